//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

use metamodel_core::application::DeploymentMode;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "metamodel",
    bin_name = "metamodel",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Inspect and validate a facet-based domain metamodel",
    long_about = "metamodel introspects domain classes through a programming model \
                  of facet factories and reports the resulting specifications, \
                  their facets and every validation failure.",
    after_help = "EXAMPLES:\n\
        \x20 metamodel list\n\
        \x20 metamodel inspect com.acme.Customer --diagnostics\n\
        \x20 metamodel validate --mode production\n\
        \x20 metamodel identifier 'com.acme.Order#cancel(string)[0]'\n\
        \x20 metamodel completions bash > /usr/share/bash-completion/completions/metamodel",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the specification of one class.
    #[command(
        visible_alias = "i",
        about = "Show a class specification",
        after_help = "EXAMPLES:\n\
            \x20 metamodel inspect com.acme.Customer\n\
            \x20 metamodel inspect com.acme.Order --diagnostics\n\
            \x20 metamodel inspect com.acme.Order --format json"
    )]
    Inspect(InspectArgs),

    /// Build every class and report validation failures.
    #[command(
        visible_alias = "check",
        about = "Build and validate the whole metamodel",
        after_help = "EXAMPLES:\n\
            \x20 metamodel validate\n\
            \x20 metamodel validate --mode production"
    )]
    Validate(ValidateArgs),

    /// List known classes.
    #[command(
        visible_alias = "ls",
        about = "List known classes",
        after_help = "EXAMPLES:\n\
            \x20 metamodel list\n\
            \x20 metamodel list --introspect\n\
            \x20 metamodel list --format names"
    )]
    List(ListArgs),

    /// Parse an identifier and show its parts.
    #[command(
        visible_alias = "id",
        about = "Parse an identifier",
        after_help = "EXAMPLES:\n\
            \x20 metamodel identifier com.acme.Customer#name\n\
            \x20 metamodel identifier 'com.acme.Order#cancel(string)[0]'"
    )]
    Identifier(IdentifierArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 metamodel completions bash > ~/.local/share/bash-completion/completions/metamodel\n\
            \x20 metamodel completions zsh  > ~/.zfunc/_metamodel\n\
            \x20 metamodel completions fish > ~/.config/fish/completions/metamodel.fish"
    )]
    Completions(CompletionsArgs),

    /// Read the effective configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 metamodel config get validation.mode\n\
            \x20 metamodel config list\n\
            \x20 metamodel config path"
    )]
    Config(ConfigCommands),
}

// ── inspect ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Fully qualified class name.
    #[arg(value_name = "CLASS", help = "Fully qualified class name")]
    pub class: String,

    /// Also show superseded facets, facet origins and validation failures.
    #[arg(short = 'd', long = "diagnostics", help = "Show superseded facets and failures")]
    pub diagnostics: bool,

    /// Output format; defaults to text unless `--output-format json` is set.
    #[arg(short = 'f', long = "format", value_enum, help = "Output format")]
    pub format: Option<InspectFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum InspectFormat {
    Text,
    Json,
}

// ── validate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Deployment mode; defaults to `validation.mode` from the configuration.
    #[arg(short = 'm', long = "mode", value_enum, help = "Deployment mode")]
    pub mode: Option<ModeArg>,
}

/// Deployment mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ModeArg {
    /// Report failures, keep going.
    Prototype,
    /// Fail on any error-severity failure.
    Production,
}

impl From<ModeArg> for DeploymentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Prototype => DeploymentMode::Prototype,
            ModeArg::Production => DeploymentMode::Production,
        }
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Introspect every class first so member counts are known.
    #[arg(short = 'i', long = "introspect", help = "Introspect classes before listing")]
    pub introspect: bool,

    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ListFormat {
    Table,
    /// One class name per line.
    Names,
    Json,
}

// ── identifier ────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IdentifierArgs {
    /// Canonical identifier text, e.g. `com.acme.Customer#name`.
    #[arg(value_name = "TEXT", help = "Identifier to parse")]
    pub text: String,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

// ── config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `validation.mode`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_inspect_command() {
        let cli = Cli::parse_from(["metamodel", "inspect", "com.acme.Customer", "-d"]);
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.class, "com.acme.Customer");
                assert!(args.diagnostics);
                assert_eq!(args.format, None);
            }
            other => panic!("expected Inspect, got {other:?}"),
        }
    }

    #[test]
    fn parse_validate_mode() {
        let cli = Cli::parse_from(["metamodel", "validate", "--mode", "production"]);
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.mode.map(DeploymentMode::from), Some(DeploymentMode::Production));
        } else {
            panic!("expected Validate command");
        }
    }

    #[test]
    fn aliases_resolve() {
        let cli = Cli::parse_from(["metamodel", "ls", "--format", "names"]);
        assert!(matches!(cli.command, Commands::List(ListArgs { format: ListFormat::Names, .. })));

        let cli = Cli::parse_from(["metamodel", "id", "a.B#c"]);
        assert!(matches!(cli.command, Commands::Identifier(_)));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["metamodel", "list", "-vv", "--no-color"]);
        assert_eq!(cli.global.verbose, 2);
        assert!(cli.global.no_color);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["metamodel", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result = Cli::try_parse_from(["metamodel", "validate", "--mode", "staging"]);
        assert!(result.is_err());
    }
}
