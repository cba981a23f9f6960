//! One module per subcommand. Each exposes `execute`.

pub mod completions;
pub mod config;
pub mod identifier;
pub mod inspect;
pub mod list;
pub mod validate;
