//! `metamodel inspect`: render one class specification.

use metamodel_core::application::DeploymentMode;
use metamodel_core::application::services::{
    FacetSummary, MemberSummary, SpecificationSummary, SupersededSummary,
};
use tracing::debug;

use crate::{
    cli::{InspectArgs, InspectFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    service,
};

pub fn execute(args: InspectArgs, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    let service = service::open(config)?;

    if args.diagnostics {
        // Cross-class validators only run on a full build.
        let report = service.build(DeploymentMode::Prototype)?;
        debug!(failures = report.failures().len(), "built metamodel for diagnostics");
    }

    let summary = service.describe(&args.class)?;

    let json = match args.format {
        Some(format) => format == InspectFormat::Json,
        None => output.is_json(),
    };
    if json {
        return output.json(&summary);
    }

    output.header(&format!("{} ({})", summary.class_name, summary.kind))?;
    for line in render_text(&summary, args.diagnostics) {
        match line {
            Line::Text(text) => output.data(&text)?,
            Line::Detail(text) => output.detail(&text)?,
            Line::Failure(text) => output.error(&text)?,
        }
    }
    Ok(())
}

/// A rendered line and how to style it.
#[derive(Debug, PartialEq)]
enum Line {
    Text(String),
    Detail(String),
    Failure(String),
}

fn render_text(summary: &SpecificationSummary, diagnostics: bool) -> Vec<Line> {
    let mut lines = Vec::new();
    let text = |lines: &mut Vec<Line>, s: String| lines.push(Line::Text(s));

    text(&mut lines, format!("  named:    {} / {}", summary.singular_name, summary.plural_name));
    if let Some(superclass) = &summary.superclass {
        text(&mut lines, format!("  extends:  {superclass}"));
    }
    if summary.immutable || summary.bounded {
        let flags: Vec<&str> = [("immutable", summary.immutable), ("bounded", summary.bounded)]
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect();
        text(&mut lines, format!("  flags:    {}", flags.join(", ")));
    }

    text(&mut lines, String::new());
    text(&mut lines, "Facets:".into());
    push_facets(&mut lines, &summary.facets, 2, diagnostics);

    text(&mut lines, String::new());
    text(&mut lines, format!("Members ({}):", summary.members.len()));
    for member in &summary.members {
        push_member(&mut lines, member, diagnostics);
    }

    if diagnostics {
        text(&mut lines, String::new());
        text(&mut lines, "Superseded facets:".into());
        let superseded: Vec<(String, &SupersededSummary)> = summary
            .superseded
            .iter()
            .map(|s| (summary.class_name.clone(), s))
            .chain(summary.members.iter().flat_map(|m| {
                m.superseded
                    .iter()
                    .map(move |s| (m.identifier.to_string(), s))
                    .chain(m.parameters.iter().flat_map(|p| {
                        p.superseded.iter().map(move |s| (p.identifier.to_string(), s))
                    }))
            }))
            .collect();
        if superseded.is_empty() {
            lines.push(Line::Detail("  (none)".into()));
        }
        for (at, s) in superseded {
            lines.push(Line::Detail(format!(
                "  {at}: {} = {} [{}] lost to {} ({})",
                s.facet.facet_type, s.facet.value, s.facet.precedence, s.winner, s.reason
            )));
        }

        text(&mut lines, String::new());
        text(&mut lines, format!("Failures ({}):", summary.failures.len()));
        for failure in &summary.failures {
            lines.push(Line::Failure(failure.to_string()));
        }
    }

    lines
}

fn push_facets(lines: &mut Vec<Line>, facets: &[FacetSummary], indent: usize, diagnostics: bool) {
    let pad = " ".repeat(indent);
    for facet in facets {
        lines.push(Line::Text(format!(
            "{pad}{} = {} [{}]",
            facet.facet_type, facet.value, facet.precedence
        )));
        if diagnostics {
            lines.push(Line::Detail(format!("{pad}  from {}", facet.origin)));
        }
    }
}

fn push_member(lines: &mut Vec<Line>, member: &MemberSummary, diagnostics: bool) {
    let params = if member.parameters.is_empty() {
        String::new()
    } else {
        let types: Vec<String> = member.parameters.iter().map(|p| p.ty.to_string()).collect();
        format!("({})", types.join(", "))
    };
    let mut line = format!(
        "  {} {}{}: {}  \"{}\"",
        member.feature_type, member.id, params, member.ty, member.name
    );
    if let Some(mixin) = &member.mixed_in_from {
        line.push_str(&format!("  [mixed in from {mixin}]"));
    }
    lines.push(Line::Text(line));
    push_facets(lines, &member.facets, 6, diagnostics);

    for param in &member.parameters {
        lines.push(Line::Text(format!(
            "      [{}] {}: {}",
            param.index, param.name, param.ty
        )));
        push_facets(lines, &param.facets, 10, diagnostics);
    }
}
