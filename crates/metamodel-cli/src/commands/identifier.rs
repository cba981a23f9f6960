//! `metamodel identifier`: parse an identifier and show its parts.

use serde::Serialize;

use metamodel_core::domain::{Identifier, IdentifierKind};
use metamodel_core::error::MetamodelError;

use crate::{cli::IdentifierArgs, error::CliResult, output::OutputManager};

#[derive(Debug, Serialize)]
struct IdentifierView<'a> {
    canonical: String,
    kind: &'static str,
    class: &'a str,
    simple_class: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    member: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    parameter_types: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter_index: Option<usize>,
}

impl<'a> From<&'a Identifier> for IdentifierView<'a> {
    fn from(id: &'a Identifier) -> Self {
        Self {
            canonical: id.to_canonical_string(),
            kind: kind_name(id.kind()),
            class: id.class_name(),
            simple_class: id.simple_class_name(),
            member: id.member_name(),
            parameter_types: id.param_types(),
            parameter_index: id.param_index(),
        }
    }
}

fn kind_name(kind: IdentifierKind) -> &'static str {
    match kind {
        IdentifierKind::Class => "class",
        IdentifierKind::Member => "member",
        IdentifierKind::Action => "action",
        IdentifierKind::Parameter(_) => "parameter",
    }
}

pub fn execute(args: IdentifierArgs, output: OutputManager) -> CliResult<()> {
    let id = Identifier::parse(&args.text).map_err(MetamodelError::from)?;
    let view = IdentifierView::from(&id);

    if output.is_json() {
        return output.json(&view);
    }

    output.header(&view.canonical)?;
    output.data(&format!("  kind:       {}", view.kind))?;
    output.data(&format!("  class:      {}", view.class))?;
    if let Some(member) = view.member {
        output.data(&format!("  member:     {member}"))?;
    }
    if view.kind == "action" || view.kind == "parameter" {
        output.data(&format!("  parameters: ({})", view.parameter_types.join(", ")))?;
    }
    if let Some(index) = view.parameter_index {
        output.data(&format!("  index:      {index}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_of_a_parameter() {
        let id = Identifier::parse("com.acme.Order#cancel(string)[0]").unwrap();
        let view = IdentifierView::from(&id);
        assert_eq!(view.kind, "parameter");
        assert_eq!(view.simple_class, "Order");
        assert_eq!(view.member, Some("cancel"));
        assert_eq!(view.parameter_types, ["string"]);
        assert_eq!(view.parameter_index, Some(0));
        assert_eq!(view.canonical, "com.acme.Order#cancel(string)[0]");
    }

    #[test]
    fn class_view_omits_member_parts() {
        let id = Identifier::parse("com.acme.Order").unwrap();
        let json = serde_json::to_value(IdentifierView::from(&id)).unwrap();
        assert_eq!(json["kind"], "class");
        assert!(json.get("member").is_none());
        assert!(json.get("parameter_types").is_none());
    }
}
