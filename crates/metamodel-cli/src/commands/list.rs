//! `metamodel list`: every known class.

use metamodel_core::application::ClassInfo;

use crate::{
    cli::{ListArgs, ListFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    service,
};

pub fn execute(args: ListArgs, config: &AppConfig, output: OutputManager) -> CliResult<()> {
    let service = service::open(config)?;
    if args.introspect {
        service.loader().build_all()?;
    }
    let classes = service.list_classes()?;
    if classes.is_empty() {
        output.print("No classes found")?;
    }

    let format = if output.is_json() { ListFormat::Json } else { args.format };
    match format {
        ListFormat::Table => {
            output.header(&format!("Classes ({}):", classes.len()))?;
            for row in table_rows(&classes) {
                output.data(&row)?;
            }
        }
        ListFormat::Names => {
            for class in &classes {
                output.data(&class.name)?;
            }
        }
        ListFormat::Json => output.json(&classes)?,
    }

    Ok(())
}

fn table_rows(classes: &[ClassInfo]) -> Vec<String> {
    let width = classes
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut rows = vec![format!("  {:<width$}  {:<10}  {:>7}  STATE", "NAME", "KIND", "MEMBERS")];
    for class in classes {
        let members = class
            .members
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".into());
        rows.push(format!(
            "  {:<width$}  {:<10}  {:>7}  {}",
            class.name, class.kind, members, class.state
        ));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, members: Option<usize>) -> ClassInfo {
        ClassInfo {
            name: name.into(),
            kind: if members.is_some() { "entity".into() } else { "-".into() },
            superclass: None,
            members,
            state: if members.is_some() { "introspected".into() } else { "unknown".into() },
        }
    }

    #[test]
    fn table_aligns_names() {
        let rows = table_rows(&[info("a.B", Some(3)), info("com.acme.Customer", None)]);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("  NAME"));
        assert!(rows[1].contains("introspected"));
        assert!(rows[2].contains("unknown"));
        let state_column = rows[0].find("STATE").unwrap();
        assert_eq!(rows[1].find("introspected"), Some(state_column));
        assert_eq!(rows[2].find("unknown"), Some(state_column));
    }

    #[test]
    fn empty_table_has_header_only() {
        assert_eq!(table_rows(&[]).len(), 1);
    }
}
