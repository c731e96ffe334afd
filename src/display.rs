use crate::editor::{EditorState, SectionValue};
use crate::validation::EditorErrors;
use comfy_table::Table;
use serde_json::json;
use std::fmt::Write;

/// One row per failing field: section, group, field, message
pub fn format_errors_text(errors: &EditorErrors) -> String {
    if errors.is_empty() {
        return "All sections valid.\n".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["Section", "Group", "Field", "Message"]);
    for (key, section) in errors.iter() {
        for (group, field, message) in section.rows() {
            table.add_row(vec![
                key.label(),
                group.unwrap_or("-"),
                field,
                message,
            ]);
        }
    }

    format!("{table}\n")
}

pub fn format_errors_json(errors: &EditorErrors) -> String {
    serde_json::to_string_pretty(&json!({
        "valid": errors.is_empty(),
        "errors": errors,
    }))
    .unwrap_or_else(|_| "{\"error\":\"failed to serialize validation errors\"}".into())
}

/// Section-by-section summary of an editor state
pub fn format_state_text(state: &EditorState) -> String {
    let mut out = String::new();
    if state.is_empty() {
        let _ = writeln!(out, "No sections.");
        return out;
    }

    for (key, value) in state.iter() {
        let summary = match value {
            SectionValue::Text(text) => format!("{:?}", text),
            SectionValue::Location(wkt) => wkt.clone(),
            SectionValue::Datatypes(values) | SectionValue::Sources(values) => values.join(", "),
            SectionValue::TimeRange(section) => {
                let range = &section.range;
                let when = match range.kind.as_deref() {
                    Some("DURING") => format!(
                        "DURING {} / {}",
                        range.from.as_deref().unwrap_or("?"),
                        range.to.as_deref().unwrap_or("?")
                    ),
                    Some("=") => format!(
                        "LAST {} {}",
                        range.last.as_deref().unwrap_or("?"),
                        range.unit.as_deref().unwrap_or("?")
                    ),
                    Some(kind) => format!("{} {}", kind, range.value.as_deref().unwrap_or("?")),
                    None => "(no type)".to_string(),
                };
                format!("{} on {}", when, section.apply_to.join(", "))
            }
        };
        let _ = writeln!(out, "{:<12} {}", key.label(), summary);
    }

    out
}
