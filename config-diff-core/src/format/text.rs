use crate::diff::result::{DiffEntry, DiffKind};
use crate::tree::scalar_text;

/// Format diff entries as plain text.
pub fn format_text(entries: &[DiffEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = entry.display_path();
        match entry.kind {
            DiffKind::New => lines.push(format!("+ {path}")),
            DiffKind::Deleted => lines.push(format!("- {path}")),
            DiffKind::Edited => {
                lines.push(format!("~ {path}"));
                if entry.is_nested() {
                    lines.push(format!("  current: {}", side_text(entry.lhs.as_ref())));
                    lines.push(format!("  desired: {}", side_text(entry.rhs.as_ref())));
                }
            }
            DiffKind::Array => lines.push(format!("* {path}")),
        }
    }
    lines.join("\n")
}

/// Format a simple summary of diff counts.
pub fn format_summary(entries: &[DiffEntry]) -> String {
    let mut new = 0;
    let mut deleted = 0;
    let mut edited = 0;
    let mut array = 0;

    for entry in entries {
        match entry.kind {
            DiffKind::New => new += 1,
            DiffKind::Deleted => deleted += 1,
            DiffKind::Edited => edited += 1,
            DiffKind::Array => array += 1,
        }
    }

    format!("new={new} deleted={deleted} edited={edited} array={array}")
}

fn side_text(value: Option<&serde_json::Value>) -> String {
    value.map(scalar_text).unwrap_or_default()
}
