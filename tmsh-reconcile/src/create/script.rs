use config_diff_core::tree::scalar_text;
use config_diff_core::{ConfigTree, DiffEntry, PropertyBag};

use super::{resource, rhs_command};
use crate::command::{CommandFragment, CREATE};
use crate::context::Context;
use crate::error::Result;
use crate::stringify::stringify;

/// Property holding the script source.
const BODY_KEY: &str = "api-anonymous";

static SCRIPT_COMMANDS: &[&str] = &["gtm rule", "ltm rule", "pem irule"];

pub fn is_script_command(command: &str) -> bool {
    SCRIPT_COMMANDS.contains(&command)
}

/// `api-anonymous \{\n<body>\n\}`, with the body taken verbatim so quotes
/// and leading comments survive.
pub fn script_body_text(body: &str) -> String {
    format!("{BODY_KEY} \\{{\n{body}\n\\}}")
}

pub(super) fn script_body(
    _context: &mut Context,
    diff: &DiffEntry,
    mut bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let command = rhs_command(diff)?;
    let body = bag
        .shift_remove(BODY_KEY)
        .map(|value| scalar_text(&value))
        .unwrap_or_default();
    Ok(CommandFragment::single(format!(
        "{CREATE} {command} {path}{} {}",
        stringify(command, &bag, false),
        script_body_text(&body)
    )))
}
