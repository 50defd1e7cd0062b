//! Creation and modification fragments, dispatched on the desired resource type.
//!
//! Every handler receives an exclusively owned copy of the target bag and may
//! rewrite it freely. Types without a handler get one `tmsh::create` command
//! carrying the whole bag.

use config_diff_core::{ConfigTree, DiffEntry, PropertyBag};
use tracing::debug;

use crate::command::{CommandFragment, CREATE, MODIFY};
use crate::context::Context;
use crate::error::{Result, ScriptError};
use crate::monitor::encode_monitors;
use crate::stringify::stringify;

mod apm;
mod gtm;
mod ltm;
mod script;
mod sys;

pub use apm::{is_remote_import, REMOTE_IMPORT_MARKER};
pub use gtm::{quoted_wideip, wideip_with_defaults};
pub use script::{is_script_command, script_body_text};
pub(crate) use gtm::{is_wideip_command, longest_match_command};
pub(crate) use sys::partition_name;

/// Common signature of every resource-specific create rule.
pub type CreateHandler =
    fn(&mut Context, &DiffEntry, PropertyBag, &ConfigTree) -> Result<CommandFragment>;

/// Resource types edited with `tmsh::modify`, with the properties whose
/// change still forces a full replacement.
static MODIFY_ON_EDIT: &[(&str, &[&str])] = &[
    ("auth partition", &[]),
    ("ltm node", &["address", "fqdn"]),
    ("sys log-config publisher", &[]),
];

fn create_handler(command: &str) -> Option<CreateHandler> {
    let handler: CreateHandler = match command {
        "auth partition" => sys::partition,
        "apm policy access-policy" | "apm profile access" => apm::remote_import,
        "gtm topology" => gtm::topology,
        "ltm node" => ltm::node,
        "ltm policy" => ltm::policy,
        "ltm pool" => ltm::pool,
        "ltm virtual-address" => ltm::virtual_address,
        "sys file ssl-cert" => sys::ssl_cert,
        "sys log-config publisher" => sys::log_publisher,
        cmd if script::is_script_command(cmd) => script::script_body,
        cmd if gtm::is_wideip_command(cmd) => gtm::wideip,
        _ => return None,
    };
    Some(handler)
}

/// Build the creation fragment for `diff`, dispatched on its `rhs_command`.
pub fn build_create(
    context: &mut Context,
    diff: &DiffEntry,
    mut bag: PropertyBag,
    current: &ConfigTree,
) -> Result<CommandFragment> {
    let command = rhs_command(diff)?;
    encode_monitors(&mut bag);
    match create_handler(command) {
        Some(handler) => {
            debug!(command, resource = ?diff.resource(), "create rule");
            handler(context, diff, bag, current)
        }
        None => Ok(CommandFragment::single(create_line(
            CREATE,
            command,
            resource(diff)?,
            &bag,
        ))),
    }
}

/// True when `diff` edits a `tmsh::modify`-capable resource in place.
///
/// Top-level additions and deletions, command changes and changes to
/// replacement-forcing properties are never in place.
pub fn modifies_in_place(diff: &DiffEntry, command: &str) -> bool {
    let Some((_, forcing)) = MODIFY_ON_EDIT.iter().find(|(cmd, _)| *cmd == command) else {
        return false;
    };
    if diff.path.get(1).map(String::as_str) != Some("properties") {
        return false;
    }
    match diff.path.get(2) {
        Some(property) => !forcing.contains(&property.as_str()),
        None => false,
    }
}

pub(crate) fn resource(diff: &DiffEntry) -> Result<&str> {
    diff.resource().ok_or(ScriptError::EmptyPath)
}

pub(crate) fn rhs_command(diff: &DiffEntry) -> Result<&str> {
    diff.rhs_command
        .as_deref()
        .ok_or_else(|| ScriptError::MissingCommand {
            path: diff.resource().unwrap_or_default().to_string(),
            side: "create",
        })
}

pub(crate) fn create_line(instruction: &str, command: &str, path: &str, bag: &PropertyBag) -> String {
    format!("{instruction} {command} {path}{}", stringify(command, bag, true))
}

/// Create, or modify when the edit can be applied in place.
pub(crate) fn create_or_modify(diff: &DiffEntry, command: &str, path: &str, bag: &PropertyBag) -> String {
    let instruction = if modifies_in_place(diff, command) {
        MODIFY
    } else {
        CREATE
    };
    create_line(instruction, command, path, bag)
}

#[cfg(test)]
mod tests;
