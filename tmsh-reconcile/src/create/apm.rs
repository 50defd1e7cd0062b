//! Access profiles and policies posted from a remote artifact.

use config_diff_core::tree::scalar_text;
use config_diff_core::{ConfigTree, DiffEntry, PropertyBag};
use serde_json::Value;
use tracing::{debug, warn};

use super::{create_line, resource, rhs_command, script};
use crate::command::{Command, CommandFragment, CREATE};
use crate::context::Context;
use crate::error::{Result, ScriptError};
use crate::rename::{mentions_name, ProfileReferences, RenameEvent, RenameKind, ScriptReference};

/// Internal key marking a bag whose object is imported from a downloaded file.
pub const REMOTE_IMPORT_MARKER: &str = "_remote";

/// Resource types that may be posted from a remote artifact.
const REMOTE_COMMANDS: [&str; 2] = ["apm policy access-policy", "apm profile access"];

/// True when `bag` declares a remotely imported access profile or policy.
///
/// Such objects are replaced through the rename migration, never by a
/// delete in the transaction.
pub fn is_remote_import(command: &str, bag: &PropertyBag) -> bool {
    REMOTE_COMMANDS.contains(&command) && bag.contains_key(REMOTE_IMPORT_MARKER)
}

pub(super) fn remote_import(
    context: &mut Context,
    diff: &DiffEntry,
    bag: PropertyBag,
    current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let command = rhs_command(diff)?;
    let Some(marker) = bag.get(REMOTE_IMPORT_MARKER) else {
        return Ok(CommandFragment::single(create_line(CREATE, command, path, &bag)));
    };
    let Value::Object(marker) = marker else {
        return Err(ScriptError::ExpectedBag {
            resource: path.to_string(),
            key: REMOTE_IMPORT_MARKER.to_string(),
        });
    };

    let file = marker.get("file").map(scalar_text).unwrap_or_default();
    let enable = marker.get("enable").and_then(Value::as_bool);
    let tenant = match &context.task.tenant {
        Some(tenant) => tenant.clone(),
        None => tenant_of(path)?.to_string(),
    };
    let source = format!("{}/{file}", context.download_dir.trim_end_matches('/'));
    let new_name = format!("{path}_{}", context.task.id);
    let kind = if command == "apm profile access" {
        RenameKind::Profile
    } else {
        RenameKind::Policy
    };

    let mut fragment = CommandFragment::new();
    fragment.pre_trans.push(Command::best_effort(format!(
        "exec ng_import -s {source} {path} -p {tenant}"
    )));
    fragment.pre_trans(format!("exec ng_import -s {source} {new_name} -p {tenant}"));

    let references = find_references(current, path, kind);
    debug!(
        resource = path,
        virtuals = references.virtuals.len(),
        scripts = references.scripts.len(),
        "recording remote import rename"
    );
    context.record_rename(RenameEvent {
        tenant,
        old_name: path.to_string(),
        new_name,
        kind,
        enable,
        references,
    });
    Ok(fragment)
}

fn tenant_of(path: &str) -> Result<&str> {
    path.strip_prefix('/')
        .and_then(|rest| rest.split('/').next())
        .filter(|tenant| !tenant.is_empty())
        .ok_or_else(|| ScriptError::MalformedPath(path.to_string()))
}

/// Objects in `current` that refer to `name` and must follow it through the rename.
fn find_references(current: &ConfigTree, name: &str, kind: RenameKind) -> ProfileReferences {
    let mut references = ProfileReferences::default();
    for (path, item) in current.iter() {
        if item.command == "ltm virtual" {
            let holds = match kind {
                RenameKind::Profile => match item.properties.get("profiles") {
                    Some(Value::Object(profiles)) => profiles.contains_key(name),
                    Some(Value::Null) | None => false,
                    Some(_) => {
                        warn!(virtual_server = %path, "profiles is not a collection; skipping");
                        false
                    }
                },
                RenameKind::Policy => item
                    .properties
                    .get("per-flow-request-access-policy")
                    .is_some_and(|policy| scalar_text(policy) == name),
            };
            if holds {
                references.virtuals.push(path.clone());
            }
        } else if script::is_script_command(&item.command) {
            let body = item
                .properties
                .get("api-anonymous")
                .map(scalar_text)
                .unwrap_or_default();
            if mentions_name(&body, name) {
                references.scripts.push(ScriptReference {
                    path: path.clone(),
                    command: item.command.clone(),
                    body,
                });
            }
        }
    }
    references
}
