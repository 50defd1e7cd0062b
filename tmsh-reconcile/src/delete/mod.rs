//! Deletion fragments, dispatched on the current resource type.

use config_diff_core::tree::scalar_text;
use config_diff_core::{ConfigTree, DiffEntry, DiffKind};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cleanup::{build_reference_cleanup, HolderKind};
use crate::command::{Command, CommandFragment, CREATE, DELETE, MODIFY};
use crate::context::Context;
use crate::create::{
    is_wideip_command, longest_match_command, modifies_in_place, partition_name, quoted_wideip,
    wideip_with_defaults,
};
use crate::error::{Result, ScriptError};
use crate::stringify::stringify;

/// Common signature of every resource-specific delete rule.
pub type DeleteHandler = fn(&mut Context, &DiffEntry, &ConfigTree) -> Result<CommandFragment>;

fn delete_handler(command: &str) -> Option<DeleteHandler> {
    let handler: DeleteHandler = match command {
        "auth partition" => partition,
        "gtm topology" => topology,
        "ltm node" => node,
        "ltm virtual" => virtual_server,
        "sys log-config publisher" => log_publisher,
        cmd if HolderKind::from_command(cmd).is_some() => rule_holder,
        cmd if is_wideip_command(cmd) => wideip,
        _ => return None,
    };
    Some(handler)
}

/// Build the deletion fragment for `diff`, dispatched on its `lhs_command`.
pub fn build_delete(context: &mut Context, diff: &DiffEntry, current: &ConfigTree) -> Result<CommandFragment> {
    let command = lhs_command(diff)?;
    match delete_handler(command) {
        Some(handler) => {
            debug!(command, resource = ?diff.resource(), "delete rule");
            handler(context, diff, current)
        }
        None => Ok(CommandFragment::single(delete_line(command, resource(diff)?))),
    }
}

fn resource(diff: &DiffEntry) -> Result<&str> {
    diff.resource().ok_or(ScriptError::EmptyPath)
}

fn lhs_command(diff: &DiffEntry) -> Result<&str> {
    diff.lhs_command
        .as_deref()
        .ok_or_else(|| ScriptError::MissingCommand {
            path: diff.resource().unwrap_or_default().to_string(),
            side: "delete",
        })
}

fn delete_line(command: &str, path: &str) -> String {
    format!("{DELETE} {command} {path}")
}

/// True when the whole resource, not one of its properties, is removed.
fn removes_resource(diff: &DiffEntry) -> bool {
    diff.kind == DiffKind::Deleted && !diff.is_nested()
}

fn partition(_context: &mut Context, diff: &DiffEntry, _current: &ConfigTree) -> Result<CommandFragment> {
    if modifies_in_place(diff, "auth partition") {
        return Ok(CommandFragment::new());
    }
    let name = partition_name(resource(diff)?)?;
    Ok(CommandFragment::single(delete_line("auth partition", name)))
}

/// Shared-partition nodes are deleted after commit and may fail: an FQDN node
/// resolving to the same address can hold it briefly.
fn node(_context: &mut Context, diff: &DiffEntry, _current: &ConfigTree) -> Result<CommandFragment> {
    if modifies_in_place(diff, "ltm node") {
        return Ok(CommandFragment::new());
    }
    let path = resource(diff)?;
    let line = delete_line("ltm node", path);
    if path.starts_with("/Common/") && !diff.is_nested() {
        let mut fragment = CommandFragment::new();
        fragment.post_trans.push(Command::best_effort(line));
        return Ok(fragment);
    }
    Ok(CommandFragment::single(line))
}

fn log_publisher(_context: &mut Context, diff: &DiffEntry, _current: &ConfigTree) -> Result<CommandFragment> {
    const COMMAND: &str = "sys log-config publisher";
    if modifies_in_place(diff, COMMAND) {
        return Ok(CommandFragment::new());
    }
    let path = resource(diff)?;
    let mut fragment = CommandFragment::single(format!("{MODIFY} {COMMAND} {path} destinations none"));
    if removes_resource(diff) {
        fragment.post_trans(delete_line(COMMAND, path));
    } else {
        fragment.command(delete_line(COMMAND, path));
    }
    Ok(fragment)
}

/// Deleting a virtual also removes the shared virtual address it was created
/// with, when the address cache shows this tool owns it.
fn virtual_server(context: &mut Context, diff: &DiffEntry, current: &ConfigTree) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let mut fragment = CommandFragment::single(delete_line("ltm virtual", path));
    if !removes_resource(diff) {
        return Ok(fragment);
    }

    let Some(destination) = current
        .get(path)
        .and_then(|item| item.properties.get("destination"))
        .map(scalar_text)
    else {
        return Ok(fragment);
    };
    if !destination.starts_with("/Common/") {
        return Ok(fragment);
    }
    let Some(address) = destination_address(&destination) else {
        warn!(virtual_server = path, destination = %destination, "unparsable destination; keeping its address");
        return Ok(fragment);
    };
    match context.owned_virtual_address(address) {
        Some(record) => {
            debug!(virtual_server = path, address = %record.full_path, "removing owned virtual address");
            fragment
                .post_trans
                .push(Command::best_effort(delete_line("ltm virtual-address", &record.full_path)));
        }
        None => debug!(virtual_server = path, address, "address not owned; keeping it"),
    }
    Ok(fragment)
}

/// Address part of a `/<partition>/<address><sep><port>` destination.
///
/// IPv6 destinations separate the port with `.`, IPv4 ones with `:`.
pub(crate) fn destination_address(destination: &str) -> Option<&str> {
    let (_, target) = destination.rsplit_once('/')?;
    let address = if target.matches(':').count() > 1 {
        target.rsplit_once('.').map_or(target, |(address, _port)| address)
    } else {
        target.rsplit_once(':').map_or(target, |(address, _port)| address)
    };
    (!address.is_empty()).then_some(address)
}

/// Rule holders detach their references before the delete.
fn rule_holder(_context: &mut Context, diff: &DiffEntry, current: &ConfigTree) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let command = lhs_command(diff)?;
    let mut fragment = CommandFragment::new();
    if let Some(kind) = HolderKind::from_command(command) {
        match current.get(path).and_then(|item| item.properties.get("rules")) {
            Some(Value::Object(rules)) => fragment.extend(build_reference_cleanup(path, rules, kind)),
            Some(Value::Null) | None => {}
            Some(_) => {
                return Err(ScriptError::ExpectedBag {
                    resource: path.to_string(),
                    key: "rules".to_string(),
                })
            }
        }
    }
    fragment.command(delete_line(command, path));
    Ok(fragment)
}

/// Topology records go as a set; the longest-match flag returns to its default.
fn topology(context: &mut Context, _diff: &DiffEntry, _current: &ConfigTree) -> Result<CommandFragment> {
    let mut fragment = CommandFragment::single(delete_line("gtm topology", "all"));
    if context.target.at_least(14, 1) {
        fragment.command(longest_match_command("yes"));
    }
    Ok(fragment)
}

/// Wide IPs are recreated from the current tree if the transaction fails.
fn wideip(_context: &mut Context, diff: &DiffEntry, current: &ConfigTree) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let command = lhs_command(diff)?;
    let name = quoted_wideip(path);
    let mut fragment = CommandFragment::single(delete_line(command, &name));

    let restored = wideip_with_defaults(current.get(path).map(|item| &item.properties));
    fragment.rollback_step(format!(
        "{CREATE} {command} {name}{}",
        stringify(command, &restored, true)
    ));
    Ok(fragment)
}

#[cfg(test)]
mod tests;
