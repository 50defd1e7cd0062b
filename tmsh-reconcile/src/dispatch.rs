//! Diff-kind state machine folding diff entries into one command script.

use config_diff_core::{ConfigTree, DiffEntry, DiffKind};
use tracing::{debug, info};

use crate::command::{CommandFragment, CommandScript};
use crate::context::Context;
use crate::create::{build_create, is_remote_import, modifies_in_place};
use crate::error::{Result, ScriptError};
use crate::monitor::MINIMUM_MONITORS;
use crate::rename::build_rename_script;

/// Fold one diff entry into `script`.
///
/// The desired bag is copied before any handler sees it, so `desired` is
/// never modified. Delete output precedes create output in every section.
/// An edited remote import skips the delete: its migration swaps the new
/// copy in under the declared name, and the holders stay attached to it.
pub fn dispatch(
    context: &mut Context,
    script: &mut CommandScript,
    diff: &DiffEntry,
    desired: &ConfigTree,
    current: &ConfigTree,
) -> Result<()> {
    let (mut run_delete, run_create) = match diff.kind {
        DiffKind::New => (diff.is_nested(), true),
        DiffKind::Deleted => (true, diff.is_nested()),
        DiffKind::Edited | DiffKind::Array => (true, true),
    };
    if run_delete && run_create && replaced_by_import(diff, desired) {
        run_delete = false;
    }
    debug!(
        kind = %diff.kind,
        path = %diff.display_path(),
        run_delete,
        run_create,
        "dispatching diff entry"
    );

    let mut fragment = CommandFragment::new();
    if run_delete {
        fragment.extend(crate::delete::build_delete(context, diff, current)?);
    }
    if run_create {
        let path = diff.resource().ok_or(ScriptError::EmptyPath)?;
        let bag = desired
            .get(path)
            .map(|item| item.properties.clone())
            .ok_or_else(|| ScriptError::MissingDesired(path.to_string()))?;
        fragment.extend(build_create(context, diff, bag, current)?);
    }
    script.append(fragment);
    Ok(())
}

fn replaced_by_import(diff: &DiffEntry, desired: &ConfigTree) -> bool {
    let Some(item) = diff.resource().and_then(|path| desired.get(path)) else {
        return false;
    };
    is_remote_import(&item.command, &item.properties)
}

/// Build the script for a whole diff.
///
/// Entries are coalesced to one per resource, since each generator renders
/// the complete resource. Rename events recorded along the way are drained
/// and their migration commands appended after every per-resource fragment.
pub fn update_script(
    context: &mut Context,
    desired: &ConfigTree,
    current: &ConfigTree,
    diffs: &[DiffEntry],
) -> Result<CommandScript> {
    let mut script = CommandScript::new();
    let entries = coalesce(diffs)?;
    for diff in &entries {
        dispatch(context, &mut script, diff, desired, current)?;
    }

    let events = context.take_rename_events();
    if !events.is_empty() {
        let renames = build_rename_script(context, &events);
        script.append(renames.into_fragment());
    }
    info!(
        entries = diffs.len(),
        resources = entries.len(),
        renames = events.len(),
        commands = script.len(),
        "script generated"
    );
    Ok(script)
}

/// One entry per resource, in first-appearance order.
///
/// A replacing entry wins over an in-place one, and among equals an entry
/// touching the monitor rule wins so its clear-and-restore steps are kept.
fn coalesce(diffs: &[DiffEntry]) -> Result<Vec<&DiffEntry>> {
    let mut chosen: Vec<&DiffEntry> = Vec::new();
    for diff in diffs {
        let path = diff.resource().ok_or(ScriptError::EmptyPath)?;
        match chosen.iter_mut().find(|entry| entry.resource() == Some(path)) {
            Some(slot) => {
                if score(diff) > score(*slot) {
                    *slot = diff;
                }
            }
            None => chosen.push(diff),
        }
    }
    Ok(chosen)
}

fn score(diff: &DiffEntry) -> u8 {
    let command = diff
        .rhs_command
        .as_deref()
        .or(diff.lhs_command.as_deref())
        .unwrap_or_default();
    let replaces = u8::from(!modifies_in_place(diff, command));
    let monitor = u8::from(diff.touches("monitor") || diff.touches(MINIMUM_MONITORS));
    replaces * 2 + monitor
}
