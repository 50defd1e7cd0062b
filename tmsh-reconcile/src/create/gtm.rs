use config_diff_core::tree::scalar_text;
use config_diff_core::{ConfigTree, DiffEntry, PropertyBag};
use serde_json::{Map, Value};
use tracing::warn;

use super::{resource, rhs_command};
use crate::command::{CommandFragment, CREATE, MODIFY};
use crate::context::Context;
use crate::error::{Result, ScriptError};
use crate::stringify::stringify;

const WIDEIP_PREFIX: &str = "gtm wideip ";
/// Wide-IP collections cleared with `none` when recreated without them.
const WIDEIP_COLLECTIONS: [&str; 2] = ["pools", "aliases"];
const LONGEST_MATCH: &str = "longest-match";

pub(crate) fn is_wideip_command(command: &str) -> bool {
    command.starts_with(WIDEIP_PREFIX)
}

/// Device form of a wide-IP path: the record-type suffix is split off and
/// the domain name is quoted, so `/Common/Shared/x.example.com a` becomes
/// `\"/Common/Shared/x.example.com\"`.
pub fn quoted_wideip(path: &str) -> String {
    let name = match path.rsplit_once(' ') {
        Some((name, _record_type)) => name,
        None => path,
    };
    format!("\\\"{name}\\\"")
}

/// Wide-IP properties with empty defaults for the collections and the
/// enabled flag, overlaid with `properties`.
pub fn wideip_with_defaults(properties: Option<&PropertyBag>) -> PropertyBag {
    let mut bag = PropertyBag::new();
    for key in WIDEIP_COLLECTIONS {
        bag.insert(key.to_string(), Value::Object(Map::new()));
    }
    bag.insert("enabled".to_string(), Value::String(String::new()));
    if let Some(properties) = properties {
        for (key, value) in properties {
            bag.insert(key.clone(), value.clone());
        }
    }
    bag
}

pub(super) fn wideip(
    _context: &mut Context,
    diff: &DiffEntry,
    bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let command = rhs_command(diff)?;
    Ok(CommandFragment::single(format!(
        "{CREATE} {command} {}{}",
        quoted_wideip(path),
        stringify(command, &bag, true)
    )))
}

/// Topology records are not addressable by name: each record becomes its
/// own create, and the longest-match flag lives on global settings.
pub(super) fn topology(
    context: &mut Context,
    diff: &DiffEntry,
    bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let mut fragment = CommandFragment::new();

    match bag.get("records") {
        Some(Value::Object(records)) => {
            for record in records.values() {
                let Value::Object(record) = record else {
                    return Err(ScriptError::ExpectedBag {
                        resource: path.to_string(),
                        key: "records".to_string(),
                    });
                };
                fragment.command(topology_record(record));
            }
        }
        Some(Value::Null) | None => {}
        Some(_) => {
            return Err(ScriptError::ExpectedBag {
                resource: path.to_string(),
                key: "records".to_string(),
            })
        }
    }

    if let Some(longest_match) = bag.get(LONGEST_MATCH).map(scalar_text) {
        if context.target.at_least(14, 1) {
            let flag = if matches!(longest_match.as_str(), "true" | "yes" | "enabled") {
                "yes"
            } else {
                "no"
            };
            fragment.command(longest_match_command(flag));
        } else {
            warn!(
                resource = path,
                version = %context.target.version,
                "topology longest-match needs 14.1 or later; leaving global settings untouched"
            );
        }
    }
    Ok(fragment)
}

fn topology_record(record: &PropertyBag) -> String {
    let mut line = format!("{CREATE} gtm topology");
    for key in ["ldns", "server"] {
        if let Some(value) = record.get(key).map(scalar_text) {
            line.push_str(&format!(" {key}: {value}"));
        }
    }
    if let Some(weight) = record.get("weight").map(scalar_text) {
        line.push_str(&format!(" weight {weight}"));
    }
    line
}

pub(crate) fn longest_match_command(flag: &str) -> String {
    format!("{MODIFY} gtm global-settings load-balancing topology-longest-match {flag}")
}
