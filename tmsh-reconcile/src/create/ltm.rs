use config_diff_core::tree::scalar_text;
use config_diff_core::{ConfigTree, DiffEntry, PropertyBag};
use serde_json::{Map, Value};

use super::{create_line, create_or_modify, resource};
use crate::command::{CommandFragment, CREATE, MODIFY};
use crate::context::{Context, OWNER_METADATA_KEY, OWNER_METADATA_VALUE};
use crate::error::{Result, ScriptError};
use crate::monitor::{encode_member_monitors, encode_pool_monitors, MINIMUM_MONITORS};
use crate::stringify::stringify;

/// Policy features implied by event names found in conditions and actions.
static POLICY_REQUIRES: &[(&str, &[&str])] = &[
    ("client-ssl", &["ssl-client-hello", "ssl-client-serverhello-send", "ssl-extension"]),
    ("http", &["http-", "request", "response"]),
    ("server-ssl", &["ssl-server-handshake", "ssl-server-hello"]),
    ("ssl-persistence", &["ssl-persistence"]),
    ("tcp", &["tcp", "client-accepted", "server-connected"]),
];

/// Policy features implied by action names.
static POLICY_CONTROLS: &[(&str, &[&str])] = &[
    ("acceleration", &["wam"]),
    ("asm", &["asm"]),
    ("avr", &["avr"]),
    ("caching", &["cache"]),
    ("classification", &["classification"]),
    ("compression", &["compress"]),
    ("forwarding", &["forward", "shutdown"]),
    ("persistence", &["persist"]),
    ("request-adaptation", &["request-adapt"]),
    ("response-adaptation", &["response-adapt"]),
    ("server-ssl", &["server-ssl"]),
];

/// Pools encode member monitors, and a pool-level monitor change clears the
/// monitor rule first so the replacement applies cleanly.
pub(super) fn pool(
    _context: &mut Context,
    diff: &DiffEntry,
    mut bag: PropertyBag,
    current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    encode_pool_monitors(&mut bag);
    encode_member_monitors(&mut bag);
    let mut fragment = CommandFragment::new();

    let touches_monitor = matches!(
        diff.path.get(2).map(String::as_str),
        Some("monitor") | Some(MINIMUM_MONITORS)
    );
    if touches_monitor && diff.path.get(1).map(String::as_str) == Some("properties") {
        fragment.pre_trans(format!("{MODIFY} ltm pool {path} monitor none"));
        let restored = current
            .get(path)
            .map(|item| {
                let mut existing = item.properties.clone();
                encode_pool_monitors(&mut existing);
                existing.get("monitor").map(scalar_text).unwrap_or_default()
            })
            .filter(|monitor| !monitor.is_empty())
            .unwrap_or_else(|| "none".to_string());
        fragment.rollback_step(format!("{MODIFY} ltm pool {path} monitor {restored}"));
    }

    fragment.command(create_line(CREATE, "ltm pool", path, &bag));
    Ok(fragment)
}

/// Nodes are modified in place unless their address changes; the address
/// fields are not modifiable and are dropped from a modify.
pub(super) fn node(
    _context: &mut Context,
    diff: &DiffEntry,
    mut bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    if super::modifies_in_place(diff, "ltm node") {
        bag.shift_remove("address");
        bag.shift_remove("fqdn");
    }
    Ok(CommandFragment::single(create_or_modify(diff, "ltm node", path, &bag)))
}

/// Shared virtual addresses get the ownership marker so that a later virtual
/// deletion may remove them.
pub(super) fn virtual_address(
    _context: &mut Context,
    diff: &DiffEntry,
    mut bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    if path.starts_with("/Common/") {
        let metadata = bag
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(metadata) = metadata else {
            return Err(ScriptError::ExpectedBag {
                resource: path.to_string(),
                key: "metadata".to_string(),
            });
        };
        let mut marker = Map::new();
        marker.insert("value".to_string(), Value::String(OWNER_METADATA_VALUE.to_string()));
        metadata.insert(OWNER_METADATA_KEY.to_string(), Value::Object(marker));
    }
    Ok(CommandFragment::single(create_line(
        CREATE,
        "ltm virtual-address",
        path,
        &bag,
    )))
}

/// Policies declare the features their rules depend on; infer `requires`
/// from conditions and actions and `controls` from actions.
pub(super) fn policy(
    _context: &mut Context,
    diff: &DiffEntry,
    mut bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let mut condition_text = String::new();
    let mut action_text = String::new();

    match bag.get("rules") {
        Some(Value::Object(rules)) => {
            for rule in rules.values() {
                let Value::Object(rule) = rule else {
                    continue;
                };
                if let Some(Value::Object(conditions)) = rule.get("conditions") {
                    condition_text.push_str(&stringify("ltm policy", conditions, false));
                }
                if let Some(Value::Object(actions)) = rule.get("actions") {
                    action_text.push_str(&stringify("ltm policy", actions, false));
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(_) => {
            return Err(ScriptError::ExpectedBag {
                resource: path.to_string(),
                key: "rules".to_string(),
            })
        }
    }

    let mut requires = feature_set(&bag, "requires");
    infer_features(POLICY_REQUIRES, &format!("{condition_text}{action_text}"), &mut requires);
    let mut controls = feature_set(&bag, "controls");
    infer_features(POLICY_CONTROLS, &action_text, &mut controls);

    bag.insert("requires".to_string(), Value::Object(requires));
    bag.insert("controls".to_string(), Value::Object(controls));
    Ok(CommandFragment::single(create_line(CREATE, "ltm policy", path, &bag)))
}

fn feature_set(bag: &PropertyBag, key: &str) -> Map<String, Value> {
    match bag.get(key) {
        Some(Value::Object(existing)) => existing.clone(),
        _ => Map::new(),
    }
}

fn infer_features(table: &[(&str, &[&str])], text: &str, features: &mut Map<String, Value>) {
    for (feature, needles) in table {
        if needles.iter().any(|needle| text.contains(needle)) {
            features
                .entry(feature.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
}
