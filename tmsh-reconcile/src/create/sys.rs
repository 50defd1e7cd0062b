use config_diff_core::tree::scalar_text;
use config_diff_core::{ConfigTree, DiffEntry, PropertyBag};
use serde_json::Value;
use tracing::warn;

use super::{create_line, create_or_modify, resource};
use crate::command::{CommandFragment, CREATE, MODIFY};
use crate::context::Context;
use crate::error::{Result, ScriptError};

/// Certificate fields the device rejects on an initial create.
const CERT_VALIDATOR_FIELDS: [&str; 3] = ["issuer-cert", "cert-validators", "cert-validation-options"];

/// Partitions are addressed by bare name; `/T/` names partition `T`.
pub(super) fn partition(
    _context: &mut Context,
    diff: &DiffEntry,
    bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let name = partition_name(path)?;
    Ok(CommandFragment::single(create_or_modify(diff, "auth partition", name, &bag)))
}

pub(crate) fn partition_name(path: &str) -> Result<&str> {
    let name = path.trim_matches('/');
    if name.is_empty() || name.contains('/') {
        return Err(ScriptError::MalformedPath(path.to_string()));
    }
    Ok(name)
}

pub(super) fn log_publisher(
    _context: &mut Context,
    diff: &DiffEntry,
    bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    Ok(CommandFragment::single(create_or_modify(
        diff,
        "sys log-config publisher",
        path,
        &bag,
    )))
}

/// Validator fields move to a follow-up modify after the plain create.
pub(super) fn ssl_cert(
    context: &mut Context,
    diff: &DiffEntry,
    mut bag: PropertyBag,
    _current: &ConfigTree,
) -> Result<CommandFragment> {
    let path = resource(diff)?;
    let mut validators = PropertyBag::new();
    for field in CERT_VALIDATOR_FIELDS {
        if let Some(value) = bag.shift_remove(field) {
            if carries_value(&value) {
                validators.insert(field.to_string(), value);
            }
        }
    }

    let mut fragment = CommandFragment::single(create_line(CREATE, "sys file ssl-cert", path, &bag));
    if validators.is_empty() {
        return Ok(fragment);
    }
    if !context.target.at_least(13, 0) {
        warn!(
            resource = path,
            version = %context.target.version,
            "certificate validators need 13.0 or later; dropping them"
        );
        return Ok(fragment);
    }
    fragment.command(create_line(MODIFY, "sys file ssl-cert", path, &validators));
    Ok(fragment)
}

fn carries_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(nested) => !nested.is_empty(),
        scalar => {
            let text = scalar_text(scalar);
            !text.is_empty() && text != "none"
        }
    }
}
