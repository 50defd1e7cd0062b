use config_diff_core::tree::scalar_text;
use config_diff_core::PropertyBag;
use serde_json::Value;

pub const MINIMUM_MONITORS: &str = "minimumMonitors";

/// Collapse a `monitor` map plus `minimumMonitors` into tmsh monitor rule text.
///
/// `all` (or a minimum covering every monitor) becomes `m1 and m2`; a smaller
/// minimum becomes `min <n> of \{ m1 m2 \}`. `minimumMonitors` is dropped
/// either way. Bags without both fields are left untouched.
pub fn encode_monitors(bag: &mut PropertyBag) {
    let Some(minimum) = bag.get(MINIMUM_MONITORS).map(scalar_text) else {
        return;
    };
    let Some(Value::Object(monitors)) = bag.get("monitor") else {
        return;
    };

    let names: Vec<&str> = monitors.keys().map(String::as_str).collect();
    let encoded = if names.is_empty() {
        "none".to_string()
    } else {
        match minimum.parse::<usize>() {
            Ok(n) if n < names.len() => format!("min {n} of \\{{ {} \\}}", names.join(" ")),
            _ => names.join(" and "),
        }
    };

    bag.insert("monitor".to_string(), Value::String(encoded));
    bag.shift_remove(MINIMUM_MONITORS);
}

/// Encode a pool-level monitor rule, treating a missing `minimumMonitors`
/// as `all` so a bare monitor map still renders as a rule.
pub fn encode_pool_monitors(bag: &mut PropertyBag) {
    if matches!(bag.get("monitor"), Some(Value::Object(_))) && !bag.contains_key(MINIMUM_MONITORS) {
        bag.insert(MINIMUM_MONITORS.to_string(), Value::String("all".to_string()));
    }
    encode_monitors(bag);
}

/// Encode monitors on every member of the `members` collection.
pub fn encode_member_monitors(bag: &mut PropertyBag) {
    if let Some(Value::Object(members)) = bag.get_mut("members") {
        for member in members.values_mut() {
            if let Value::Object(member) = member {
                encode_monitors(member);
            }
        }
    }
}
