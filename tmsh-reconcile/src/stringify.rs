//! Property bag serialization into tmsh argument syntax.

use config_diff_core::tree::scalar_text;
use config_diff_core::PropertyBag;
use serde_json::Value;

use crate::policy::collection_directive;

/// Keys with this prefix carry engine-internal data and are never rendered.
pub const INTERNAL_PREFIX: &str = "_";

/// Serialize `bag` as tmsh arguments, each preceded by a single space.
///
/// Nested bags render inside escaped braces, preceded by the collection
/// directive for `"<resource_type> <key>"` when one is set. An empty nested
/// bag renders as `none` when a directive exists (even an empty one) and as
/// the bare key otherwise.
pub fn stringify(resource_type: &str, bag: &PropertyBag, escape_quote: bool) -> String {
    let mut out = String::new();
    for (key, value) in bag {
        if key.starts_with(INTERNAL_PREFIX) || value.is_null() {
            continue;
        }
        out.push(' ');
        out.push_str(key);
        match value {
            Value::Object(nested) => {
                let inner = stringify(resource_type, nested, false);
                let directive = collection_directive(resource_type, key);
                if inner.is_empty() {
                    if directive.is_some() {
                        out.push_str(" none");
                    }
                } else {
                    if let Some(directive) = directive.filter(|d| !d.is_empty()) {
                        out.push(' ');
                        out.push_str(directive);
                    }
                    out.push_str(" \\{");
                    out.push_str(&inner);
                    out.push_str(" \\}");
                }
            }
            scalar => {
                out.push(' ');
                out.push_str(&scalar_text(scalar));
            }
        }
    }

    if escape_quote {
        escape_quotes(&out)
    } else {
        out
    }
}

/// Backslash-escape every double quote.
pub fn escape_quotes(input: &str) -> String {
    input.replace('"', "\\\"")
}
