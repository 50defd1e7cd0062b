//! Detach and reattach fragments for rules holding references by name.
//!
//! The device refuses to delete an object still referenced from elsewhere, so
//! before a rule holder is deleted each referencing field is cleared in
//! `pre_trans`, and `rollback` restores exactly those fields with their
//! original values, grouped the same way.

use config_diff_core::tree::scalar_text;
use config_diff_core::PropertyBag;
use serde_json::Value;
use tracing::debug;

use crate::command::{CommandFragment, MODIFY};
use crate::policy::REPLACE_ALL_WITH;

/// Address-side blocks of a rule that may carry list references.
const SIDES: [&str; 2] = ["source", "destination"];
/// List fields cleared with `none` and restored with `replace-all-with`.
const LIST_FIELDS: [&str; 3] = ["address-lists", "port-lists", "vlans"];
/// Scalar fields naming an iRule.
const IRULE_FIELDS: [&str; 1] = ["irule"];

/// Resource types whose rules may reference other objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderKind {
    FirewallRuleList,
    FirewallPolicy,
    PemPolicy,
}

impl HolderKind {
    pub fn from_command(command: &str) -> Option<Self> {
        match command {
            "security firewall rule-list" => Some(HolderKind::FirewallRuleList),
            "security firewall policy" => Some(HolderKind::FirewallPolicy),
            "pem policy" => Some(HolderKind::PemPolicy),
            _ => None,
        }
    }

    pub fn command(self) -> &'static str {
        match self {
            HolderKind::FirewallRuleList => "security firewall rule-list",
            HolderKind::FirewallPolicy => "security firewall policy",
            HolderKind::PemPolicy => "pem policy",
        }
    }
}

/// Build detach/reattach commands for every rule of `holder` that references
/// an iRule, address list, port list or VLAN.
///
/// Returns an empty fragment when no rule needs detaching.
pub fn build_reference_cleanup(holder: &str, rules: &PropertyBag, kind: HolderKind) -> CommandFragment {
    let mut detach_groups = Vec::new();
    let mut reattach_groups = Vec::new();

    for (rule_name, rule) in rules {
        let Value::Object(rule) = rule else {
            continue;
        };
        let mut detach = Vec::new();
        let mut reattach = Vec::new();

        for field in IRULE_FIELDS {
            if let Some(value) = rule.get(field).map(scalar_text).filter(|v| !v.is_empty() && v != "none") {
                detach.push(format!("{field} none"));
                reattach.push(format!("{field} {value}"));
            }
        }

        for side in SIDES {
            let Some(Value::Object(side_bag)) = rule.get(side) else {
                continue;
            };
            let mut side_detach = Vec::new();
            let mut side_reattach = Vec::new();
            for field in LIST_FIELDS {
                let Some(Value::Object(members)) = side_bag.get(field) else {
                    continue;
                };
                if members.is_empty() {
                    continue;
                }
                let names: Vec<&str> = members.keys().map(String::as_str).collect();
                side_detach.push(format!("{field} none"));
                side_reattach.push(format!(
                    "{field} {REPLACE_ALL_WITH} \\{{ {} \\}}",
                    names.join(" ")
                ));
            }
            if !side_detach.is_empty() {
                detach.push(group(side, &side_detach));
                reattach.push(group(side, &side_reattach));
            }
        }

        if !detach.is_empty() {
            detach_groups.push(group(rule_name, &detach));
            reattach_groups.push(group(rule_name, &reattach));
        }
    }

    let mut fragment = CommandFragment::new();
    if detach_groups.is_empty() {
        return fragment;
    }
    debug!(holder, rules = detach_groups.len(), "detaching rule references");

    let command = kind.command();
    fragment.pre_trans(format!(
        "{MODIFY} {command} {holder} rules modify \\{{ {} \\}}",
        detach_groups.join(" ")
    ));
    fragment.rollback_step(format!(
        "{MODIFY} {command} {holder} rules modify \\{{ {} \\}}",
        reattach_groups.join(" ")
    ));
    fragment
}

fn group(name: &str, parts: &[String]) -> String {
    format!("{name} \\{{ {} \\}}", parts.join(" "))
}
