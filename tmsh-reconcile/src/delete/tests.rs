use std::collections::BTreeMap;

use config_diff_core::{ConfigItem, ConfigTree, DiffEntry, DiffKind, PropertyBag};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::{build_delete, destination_address};
use crate::command::{Command, CommandFragment};
use crate::context::{Context, TargetInfo, TaskInfo, VirtualAddressRecord};

fn bag(value: serde_json::Value) -> PropertyBag {
    value.as_object().cloned().unwrap_or_default()
}

fn entry(kind: DiffKind, path: &[&str], command: &str) -> DiffEntry {
    let mut diff = DiffEntry::new(kind, path.iter().map(|s| s.to_string()).collect());
    diff.lhs_command = Some(command.to_string());
    diff.rhs_command = Some(command.to_string());
    diff
}

fn context() -> Context {
    Context::new(TaskInfo::new("task1"), TargetInfo::default())
}

fn rendered(commands: &[Command]) -> Vec<String> {
    commands.iter().map(Command::render).collect()
}

fn delete(diff: &DiffEntry, current: &ConfigTree) -> CommandFragment {
    build_delete(&mut context(), diff, current).expect("delete")
}

fn tree(path: &str, command: &str, props: serde_json::Value) -> ConfigTree {
    let mut tree = ConfigTree::new();
    tree.insert(path, ConfigItem::new(command, bag(props)));
    tree
}

#[test]
fn unknown_type_gets_single_delete() {
    let diff = entry(DiffKind::Deleted, &["/T/A/pool"], "ltm pool");
    assert_eq!(
        rendered(&delete(&diff, &ConfigTree::new()).commands),
        vec!["tmsh::delete ltm pool /T/A/pool"]
    );
}

#[test]
fn delete_without_lhs_command_is_an_error() {
    let diff = DiffEntry::new(DiffKind::Deleted, vec!["/T/A/pool".to_string()]);
    assert!(build_delete(&mut context(), &diff, &ConfigTree::new()).is_err());
}

#[test]
fn wideip_delete_restores_with_empty_defaults() {
    let diff = entry(DiffKind::Deleted, &["/Common/Shared/wip.example.com a"], "gtm wideip a");
    let fragment = delete(&diff, &ConfigTree::new());

    assert_eq!(
        rendered(&fragment.commands),
        vec!["tmsh::delete gtm wideip a \\\"/Common/Shared/wip.example.com\\\""]
    );
    assert_eq!(fragment.rollback.len(), 1);
    assert!(fragment.rollback[0].best_effort);
    assert_eq!(
        fragment.rollback[0].text,
        "tmsh::create gtm wideip a \\\"/Common/Shared/wip.example.com\\\" pools none aliases none enabled "
    );
}

#[test]
fn wideip_rollback_keeps_current_values() {
    let current = tree(
        "/Common/Shared/wip.example.com a",
        "gtm wideip a",
        json!({"pools": {"/Common/Shared/p1": {}}, "description": "\"edge\""}),
    );
    let diff = entry(DiffKind::Deleted, &["/Common/Shared/wip.example.com a"], "gtm wideip a");
    assert_eq!(
        delete(&diff, &current).rollback[0].text,
        "tmsh::create gtm wideip a \\\"/Common/Shared/wip.example.com\\\" pools replace-all-with \\{ /Common/Shared/p1 \\} aliases none enabled  description \\\"edge\\\""
    );
}

#[test]
fn rule_list_detaches_references_then_deletes() {
    let current = tree(
        "/T/A/rl",
        "security firewall rule-list",
        json!({
            "rules": {
                "allow": {
                    "irule": "/T/A/ir",
                    "source": {"address-lists": {"/T/A/al": {}}},
                    "destination": {"port-lists": {"/T/A/pl": {}}}
                }
            }
        }),
    );
    let diff = entry(DiffKind::Deleted, &["/T/A/rl"], "security firewall rule-list");
    let fragment = delete(&diff, &current);

    assert_eq!(
        rendered(&fragment.pre_trans),
        vec!["tmsh::modify security firewall rule-list /T/A/rl rules modify \\{ allow \\{ irule none source \\{ address-lists none \\} destination \\{ port-lists none \\} \\} \\}"]
    );
    assert_eq!(
        rendered(&fragment.rollback),
        vec!["catch { tmsh::modify security firewall rule-list /T/A/rl rules modify \\{ allow \\{ irule /T/A/ir source \\{ address-lists replace-all-with \\{ /T/A/al \\} \\} destination \\{ port-lists replace-all-with \\{ /T/A/pl \\} \\} \\} \\} } e"]
    );
    assert_eq!(
        rendered(&fragment.commands),
        vec!["tmsh::delete security firewall rule-list /T/A/rl"]
    );
}

#[test]
fn rule_holder_with_scalar_rules_is_fatal() {
    let current = tree("/T/A/pp", "pem policy", json!({"rules": "oops"}));
    let diff = entry(DiffKind::Deleted, &["/T/A/pp"], "pem policy");
    assert!(build_delete(&mut context(), &diff, &current).is_err());
}

#[test]
fn shared_node_delete_is_deferred_and_best_effort() {
    let diff = entry(DiffKind::Deleted, &["/Common/10.0.0.5"], "ltm node");
    let fragment = delete(&diff, &ConfigTree::new());
    assert!(fragment.commands.is_empty());
    assert_eq!(
        rendered(&fragment.post_trans),
        vec!["catch { tmsh::delete ltm node /Common/10.0.0.5 } e"]
    );

    let tenant = entry(DiffKind::Deleted, &["/T/10.0.0.5"], "ltm node");
    assert_eq!(
        rendered(&delete(&tenant, &ConfigTree::new()).commands),
        vec!["tmsh::delete ltm node /T/10.0.0.5"]
    );
}

#[test]
fn in_place_edits_delete_nothing() {
    let node = entry(DiffKind::Edited, &["/T/10.0.0.5", "properties", "ratio"], "ltm node");
    assert!(delete(&node, &ConfigTree::new()).is_empty());

    let partition = entry(DiffKind::New, &["/T/", "properties", "description"], "auth partition");
    assert!(delete(&partition, &ConfigTree::new()).is_empty());
}

#[test]
fn publisher_delete_moves_after_commit_only_when_removed() {
    let removed = entry(DiffKind::Deleted, &["/T/A/pub"], "sys log-config publisher");
    let fragment = delete(&removed, &ConfigTree::new());
    assert_eq!(
        rendered(&fragment.commands),
        vec!["tmsh::modify sys log-config publisher /T/A/pub destinations none"]
    );
    assert_eq!(
        rendered(&fragment.post_trans),
        vec!["tmsh::delete sys log-config publisher /T/A/pub"]
    );

    let retyped = entry(DiffKind::Edited, &["/T/A/pub", "command"], "sys log-config publisher");
    let fragment = delete(&retyped, &ConfigTree::new());
    assert_eq!(fragment.commands.len(), 2);
    assert!(fragment.post_trans.is_empty());
}

#[test]
fn topology_delete_resets_longest_match() {
    let diff = entry(DiffKind::Deleted, &["/Common/Shared/topology"], "gtm topology");
    assert_eq!(
        rendered(&delete(&diff, &ConfigTree::new()).commands),
        vec![
            "tmsh::delete gtm topology all",
            "tmsh::modify gtm global-settings load-balancing topology-longest-match yes",
        ]
    );

    let mut old_device = Context::new(TaskInfo::new("t"), TargetInfo::parse("12.1.3").expect("version"));
    let fragment = build_delete(&mut old_device, &diff, &ConfigTree::new()).expect("delete");
    assert_eq!(rendered(&fragment.commands), vec!["tmsh::delete gtm topology all"]);
}

fn owned(full_path: &str, address: &str) -> VirtualAddressRecord {
    let mut metadata = BTreeMap::new();
    metadata.insert("managed-by".to_string(), "tmsh-reconcile".to_string());
    VirtualAddressRecord {
        full_path: full_path.to_string(),
        address: address.to_string(),
        metadata,
    }
}

#[test]
fn virtual_delete_cascades_to_owned_shared_address() {
    let current = tree("/T/A/vs", "ltm virtual", json!({"destination": "/Common/2001:db8:0::5.443"}));
    let mut ctx = context().with_virtual_addresses(vec![
        owned("/Common/192.0.2.10", "192.0.2.10"),
        owned("/Common/2001:db8::5", "2001:db8::5"),
    ]);
    let diff = entry(DiffKind::Deleted, &["/T/A/vs"], "ltm virtual");
    let fragment = build_delete(&mut ctx, &diff, &current).expect("delete");

    assert_eq!(rendered(&fragment.commands), vec!["tmsh::delete ltm virtual /T/A/vs"]);
    assert_eq!(
        rendered(&fragment.post_trans),
        vec!["catch { tmsh::delete ltm virtual-address /Common/2001:db8::5 } e"]
    );
}

#[test]
fn virtual_delete_keeps_unowned_or_tenant_addresses() {
    let mut unowned = owned("/Common/192.0.2.10", "192.0.2.10");
    unowned.metadata.clear();
    let mut ctx = context().with_virtual_addresses(vec![unowned, owned("/T/192.0.2.11", "192.0.2.11")]);
    let diff = entry(DiffKind::Deleted, &["/T/A/vs"], "ltm virtual");

    let shared = tree("/T/A/vs", "ltm virtual", json!({"destination": "/Common/192.0.2.10:80"}));
    assert!(build_delete(&mut ctx, &diff, &shared).expect("delete").post_trans.is_empty());

    let tenant = tree("/T/A/vs", "ltm virtual", json!({"destination": "/T/192.0.2.11:80"}));
    assert!(build_delete(&mut ctx, &diff, &tenant).expect("delete").post_trans.is_empty());
}

#[test]
fn destination_address_handles_both_families() {
    assert_eq!(destination_address("/Common/10.0.0.1:80"), Some("10.0.0.1"));
    assert_eq!(destination_address("/Common/10.0.0.1%2:80"), Some("10.0.0.1%2"));
    assert_eq!(destination_address("/Common/2001:db8::1.443"), Some("2001:db8::1"));
    assert_eq!(destination_address("no-partition"), None);
}
