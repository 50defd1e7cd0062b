use config_diff_core::{ConfigItem, ConfigTree, DiffEntry, DiffKind, PropertyBag};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::{build_create, modifies_in_place};
use crate::command::CommandFragment;
use crate::context::{Context, TargetInfo, TaskInfo};
use crate::rename::RenameKind;

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

fn commands(fragment: &CommandFragment) -> Vec<String> {
    fragment.commands.iter().map(|c| c.render()).collect()
}

fn create(diff: &DiffEntry, props: serde_json::Value) -> CommandFragment {
    build_create(&mut context(), diff, bag(props), &ConfigTree::new()).expect("create")
}

#[test]
fn unknown_type_gets_single_create() {
    let diff = entry(DiffKind::New, &["/T/A/dg"], "ltm data-group internal");
    let fragment = create(&diff, json!({"type": "string", "records": {"a": {"data": "1"}}}));
    assert_eq!(
        commands(&fragment),
        vec!["tmsh::create ltm data-group internal /T/A/dg type string records replace-all-with \\{ a \\{ data 1 \\} \\}"]
    );
    assert!(fragment.pre_trans.is_empty() && fragment.rollback.is_empty());
}

#[test]
fn create_without_rhs_command_is_an_error() {
    let diff = DiffEntry::new(DiffKind::New, vec!["/T/A/p".to_string()]);
    assert!(build_create(&mut context(), &diff, PropertyBag::new(), &ConfigTree::new()).is_err());
}

#[test]
fn certificate_validators_move_to_a_modify() {
    let diff = entry(DiffKind::New, &["/T/A/cert"], "sys file ssl-cert");
    let props = json!({
        "source-path": "file:/tmp/cert.pem",
        "issuer-cert": "/Common/ca.crt",
        "cert-validators": {"/Common/ocsp": {}},
        "cert-validation-options": {}
    });
    let fragment = create(&diff, props.clone());
    assert_eq!(
        commands(&fragment),
        vec![
            "tmsh::create sys file ssl-cert /T/A/cert source-path file:/tmp/cert.pem",
            "tmsh::modify sys file ssl-cert /T/A/cert issuer-cert /Common/ca.crt cert-validators replace-all-with \\{ /Common/ocsp \\}",
        ]
    );

    let mut old_device = Context::new(
        TaskInfo::new("task1"),
        TargetInfo::parse("12.1.0").expect("version"),
    );
    let fragment =
        build_create(&mut old_device, &diff, bag(props), &ConfigTree::new()).expect("create");
    assert_eq!(
        commands(&fragment),
        vec!["tmsh::create sys file ssl-cert /T/A/cert source-path file:/tmp/cert.pem"]
    );
}

#[test]
fn certificate_without_validators_is_one_create() {
    let diff = entry(DiffKind::New, &["/T/A/cert"], "sys file ssl-cert");
    let fragment = create(&diff, json!({"source-path": "file:/c", "issuer-cert": "none"}));
    assert_eq!(commands(&fragment), vec!["tmsh::create sys file ssl-cert /T/A/cert source-path file:/c"]);
}

#[test]
fn policy_requires_and_controls_are_inferred() {
    let diff = entry(DiffKind::New, &["/T/A/pol"], "ltm policy");
    let fragment = create(
        &diff,
        json!({
            "strategy": "/Common/first-match",
            "rules": {
                "r1": {
                    "conditions": {"0": {"http-uri": "", "request": "", "values": {"/a": {}}}},
                    "actions": {"0": {"forward": "", "select": "", "pool": "/T/A/p"}}
                }
            }
        }),
    );
    let line = &commands(&fragment)[0];
    assert!(line.starts_with("tmsh::create ltm policy /T/A/pol strategy /Common/first-match rules \\{ r1 \\{"));
    assert!(line.ends_with(" requires replace-all-with \\{ http \\} controls replace-all-with \\{ forwarding \\}"));
}

#[test]
fn policy_without_rules_clears_features() {
    let diff = entry(DiffKind::New, &["/T/A/pol"], "ltm policy");
    let fragment = create(&diff, json!({"strategy": "/Common/first-match"}));
    assert_eq!(
        commands(&fragment),
        vec!["tmsh::create ltm policy /T/A/pol strategy /Common/first-match requires none controls none"]
    );
}

#[test]
fn pool_monitor_change_clears_then_restores() {
    let mut current = ConfigTree::new();
    current.insert(
        "/T/A/pool",
        ConfigItem::new(
            "ltm pool",
            bag(json!({"monitor": {"/Common/http": {}}, "minimumMonitors": "all"})),
        ),
    );
    let diff = entry(DiffKind::Edited, &["/T/A/pool", "properties", "monitor"], "ltm pool");
    let desired = bag(json!({
        "monitor": {"/Common/tcp": {}},
        "minimumMonitors": "all",
        "members": {
            "/T/10.0.0.1:80": {
                "monitor": {"/Common/icmp": {}, "/Common/gateway_icmp": {}},
                "minimumMonitors": 1
            }
        }
    }));
    let fragment = build_create(&mut context(), &diff, desired, &current).expect("create");

    assert_eq!(fragment.pre_trans[0].render(), "tmsh::modify ltm pool /T/A/pool monitor none");
    assert_eq!(
        fragment.rollback[0].render(),
        "catch { tmsh::modify ltm pool /T/A/pool monitor /Common/http } e"
    );
    assert_eq!(
        commands(&fragment),
        vec!["tmsh::create ltm pool /T/A/pool monitor /Common/tcp members replace-all-with \\{ /T/10.0.0.1:80 \\{ monitor min 1 of \\{ /Common/icmp /Common/gateway_icmp \\} \\} \\}"]
    );
}

#[test]
fn pool_monitor_without_minimum_restores_an_and_rule() {
    let mut current = ConfigTree::new();
    current.insert(
        "/T/A/pool",
        ConfigItem::new(
            "ltm pool",
            bag(json!({"monitor": {"/Common/http": {}, "/Common/tcp": {}}})),
        ),
    );
    let diff = entry(DiffKind::Deleted, &["/T/A/pool", "properties", "monitor", "/Common/tcp"], "ltm pool");
    let desired = bag(json!({"monitor": {"/Common/http": {}}}));
    let fragment = build_create(&mut context(), &diff, desired, &current).expect("create");

    assert_eq!(
        fragment.rollback[0].render(),
        "catch { tmsh::modify ltm pool /T/A/pool monitor /Common/http and /Common/tcp } e"
    );
    assert_eq!(
        commands(&fragment),
        vec!["tmsh::create ltm pool /T/A/pool monitor /Common/http"]
    );
}

#[test]
fn pool_change_elsewhere_has_no_monitor_delta() {
    let diff = entry(DiffKind::Edited, &["/T/A/pool", "properties", "description"], "ltm pool");
    let fragment = create(&diff, json!({"description": "web"}));
    assert!(fragment.pre_trans.is_empty());
    assert!(fragment.rollback.is_empty());
}

#[test]
fn node_edits_modify_in_place_unless_address_changes() {
    let desired = json!({"address": "10.0.1.10", "description": "primary"});
    let edit = entry(DiffKind::Edited, &["/T/10.0.1.10", "properties", "description"], "ltm node");
    assert_eq!(
        commands(&create(&edit, desired.clone())),
        vec!["tmsh::modify ltm node /T/10.0.1.10 description primary"]
    );

    let readdress = entry(DiffKind::Edited, &["/T/10.0.1.10", "properties", "address"], "ltm node");
    assert_eq!(
        commands(&create(&readdress, desired)),
        vec!["tmsh::create ltm node /T/10.0.1.10 address 10.0.1.10 description primary"]
    );
}

#[test]
fn partition_uses_bare_name() {
    let added = entry(DiffKind::New, &["/Tenant/"], "auth partition");
    assert_eq!(
        commands(&create(&added, json!({"description": "demo"}))),
        vec!["tmsh::create auth partition Tenant description demo"]
    );

    let edited = entry(DiffKind::Edited, &["/Tenant/", "properties", "description"], "auth partition");
    assert_eq!(
        commands(&create(&edited, json!({"description": "updated"}))),
        vec!["tmsh::modify auth partition Tenant description updated"]
    );
}

#[test]
fn shared_virtual_address_gets_owner_marker() {
    let diff = entry(DiffKind::New, &["/Common/10.1.1.1"], "ltm virtual-address");
    assert_eq!(
        commands(&create(&diff, json!({"address": "10.1.1.1"}))),
        vec!["tmsh::create ltm virtual-address /Common/10.1.1.1 address 10.1.1.1 metadata replace-all-with \\{ managed-by \\{ value tmsh-reconcile \\} \\}"]
    );

    let tenant = entry(DiffKind::New, &["/T/A/10.1.1.2"], "ltm virtual-address");
    assert_eq!(
        commands(&create(&tenant, json!({"address": "10.1.1.2"}))),
        vec!["tmsh::create ltm virtual-address /T/A/10.1.1.2 address 10.1.1.2"]
    );
}

#[test]
fn remote_import_emits_two_imports_and_records_rename() {
    let mut current = ConfigTree::new();
    current.insert(
        "/T/A/vs",
        ConfigItem::new("ltm virtual", bag(json!({"profiles": {"/T/A/prof": {}, "/Common/http": {}}}))),
    );
    current.insert(
        "/T/A/other",
        ConfigItem::new("ltm virtual", bag(json!({"profiles": {"/Common/http": {}}}))),
    );
    let diff = entry(DiffKind::New, &["/T/A/prof"], "apm profile access");
    let mut ctx = context();
    let fragment = build_create(
        &mut ctx,
        &diff,
        bag(json!({"_remote": {"file": "prof.tar.gz", "enable": true}})),
        &current,
    )
    .expect("create");

    let pre: Vec<String> = fragment.pre_trans.iter().map(|c| c.render()).collect();
    assert_eq!(
        pre,
        vec![
            "catch { exec ng_import -s /var/config/rest/downloads/prof.tar.gz /T/A/prof -p T } e",
            "exec ng_import -s /var/config/rest/downloads/prof.tar.gz /T/A/prof_task1 -p T",
        ]
    );
    assert!(fragment.commands.is_empty());

    let events = ctx.rename_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, RenameKind::Profile);
    assert_eq!(events[0].new_name, "/T/A/prof_task1");
    assert_eq!(events[0].enable, Some(true));
    assert_eq!(events[0].references.virtuals, vec!["/T/A/vs".to_string()]);
}

#[test]
fn access_policy_references_include_scripts() {
    let mut current = ConfigTree::new();
    current.insert(
        "/T/A/vs",
        ConfigItem::new("ltm virtual", bag(json!({"per-flow-request-access-policy": "/T/A/pol"}))),
    );
    current.insert(
        "/T/A/rule",
        ConfigItem::new("ltm rule", bag(json!({"api-anonymous": "when HTTP_REQUEST { ACCESS::policy /T/A/pol }"}))),
    );
    let diff = entry(DiffKind::New, &["/T/A/pol"], "apm policy access-policy");
    let mut ctx = context();
    build_create(&mut ctx, &diff, bag(json!({"_remote": {"file": "pol.tar.gz"}})), &current)
        .expect("create");

    let event = &ctx.rename_events()[0];
    assert_eq!(event.kind, RenameKind::Policy);
    assert_eq!(event.enable, None);
    assert_eq!(event.references.virtuals, vec!["/T/A/vs".to_string()]);
    assert_eq!(event.references.scripts[0].path, "/T/A/rule");
}

#[test]
fn scripts_naming_a_longer_policy_are_not_references() {
    let mut current = ConfigTree::new();
    current.insert(
        "/T/A/rule",
        ConfigItem::new("ltm rule", bag(json!({"api-anonymous": "when HTTP_REQUEST { ACCESS::policy /T/A/pol2 }"}))),
    );
    let diff = entry(DiffKind::New, &["/T/A/pol"], "apm policy access-policy");
    let mut ctx = context();
    build_create(&mut ctx, &diff, bag(json!({"_remote": {"file": "pol.tar.gz"}})), &current)
        .expect("create");

    assert!(ctx.rename_events()[0].references.is_empty());
}

#[test]
fn access_profile_without_marker_is_plain_create() {
    let diff = entry(DiffKind::New, &["/T/A/prof"], "apm profile access");
    let mut ctx = context();
    let fragment = build_create(&mut ctx, &diff, bag(json!({"accept-languages": {"en": {}}})), &ConfigTree::new())
        .expect("create");
    assert_eq!(
        commands(&fragment),
        vec!["tmsh::create apm profile access /T/A/prof accept-languages \\{ en \\}"]
    );
    assert!(ctx.rename_events().is_empty());
}

#[test]
fn script_bodies_are_wrapped_verbatim() {
    let diff = entry(DiffKind::New, &["/T/A/rule"], "ltm rule");
    let fragment = create(
        &diff,
        json!({"api-anonymous": "# keep me\nwhen HTTP_REQUEST { log local0. \"hit\" }"}),
    );
    assert_eq!(
        commands(&fragment),
        vec!["tmsh::create ltm rule /T/A/rule api-anonymous \\{\n# keep me\nwhen HTTP_REQUEST { log local0. \"hit\" }\n\\}"]
    );
}

#[test]
fn wideip_names_are_quoted() {
    let diff = entry(DiffKind::New, &["/Common/Shared/wip.example.com a"], "gtm wideip a");
    assert_eq!(
        commands(&create(&diff, json!({"pools": {"/Common/Shared/p1": {}}}))),
        vec!["tmsh::create gtm wideip a \\\"/Common/Shared/wip.example.com\\\" pools replace-all-with \\{ /Common/Shared/p1 \\}"]
    );
}

#[test]
fn topology_records_are_created_one_by_one() {
    let diff = entry(DiffKind::New, &["/Common/Shared/topology"], "gtm topology");
    let props = json!({
        "records": {
            "0": {"ldns": "region /Common/emea", "server": "pool /Common/Shared/eu", "weight": 10},
            "1": {"ldns": "continent NA", "server": "pool /Common/Shared/us", "weight": 1}
        },
        "longest-match": true
    });
    assert_eq!(
        commands(&create(&diff, props.clone())),
        vec![
            "tmsh::create gtm topology ldns: region /Common/emea server: pool /Common/Shared/eu weight 10",
            "tmsh::create gtm topology ldns: continent NA server: pool /Common/Shared/us weight 1",
            "tmsh::modify gtm global-settings load-balancing topology-longest-match yes",
        ]
    );

    let mut old_device = Context::new(TaskInfo::new("t"), TargetInfo::parse("13.1").expect("version"));
    let fragment = build_create(&mut old_device, &diff, bag(props), &ConfigTree::new()).expect("create");
    assert_eq!(fragment.commands.len(), 2);
}

#[test]
fn in_place_edits_are_limited_to_modify_types() {
    let nested = |command: &str, property: &str| {
        entry(DiffKind::Edited, &["/T/x", "properties", property], command)
    };
    assert!(modifies_in_place(&nested("ltm node", "ratio"), "ltm node"));
    assert!(!modifies_in_place(&nested("ltm node", "fqdn"), "ltm node"));
    assert!(modifies_in_place(&nested("sys log-config publisher", "destinations"), "sys log-config publisher"));
    assert!(!modifies_in_place(&nested("ltm pool", "ratio"), "ltm pool"));
    assert!(!modifies_in_place(&entry(DiffKind::New, &["/T/x"], "ltm node"), "ltm node"));
    assert!(!modifies_in_place(&entry(DiffKind::Edited, &["/T/x", "command"], "ltm node"), "ltm node"));
}
