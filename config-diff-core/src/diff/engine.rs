use std::collections::BTreeSet;

use serde_json::Value;

use crate::diff::result::{DiffEntry, DiffKind};
use crate::tree::{ConfigItem, ConfigTree, PropertyBag};

/// Configures tree diff behavior.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Maximum property recursion depth. `-1` means unlimited.
    ///
    /// A nested bag below the limit is reported as one edited value.
    pub max_depth: i32,
    /// Resource paths or property names to ignore.
    pub ignore_paths: Vec<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_depth: -1,
            ignore_paths: Vec::new(),
        }
    }
}

/// Diff the current tree against the desired tree with default options.
pub fn diff(current: &ConfigTree, desired: &ConfigTree) -> Vec<DiffEntry> {
    diff_with_options(current, desired, &DiffOptions::default())
}

/// Diff the current tree against the desired tree with custom options.
pub fn diff_with_options(
    current: &ConfigTree,
    desired: &ConfigTree,
    opts: &DiffOptions,
) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    let paths: BTreeSet<&String> = current
        .iter()
        .map(|(path, _)| path)
        .chain(desired.iter().map(|(path, _)| path))
        .collect();

    for path in paths {
        if opts.ignore_paths.iter().any(|ignore| ignore == path) {
            continue;
        }
        match (current.get(path), desired.get(path)) {
            (Some(left), None) => {
                let mut entry = DiffEntry::new(DiffKind::Deleted, vec![path.clone()]);
                entry.lhs = serde_json::to_value(left).ok();
                entry.lhs_command = Some(left.command.clone());
                out.push(entry);
            }
            (None, Some(right)) => {
                let mut entry = DiffEntry::new(DiffKind::New, vec![path.clone()]);
                entry.rhs = serde_json::to_value(right).ok();
                entry.rhs_command = Some(right.command.clone());
                out.push(entry);
            }
            (Some(left), Some(right)) => diff_item(path, left, right, opts, &mut out),
            (None, None) => {}
        }
    }
    out
}

struct MatchContext<'a, 'b> {
    lhs_command: &'a str,
    rhs_command: &'a str,
    ignore: Vec<&'a str>,
    opts: &'a DiffOptions,
    out: &'b mut Vec<DiffEntry>,
}

impl MatchContext<'_, '_> {
    fn push(&mut self, kind: DiffKind, path: Vec<String>, lhs: Option<&Value>, rhs: Option<&Value>) {
        let mut entry = DiffEntry::new(kind, path);
        entry.lhs = lhs.cloned();
        entry.rhs = rhs.cloned();
        entry.lhs_command = Some(self.lhs_command.to_string());
        entry.rhs_command = Some(self.rhs_command.to_string());
        self.out.push(entry);
    }

    fn should_ignore(&self, key: &str) -> bool {
        self.ignore.contains(&key) || self.opts.ignore_paths.iter().any(|i| i == key)
    }
}

fn diff_item(
    path: &str,
    left: &ConfigItem,
    right: &ConfigItem,
    opts: &DiffOptions,
    out: &mut Vec<DiffEntry>,
) {
    let mut ctx = MatchContext {
        lhs_command: &left.command,
        rhs_command: &right.command,
        ignore: left
            .ignore
            .iter()
            .chain(right.ignore.iter())
            .map(String::as_str)
            .collect(),
        opts,
        out,
    };

    if left.command != right.command {
        let lhs = Value::String(left.command.clone());
        let rhs = Value::String(right.command.clone());
        ctx.push(
            DiffKind::Edited,
            vec![path.to_string(), "command".to_string()],
            Some(&lhs),
            Some(&rhs),
        );
        return;
    }

    let base = vec![path.to_string(), "properties".to_string()];
    diff_bag(&left.properties, &right.properties, &base, 0, &mut ctx);
}

fn diff_bag(
    left: &PropertyBag,
    right: &PropertyBag,
    path: &[String],
    depth: i32,
    ctx: &mut MatchContext<'_, '_>,
) {
    let mut keys: Vec<&String> = left.keys().collect();
    for key in right.keys() {
        if !left.contains_key(key) {
            keys.push(key);
        }
    }

    for key in keys {
        if ctx.should_ignore(key) {
            continue;
        }
        let mut child_path = path.to_vec();
        child_path.push(key.clone());
        match (left.get(key), right.get(key)) {
            (Some(l), None) => ctx.push(DiffKind::Deleted, child_path, Some(l), None),
            (None, Some(r)) => ctx.push(DiffKind::New, child_path, None, Some(r)),
            (Some(l), Some(r)) => diff_value(l, r, child_path, depth + 1, ctx),
            (None, None) => {}
        }
    }
}

fn diff_value(
    left: &Value,
    right: &Value,
    path: Vec<String>,
    depth: i32,
    ctx: &mut MatchContext<'_, '_>,
) {
    if left == right {
        return;
    }
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            if ctx.opts.max_depth >= 0 && depth > ctx.opts.max_depth {
                ctx.push(DiffKind::Edited, path, Some(left), Some(right));
            } else {
                diff_bag(l, r, &path, depth, ctx);
            }
        }
        (Value::Array(_), Value::Array(_)) => {
            ctx.push(DiffKind::Array, path, Some(left), Some(right));
        }
        _ => ctx.push(DiffKind::Edited, path, Some(left), Some(right)),
    }
}
