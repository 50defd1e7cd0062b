//! Migration of remotely imported profiles and policies onto their declared names.
//!
//! A remote import lands under a per-operation temporary name. Once every
//! per-resource fragment is generated, holders of the declared name are moved
//! to the temporary copy, the declared object is replaced from that copy, and
//! the holders are moved back.
//!
//! Two passes are emitted. The detach pass handles policies before profiles;
//! the reattach pass runs in the opposite order. Only the two kinds in
//! [`RenameKind`] exist, which keeps that ordering total.

use serde::Serialize;
use tracing::debug;

use crate::command::{Command, CommandFragment, MODIFY};
use crate::context::Context;
use crate::create::script_body_text;

/// Which kind of remote artifact a rename concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameKind {
    Profile,
    Policy,
}

impl RenameKind {
    fn as_str(self) -> &'static str {
        match self {
            RenameKind::Profile => "profile",
            RenameKind::Policy => "policy",
        }
    }
}

/// A script body that mentions the renamed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReference {
    pub path: String,
    pub command: String,
    pub body: String,
}

/// Holder objects that refer to the old name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileReferences {
    /// Virtual servers listing the object as a profile or access policy.
    pub virtuals: Vec<String>,
    pub scripts: Vec<ScriptReference>,
}

impl ProfileReferences {
    pub fn is_empty(&self) -> bool {
        self.virtuals.is_empty() && self.scripts.is_empty()
    }
}

/// One remote import whose temporary copy must take over the declared name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEvent {
    pub tenant: String,
    pub old_name: String,
    pub new_name: String,
    pub kind: RenameKind,
    /// Apply the access policy after the swap.
    pub enable: Option<bool>,
    pub references: ProfileReferences,
}

/// Side-channel commands run after every per-resource fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameScript {
    pub pre_trans: Vec<Command>,
}

impl RenameScript {
    pub fn into_fragment(self) -> CommandFragment {
        CommandFragment {
            pre_trans: self.pre_trans,
            ..CommandFragment::default()
        }
    }
}

/// Order rename events into detach and reattach passes.
pub fn build_rename_script(context: &Context, events: &[RenameEvent]) -> RenameScript {
    let (policies, profiles): (Vec<&RenameEvent>, Vec<&RenameEvent>) = events
        .iter()
        .partition(|event| event.kind == RenameKind::Policy);
    debug!(
        task = %context.task.id,
        policies = policies.len(),
        profiles = profiles.len(),
        "ordering rename events"
    );

    let mut pre_trans = Vec::new();
    for event in policies.iter().chain(profiles.iter()) {
        detach(event, &mut pre_trans);
    }
    for event in profiles.iter().chain(policies.iter()) {
        reattach(event, &mut pre_trans);
    }
    RenameScript { pre_trans }
}

fn detach(event: &RenameEvent, out: &mut Vec<Command>) {
    redirect_holders(event, &event.old_name, &event.new_name, out);
    out.push(Command::new(ng_profile(
        event,
        &format!("-deleteall {}", event.old_name),
    )));
}

fn reattach(event: &RenameEvent, out: &mut Vec<Command>) {
    out.push(Command::new(ng_profile(
        event,
        &format!("-copy {} {}", event.new_name, event.old_name),
    )));
    redirect_holders(event, &event.new_name, &event.old_name, out);
    out.push(Command::new(ng_profile(
        event,
        &format!("-deleteall {}", event.new_name),
    )));
    if event.kind == RenameKind::Profile && event.enable == Some(true) {
        out.push(Command::new(format!(
            "{MODIFY} apm profile access {} generation-action increment",
            event.old_name
        )));
    }
}

fn redirect_holders(event: &RenameEvent, from: &str, to: &str, out: &mut Vec<Command>) {
    for virtual_path in &event.references.virtuals {
        let text = match event.kind {
            RenameKind::Profile => format!(
                "{MODIFY} ltm virtual {virtual_path} profiles delete \\{{ {from} \\}} profiles add \\{{ {to} \\}}"
            ),
            RenameKind::Policy => format!(
                "{MODIFY} ltm virtual {virtual_path} per-flow-request-access-policy {to}"
            ),
        };
        out.push(Command::new(text));
    }
    for script in &event.references.scripts {
        let body = if from == event.old_name {
            replace_name(&script.body, from, to)
        } else {
            script.body.clone()
        };
        out.push(Command::new(format!(
            "{MODIFY} {} {} {}",
            script.command,
            script.path,
            script_body_text(&body)
        )));
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')
}

/// Byte offsets of every occurrence of `name` standing as a whole object name.
fn name_matches<'a>(text: &'a str, name: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(name).map(|(start, _)| start).filter(move |&start| {
        let before = text[..start].chars().next_back();
        let after = text[start + name.len()..].chars().next();
        !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
    })
}

/// True when `text` mentions `name` as a whole object name, not as a prefix
/// or suffix of a longer one.
pub fn mentions_name(text: &str, name: &str) -> bool {
    !name.is_empty() && name_matches(text, name).next().is_some()
}

/// Replace whole-name occurrences of `from` with `to`.
pub fn replace_name(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for start in name_matches(text, from) {
        out.push_str(&text[last..start]);
        out.push_str(to);
        last = start + from.len();
    }
    out.push_str(&text[last..]);
    out
}

fn ng_profile(event: &RenameEvent, operation: &str) -> String {
    format!(
        "exec ng_profile -t {} -p {} {operation}",
        event.kind.as_str(),
        event.tenant
    )
}
