//! Command fragments and the aggregate four-section script.

use serde::Serialize;

pub const CREATE: &str = "tmsh::create";
pub const MODIFY: &str = "tmsh::modify";
pub const DELETE: &str = "tmsh::delete";

/// One device command.
///
/// A best-effort command is rendered inside a `catch` wrapper so that its
/// failure does not abort the surrounding script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub text: String,
    pub best_effort: bool,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            best_effort: false,
        }
    }

    pub fn best_effort(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            best_effort: true,
        }
    }

    /// Text as submitted to the device.
    pub fn render(&self) -> String {
        if self.best_effort {
            format!("catch {{ {} }} e", self.text)
        } else {
            self.text.clone()
        }
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Command::new(text)
    }
}

/// Output of one resource-level generation step.
///
/// `pre_trans` runs before `commands`, both inside the device transaction;
/// `post_trans` runs after commit and `rollback` only when commit fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandFragment {
    pub pre_trans: Vec<Command>,
    pub commands: Vec<Command>,
    pub post_trans: Vec<Command>,
    pub rollback: Vec<Command>,
}

impl CommandFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment holding a single transactional command.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            commands: vec![Command::new(text)],
            ..Self::default()
        }
    }

    pub fn command(&mut self, text: impl Into<String>) {
        self.commands.push(Command::new(text));
    }

    pub fn pre_trans(&mut self, text: impl Into<String>) {
        self.pre_trans.push(Command::new(text));
    }

    pub fn post_trans(&mut self, text: impl Into<String>) {
        self.post_trans.push(Command::new(text));
    }

    /// Rollback steps are always isolated from each other.
    pub fn rollback_step(&mut self, text: impl Into<String>) {
        self.rollback.push(Command::best_effort(text));
    }

    pub fn extend(&mut self, other: CommandFragment) {
        self.pre_trans.extend(other.pre_trans);
        self.commands.extend(other.commands);
        self.post_trans.extend(other.post_trans);
        self.rollback.extend(other.rollback);
    }

    pub fn is_empty(&self) -> bool {
        self.pre_trans.is_empty()
            && self.commands.is_empty()
            && self.post_trans.is_empty()
            && self.rollback.is_empty()
    }
}

/// All fragments of one operation, accumulated section by section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandScript {
    pub pre_trans: Vec<Command>,
    pub commands: Vec<Command>,
    pub post_trans: Vec<Command>,
    pub rollback: Vec<Command>,
}

/// A script joined into the four strings handed to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedScript {
    pub pre_trans: String,
    pub commands: String,
    pub post_trans: String,
    pub rollback: String,
}

impl CommandScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, fragment: CommandFragment) {
        self.pre_trans.extend(fragment.pre_trans);
        self.commands.extend(fragment.commands);
        self.post_trans.extend(fragment.post_trans);
        self.rollback.extend(fragment.rollback);
    }

    pub fn is_empty(&self) -> bool {
        self.pre_trans.is_empty()
            && self.commands.is_empty()
            && self.post_trans.is_empty()
            && self.rollback.is_empty()
    }

    /// Total command count across all sections.
    pub fn len(&self) -> usize {
        self.pre_trans.len() + self.commands.len() + self.post_trans.len() + self.rollback.len()
    }

    pub fn render(&self) -> RenderedScript {
        RenderedScript {
            pre_trans: join(&self.pre_trans),
            commands: join(&self.commands),
            post_trans: join(&self.post_trans),
            rollback: join(&self.rollback),
        }
    }
}

fn join(commands: &[Command]) -> String {
    commands
        .iter()
        .map(Command::render)
        .collect::<Vec<_>>()
        .join("\n")
}
