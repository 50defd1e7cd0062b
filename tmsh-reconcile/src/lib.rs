//! Reconciliation of device configuration trees into tmsh command scripts.
//!
//! Given the current and desired configuration of a device as trees of
//! property bags, and the diff between them, this library produces the
//! command script that moves the device from one to the other.
//!
//! # Script model
//!
//! Every diff entry yields a [`command::CommandFragment`] with four sections:
//! `pre_trans` and `commands` run inside one device transaction,
//! `post_trans` runs after commit, and `rollback` only when commit fails.
//! Fragments accumulate section by section into a [`command::CommandScript`].
//!
//! # Modules
//!
//! - [`dispatch`]: Diff-kind state machine and the whole-diff entry point
//! - [`create`] / [`delete`]: Resource-specific generators keyed by type
//! - [`stringify`] and [`policy`]: Property bag rendering and collection directives
//! - [`monitor`]: Monitor rule encoding
//! - [`cleanup`]: Reference detach/reattach for rule holders
//! - [`rename`]: Migration of remotely imported profiles and policies
//! - [`context`]: Per-operation task, target and cache state
//! - [`settings`]: TOML settings and context construction
//! - [`report`]: Terminal rendering of diffs and scripts
//!
//! # Example
//!
//! ```ignore
//! use config_diff_core::{diff, parse_file};
//! use tmsh_reconcile::context::Context;
//! use tmsh_reconcile::dispatch::update_script;
//!
//! let current = parse_file("current.json")?;
//! let desired = parse_file("desired.json")?;
//! let mut context = Context::default();
//! let script = update_script(&mut context, &desired, &current, &diff(&current, &desired))?;
//! println!("{}", script.render().commands);
//! ```

pub mod cleanup;
pub mod command;
pub mod context;
pub mod create;
pub mod delete;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod policy;
pub mod rename;
pub mod report;
pub mod settings;
pub mod stringify;
