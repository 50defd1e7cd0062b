//! Generic configuration-tree loading and diffing primitives used by higher-level tools.

pub mod diff;
pub mod format;
pub mod parser;
pub mod tree;

pub use diff::{diff, diff_with_options, DiffEntry, DiffKind, DiffOptions};
pub use format::{format_json, format_summary, format_text};
pub use parser::{parse, parse_file, ParseError};
pub use tree::{ConfigItem, ConfigTree, PropertyBag};
