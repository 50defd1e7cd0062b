use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse an output directory that is, or directly holds, one of the inputs.
pub fn ensure_output_dir_safe(output: &Path, inputs: &[&Path]) -> Result<()> {
    let out_norm = normalize_for_compare(output)
        .with_context(|| format!("failed to normalize output path {}", output.display()))?;

    for input in inputs {
        let in_norm = normalize_for_compare(input)
            .with_context(|| format!("failed to normalize input path {}", input.display()))?;
        if out_norm == in_norm || in_norm.parent() == Some(out_norm.as_path()) {
            bail!(
                "refusing to write script files into {}: it holds input {}",
                output.display(),
                input.display()
            );
        }
    }
    Ok(())
}

/// Absolute form of `path` for comparison.
///
/// `.` and `..` are folded lexically first, so a not-yet-created output such
/// as `out/../fixtures` still compares equal to `fixtures`. The longest
/// existing ancestor is then canonicalized and the missing tail appended.
fn normalize_for_compare(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        fold_components(path)
    } else {
        fold_components(&std::env::current_dir().context("current_dir")?.join(path))
    };

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name);
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }

    let mut resolved = existing
        .canonicalize()
        .with_context(|| format!("canonicalize {}", existing.display()))?;
    for name in tail.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

fn fold_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
