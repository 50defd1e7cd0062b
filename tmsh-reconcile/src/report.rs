use colored::Colorize;
use config_diff_core::{format_summary, format_text, DiffEntry};

use crate::command::{Command, CommandScript, CREATE, DELETE, MODIFY};

/// Render diff entries for terminal output.
pub fn render_text(entries: &[DiffEntry]) -> String {
    let raw = format_text(entries);
    let mut out = Vec::new();

    for line in raw.lines() {
        let colored = if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('~') {
            line.yellow().to_string()
        } else if line.starts_with('*') {
            line.magenta().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render summary counts for terminal output.
pub fn render_summary(entries: &[DiffEntry]) -> String {
    format_summary(entries).cyan().to_string()
}

/// Render the four script sections under `# <section>` headers.
///
/// Empty sections are shown with their header only.
pub fn render_script(script: &CommandScript) -> String {
    let sections: [(&str, &[Command]); 4] = [
        ("pre_trans", &script.pre_trans),
        ("commands", &script.commands),
        ("post_trans", &script.post_trans),
        ("rollback", &script.rollback),
    ];

    let mut out = Vec::new();
    for (name, commands) in sections {
        out.push(format!("# {name}").bold().to_string());
        for command in commands {
            out.push(render_command(command));
        }
    }
    out.join("\n")
}

/// Section counts, e.g. `pre_trans=1 commands=4 post_trans=0 rollback=1`.
pub fn render_script_summary(script: &CommandScript) -> String {
    format!(
        "pre_trans={} commands={} post_trans={} rollback={}",
        script.pre_trans.len(),
        script.commands.len(),
        script.post_trans.len(),
        script.rollback.len()
    )
    .cyan()
    .to_string()
}

fn render_command(command: &Command) -> String {
    let line = command.render();
    if command.best_effort {
        line.dimmed().to_string()
    } else if command.text.starts_with(DELETE) {
        line.red().to_string()
    } else if command.text.starts_with(CREATE) {
        line.green().to_string()
    } else if command.text.starts_with(MODIFY) {
        line.yellow().to_string()
    } else {
        line
    }
}
