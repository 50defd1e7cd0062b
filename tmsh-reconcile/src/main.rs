use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use config_diff_core::{diff, diff_with_options, format_json, parse_file, DiffOptions};
use tmsh_reconcile::dispatch::update_script;
use tmsh_reconcile::report::{render_script, render_script_summary, render_summary, render_text};
use tmsh_reconcile::settings::{default_settings, load_settings};
use tracing::debug;

mod cli;
mod logging;
mod path_guard;

use cli::{Cli, Command, DiffArgs, OutputFormat, ScriptArgs};

/// Section file names written by `script --output`, in execution order.
const SECTION_FILES: [&str; 4] = ["pre_trans.tcl", "commands.tcl", "post_trans.tcl", "rollback.tcl"];

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("warning: logging disabled ({err})");
    }

    match cli.command {
        Command::Diff(args) => run_diff(args),
        Command::Script(args) => run_script(args),
    }
}

fn run_diff(args: DiffArgs) -> Result<()> {
    let current = parse_file(&args.current)
        .with_context(|| format!("failed to parse {}", args.current.display()))?;
    let desired = parse_file(&args.desired)
        .with_context(|| format!("failed to parse {}", args.desired.display()))?;

    let opts = DiffOptions {
        ignore_paths: args.ignore,
        ..DiffOptions::default()
    };
    let entries = diff_with_options(&current, &desired, &opts);

    if args.summary {
        println!("{}", render_summary(&entries));
        return Ok(());
    }
    match args.format {
        OutputFormat::Text => println!("{}", render_text(&entries)),
        OutputFormat::Json => println!("{}", format_json(&entries)),
    }
    Ok(())
}

fn run_script(args: ScriptArgs) -> Result<()> {
    let current = parse_file(&args.current)
        .with_context(|| format!("failed to parse {}", args.current.display()))?;
    let desired = parse_file(&args.desired)
        .with_context(|| format!("failed to parse {}", args.desired.display()))?;

    let mut settings = match &args.config {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load settings {}", path.display()))?,
        None => default_settings(),
    };
    if let Some(version) = args.target_version {
        settings.target_version = version;
    }
    if let Some(task_id) = args.task_id {
        settings.task_id = task_id;
    }
    if let Some(cache) = args.virtual_addresses {
        settings.virtual_addresses = Some(cache);
    }
    let mut context = settings
        .build_context()
        .with_context(|| "failed to prepare script context")?;
    debug!(task = %context.task.id, version = %context.target.version, "script context ready");

    let entries = diff(&current, &desired);
    let script = update_script(&mut context, &desired, &current, &entries)
        .with_context(|| "failed to generate script")?;
    let rendered = script.render();

    if let Some(dir) = &args.output {
        path_guard::ensure_output_dir_safe(dir, &[args.current.as_path(), args.desired.as_path()])?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        let sections = [
            &rendered.pre_trans,
            &rendered.commands,
            &rendered.post_trans,
            &rendered.rollback,
        ];
        for (name, body) in SECTION_FILES.iter().zip(sections) {
            let path = dir.join(name);
            fs::write(&path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        println!("{}", render_script_summary(&script));
        return Ok(());
    }

    if args.summary {
        println!("{}", render_script_summary(&script));
        return Ok(());
    }
    match args.format {
        OutputFormat::Text => println!("{}", render_script(&script)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rendered)?),
    }
    Ok(())
}
