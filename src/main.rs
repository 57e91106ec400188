// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands, ReorderAction, TargetArgs};
use quill_config::Config;
use quill_core::{EditingSession, Editor, Notice, OpError, OrderingReconciler};
use quill_format::{FormatOptions, LayoutMode, WordCount};
use quill_remote::{Backend, ComposedUnit};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Offline subcommands first (no backend needed)
    match &cli.command {
        Commands::Completions { shell } => {
            cli::print_completions(*shell);
            return Ok(());
        }
        Commands::ShowConfig => {
            let config = load_config(&cli)?;
            println!("{}", serde_yaml::to_string(&config).unwrap_or_default());
            return Ok(());
        }
        Commands::Format { file, mode, indent, stats } => {
            let config = load_config(&cli)?;
            return format_cmd(config.format, file.as_deref(), *mode, *indent, *stats);
        }
        Commands::Count { file } => {
            let text = read_input(file.as_deref())?;
            let count = WordCount::of(&text);
            println!("{}\t{}", count.total, count.no_punctuation);
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    let backend = quill_remote::from_config(&config.remote)?;
    tracing::debug!(backend = backend.name(), "backend ready");

    match cli.command {
        Commands::Expand(target) => run_generation(backend, config, target, Op::Expand).await,
        Commands::Polish(target) => run_generation(backend, config, target, Op::Polish).await,
        Commands::Summarize(target) => run_generation(backend, config, target, Op::Summarize).await,
        Commands::Reformat { target, mode } => run_reformat(backend, config, target, mode).await,
        Commands::Save { file, unit } => run_save(backend, config, &file, unit).await,
        Commands::Reorder { action } => run_reorder(backend, action).await,
        Commands::Completions { .. }
        | Commands::ShowConfig
        | Commands::Format { .. }
        | Commands::Count { .. } => Ok(()),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = quill_config::load(cli.config.as_deref())?;
    if let Some(kind) = cli.backend {
        config.remote.backend = kind;
    }
    if let Some(novel) = &cli.novel {
        config.remote.novel_id = Some(novel.clone());
    }
    Ok(config)
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn format_cmd(
    mut opts: FormatOptions,
    file: Option<&Path>,
    mode: Option<LayoutMode>,
    indent: Option<u8>,
    stats: bool,
) -> anyhow::Result<()> {
    if let Some(mode) = mode {
        opts.layout_mode = mode;
    }
    if let Some(indent) = indent {
        opts.indent = indent;
    }
    let text = read_input(file)?;
    let out = quill_format::reformat(&text, &opts);
    if stats {
        eprintln!(
            "changed={} changed_lines={} total_lines={}",
            out.diff.changed, out.diff.changed_lines, out.diff.total_lines
        );
    }
    print!("{}", out.text);
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Expand,
    Polish,
    Summarize,
}

fn open_target(backend: Arc<dyn Backend>, mut config: Config, target: &TargetArgs) -> anyhow::Result<Editor> {
    if let Some(policy) = target.policy {
        config.editor.selection_policy = policy;
    }
    let text = std::fs::read_to_string(&target.file)
        .with_context(|| format!("reading {}", target.file.display()))?;
    let mut session = EditingSession::new(text);
    if let Some((start, end)) = target.select {
        session.set_selection(start, end);
    } else if let Some(caret) = target.caret {
        session.set_caret(caret);
    }
    Ok(Editor::new(backend, &config).with_session(session))
}

fn finish(editor: &Editor, target: &TargetArgs, notice: Notice) -> anyhow::Result<()> {
    eprintln!("{notice}");
    let text = editor.text();
    if target.in_place {
        std::fs::write(&target.file, &text)
            .with_context(|| format!("writing {}", target.file.display()))?;
    } else {
        print!("{text}");
    }
    Ok(())
}

fn report(err: OpError) -> anyhow::Error {
    eprintln!("{}", Notice::from_error(&err));
    err.into()
}

async fn run_generation(
    backend: Arc<dyn Backend>,
    config: Config,
    target: TargetArgs,
    op: Op,
) -> anyhow::Result<()> {
    let editor = open_target(backend, config, &target)?;
    let applied = match op {
        Op::Expand => editor.expand().await,
        Op::Polish => editor.polish().await,
        Op::Summarize => editor.summarize().await,
    }
    .map_err(report)?;
    finish(&editor, &target, Notice::applied(applied.kind))
}

async fn run_reformat(
    backend: Arc<dyn Backend>,
    config: Config,
    target: TargetArgs,
    mode: Option<LayoutMode>,
) -> anyhow::Result<()> {
    let editor = open_target(backend, config, &target)?;
    let outcome = editor.reformat(mode).await.map_err(report)?;
    finish(&editor, &target, Notice::reformatted(outcome))
}

async fn run_save(backend: Arc<dyn Backend>, config: Config, file: &Path, unit: String) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let editor = Editor::new(backend, &config);
    editor.open(&ComposedUnit {
        id: unit,
        content,
        ..ComposedUnit::default()
    });
    let saved = editor.save().await.map_err(report)?;
    eprintln!("{}", Notice::applied(quill_core::OpKind::Save));
    println!("{}", saved.id);
    Ok(())
}

async fn run_reorder(backend: Arc<dyn Backend>, action: ReorderAction) -> anyhow::Result<()> {
    let store = backend.as_ref();
    let mut list = OrderingReconciler::load(store)
        .await
        .context("loading units")?;

    match action {
        ReorderAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(list.items())?);
            } else {
                print_units(list.items());
            }
            Ok(())
        }
        ReorderAction::Move { id, position, dry_run } => {
            if let Err(e) = list.move_to(&id, position) {
                eprintln!("{}", Notice::from_reconcile_error(&e));
                return Err(e.into());
            }
            if dry_run {
                for unit in list.pending() {
                    println!("{}\t{}\t{}", unit.id, unit.order, unit.title);
                }
                return Ok(());
            }
            match list.commit(store).await {
                Ok(report) => {
                    eprintln!("{}", Notice::committed(&report));
                    print_units(list.items());
                    Ok(())
                }
                Err(e) => {
                    eprintln!("{}", Notice::from_reconcile_error(&e));
                    Err(e.into())
                }
            }
        }
    }
}

fn print_units(units: &[ComposedUnit]) {
    for unit in units {
        let words = unit
            .word_count
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}\t{}", unit.order, unit.id, words, unit.title);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
