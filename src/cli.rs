// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use quill_config::{BackendKind, SelectionPolicy};
use quill_format::LayoutMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "quill",
    about = "A writing assistant for long-form fiction",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (layered over auto-discovered files)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Backend override (http | mock)
    #[arg(long, short = 'b', value_enum, global = true, env = "QUILL_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Document (novel) id used for template scope and unit storage
    #[arg(long, short = 'n', global = true, env = "QUILL_NOVEL")]
    pub novel: Option<String>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// A file plus the selection an operation acts on.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Text file to operate on
    pub file: PathBuf,

    /// Selected character range, e.g. `12..40`
    #[arg(long, short = 's', value_name = "START..END", value_parser = parse_span, conflicts_with = "caret")]
    pub select: Option<(usize, usize)>,

    /// Caret position in characters (default: end of file)
    #[arg(long, value_name = "N")]
    pub caret: Option<usize>,

    /// Write the result back to FILE instead of stdout
    #[arg(long, short = 'i')]
    pub in_place: bool,

    /// Selection policy override (lenient | strict)
    #[arg(long, value_enum)]
    pub policy: Option<SelectionPolicy>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand the selection, or continue from the end of the text
    Expand(TargetArgs),
    /// Polish the selected text
    Polish(TargetArgs),
    /// Insert a short summary of the selection (or the whole text) at the caret
    Summarize(TargetArgs),
    /// Reformat the whole file through the configured backend
    Reformat {
        #[command(flatten)]
        target: TargetArgs,
        /// Layout mode override
        #[arg(long, short = 'm')]
        mode: Option<LayoutMode>,
    },
    /// Reformat locally without contacting any backend
    Format {
        /// Input file (default: stdin)
        file: Option<PathBuf>,
        /// Layout mode override
        #[arg(long, short = 'm')]
        mode: Option<LayoutMode>,
        /// Paragraph indent override
        #[arg(long)]
        indent: Option<u8>,
        /// Print the diff summary to stderr
        #[arg(long)]
        stats: bool,
    },
    /// Print word counts
    Count {
        /// Input file (default: stdin)
        file: Option<PathBuf>,
    },
    /// Store FILE as the content of unit ID
    Save {
        file: PathBuf,
        /// Unit id
        #[arg(long, short = 'u')]
        unit: String,
    },
    /// Inspect or change the order of composed units
    Reorder {
        #[command(subcommand)]
        action: ReorderAction,
    },
    /// Print the effective configuration and exit
    ShowConfig,
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReorderAction {
    /// List units in store order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a unit to a 1-based position and persist the new order
    Move {
        id: String,
        position: usize,
        /// Show the updates that would be sent, without sending them
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_span(s: &str) -> Result<(usize, usize), String> {
    let (a, b) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {s:?}"))?;
    let a = a.trim().parse::<usize>().map_err(|e| format!("start: {e}"))?;
    let b = b.trim().parse::<usize>().map_err(|e| format!("end: {e}"))?;
    Ok((a, b))
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "quill", &mut std::io::stdout());
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_parsing() {
        assert_eq!(parse_span("3..9"), Ok((3, 9)));
        assert_eq!(parse_span(" 0 .. 2"), Ok((0, 2)));
        assert!(parse_span("3-9").is_err());
        assert!(parse_span("a..2").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn expand_with_selection_parses() {
        let cli = Cli::try_parse_from(["quill", "-b", "mock", "expand", "ch1.txt", "-s", "0..4", "-i"]).unwrap();
        assert_eq!(cli.backend, Some(BackendKind::Mock));
        let Commands::Expand(t) = cli.command else {
            panic!("expected expand");
        };
        assert_eq!(t.select, Some((0, 4)));
        assert!(t.in_place);
    }

    #[test]
    fn select_and_caret_conflict() {
        assert!(Cli::try_parse_from(["quill", "polish", "a.txt", "-s", "0..1", "--caret", "2"]).is_err());
    }

    #[test]
    fn layout_mode_parses_from_string() {
        let cli = Cli::try_parse_from(["quill", "format", "-m", "simple"]).unwrap();
        assert!(matches!(cli.command, Commands::Format { mode: Some(LayoutMode::Simple), .. }));
    }
}
