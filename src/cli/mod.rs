//! The `sqlcase` command-line interface.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use miette::Report;
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::args::{Command, SqlCaseArgs};
use crate::config::HarnessConfig;
use crate::loader::{self, CaseLoader, FixtureLoader};
use crate::logging;
use crate::suite::Suite;

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = SqlCaseArgs::parse();
    logging::init();

    let mut config = HarnessConfig::default();
    if let Some(root) = args.root {
        config = config.with_root(root);
    }

    let ok = match args.command {
        Command::List { json } => handle_list(&config, json),
        Command::Check { path } => {
            let path = path.unwrap_or_else(|| config.case_root.clone());
            handle_check(&config, &path)
        }
    };

    if !ok {
        process::exit(1);
    }
}

#[derive(Debug, Serialize)]
struct InventoryEntry<'a> {
    group: &'a str,
    fixture: &'a str,
    enabled: bool,
    cases: Option<usize>,
    error: Option<String>,
}

/// Lists the select suite. Only enabled groups are loaded, to count cases.
fn handle_list(config: &HarnessConfig, json: bool) -> bool {
    let suite = Suite::select();
    let loader = FixtureLoader::new(&config.case_root);
    let entries: Vec<InventoryEntry> = suite
        .groups
        .iter()
        .map(|group| {
            let loaded = group.enabled.then(|| loader.load(&group.fixture));
            InventoryEntry {
                group: &group.name,
                fixture: &group.fixture,
                enabled: group.enabled,
                cases: loaded.as_ref().and_then(|l| l.as_ref().ok()).map(Vec::len),
                error: loaded
                    .and_then(Result::err)
                    .map(|e| e.error_type().to_string()),
            }
        })
        .collect();

    if json {
        return match serde_json::to_string_pretty(&entries) {
            Ok(text) => {
                println!("{}", text);
                true
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                false
            }
        };
    }

    println!("suite {}", suite.name);
    for entry in &entries {
        let state = if entry.enabled { "enabled" } else { "disabled" };
        let cases = match (&entry.cases, &entry.error) {
            (Some(n), _) => format!("{} case(s)", n),
            (None, Some(kind)) => format!("unavailable: {}", kind),
            (None, None) => "not loaded".to_string(),
        };
        println!(
            "  {:<16} {:<9} {} {}",
            entry.group, state, entry.fixture, cases
        );
    }
    true
}

/// Loads every fixture under `path`, reporting each failure as a diagnostic.
fn handle_check(config: &HarnessConfig, path: &Path) -> bool {
    let files = match loader::discover(path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{:?}", Report::new(e));
            return false;
        }
    };
    if files.is_empty() {
        println!("no fixtures found under {}", path.display());
        return true;
    }

    let choice = if config.use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    let loader = FixtureLoader::new(&config.case_root);
    match check_files(&mut stdout, &loader, &files) {
        Ok(failures) => failures == 0,
        Err(e) => {
            eprintln!("Error: failed to write check results: {}", e);
            false
        }
    }
}

/// Writes one status line per fixture and a closing tally; returns the failure count.
fn check_files<W: WriteColor>(
    out: &mut W,
    loader: &FixtureLoader,
    files: &[PathBuf],
) -> io::Result<usize> {
    let mut failures = 0;
    for file in files {
        match loader.load_file(file) {
            Ok(cases) => {
                write_status(out, "ok", Color::Green)?;
                writeln!(out, "   {} ({} cases)", file.display(), cases.len())?;
            }
            Err(e) => {
                failures += 1;
                write_status(out, "FAIL", Color::Red)?;
                writeln!(out, " {} ({})", file.display(), e.error_type())?;
                eprintln!("{:?}", Report::new(e));
            }
        }
    }
    writeln!(out, "\nchecked {} fixture(s), {} failed", files.len(), failures)?;
    Ok(failures)
}

fn write_status<W: WriteColor>(out: &mut W, text: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", text)?;
    out.reset()
}
