//! Human-readable suite reports: one line per case, failure details with a
//! line diff, then a summary.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::HarnessConfig;
use crate::dispatch::TestResult;
use crate::suite::{GroupOutcome, SuiteReport};

/// Prints the report to stdout, colored when the config allows it.
pub fn print_report(report: &SuiteReport, config: &HarnessConfig) -> io::Result<()> {
    let choice = if config.use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_report(&mut stdout, report)
}

pub fn write_report<W: WriteColor>(out: &mut W, report: &SuiteReport) -> io::Result<()> {
    for group in &report.groups {
        if let GroupOutcome::SetupFailed(err) = &group.outcome {
            status(out, "ERROR", Color::Red)?;
            writeln!(out, ": {} [{}]", group.group.name, group.group.fixture)?;
            writeln!(out, "  Setup: {} ({})", err, err.error_type())?;
            continue;
        }
        for result in group.results() {
            write_result(out, &result)?;
        }
    }

    let summary = report.summary();
    write!(out, "\nTest summary for {}: total {}, ", report.suite, summary.total())?;
    status(out, "passed", Color::Green)?;
    write!(out, " {}, ", summary.passed)?;
    status(out, "failed", Color::Red)?;
    write!(out, " {}, ", summary.failed)?;
    status(out, "skipped", Color::Yellow)?;
    writeln!(out, " {}", summary.skipped)?;
    if summary.setup_failures > 0 {
        writeln!(out, "{} group(s) failed to load", summary.setup_failures)?;
    }

    let failed: Vec<_> = report.results().into_iter().filter(TestResult::is_fail).collect();
    if !failed.is_empty() {
        writeln!(out, "\nFailed tests:")?;
        for r in failed {
            writeln!(out, "  - {}::{}", r.group(), r.name())?;
        }
    }
    Ok(())
}

fn write_result<W: WriteColor>(out: &mut W, result: &TestResult) -> io::Result<()> {
    match result {
        TestResult::Pass { group, name } => {
            status(out, "PASS", Color::Green)?;
            writeln!(out, ": {} [{}]", name, group)
        }
        TestResult::Skipped {
            group,
            name,
            reason,
        } => {
            status(out, "SKIP", Color::Yellow)?;
            writeln!(out, ": {} [{}] ({})", name, group, reason)
        }
        TestResult::Fail {
            group,
            name,
            error,
            diff,
        } => {
            status(out, "FAIL", Color::Red)?;
            writeln!(out, ": {} [{}]", name, group)?;
            writeln!(out, "  Error: {}", error)?;
            if let Some((expected, actual)) = diff {
                writeln!(out, "  Diff:")?;
                write_diff(out, expected, actual)?;
            }
            Ok(())
        }
    }
}

/// Writes a line diff: `-` lines are expected only, `+` lines actual only.
pub fn write_diff<W: WriteColor>(out: &mut W, expected: &str, actual: &str) -> io::Result<()> {
    let changeset = Changeset::new(expected, actual, "\n");
    for diff in &changeset.diffs {
        let (marker, color, text) = match diff {
            Difference::Same(x) => (' ', None, x),
            Difference::Rem(x) => ('-', Some(Color::Green), x),
            Difference::Add(x) => ('+', Some(Color::Red), x),
        };
        for line in text.lines() {
            if let Some(color) = color {
                out.set_color(ColorSpec::new().set_fg(Some(color)))?;
            }
            write!(out, "  {}{}", marker, line)?;
            out.reset()?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn status<W: WriteColor>(out: &mut W, text: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", text)?;
    out.reset()
}
