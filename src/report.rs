//! Human-readable report rendering for terminal output.
//!
//! Produces a colored summary of the search setup, the enumeration result and
//! the public email checks of a finished [`SearchReport`].
use colored::*;

use crate::engine::SearchReport;
use crate::generator::SeparatorMode;
use crate::search::SearchOutcome;
use crate::stats::{Throughput, format_count, format_interval, format_sizeof, pct};

fn visible_len(s: &str) -> usize {
    // Strip ANSI escape sequences (\x1b[ ... m) to compute printable width
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}

fn section_header(title: &str) -> String {
    let len = visible_len(title);
    let mut s = String::new();
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"─".repeat(len));
    s.push_str("\n\n");
    s
}

fn push_section(out: &mut String, title: ColoredString, lines: Vec<String>) {
    out.push_str(&section_header(&title.to_string()));
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
}

fn mode_label(mode: SeparatorMode) -> &'static str {
    match mode {
        SeparatorMode::Normal => "normal (one separator per address)",
        SeparatorMode::Crazy => "crazy (any separator in any gap)",
    }
}

pub fn render_report(report: &SearchReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        "hashtrace: Email Hash Enumeration Results".bold().cyan()
    ));

    // Setup
    let setup = vec![
        format!("Target: {} ({})", report.target, report.algorithm),
        format!("Elements to permute: {}", report.chunks.join(", ").yellow()),
        format!("Number of email domains: {}", report.domain_count),
        format!("Separator mode: {}", mode_label(report.mode)),
        format!(
            "Number of possible combinations: {}",
            format_count(report.total)
        ),
    ];
    push_section(&mut out, "Search Setup".bold().yellow(), setup);

    // Enumeration
    let tp = Throughput::of(&report.outcome);
    let mut result_lines = vec![
        format!(
            "Processed: {} / {} ({})",
            format_count(tp.processed as u128),
            format_count(report.total),
            pct(tp.processed as u128, report.total)
        ),
        format!(
            "Elapsed: {} at {} hashes/s",
            format_interval(tp.elapsed),
            format_sizeof(tp.rate)
        ),
    ];
    match &report.outcome {
        SearchOutcome::Found {
            email, position, ..
        } => {
            result_lines.push(format!(
                "Email found after {} hashes: {}",
                format_count(*position as u128),
                email.bold().green()
            ));
        }
        SearchOutcome::Exhausted { .. } => {
            result_lines.push(format!(
                "{}",
                "No generated email matches the account hash.".red()
            ));
        }
        SearchOutcome::Cancelled { .. } => {
            result_lines.push(format!(
                "{}",
                "Search cancelled before the space was exhausted.".yellow()
            ));
        }
    }
    push_section(&mut out, "Enumeration".bold().cyan(), result_lines);

    // Public emails
    let mut public_lines: Vec<String> = Vec::new();
    if report.public_emails.is_empty() {
        public_lines.push("(No public emails on the profile)".to_string());
    } else {
        for check in &report.public_emails {
            if check.matches {
                public_lines.push(format!(
                    "  {}: {}",
                    check.email.bold().green(),
                    "matches the account hash (primary email)".green()
                ));
            } else {
                public_lines.push(format!(
                    "  {}: {}",
                    check.email,
                    "does not match the account hash".dimmed()
                ));
            }
        }
    }
    push_section(&mut out, "Public Emails".bold().magenta(), public_lines);

    out
}
