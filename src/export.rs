//! Export helpers for writing results to CSV and plain text files.
//!
//! - `save_report_csv` writes one row for the enumeration result and one per
//!   public email check.
//! - `save_candidates_txt` streams every candidate to a wordlist, one per line.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use crate::engine::SearchReport;
use crate::stats::Throughput;

pub fn save_report_csv<P: AsRef<Path>>(report: &SearchReport, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr =
        Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    wtr.write_record([
        "Source",
        "Status",
        "Email",
        "Processed",
        "Total",
        "ElapsedSeconds",
        "HashesPerSecond",
        "Algorithm",
        "Target",
    ])?;
    let tp = Throughput::of(&report.outcome);
    let processed = tp.processed.to_string();
    let total = report.total.to_string();
    let elapsed = format!("{:.3}", tp.elapsed.as_secs_f64());
    let rate = format!("{:.0}", tp.rate);
    wtr.write_record([
        "enumeration",
        report.outcome.status(),
        report.outcome.email().unwrap_or(""),
        processed.as_str(),
        total.as_str(),
        elapsed.as_str(),
        rate.as_str(),
        report.algorithm.name(),
        report.target.as_str(),
    ])?;
    for check in &report.public_emails {
        wtr.write_record([
            "public",
            if check.matches { "match" } else { "no-match" },
            check.email.as_str(),
            "",
            "",
            "",
            "",
            report.algorithm.name(),
            report.target.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every candidate on its own line; returns how many were written.
pub fn save_candidates_txt<P, I>(candidates: I, path: P) -> Result<u64>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = String>,
{
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    let mut written = 0u64;
    for candidate in candidates {
        writeln!(w, "{}", candidate)?;
        written += 1;
    }
    w.flush()?;
    Ok(written)
}
