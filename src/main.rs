//! CLI entrypoint for `hashtrace`.
//!
//! Parses command-line arguments, loads the profile record and any list files,
//! builds a search session through the library engine, runs the enumeration
//! with a progress bar and cooperative cancellation, prints a terminal report
//! and optionally writes a CSV export or a candidate wordlist.
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use hashtrace::{
    domains::{DomainSource, DomainTier},
    engine::{EngineError, SessionBuilder},
    export::{save_candidates_txt, save_report_csv},
    generator::SeparatorMode,
    io::{DEFAULT_MMAP_THRESHOLD_BYTES, read_list_file},
    profile::ProfileRecord,
    report::render_report,
    search::{Progress, StopFlag},
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hashtrace",
    version,
    about = "Recover the email behind an avatar profile hash"
)]
struct Args {
    /// MD5 or SHA-256 digest of the email (defaults to the profile's hash)
    target: Option<String>,

    /// Profile record as JSON
    #[arg(short = 'p', long = "profile")]
    profile: Option<PathBuf>,

    /// Elements to combine, added to those found in the profile
    #[arg(short = 'e', long = "elements", num_args = 1..)]
    elements: Vec<String>,

    /// File with one element per line
    #[arg(long = "elements-file")]
    elements_file: Option<PathBuf>,

    /// Built-in email domain list
    #[arg(short = 'l', long = "domain-list", value_enum)]
    domain_list: Option<TierChoice>,

    /// Custom email domains, replacing the built-in list
    #[arg(short = 'd', long = "domains", num_args = 1..)]
    domains: Vec<String>,

    /// File with one custom email domain per line
    #[arg(long = "domains-file")]
    domains_file: Option<PathBuf>,

    /// Try every separator in every gap between elements
    #[arg(short = 'c', long = "crazy")]
    crazy: bool,

    /// Stop after this many seconds
    #[arg(long = "max-time")]
    max_time: Option<u64>,

    /// Search on all cores
    #[arg(long = "parallel")]
    parallel: bool,

    /// Number of shards for --parallel (0 = four per thread)
    #[arg(long = "shards", default_value_t = 0)]
    shards: usize,

    /// Path to the output directory for the CSV results
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Write every candidate email to this file instead of searching
    #[arg(long = "wordlist")]
    wordlist: Option<PathBuf>,

    /// Override mmap threshold in bytes for list files. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Suppress the progress bar and report (still writes exports)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TierChoice {
    Common,
    Long,
    Full,
}

impl From<TierChoice> for DomainTier {
    fn from(t: TierChoice) -> Self {
        match t {
            TierChoice::Common => DomainTier::Common,
            TierChoice::Long => DomainTier::Long,
            TierChoice::Full => DomainTier::Full,
        }
    }
}

const ASCII_TITLE: &str = r#"
 _               _     _
| |__   __ _ ___| |__ | |_ _ __ __ _  ___ ___
| '_ \ / _` / __| '_ \| __| '__/ _` |/ __/ _ \
| | | | (_| \__ \ | | | |_| | | (_| | (_|  __/
|_| |_|\__,_|___/_| |_|\__|_|  \__,_|\___\___|
"#;

/// Progress sink backed by an `indicatif` bar.
struct BarProgress(ProgressBar);

impl BarProgress {
    fn new(quiet: bool) -> Self {
        if quiet {
            return Self(ProgressBar::hidden());
        }
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{msg} {wide_bar} {human_pos}/{human_len} [{elapsed_precise}<{eta_precise}, {per_sec}]",
        ) {
            bar.set_style(style);
        }
        bar.set_message("Comparing email hashes");
        Self(bar)
    }
}

impl Progress for BarProgress {
    fn begin(&self, total: u128) {
        self.0.set_length(u64::try_from(total).unwrap_or(u64::MAX));
    }

    fn step(&self, processed: u64) {
        self.0.set_position(processed);
    }

    fn end(&self) {
        self.0.finish_and_clear();
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_inputs(args: &Args) -> Result<()> {
    for p in [&args.profile, &args.elements_file, &args.domains_file]
        .into_iter()
        .flatten()
    {
        if !p.exists() {
            bail!("input file not found: {}", p.display());
        }
    }
    if args.target.is_none() && args.profile.is_none() {
        bail!("no target hash given and no profile to take it from");
    }
    if args.shards > 0 && !args.parallel {
        warn!("--shards has no effect without --parallel");
    }
    Ok(())
}

struct Inputs {
    profile: Option<ProfileRecord>,
    elements: Vec<String>,
    domains: Vec<String>,
}

fn load_inputs(args: &Args, threshold: u64) -> Result<Inputs> {
    let profile = args
        .profile
        .as_ref()
        .map(ProfileRecord::from_path)
        .transpose()?;
    let mut elements = args.elements.clone();
    if let Some(path) = &args.elements_file {
        elements.extend(read_list_file(path, threshold)?);
    }
    let mut domains = args.domains.clone();
    if let Some(path) = &args.domains_file {
        domains.extend(read_list_file(path, threshold)?);
    }
    Ok(Inputs {
        profile,
        elements,
        domains,
    })
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    // Configure color policy
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    if let Err(e) = verify_inputs(&args) {
        error!("{}", e);
        std::process::exit(2);
    }
    let threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };
    let inputs = match load_inputs(&args, threshold) {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("failed to load inputs: {:#}", e);
            std::process::exit(3);
        }
    };

    let source = match DomainSource::resolve(args.domain_list.map(Into::into), inputs.domains) {
        Ok(source) => source,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    let mut builder = SessionBuilder::new()
        .elements(inputs.elements)
        .domains(source)
        .mode(if args.crazy {
            SeparatorMode::Crazy
        } else {
            SeparatorMode::Normal
        });
    if let Some(target) = &args.target {
        builder = builder.target(target.as_str());
    }
    if let Some(profile) = inputs.profile {
        builder = builder.profile(profile);
    }
    let session = match builder.build() {
        Ok(session) => session,
        Err(EngineError::EmptyChunkSet) => {
            error!("{}", EngineError::EmptyChunkSet);
            eprintln!("Supply known fragments, e.g. `hashtrace <HASH> -e marco m polo p`;");
            eprintln!("include initials to match patterns like m_polo@domain.tld");
            std::process::exit(4);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    if let Some(path) = &args.wordlist {
        match save_candidates_txt(session.candidates(), path) {
            Ok(n) => {
                info!("wrote {} candidates to {}", n, path.display());
                if !args.quiet {
                    println!("{} candidates written to {}", n, path.display());
                }
            }
            Err(e) => {
                error!("failed to write {}: {:#}", path.display(), e);
                std::process::exit(5);
            }
        }
        return;
    }

    let mut stop = StopFlag::new();
    if let Some(secs) = args.max_time {
        stop = stop.with_budget(Duration::from_secs(secs));
    }
    let interrupted = stop.handle();
    if let Err(e) = ctrlc::set_handler(move || interrupted.store(true, Ordering::Relaxed)) {
        warn!("could not install Ctrl-C handler: {}", e);
    }

    if !args.quiet {
        println!("{}", ASCII_TITLE.bold().green());
    }
    let progress = BarProgress::new(args.quiet);
    let report = if args.parallel {
        let shards = if args.shards == 0 {
            rayon::current_num_threads() * 4
        } else {
            args.shards
        };
        session.run_parallel(shards, &progress, &stop)
    } else {
        session.run(&progress, &stop)
    };

    if !args.quiet {
        println!("{}", render_report(&report));
    }

    if let Some(outdir) = args.output {
        if let Err(e) = fs::create_dir_all(&outdir) {
            error!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            );
            std::process::exit(5);
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S");
        let csv = outdir.join(format!("hashtrace_results_{}.csv", ts));
        if let Err(e) = save_report_csv(&report, &csv) {
            error!("failed to write {}: {:#}", csv.display(), e);
            std::process::exit(5);
        }
    }
}
