//! CLI entry point for iacguard.
//!
//! This module is thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `iacguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use iacguard_app::{ScanInput, exit_code, list_rules, run_scan, serialize_report, write_report};
use iacguard_rules::RuleCatalog;
use iacguard_settings::{IacguardConfigV1, Overrides};
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "iacguard",
    version,
    about = "Security and compliance scanner for Azure deployment templates"
)]
struct Cli {
    /// Root of the scanned filesystem. Report paths and relative policy dirs resolve against it.
    #[arg(long, global = true, default_value = ".")]
    root: Utf8PathBuf,

    /// Path to the iacguard config TOML, relative to the root.
    #[arg(long, global = true, default_value = "iacguard.toml")]
    config: Utf8PathBuf,

    /// Log at debug level (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan deployment templates and write a JSON report.
    Scan {
        /// Directory under the root to scan.
        #[arg(default_value = ".")]
        dir: String,

        /// Restrict builtin rules to these frameworks (repeatable; `all` selects every rule).
        #[arg(long = "framework")]
        frameworks: Vec<String>,

        /// Evaluate Rego policies only.
        #[arg(long)]
        rego_only: bool,

        /// Also run deprecated rules.
        #[arg(long)]
        include_deprecated: bool,

        /// Directory of `*.rego` policies (repeatable). Replaces the config's `policies.dirs`.
        #[arg(long = "policy-dir")]
        policy_dirs: Vec<String>,

        /// Abort the scan after this many seconds (0 disables).
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Where to write the JSON report (stdout if omitted).
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,
    },

    /// List the rules a scan would run, as JSON.
    Rules {
        #[arg(long = "framework")]
        frameworks: Vec<String>,

        #[arg(long)]
        include_deprecated: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.cmd {
        Commands::Scan {
            dir,
            frameworks,
            rego_only,
            include_deprecated,
            policy_dirs,
            timeout_secs,
            report_out,
        } => cmd_scan(
            &cli,
            dir,
            Overrides {
                frameworks: frameworks.clone(),
                rego_only: rego_only.then_some(true),
                include_deprecated_checks: include_deprecated.then_some(true),
                timeout_secs: *timeout_secs,
                policy_dirs: policy_dirs.clone(),
            },
            report_out.as_deref(),
        ),
        Commands::Rules {
            frameworks,
            include_deprecated,
        } => cmd_rules(
            &cli,
            Overrides {
                frameworks: frameworks.clone(),
                include_deprecated_checks: include_deprecated.then_some(true),
                ..Overrides::default()
            },
        ),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("iacguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("iacguard=debug")
    } else {
        EnvFilter::new("iacguard=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_scan(
    cli: &Cli,
    dir: &str,
    overrides: Overrides,
    report_out: Option<&Utf8Path>,
) -> anyhow::Result<i32> {
    let root = canonical_root(&cli.root)?;
    let config_text = read_config(&root.join(&cli.config))?;

    let output = run_scan(ScanInput {
        fs_root: &root,
        dir,
        config_text: &config_text,
        overrides,
    })?;

    match report_out {
        Some(path) => write_report(path, &output.report).context("write report json")?,
        None => {
            let data = serialize_report(&output.report)?;
            std::io::stdout()
                .write_all(&data)
                .context("write report to stdout")?;
        }
    }

    Ok(exit_code(&output.report))
}

fn cmd_rules(cli: &Cli, overrides: Overrides) -> anyhow::Result<i32> {
    let root = canonical_root(&cli.root)?;
    let config_text = read_config(&root.join(&cli.config))?;
    let cfg = if config_text.trim().is_empty() {
        IacguardConfigV1::default()
    } else {
        iacguard_settings::parse_config_toml(&config_text).context("parse config")?
    };
    let resolved =
        iacguard_settings::resolve_config(cfg, overrides).context("resolve config")?;

    let rules = list_rules(
        &RuleCatalog::builtin(),
        &resolved.frameworks,
        resolved.include_deprecated_checks,
    );
    let json = serde_json::to_string_pretty(&rules).context("serialize rules")?;
    println!("{json}");
    Ok(0)
}

fn canonical_root(root: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    if !root.is_dir() {
        anyhow::bail!("root does not exist: {root}");
    }
    Ok(root.canonicalize_utf8().unwrap_or_else(|_| root.to_path_buf()))
}

/// Missing config file is allowed (defaults apply).
fn read_config(path: &Utf8Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("read config: {path}")),
    }
}
