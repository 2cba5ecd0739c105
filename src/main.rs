//! WWMI Tools - toggle and transparency patcher for WWMI `mod.ini` files.
//!
//! Command-line front end over [`EditSession`]. Every mutating command
//! follows the same loop: open and scan the file, queue the requested edits,
//! then either print the preview (`--dry-run`) or apply with a backup.
//!
//! Entry numbers are the 1-based positions printed by `scan`.

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use wwmi_tools::models::{ApplyReport, BlendMode, ToggleStatus};
use wwmi_tools::services::SpecError;
use wwmi_tools::{APP_NAME, ConfigManager, DiskStore, EditSession, SessionError, VERSION, logging};

#[derive(Parser)]
#[command(
    name = "wwmi-tools",
    version,
    about = "Add key toggles and transparency overrides to WWMI mod.ini files"
)]
struct Cli {
    /// Directory holding `WWMI Tools.yaml`
    #[arg(long, global = true, default_value = "WWMI Tools Data")]
    config_dir: Utf8PathBuf,

    /// Verbose logging, mirrored to the console
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List drawindexed entries and existing toggles
    Scan { file: Utf8PathBuf },
    /// Guard entries behind a new cycle-key variable
    Toggle {
        file: Utf8PathBuf,
        /// Entry number from `scan` (repeatable)
        #[arg(long = "entry", required = true, num_args = 1..)]
        entries: Vec<usize>,
        /// Variable name, with or without the leading `$`
        #[arg(long)]
        var: String,
        /// Key binding, e.g. `h` or `VK_F1`
        #[arg(long)]
        key: String,
        /// Print the result instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove existing simple toggles
    Untoggle {
        file: Utf8PathBuf,
        #[arg(long = "entry", required = true, num_args = 1..)]
        entries: Vec<usize>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Route an entry through a CustomShaderTransparency section
    Transparency {
        file: Utf8PathBuf,
        #[arg(long)]
        entry: usize,
        #[arg(long, value_enum, default_value_t = Mode::Alpha)]
        mode: Mode,
        /// Four comma-separated blend factors for `--mode factor`
        #[arg(long, value_delimiter = ',')]
        factors: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Drop declarations and key sections no toggle uses
    Prune {
        file: Utf8PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// blend = ADD SRC_ALPHA INV_SRC_ALPHA
    Alpha,
    /// blend = ADD BLEND_FACTOR INV_BLEND_FACTOR with four factors
    Factor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let mut settings = config_manager.load_settings()?;
    settings.debug_mode |= cli.debug;

    let _guard = logging::setup_logging_with_console(
        &settings.log_dir,
        APP_NAME,
        settings.debug_mode,
        cli.debug,
    )?;
    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    match cli.command {
        Command::Scan { file } => {
            let session = EditSession::open(DiskStore, &file, settings)?;
            print_scan(&session);
            Ok(())
        }
        Command::Toggle {
            file,
            entries,
            var,
            key,
            dry_run,
        } => {
            let mut session = EditSession::open(DiskStore, &file, settings)?;
            for n in entries {
                let queued = session.queue_toggle(entry_index(n)?, &var, &key);
                skip_complex(queued, n).with_context(|| format!("Cannot toggle entry {}", n))?;
            }
            finish(session, dry_run)
        }
        Command::Untoggle {
            file,
            entries,
            dry_run,
        } => {
            let mut session = EditSession::open(DiskStore, &file, settings)?;
            for n in entries {
                let queued = session.queue_unwrap(entry_index(n)?);
                skip_complex(queued, n).with_context(|| format!("Cannot untoggle entry {}", n))?;
            }
            finish(session, dry_run)
        }
        Command::Transparency {
            file,
            entry,
            mode,
            factors,
            dry_run,
        } => {
            let mode = match mode {
                Mode::Alpha => BlendMode::TextureAlpha,
                Mode::Factor => {
                    let Ok(factors) = <[String; 4]>::try_from(factors) else {
                        bail!("--mode factor needs --factors a,b,c,d");
                    };
                    BlendMode::BlendFactor(factors)
                }
            };
            let mut session = EditSession::open(DiskStore, &file, settings)?;
            let name = session
                .queue_transparency(entry_index(entry)?, mode)
                .with_context(|| format!("Cannot add transparency to entry {}", entry))?;
            eprintln!("Queued [{}]", name);
            finish(session, dry_run)
        }
        Command::Prune { file, dry_run } => {
            let session = EditSession::open(DiskStore, &file, settings)?;
            finish(session, dry_run)
        }
    }
}

fn entry_index(n: usize) -> Result<usize> {
    if n == 0 {
        bail!("Entry numbers start at 1");
    }
    Ok(n - 1)
}

/// Complex blocks are left alone and counted in the report; every other
/// queueing error stops the command.
fn skip_complex(queued: Result<(), SessionError>, n: usize) -> Result<(), SessionError> {
    match queued {
        Err(SessionError::Spec(SpecError::UnsafeEdit(line))) => {
            tracing::warn!("Entry {} (line {}) is in a complex toggle block; skipped", n, line);
            Ok(())
        }
        other => other,
    }
}

fn print_scan(session: &EditSession) {
    let result = session.scan_result();
    println!("{}", session.path());
    for (i, entry) in result.entries.iter().enumerate() {
        println!("{:>4}  {}", i + 1, entry);
    }
    println!(
        "{} entries, {} simple toggles, {} complex toggles; key variables: {}",
        result.entries.len(),
        result.count_by_status(ToggleStatus::ExistingSimple),
        result.count_by_status(ToggleStatus::ExistingComplex),
        result
            .key_variables
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    for diagnostic in &result.diagnostics {
        println!("warning: {}", diagnostic);
    }
}

fn finish(mut session: EditSession, dry_run: bool) -> Result<()> {
    if dry_run {
        let outcome = session.preview();
        print!("{}", outcome.text());
        print_report(&outcome.report);
        return Ok(());
    }

    let report = session.apply()?;
    print_report(&report);
    if report.has_changes() {
        println!(
            "Backup: {}",
            session.settings().backup_path(session.path())
        );
    }
    Ok(())
}

fn print_report(report: &ApplyReport) {
    eprintln!("{}", report.summary());
    for diagnostic in &report.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
}
