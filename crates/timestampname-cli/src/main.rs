use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(
    name = "timestampname",
    version,
    about = "Rename photos and videos after the capture time stored in their metadata"
)]
struct Cli {
    /// Folder to process (default: current directory)
    dir: Option<PathBuf>,

    /// Dry run: print the rename plan without renaming
    #[arg(long)]
    dry: bool,

    /// No ordinal counter prefix in target names
    #[arg(long)]
    noprefix: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,
}

/// Console rendering of pipeline progress: one bar per long-running stage.
struct Console {
    bar: Mutex<Option<(String, ProgressBar)>>,
}

impl Console {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn finish(&self) {
        if let Some((_, bar)) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }

    fn advance(&self, stage: &str, total: u64, label: &str) {
        let mut current = self.bar.lock().unwrap();
        if current.as_ref().map_or(true, |(name, _)| name != stage) {
            if let Some((_, bar)) = current.take() {
                bar.finish_and_clear();
            }
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(&format!("[{{bar:40}}] {{pos}}/{{len}} {}", label))
                    .unwrap(),
            );
            *current = Some((stage.to_string(), bar));
        }
        if let Some((_, bar)) = current.as_ref() {
            bar.inc(1);
        }
    }

    fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        match stage {
            "scan" => eprintln!("{} supported files found.", total),
            "extract" => self.advance(stage, total, "processing files"),
            "verify" => {
                if current == 0 {
                    self.finish();
                    eprintln!("Verifying:");
                }
                eprintln!("    {}", message);
            }
            "rename" => self.advance(stage, total, "renaming files"),
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let options = timestampname_core::ProcessOptions {
        dir,
        dry_run: cli.dry,
        no_prefix: cli.noprefix,
    };
    log::debug!("options: {:?}", options);

    eprintln!("Scanning for files in {}...", options.dir.display());
    let console = Console::new();
    let outcome = timestampname_core::process(&options, &|stage, current, total, message| {
        console.report(stage, current, total, message);
    });
    console.finish();
    let result = outcome?;

    if result.files_found == 0 {
        eprintln!("Nothing to do.");
    } else if options.dry_run {
        eprintln!("Dry run: {} files left unchanged.", result.operations.len());
    } else {
        eprintln!("Renamed {} files.", result.files_renamed);
    }
    eprintln!("Finished.");

    Ok(())
}
