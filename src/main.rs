use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use embedfmt::config::EmbedConfig;
use embedfmt::embed::Dispatcher;
use embedfmt::foreign::FormatterRegistry;
use embedfmt::formatter::{FormatOptions, Mode, format_file_source, inspect};
use embedfmt::logging;
use embedfmt::parser::HostLanguage;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "embedfmt",
    version,
    about = "Formats languages embedded in JavaScript and TypeScript template literals"
)]
struct Cli {
    /// Configuration file (defaults to .embedfmt.json in the current dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Fmt {
        /// Paths (files or directories) to format (defaults to current dir)
        paths: Vec<PathBuf>,
        /// Write the formatted content back to the files
        #[arg(long)]
        write: bool,
        /// Check if files are formatted; non-zero exit if changes needed
        #[arg(long)]
        check: bool,
    },
    /// List the template literals of a file and the language claiming each
    Debug {
        /// File to debug
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    if let Err(err) = logging::init() {
        eprintln!("failed to initialize logging: {err}");
    }
    let cli = Cli::parse();
    let config = EmbedConfig::discover(cli.config.as_deref())?;
    let dispatcher = Dispatcher::new(&config, FormatterRegistry::from_config(&config));

    match cli.command {
        Commands::Fmt {
            paths,
            write,
            check,
        } => {
            if write && check {
                bail!("--write and --check are mutually exclusive");
            }
            let mode = if write {
                Mode::Write
            } else if check {
                Mode::Check
            } else {
                Mode::Stdout
            };
            let opts = FormatOptions {
                print: config.print_options(),
                mode,
                ..FormatOptions::default()
            };
            let targets = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            let mut source_files = Vec::new();
            for p in targets {
                collect_source_files(&p, &mut source_files);
            }

            let results: Vec<_> = source_files
                .par_iter()
                .map(|path| process_file(path, &opts, &dispatcher))
                .collect();
            let mut had_change = false;
            let mut had_error = false;
            for (path, r) in source_files.iter().zip(results) {
                match r {
                    Ok(changed) => {
                        had_change |= changed;
                        if changed && mode == Mode::Check {
                            println!("{}", path.display());
                        }
                    }
                    Err(e) => {
                        had_error = true;
                        eprintln!("{}: {e:#}", path.display());
                    }
                }
            }
            if had_error || (mode == Mode::Check && had_change) {
                std::process::exit(1);
            }
        }
        Commands::Debug { file } => {
            debug_file(&file, &dispatcher)?;
        }
    }
    Ok(())
}

fn debug_file(path: &Path, dispatcher: &Dispatcher) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let host = HostLanguage::from_path(path).unwrap_or_default();
    println!("===== {} ({host:?}) =====", path.display());
    for report in inspect(&content, host, dispatcher)? {
        let claimed = match &report.claimed_by {
            Some((language, identifier)) => format!("{language} via `{identifier}`"),
            None => "-".to_string(),
        };
        println!(
            "{}:{} tag={} comment={} expressions={} => {}",
            report.line,
            report.column,
            report.tag.as_deref().unwrap_or("-"),
            report.comment.as_deref().unwrap_or("-"),
            report.expressions,
            claimed
        );
    }
    Ok(())
}

fn collect_source_files(path: &Path, out: &mut Vec<PathBuf>) {
    if path.is_file() {
        if HostLanguage::from_path(path).is_some() {
            out.push(path.to_path_buf());
        }
        return;
    }
    for entry in WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e.path()))
        .filter_map(|e| e.ok())
    {
        let p = entry.path();
        if p.is_file() && HostLanguage::from_path(p).is_some() {
            out.push(p.to_path_buf());
        }
    }
}

fn is_skipped_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

fn process_file(path: &Path, opts: &FormatOptions, dispatcher: &Dispatcher) -> Result<bool> {
    let content = fs::read_to_string(path)?;
    let formatted = format_file_source(&content, path, opts, dispatcher)?;
    let changed = formatted != content;
    match opts.mode {
        Mode::Stdout => {
            println!("===== {} =====", path.display());
            print!("{}", formatted);
        }
        Mode::Write => {
            if changed {
                fs::write(path, formatted)?;
            }
        }
        Mode::Check => {}
    }
    Ok(changed)
}
