use std::fs;
use std::path::PathBuf;

use clap::Parser;

use absint_rs::cfg::Verdict;
use absint_rs::program::parse_program;

/// Prove assertions of a program by abstract interpretation.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Path to the program file.
    path: PathBuf,

    /// Log level filter.
    #[arg(long, default_value = "info")]
    log: simplelog::LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    simplelog::TermLogger::init(
        args.log,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let text = fs::read_to_string(&args.path)?;
    let mut cfg = parse_program(&text)?;
    log::info!(
        "parsed {} with {} node(s) and {} edge(s)",
        args.path.display(),
        cfg.num_nodes(),
        cfg.num_edges()
    );

    let verdict = cfg.analyze()?;
    match verdict {
        Verdict::Proved => println!("proved: every assertion holds"),
        Verdict::Unproved => println!("unproved: some assertion could not be established"),
    }

    Ok(())
}
