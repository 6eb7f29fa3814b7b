//! Main entry point for the tr-sim CLI

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use tr_sim::cli::{Cli, Commands};
use tr_sim::commands;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    match cli.command {
        Commands::Info { file } => commands::info::execute(&file),
        Commands::Run {
            file,
            ticks,
            every,
            format,
            snapshot,
            restore,
        } => commands::run::execute(&file, ticks, every, format, snapshot.as_deref(), restore.as_deref()),
        Commands::Probe {
            file,
            x,
            y,
            z,
            angle,
            room,
            format,
        } => commands::probe::execute(&file, [x, y, z], angle, room, format),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
