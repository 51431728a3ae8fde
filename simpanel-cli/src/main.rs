mod bindings;
mod sim;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;

use simpanel_core::config;
use simpanel_core::panel::Panel;
use simpanel_core::predicate::PredicateRegistry;
use simpanel_core::vkey::VirtualKeyRegistry;

#[derive(Parser)]
#[command(name = "simpanel-cli")]
#[command(about = "Bench tools for the simulator control panel firmware")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the startup validation pass over the built-in configuration
    Check,
    /// Print the binding tables (predicates, keys, inputs)
    Bindings,
    /// Drive the engine from a switch script and print every HID event
    Simulate {
        /// Path to the script file
        script: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check => check(),
        Command::Bindings => {
            print!("{}", bindings::render());
            Ok(())
        }
        Command::Simulate { script } => {
            let contents =
                fs::read_to_string(&script).with_context(|| format!("reading {}", script))?;
            sim::run(&contents)
        }
    }
}

/// Validate the shipped configuration exactly the way the firmware does
/// at boot.
fn check() -> Result<()> {
    let mut predicates = config::predicates();
    let mut keys = config::virtual_keys();
    let mut inputs = config::physical_inputs();

    match Panel::new(
        PredicateRegistry::new(&mut predicates),
        VirtualKeyRegistry::new(&mut keys),
        &mut inputs,
    ) {
        Ok(_) => {
            println!(
                "configuration ok: {} predicates, {} virtual keys, {} inputs",
                config::PREDICATE_COUNT,
                config::KEY_COUNT,
                config::INPUT_COUNT
            );
            Ok(())
        }
        Err(error) => {
            eprintln!("configuration error: {error}");
            std::process::exit(1);
        }
    }
}
