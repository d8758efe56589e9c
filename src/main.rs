use std::io::{self, Read};

use clap::Parser;
use howl::{
    config::{default_config_toml, load_policy},
    error::HowlError,
    render::{output_line, RenderOptions},
    HowlRunner,
};
use tracing_subscriber::EnvFilter;

/// Reads a session snapshot as JSON on stdin and prints the status lines.
#[derive(Parser, Debug)]
#[command(name = "howl", version, about)]
struct Cli {
    /// Print the default config file and exit
    #[arg(long)]
    print_config: bool,

    /// Disable ANSI colors (also honored via NO_COLOR)
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if cli.print_config {
        print!("{}", default_config_toml());
        return;
    }

    let mut input = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut input) {
        tracing::debug!(%err, "stdin unreadable, rendering empty snapshot");
        input.clear();
    }

    let color_enabled = !cli.no_color && std::env::var_os("NO_COLOR").is_none();
    let options = RenderOptions::new(color_enabled);
    let policy = load_policy();

    match HowlRunner::default().run_from_str(&input, &policy, &options) {
        Ok(lines) => {
            for line in lines {
                println!("{}", output_line(&line));
            }
        }
        Err(HowlError::InvalidInput(err)) => {
            tracing::debug!(%err, "malformed snapshot");
            eprintln!("howl: stdin parse error");
            std::process::exit(1);
        }
    }
}

/// Diagnostics go to stderr and only when `HOWL_LOG` is set, so stdout
/// stays reserved for the status lines.
fn init_tracing() {
    let Ok(filter) = EnvFilter::try_from_env("HOWL_LOG") else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
