mod app;
mod host;
mod runtime;
mod script;
mod sink;

pub use app::{App, RunArgs};
use clap::{ArgAction, Parser, Subcommand};
use cogex_experiment::TrialConfig;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "cogex", version, about = "Run a video keyboard-response trial")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one trial and print its result as JSON.
    Run(RunArgs),
    /// List the options a trial config accepts.
    Describe,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => {
            let app = App::new(args)?;
            app.run()?;
        }
        Command::Describe => describe(),
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn describe() {
    println!("=== {} ===", TrialConfig::NAME);
    for param in TrialConfig::PARAMETERS {
        let kind = if param.array {
            format!("{:?}[]", param.kind)
        } else {
            format!("{:?}", param.kind)
        };
        let default = param.default.unwrap_or("(required)");
        println!("  {:<9} {:<10} default {:<10} {}", param.name, kind, default, param.description);
    }
}
