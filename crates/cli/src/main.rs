use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "libris", version, about = "Library circulation service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Print the effective configuration and exit
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => libris_app::run().await,
        Command::Config => {
            let settings = libris_kernel::settings::Settings::load()
                .with_context(|| "failed to load LIBRIS settings")?;
            println!("{settings:#?}");
            Ok(())
        }
    }
}
