use clap::Parser;
use toteboard::app::App;
use toteboard::cli::command::{Cli, Commands};
use toteboard::cli::output::{self, OutputConfig};
use toteboard::cli::{board, place, result, seed, simulate};
use toteboard::config::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    config.init_logging();

    if let Err(e) = dispatch(cli.command, &config).await {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands, config: &Config) -> anyhow::Result<()> {
    let app = App::bootstrap(config)?;
    match command {
        Commands::Seed(args) => seed::execute(&app, &args),
        Commands::Place(args) => place::execute(&app, &args).await,
        Commands::Result(args) => result::execute(&app, &args).await,
        Commands::Board(args) => board::execute(&app, &args),
        Commands::Simulate(args) => simulate::execute(&app, &args).await,
    }
}
