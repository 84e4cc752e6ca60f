pub mod invoke;
pub mod networks;

use clap::Command;
use color_eyre::eyre::Result;
use eth_provider::config::Config;

/// Register all application commands
pub fn register_commands(app: Command) -> Command {
    app.subcommand(invoke::register_command(Command::new("invoke")))
        .subcommand(networks::register_command(Command::new("networks")))
}

/// Handle all application commands
pub async fn handle_commands(matches: clap::ArgMatches, config: &Config) -> Result<()> {
    match matches.subcommand() {
        Some(("invoke", invoke_matches)) => invoke::handle_command(invoke_matches, config).await,
        Some(("networks", networks_matches)) => networks::handle_command(networks_matches, config),
        _ => {
            println!("Please specify a subcommand. Use --help for more information.");
            Ok(())
        },
    }
}
