use clap::{ArgMatches, Command};
use color_eyre::eyre::Result;
use eth_provider::{config::Config, eth::KnownNetwork};

/// Register the networks command
pub fn register_command(cmd: Command) -> Command {
    cmd.about("List known networks and configured connections")
}

/// Handle the networks command
pub fn handle_command(_matches: &ArgMatches, config: &Config) -> Result<()> {
    let connections = config.connections()?;
    let template = &config.provider.gateway_template;

    println!("Known networks:");
    for network in KnownNetwork::ALL {
        println!(
            "  {:>12}  {:<18} {}",
            network.chain_id(),
            network.name(),
            network.endpoint(template)
        );
    }

    println!();
    println!("Configured connections (default: {}):", connections.default_network());
    let mut networks: Vec<&str> = connections.networks().collect();
    networks.sort_unstable();
    for network in networks {
        if let Some(connection) = connections.get(network) {
            let signed = connection.has_signer() || connections.has_signer();
            let signer = if signed { "signer" } else { "" };
            println!("  {:<20} {} {}", network, connection.endpoint(), signer);
        }
    }

    Ok(())
}
