use clap::{Arg, ArgAction, ArgMatches, Command, builder::PossibleValuesParser};
use color_eyre::eyre::{Result, eyre};
use eth_provider::{
    config::Config,
    error::{config_exit_code, exit_code},
    eth::ConnectionDescriptor,
    plugin::METHODS,
};
use serde_json::Value;
use tracing::{error, info};

/// Register the invoke command
pub fn register_command(cmd: Command) -> Command {
    cmd.about("Invoke a provider plugin method and print its JSON result")
        .arg(
            Arg::new("method")
                .help("Plugin method to invoke")
                .required(true)
                .value_parser(PossibleValuesParser::new(METHODS)),
        )
        .arg(
            Arg::new("args")
                .long("args")
                .short('a')
                .help("Method arguments as a JSON object")
                .default_value("{}")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("network")
                .long("network")
                .short('n')
                .help("Network name or chain ID used when the arguments carry no connection")
                .conflicts_with("node")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("node")
                .long("node")
                .help("Node URL used when the arguments carry no connection")
                .action(ArgAction::Set),
        )
}

/// Handle the invoke command
pub async fn handle_command(matches: &ArgMatches, config: &Config) -> Result<()> {
    let method = matches
        .get_one::<String>("method")
        .ok_or_else(|| eyre!("A method name is required"))?;
    let raw_args = matches.get_one::<String>("args").map(String::as_str).unwrap_or("{}");
    let args: Value =
        serde_json::from_str(raw_args).map_err(|e| eyre!("Invalid --args JSON: {}", e))?;

    let mut plugin = match config.plugin() {
        Ok(plugin) => plugin,
        Err(e) => {
            error!("Invalid provider configuration: {}", e);
            std::process::exit(config_exit_code(&e));
        },
    };

    let env = ConnectionDescriptor {
        node: matches.get_one::<String>("node").cloned(),
        network_name_or_chain_id: matches.get_one::<String>("network").cloned(),
    };
    if env != ConnectionDescriptor::default() {
        plugin = plugin.with_env(env);
    }

    info!("Invoking {}", method);
    match plugin.invoke(method, args).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        },
        Err(e) => {
            error!("{} failed: {}", method, e);
            eprintln!("{}", e);
            std::process::exit(exit_code(&e));
        },
    }
}
