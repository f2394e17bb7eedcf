//! `capdemo`: runs the capability runtime scenarios and prints their console text.

use cap_core::RuntimeConfig;
use cap_demo::{render, Scenario};
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("capdemo")
        .version(cap_demo::VERSION)
        .about("Capability runtime demonstrations")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .help("TOML runtime configuration"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .subcommand(Command::new("composite").about("Aggregate leaves through a composite"))
        .subcommand(Command::new("decorator").about("Wrap a component in nested layers"))
        .subcommand(Command::new("chain").about("Offer foods to the animal chain"))
        .subcommand(Command::new("flyweight").about("Serve shared and custom pizzas"))
        .subcommand(Command::new("all").about("Run every scenario (default)"));

    let matches = cli.get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    let json = matches.get_flag("json");

    let scenario = matches
        .subcommand_name()
        .and_then(Scenario::from_name)
        .unwrap_or(Scenario::All);

    tracing::info!(?scenario, json, "starting");
    println!("{}", render(scenario, &config, json)?);
    Ok(())
}
