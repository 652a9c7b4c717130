mod simulation;

use blackjack_ev_drivers::{init_logger, load_config, ConfigError, DEFAULT_CONFIG_PATH};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, about = "Play rounds with basic strategy and report EV per decision", long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Overrides auto_simulator.rounds from the config
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Overrides auto_simulator.seed from the config
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() {
    init_logger();
    let args = CommandLineArgs::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: CommandLineArgs) -> Result<(), ConfigError> {
    let mut config = load_config(&args.config)?;
    if let Some(rounds) = args.rounds {
        config.auto_simulator.rounds = rounds;
    }
    if args.seed.is_some() {
        config.auto_simulator.seed = args.seed;
    }
    log::debug!("{:#?}", config);

    let rule: blackjack_ev::Rule = config.rule.try_into()?;
    let table = simulation::simulate_rounds(&rule, &config.auto_simulator)?;
    simulation::print_ev_table(&table, config.auto_simulator.bet);
    Ok(())
}
