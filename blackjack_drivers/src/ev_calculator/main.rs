use blackjack_ev::{
    best_action, Action, BasicStrategy, BustOdds, Card, Estimator, EvResult, Rank, RankCounts, Rule, Scenario, Strategy,
};
use blackjack_ev_drivers::{init_logger, load_config, parse_cards, ConfigError, DEFAULT_CONFIG_PATH};
use clap::Parser;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(author, about = "Estimate the EV of every legal action for a blackjack hand", long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Player cards, e.g. "AS,8D"
    #[arg(short, long)]
    player: String,

    /// Dealer up card, e.g. "6H"
    #[arg(short, long)]
    dealer: String,

    /// Other cards already seen, e.g. the other hands of a split
    #[arg(short, long)]
    known: Option<String>,

    #[arg(short, long, default_value_t = 10.0)]
    bet: f64,

    /// Number of hands the seat holds, more than 1 after a split
    #[arg(long, default_value_t = 1)]
    hand_count: u8,

    /// Overrides estimator.trials from the config
    #[arg(short, long)]
    trials: Option<u64>,

    /// Overrides estimator.seed from the config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Overrides estimator.number_of_threads from the config
    #[arg(long)]
    threads: Option<usize>,

    /// Print the report as YAML
    #[arg(long, default_value_t = false)]
    yaml: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    player: String,
    dealer_up_card: String,
    bet: f64,
    trials: u64,
    results: Vec<EvResult>,
    best_action: Option<Action>,
    policy_action: Action,
    bust_odds: BustOdds,
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
    if let Some(trials) = args.trials {
        config.estimator.trials = trials;
    }
    if args.seed.is_some() {
        config.estimator.seed = args.seed;
    }
    if let Some(threads) = args.threads {
        config.estimator.number_of_threads = threads;
    }
    let rule: Rule = config.rule.clone().try_into()?;

    let player_cards = parse_cards(&args.player)?;
    let dealer_up_card: Card = args.dealer.parse()?;
    let mut known_cards = player_cards.clone();
    known_cards.push(dealer_up_card);
    if let Some(known) = &args.known {
        known_cards.extend(parse_cards(known)?);
    }
    let scenario =
        Scenario::new(&player_cards, dealer_up_card, &known_cards, args.bet)?.with_hand_count(args.hand_count)?;
    log::info!(
        "Evaluating {} vs {} with {} trials",
        scenario.player_hand(),
        dealer_up_card,
        config.estimator.trials
    );

    let estimator = Estimator::new(&rule, (&config.estimator).into());
    let results = estimator.estimate_all(&scenario, config.estimator.trials)?;
    let policy_action =
        BasicStrategy::new(&rule).decide(&scenario.player_hand(), dealer_up_card, true, scenario.hand_count());
    let bust_odds = RankCounts::unseen(scenario.known_cards())?.bust_odds(&scenario.player_hand());

    let report = Report {
        player: scenario.player_hand().to_string(),
        dealer_up_card: dealer_up_card.to_string(),
        bet: args.bet,
        trials: config.estimator.trials,
        best_action: best_action(&results),
        results,
        policy_action,
        bust_odds,
    };
    if args.yaml {
        print!("{}", serde_yaml::to_string(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!("{} vs {}, bet {}", report.player, report.dealer_up_card, report.bet);
    println!("----------------------------------------------------");
    for result in &report.results {
        println!(
            "{:<8} EV {:+.4} ({:+.2}) ±{:.4}  W {:.1}% L {:.1}% P {:.1}%",
            result.action.to_string(),
            result.ev,
            result.ev_amount(report.bet),
            result.std_error,
            percentage(result.wins, result.trials),
            percentage(result.losses, result.trials),
            percentage(result.pushes, result.trials),
        );
    }
    println!("----------------------------------------------------");
    if let Some(action) = report.best_action {
        println!("Best action: {}", action);
    }
    println!("Basic strategy: {}", report.policy_action);

    let odds = &report.bust_odds;
    println!(
        "Next card busts: {}/{} ({:.1}%)",
        odds.bust,
        odds.bust + odds.safe,
        odds.bust_probability() * 100.0
    );
    let ranks = |ranks: &[(Rank, u8)]| {
        ranks
            .iter()
            .map(|(rank, count)| format!("{}x{}", rank.symbol(), count))
            .collect::<Vec<_>>()
            .join(" ")
    };
    println!("  bust: {}", ranks(&odds.bust_ranks));
    println!("  safe: {}", ranks(&odds.safe_ranks));
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
