use blackjack_ev::autoplay::RoundPlayer;
use blackjack_ev::{EvTable, OutcomeStats};
use blackjack_ev_drivers::ConfigAutoSimulator;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use self::private::Statistics;

mod private {
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Statistics {
        rounds: u64,
        wins: u64,
        losses: u64,
        pushes: u64,

        current_money: f64,
        total_bet: f64,
        min_money: f64,

        last_money: f64,
        last_bet: f64,
    }

    impl Statistics {
        pub fn record_round(&mut self, bet: f64, amount: f64) {
            self.rounds += 1;
            if amount > 0.0 {
                self.wins += 1;
            } else if amount < 0.0 {
                self.losses += 1;
            } else {
                self.pushes += 1;
            }
            self.total_bet += bet;
            self.current_money += amount;
            if self.min_money > self.current_money {
                self.min_money = self.current_money;
            }
        }

        pub fn get_rounds(&self) -> u64 {
            self.rounds
        }

        pub fn get_wins(&self) -> u64 {
            self.wins
        }

        pub fn get_losses(&self) -> u64 {
            self.losses
        }

        pub fn get_pushes(&self) -> u64 {
            self.pushes
        }

        pub fn get_current_money(&self) -> f64 {
            self.current_money
        }

        pub fn get_total_bet(&self) -> f64 {
            self.total_bet
        }

        pub fn get_win_rate(&self) -> f64 {
            if self.rounds == 0 {
                0.0
            } else {
                self.wins as f64 / self.rounds as f64
            }
        }

        pub fn get_rate(&self) -> f64 {
            if self.total_bet == 0.0 {
                0.0
            } else {
                self.current_money / self.total_bet
            }
        }

        pub fn get_delta_money(&mut self) -> f64 {
            let ret = self.current_money - self.last_money;
            self.last_money = self.current_money;
            ret
        }

        pub fn get_delta_bet(&mut self) -> f64 {
            let ret = self.total_bet - self.last_bet;
            self.last_bet = self.total_bet;
            ret
        }

        pub fn get_min_money(&self) -> f64 {
            self.min_money
        }
    }
}

fn print_statistics(stat: &mut Statistics) {
    println!(
        "Rounds: {}. W: {} L: {} P: {}. Win rate: {:.1}%.",
        stat.get_rounds(),
        stat.get_wins(),
        stat.get_losses(),
        stat.get_pushes(),
        stat.get_win_rate() * 100.0,
    );
    println!(
        "Chips: {:+.2}({:+.2}). Total bet: {:.2}({:.2}). Rate: {:.2}%. Min chips: {:+.2}.",
        stat.get_current_money(),
        stat.get_delta_money(),
        stat.get_total_bet(),
        stat.get_delta_bet(),
        stat.get_rate() * 100.0,
        stat.get_min_money(),
    );
    println!("----------------------------------------------------");
}

/// Plays the configured number of rounds and returns the per-decision results.
pub fn simulate_rounds(rule: &blackjack_ev::Rule, config: &ConfigAutoSimulator) -> blackjack_ev::Result<EvTable> {
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    log::info!("Playing {} rounds at {} per round, seed {}", config.rounds, config.bet, seed);

    let player = RoundPlayer::new(rule);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut table = EvTable::new();
    let mut stat = Statistics::default();
    for round in 1..=config.rounds {
        let record = player.play_round(config.bet, &mut rng)?;
        if let Some(key) = record.key {
            table.record(key, record.net_units());
        }
        stat.record_round(config.bet, record.amount());
        if config.report_every > 0 && round % config.report_every == 0 {
            print_statistics(&mut stat);
        }
    }

    println!("Final:");
    print_statistics(&mut stat);
    Ok(table)
}

/// Prints one block per dealer up card, hard hands before soft ones.
pub fn print_ev_table(table: &EvTable, bet: f64) {
    let mut current_dealer = None;
    for (key, stats) in table.sorted() {
        if current_dealer != Some(key.dealer_up_card) {
            current_dealer = Some(key.dealer_up_card);
            println!("Dealer {}", key.dealer_label());
        }
        print_row(&key.hand_label(), &key.action.to_string(), &stats, bet);
    }
}

fn print_row(hand: &str, action: &str, stats: &OutcomeStats, bet: f64) {
    println!(
        "  {:<4} {:<7} n={:<7} EV {:+.4} ({:+.2}) ±{:.4}  W {} L {} P {}",
        hand,
        action,
        stats.count(),
        stats.ev(),
        stats.ev() * bet,
        stats.std_error(),
        stats.wins(),
        stats.losses(),
        stats.pushes(),
    );
}
