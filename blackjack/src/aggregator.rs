use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::rollout::net_units;
use crate::{legal_actions, Action, BasicStrategy, Card, Error, Hand, Result, RolloutEngine, Rule, Scenario, Strategy};

/// Running totals of per-trial net results, in multiples of the bet.
///
/// Win/loss/push are counted on the net result of a trial, so a split that wins
/// one hand and loses the other is a single push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutcomeStats {
    count: u64,
    sum: f64,
    sum_sq: f64,
    wins: u64,
    losses: u64,
    pushes: u64,
}

impl OutcomeStats {
    pub fn record(&mut self, net_units: f64) {
        self.count += 1;
        self.sum += net_units;
        self.sum_sq += net_units * net_units;
        if net_units > 0.0 {
            self.wins += 1;
        } else if net_units < 0.0 {
            self.losses += 1;
        } else {
            self.pushes += 1;
        }
    }

    pub fn merge(&mut self, other: &OutcomeStats) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.wins += other.wins;
        self.losses += other.losses;
        self.pushes += other.pushes;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn wins(&self) -> u64 {
        self.wins
    }

    pub fn losses(&self) -> u64 {
        self.losses
    }

    pub fn pushes(&self) -> u64 {
        self.pushes
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn ev(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Standard error of `ev`, from the sample variance. Zero below two samples.
    pub fn std_error(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let variance = ((self.sum_sq - self.sum * self.sum / n) / (n - 1.0)).max(0.0);
        (variance / n).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvResult {
    pub action: Action,
    /// Expected net result as a multiple of the bet.
    pub ev: f64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub trials: u64,
    pub std_error: f64,
}

impl EvResult {
    pub fn from_stats(action: Action, stats: &OutcomeStats) -> EvResult {
        EvResult {
            action,
            ev: stats.ev(),
            wins: stats.wins(),
            losses: stats.losses(),
            pushes: stats.pushes(),
            trials: stats.count(),
            std_error: stats.std_error(),
        }
    }

    pub fn ev_amount(&self, bet: f64) -> f64 {
        self.ev * bet
    }
}

/// The action with the highest EV, if any.
pub fn best_action(results: &[EvResult]) -> Option<Action> {
    results.iter().max_by(|a, b| a.ev.total_cmp(&b.ev)).map(|r| r.action)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// 0 means one thread per available core.
    pub number_of_threads: usize,
    /// Fixed seed for reproducible estimates. A random one is picked when absent.
    pub seed: Option<u64>,
    pub min_trials: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            number_of_threads: 0,
            seed: None,
            min_trials: 1,
        }
    }
}

/// Monte Carlo EV estimator.
///
/// Trial `i` of a request always runs on the ChaCha stream `i` of the request seed,
/// so the result does not depend on how the trials are spread over threads, and
/// all actions of one `estimate_all` call see the same cards trial by trial.
#[derive(Debug, Clone)]
pub struct Estimator<S: Strategy + Sync = BasicStrategy> {
    engine: RolloutEngine<S>,
    config: EstimatorConfig,
}

impl Estimator<BasicStrategy> {
    pub fn new(rule: &Rule, config: EstimatorConfig) -> Self {
        Estimator {
            engine: RolloutEngine::new(rule),
            config,
        }
    }
}

impl<S: Strategy + Sync> Estimator<S> {
    pub fn with_engine(engine: RolloutEngine<S>, config: EstimatorConfig) -> Self {
        Estimator { engine, config }
    }

    pub fn engine(&self) -> &RolloutEngine<S> {
        &self.engine
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn estimate_ev(&self, scenario: &Scenario, action: Action, trials: u64) -> Result<EvResult> {
        self.check_trials(trials)?;
        self.engine.check_action(scenario, action)?;
        self.run(scenario, action, trials, self.resolve_seed())
    }

    /// Estimates every legal first action with the same seed.
    pub fn estimate_all(&self, scenario: &Scenario, trials: u64) -> Result<Vec<EvResult>> {
        self.check_trials(trials)?;
        let actions = legal_actions(&scenario.player_hand(), scenario.hand_count(), self.engine.rule());
        if actions.is_empty() {
            return Err(Error::InvalidScenario(format!(
                "no legal action for {}",
                scenario.player_hand()
            )));
        }
        let seed = self.resolve_seed();
        actions
            .into_iter()
            .map(|action| self.run(scenario, action, trials, seed))
            .collect()
    }

    fn check_trials(&self, trials: u64) -> Result<()> {
        let minimum = self.config.min_trials.max(1);
        if trials < minimum {
            return Err(Error::NotEnoughTrials {
                requested: trials,
                minimum,
            });
        }
        Ok(())
    }

    fn resolve_seed(&self) -> u64 {
        match self.config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::thread_rng().gen();
                log::debug!("No seed configured, using {}", seed);
                seed
            }
        }
    }

    fn number_of_threads(&self, trials: u64) -> usize {
        let threads = if self.config.number_of_threads == 0 {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            self.config.number_of_threads
        };
        threads.min(trials as usize).max(1)
    }

    fn run(&self, scenario: &Scenario, action: Action, trials: u64, seed: u64) -> Result<EvResult> {
        let number_of_threads = self.number_of_threads(trials);
        let chunk_size = (trials + number_of_threads as u64 - 1) / number_of_threads as u64;
        log::debug!(
            "{} vs {} {}: {} trials on {} threads ({} per thread), seed {}",
            scenario.player_hand(),
            scenario.dealer_up_card(),
            action,
            trials,
            number_of_threads,
            chunk_size,
            seed
        );

        let chunks: Vec<Result<OutcomeStats>> = std::thread::scope(|scope| {
            let threads: Vec<_> = (0..number_of_threads as u64)
                .map(|i| {
                    let range = (i * chunk_size).min(trials)..((i + 1) * chunk_size).min(trials);
                    scope.spawn(move || self.run_trials(scenario, action, seed, range))
                })
                .collect();
            threads
                .into_iter()
                .map(|thread| thread.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        let mut stats = OutcomeStats::default();
        for chunk in chunks {
            stats.merge(&chunk?);
        }
        Ok(EvResult::from_stats(action, &stats))
    }

    fn run_trials(&self, scenario: &Scenario, action: Action, seed: u64, trials: Range<u64>) -> Result<OutcomeStats> {
        let mut stats = OutcomeStats::default();
        for trial in trials {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(trial);
            let outcomes = self.engine.simulate_one(scenario, action, &mut rng)?;
            stats.record(net_units(&outcomes));
        }
        Ok(stats)
    }
}

/// Identifies a decision point: the player's total and softness, the dealer up
/// card (1 for an ace, 10 for any ten-valued card) and the action taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DecisionKey {
    pub dealer_up_card: u8,
    pub soft: bool,
    pub player_total: u8,
    pub action: Action,
}

impl DecisionKey {
    pub fn new(hand: &Hand, dealer_up_card: Card, action: Action) -> DecisionKey {
        DecisionKey {
            dealer_up_card: dealer_up_card.blackjack_value(),
            soft: hand.is_soft(),
            player_total: hand.total(),
            action,
        }
    }

    /// "H16" or "S18".
    pub fn hand_label(&self) -> String {
        format!("{}{}", if self.soft { 'S' } else { 'H' }, self.player_total)
    }

    pub fn dealer_label(&self) -> String {
        match self.dealer_up_card {
            1 => String::from("A"),
            v => v.to_string(),
        }
    }
}

impl fmt::Display for DecisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {} {}", self.hand_label(), self.dealer_label(), self.action)
    }
}

/// Accumulates results per decision point across many rounds.
#[derive(Debug, Clone, Default)]
pub struct EvTable {
    entries: HashMap<DecisionKey, OutcomeStats>,
}

impl EvTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn record(&mut self, key: DecisionKey, net_units: f64) {
        self.entries.entry(key).or_default().record(net_units);
    }

    pub fn merge(&mut self, other: &EvTable) {
        for (key, stats) in &other.entries {
            self.entries.entry(*key).or_default().merge(stats);
        }
    }

    pub fn get(&self, key: &DecisionKey) -> Option<&OutcomeStats> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by dealer up card (ace first), hard before soft, then by
    /// player total and action.
    pub fn sorted(&self) -> Vec<(DecisionKey, OutcomeStats)> {
        let mut rows: Vec<_> = self.entries.iter().map(|(k, v)| (*k, *v)).collect();
        rows.sort_by_key(|(key, _)| *key);
        rows
    }
}
