use std::fs;
use std::path::PathBuf;

use blackjack_ev::{Card, EstimatorConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_ev.yml";
const DEFAULT_CONFIG_FILE_NAME: &str = ".blackjack_ev.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid rule: {0}")]
    Rule(#[from] serde::de::value::Error),
    #[error(transparent)]
    Engine(#[from] blackjack_ev::Error),
    #[error("cannot find home directory")]
    NoHomeDir,
    #[error("{0} should be a file rather than a directory")]
    NotAFile(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub estimator: ConfigEstimator,
    pub auto_simulator: ConfigAutoSimulator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub dealer_hit_on_soft17: bool,
    pub payout_blackjack: f64,
    pub split_limit: u8,
    pub allow_das: bool,
    pub hit_split_aces: bool,
    pub peek_policy: String,
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rule = blackjack_ev::Rule::default();
        ConfigRule {
            dealer_hit_on_soft17: rule.dealer_hit_on_soft17,
            payout_blackjack: rule.payout_blackjack,
            split_limit: rule.split_limit,
            allow_das: rule.allow_das,
            hit_split_aces: rule.hit_split_aces,
            peek_policy: rule.peek_policy.to_string(),
        }
    }
}

impl TryInto<blackjack_ev::Rule> for ConfigRule {
    type Error = serde::de::value::Error;

    fn try_into(self) -> Result<blackjack_ev::Rule, Self::Error> {
        let rule = blackjack_ev::Rule {
            dealer_hit_on_soft17: self.dealer_hit_on_soft17,
            payout_blackjack: self.payout_blackjack,
            split_limit: self.split_limit,
            allow_das: self.allow_das,
            hit_split_aces: self.hit_split_aces,
            peek_policy: self.peek_policy.parse()?,
        };

        Ok(rule)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigEstimator {
    /// 0 uses every available core.
    pub number_of_threads: usize,
    pub trials: u64,
    pub min_trials: u64,
    pub seed: Option<u64>,
}

impl Default for ConfigEstimator {
    fn default() -> Self {
        ConfigEstimator {
            number_of_threads: 0,
            trials: 10_000,
            min_trials: 1,
            seed: None,
        }
    }
}

impl From<&ConfigEstimator> for EstimatorConfig {
    fn from(config: &ConfigEstimator) -> Self {
        EstimatorConfig {
            number_of_threads: config.number_of_threads,
            seed: config.seed,
            min_trials: config.min_trials,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigAutoSimulator {
    pub rounds: u64,
    pub bet: f64,
    /// Print running statistics every this many rounds. 0 disables them.
    pub report_every: u64,
    pub seed: Option<u64>,
}

impl Default for ConfigAutoSimulator {
    fn default() -> Self {
        ConfigAutoSimulator {
            rounds: 100_000,
            bet: 10.0,
            report_every: 10_000,
            seed: None,
        }
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> Result<Config, ConfigError> {
    let file_content = fs::read_to_string(filename)?;
    Ok(serde_yaml::from_str(&file_content)?)
}

/// Loads the config named on the command line. The default path may be missing,
/// in which case the built-in defaults are used.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    if path != DEFAULT_CONFIG_PATH {
        return parse_config_from_file(path);
    }

    let home_dir = home::home_dir().ok_or(ConfigError::NoHomeDir)?;
    let config_file_path = home_dir.join(DEFAULT_CONFIG_FILE_NAME);
    if !config_file_path.exists() {
        log::info!("{} not found, using default config", config_file_path.display());
        return Ok(Config::default());
    }
    if config_file_path.is_dir() {
        return Err(ConfigError::NotAFile(config_file_path));
    }
    parse_config_from_file(&config_file_path.to_string_lossy())
}

/// Parses a comma separated card list such as "AS,8D".
pub fn parse_cards(list: &str) -> Result<Vec<Card>, blackjack_ev::Error> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Logs to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_typical_config_rule() -> ConfigRule {
        ConfigRule {
            dealer_hit_on_soft17: true,
            payout_blackjack: 1.2,
            split_limit: 3,
            allow_das: true,
            hit_split_aces: false,
            peek_policy: String::from("UpAce"),
        }
    }

    #[test]
    fn can_convert_rule() {
        let config_rule = get_typical_config_rule();
        let converted_rule: blackjack_ev::Rule = config_rule.try_into().unwrap();
        assert!(converted_rule.dealer_hit_on_soft17);
        assert_eq!(converted_rule.payout_blackjack, 1.2);
        assert_eq!(converted_rule.split_limit, 3);
        assert_eq!(converted_rule.peek_policy, blackjack_ev::PeekPolicy::UpAce);
    }

    #[test]
    fn default_config_rule_is_the_default_rule() {
        let converted_rule: blackjack_ev::Rule = ConfigRule::default().try_into().unwrap();
        assert_eq!(converted_rule, blackjack_ev::Rule::default());
    }

    #[test]
    fn should_return_error_when_converting_rule() {
        let mut config_rule = get_typical_config_rule();
        config_rule.peek_policy = String::from("Not a policy");
        let convert_result: Result<blackjack_ev::Rule, serde::de::value::Error> = config_rule.try_into();
        assert!(convert_result.is_err());
    }

    #[test]
    fn config_survives_yaml() {
        let mut config = Config::default();
        config.rule = get_typical_config_rule();
        config.estimator.seed = Some(42);
        config.auto_simulator.rounds = 500;
        let text = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let text = "rule:\n  peek_policy: NoPeek\nestimator:\n  trials: 200\n";
        let parsed: Config = serde_yaml::from_str(text).unwrap();
        assert_eq!(parsed.rule.peek_policy, "NoPeek");
        assert_eq!(parsed.rule.split_limit, 2);
        assert_eq!(parsed.estimator.trials, 200);
        assert_eq!(parsed.estimator.min_trials, 1);
        assert_eq!(parsed.auto_simulator, ConfigAutoSimulator::default());

        let estimator: EstimatorConfig = (&parsed.estimator).into();
        assert_eq!(estimator, EstimatorConfig::default());
    }

    #[test]
    fn reads_config_files() {
        let path = std::env::temp_dir().join(format!("blackjack_ev_config_{}.yml", std::process::id()));
        fs::write(&path, "auto_simulator:\n  bet: 25.0\n").unwrap();
        let config = load_config(&path.to_string_lossy()).unwrap();
        assert_eq!(config.auto_simulator.bet, 25.0);
        fs::remove_file(&path).unwrap();

        assert!(matches!(load_config(&path.to_string_lossy()), Err(ConfigError::Io(_))));
    }

    #[test]
    fn parses_card_lists() {
        let cards = parse_cards("AS, 8d,10h").unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[2].to_string(), "TH");
        assert!(parse_cards("").unwrap().is_empty());
        assert!(parse_cards("AS,ZZ").is_err());
    }
}
