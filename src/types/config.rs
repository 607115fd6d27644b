//! Configuration for votecount.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::TallyResult;

/// Main configuration for votecount.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Tabulation settings.
    #[serde(default)]
    pub tabulation: TabulationConfig,

    /// Tie-break settings.
    #[serde(default)]
    pub tie_break: TieBreakConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Tabulation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabulationConfig {
    /// Voting method.
    #[serde(default = "default_method")]
    pub method: MethodKind,

    /// Number of winners requested.
    #[serde(default = "default_winners")]
    pub winners: usize,

    /// Treatment of a tied group at the top of a ranked ballot.
    #[serde(default)]
    pub tied_preference: TiedPreference,

    /// Denominator of the Plurality majority flag.
    #[serde(default)]
    pub majority_base: MajorityBase,

    /// Borda point scheme.
    #[serde(default)]
    pub borda_scheme: BordaScheme,

    /// Score aggregation.
    #[serde(default)]
    pub score_aggregation: ScoreAggregation,

    /// Ranked ballots approve every candidate ranked at or above this position.
    /// When absent, every ranked candidate is approved.
    #[serde(default)]
    pub approval_max_rank: Option<u32>,

    /// Rated ballots approve every candidate scored at or above this value.
    /// When absent, any score above the range minimum approves.
    #[serde(default)]
    pub approval_min_score: Option<i32>,
}

impl Default for TabulationConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            winners: default_winners(),
            tied_preference: TiedPreference::default(),
            majority_base: MajorityBase::default(),
            borda_scheme: BordaScheme::default(),
            score_aggregation: ScoreAggregation::default(),
            approval_max_rank: None,
            approval_min_score: None,
        }
    }
}

fn default_method() -> MethodKind {
    MethodKind::InstantRunoff
}

fn default_winners() -> usize {
    1
}

/// Available voting methods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// First past the post.
    Plurality,
    /// One vote per approved candidate.
    Approval,
    /// Sum or mean of scores.
    Score,
    /// Positional points.
    Borda,
    /// Instant-runoff elimination.
    InstantRunoff,
    /// Condorcet winner, cycles resolved by Schulze.
    Condorcet,
}

impl MethodKind {
    /// Every method, in presentation order.
    pub const ALL: [MethodKind; 6] = [
        MethodKind::Plurality,
        MethodKind::Approval,
        MethodKind::Score,
        MethodKind::Borda,
        MethodKind::InstantRunoff,
        MethodKind::Condorcet,
    ];

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Plurality => "plurality",
            MethodKind::Approval => "approval",
            MethodKind::Score => "score",
            MethodKind::Borda => "borda",
            MethodKind::InstantRunoff => "instant_runoff",
            MethodKind::Condorcet => "condorcet",
        }
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MethodKind {
    type Err = crate::TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "plurality" | "fptp" => Ok(MethodKind::Plurality),
            "approval" => Ok(MethodKind::Approval),
            "score" | "range" => Ok(MethodKind::Score),
            "borda" => Ok(MethodKind::Borda),
            "instant_runoff" | "irv" | "rcv" => Ok(MethodKind::InstantRunoff),
            "condorcet" | "schulze" => Ok(MethodKind::Condorcet),
            other => Err(crate::TallyError::config(format!(
                "método desconhecido: '{}'",
                other
            ))),
        }
    }
}

/// What to do when the top remaining preference of a ranked ballot is a tie.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TiedPreference {
    /// Split the ballot evenly among the tied candidates.
    #[default]
    Split,
    /// Treat the ballot as exhausted.
    Exhaust,
}

/// Denominator used for the Plurality majority flag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MajorityBase {
    /// Ballots that expressed a usable first preference.
    #[default]
    Cast,
    /// Every ballot in the dataset, blank ones included.
    All,
}

/// Borda point schemes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BordaScheme {
    /// N-1 points for the first position down to 0.
    #[default]
    Standard,
    /// N points for the first position down to 1.
    FromOne,
    /// 1/position (Nauru / Dowdall).
    Dowdall,
}

/// Score aggregation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScoreAggregation {
    /// Sum of the scores.
    #[default]
    Sum,
    /// Mean over the ballots that scored the candidate.
    Mean,
}

/// Tie-break settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TieBreakConfig {
    /// Policy.
    #[serde(default)]
    pub policy: TieBreakPolicy,

    /// Precedence order, most preferred first (policy = "precedence").
    #[serde(default)]
    pub precedence: Vec<String>,

    /// Seed (policy = "random").
    #[serde(default)]
    pub seed: u64,
}

impl Default for TieBreakConfig {
    fn default() -> Self {
        Self {
            policy: TieBreakPolicy::Report,
            precedence: Vec::new(),
            seed: 0,
        }
    }
}

/// Built-in tie-break policies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// Always report the tie.
    #[default]
    Report,
    /// Fixed precedence order.
    Precedence,
    /// Seeded deterministic draw.
    Random,
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum cache capacity (number of entries).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Entry time to live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    64
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> TallyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TallyResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Loads the configuration at `path`, or the default one if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> TallyResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Checks values that serde cannot check on its own.
    pub fn validate(&self) -> TallyResult<()> {
        if self.tabulation.winners == 0 {
            return Err(crate::TallyError::config("tabulation.winners deve ser >= 1"));
        }
        if self.tabulation.approval_max_rank == Some(0) {
            return Err(crate::TallyError::config(
                "tabulation.approval_max_rank deve ser >= 1",
            ));
        }
        if self.tie_break.policy == TieBreakPolicy::Precedence && self.tie_break.precedence.is_empty()
        {
            return Err(crate::TallyError::config(
                "tie_break.precedence vazio com policy = \"precedence\"",
            ));
        }
        Ok(())
    }
}
