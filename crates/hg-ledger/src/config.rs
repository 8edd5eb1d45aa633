use std::time::Duration;

/// What completion does with participants that never got a cashout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Omitted {
    /// Refuse to complete until every participant is covered.
    #[default]
    Reject,
    /// Record an explicit zero cashout for each uncovered participant.
    RecordZero,
}

impl TryFrom<&str> for Omitted {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "zero" => Ok(Self::RecordZero),
            other => Err(format!("unknown omitted-cashout policy: {}", other)),
        }
    }
}

/// Ledger policy knobs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tolerance for timestamps dated into the future.
    pub clock_skew: Duration,
    pub omitted: Omitted,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_skew: hg_core::CLOCK_SKEW,
            omitted: Omitted::default(),
        }
    }
}

impl Config {
    /// Reads `CLOCK_SKEW_SECS` and `OMITTED_CASHOUTS`, keeping defaults for
    /// anything missing or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(secs) = std::env::var("CLOCK_SKEW_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config.clock_skew = Duration::from_secs(secs),
                Err(e) => log::warn!("ignoring CLOCK_SKEW_SECS={}: {}", secs, e),
            }
        }
        if let Ok(policy) = std::env::var("OMITTED_CASHOUTS") {
            match Omitted::try_from(policy.as_str()) {
                Ok(omitted) => config.omitted = omitted,
                Err(e) => log::warn!("ignoring OMITTED_CASHOUTS: {}", e),
            }
        }
        config
    }
}
