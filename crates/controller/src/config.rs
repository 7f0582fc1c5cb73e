use anyhow::Context;
use inference::InferenceConfig;
use std::env;
use std::fmt;
use std::str::FromStr;

/// What `detect()` does when a previous run is still in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Runs are never cancelled; outcomes are applied in completion order.
    #[default]
    LastCompletionWins,
    /// A new run aborts the previous one and stale outcomes are dropped.
    CancelPrevious,
}

impl OverlapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapPolicy::LastCompletionWins => "last_completion_wins",
            OverlapPolicy::CancelPrevious => "cancel_previous",
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "last_completion_wins" => Ok(OverlapPolicy::LastCompletionWins),
            "cancel_previous" => Ok(OverlapPolicy::CancelPrevious),
            other => Err(format!(
                "unknown overlap policy '{}' (expected last_completion_wins or cancel_previous)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub inference: InferenceConfig,
    pub overlap_policy: OverlapPolicy,
}

impl ControllerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let inference = InferenceConfig::from_env()?;

        let overlap_policy = match env::var("OVERLAP_POLICY") {
            Ok(value) if !value.trim().is_empty() => value
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid OVERLAP_POLICY")?,
            _ => OverlapPolicy::default(),
        };

        Ok(Self {
            inference,
            overlap_policy,
        })
    }
}
