//! Runtime configuration for dependency resolution.
//!
//! The module exposes the [`RacePolicy`] applied when a dependency is found
//! running on another worker. It is read from `SCENARIO_DEPS_RACE_POLICY`
//! unless an in-process override is installed.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use thiserror::Error;

/// Environment variable selecting the race policy.
pub const RACE_POLICY_ENV: &str = "SCENARIO_DEPS_RACE_POLICY";

const OVERRIDE_UNSET: u8 = 0;
const OVERRIDE_WAIT: u8 = 1;
const OVERRIDE_SKIP: u8 = 2;

static RACE_POLICY_OVERRIDE: AtomicU8 = AtomicU8::new(OVERRIDE_UNSET);

/// What a caller does when the dependency it needs is still running
/// elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RacePolicy {
    /// Block until the running claimant commits, then replay its outcome.
    #[default]
    Wait,
    /// Skip the caller without error.
    Skip,
}

impl RacePolicy {
    /// Lowercase name of the policy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for RacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown race policy.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown race policy '{0}'; expected 'wait' or 'skip'")]
pub struct ParseRacePolicyError(String);

impl FromStr for RacePolicy {
    type Err = ParseRacePolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wait" => Ok(Self::Wait),
            "skip" => Ok(Self::Skip),
            _ => Err(ParseRacePolicyError(value.to_owned())),
        }
    }
}

fn env_race_policy() -> Option<RacePolicy> {
    let value = std::env::var(RACE_POLICY_ENV).ok()?;
    match value.parse() {
        Ok(policy) => Some(policy),
        Err(error) => {
            log::warn!("{RACE_POLICY_ENV}: {error}");
            None
        }
    }
}

fn override_state() -> Option<RacePolicy> {
    match RACE_POLICY_OVERRIDE.load(Ordering::Relaxed) {
        OVERRIDE_WAIT => Some(RacePolicy::Wait),
        OVERRIDE_SKIP => Some(RacePolicy::Skip),
        _ => None,
    }
}

/// Determine the race policy for new dependency plugins.
#[must_use]
pub fn race_policy() -> RacePolicy {
    override_state()
        .or_else(env_race_policy)
        .unwrap_or_default()
}

/// Override the race policy for the current process.
pub fn set_race_policy(policy: RacePolicy) {
    let value = match policy {
        RacePolicy::Wait => OVERRIDE_WAIT,
        RacePolicy::Skip => OVERRIDE_SKIP,
    };
    RACE_POLICY_OVERRIDE.store(value, Ordering::Relaxed);
}

/// Remove any in-process override of the race policy.
pub fn clear_race_policy_override() {
    RACE_POLICY_OVERRIDE.store(OVERRIDE_UNSET, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;

    #[test]
    #[serial]
    fn override_sets_policy() {
        set_race_policy(RacePolicy::Skip);
        assert_eq!(race_policy(), RacePolicy::Skip);
        set_race_policy(RacePolicy::Wait);
        assert_eq!(race_policy(), RacePolicy::Wait);
        clear_race_policy_override();
        assert!(override_state().is_none());
    }

    #[rstest]
    #[case("wait", Ok(RacePolicy::Wait))]
    #[case(" SKIP ", Ok(RacePolicy::Skip))]
    #[case("retry", Err(ParseRacePolicyError("retry".into())))]
    fn parses_policy_names(
        #[case] value: &str,
        #[case] expected: Result<RacePolicy, ParseRacePolicyError>,
    ) {
        assert_eq!(value.parse::<RacePolicy>(), expected);
    }
}
