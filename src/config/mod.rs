/*!
 * Simulation Configuration
 * Validated configuration record consumed by the core
 */

use crate::core::errors::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;

/// Scheduling policy
///
/// Closed set of the five supported policies, each tagged
/// preemptive or non-preemptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// First-come-first-served, non-preemptive
    FcfsN,
    /// First-come-first-served, preemptive
    FcfsP,
    /// Shortest-job-first, non-preemptive
    SjfN,
    /// Shortest-remaining-time-first, preemptive
    SrtfP,
    /// Round-robin with fixed cycle quantum, preemptive
    RrP,
}

impl Policy {
    /// Parse from string representation
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_uppercase().as_str() {
            "FCFS-N" => Ok(Self::FcfsN),
            "FCFS-P" => Ok(Self::FcfsP),
            "SJF-N" => Ok(Self::SjfN),
            "SRTF-P" => Ok(Self::SrtfP),
            "RR-P" => Ok(Self::RrP),
            _ => Err(ConfigError::InvalidPolicy(s.to_string())),
        }
    }

    /// Convert to string representation
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FcfsN => "FCFS-N",
            Self::FcfsP => "FCFS-P",
            Self::SjfN => "SJF-N",
            Self::SrtfP => "SRTF-P",
            Self::RrP => "RR-P",
        }
    }

    /// Whether a running process may be interrupted before an
    /// operation naturally completes
    ///
    /// # Performance
    /// Hot path - checked once per executed CPU cycle
    #[inline(always)]
    pub const fn is_preemptive(&self) -> bool {
        matches!(self, Self::FcfsP | Self::SrtfP | Self::RrP)
    }
}

impl Serialize for Policy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Destination for the formatted event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogTarget {
    /// Emit events through the tracing subscriber only
    #[default]
    Monitor,
    /// Persist formatted lines to the configured file only
    File,
    /// Both of the above
    Both,
}

impl LogTarget {
    #[inline(always)]
    pub const fn to_monitor(&self) -> bool {
        matches!(self, Self::Monitor | Self::Both)
    }

    #[inline(always)]
    pub const fn to_file(&self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

/// Clock pacing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Logical time only: advancing the clock is instantaneous
    #[default]
    Virtual,
    /// Advancing the clock also sleeps for the same wall-clock span
    Realtime,
}

/// Validated simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimConfig {
    pub policy: Policy,
    /// Maximum cycles a round-robin process may run before forced preemption
    pub quantum_cycles: u32,
    /// Total addressable simulated memory in bytes
    pub mem_available: u64,
    /// Simulated milliseconds consumed by one CPU cycle
    pub cpu_cycle_rate_ms: u64,
    /// Simulated milliseconds consumed by one I/O cycle
    pub io_cycle_rate_ms: u64,
    #[serde(default)]
    pub log_target: LogTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    #[serde(default)]
    pub pacing: Pacing,
}

impl SimConfig {
    /// Validate field ranges and cross-field requirements
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy == Policy::RrP && self.quantum_cycles == 0 {
            return Err(ConfigError::InvalidQuantum(self.quantum_cycles));
        }
        if self.cpu_cycle_rate_ms == 0 {
            return Err(ConfigError::InvalidCycleRate(self.cpu_cycle_rate_ms));
        }
        if self.io_cycle_rate_ms == 0 {
            return Err(ConfigError::InvalidCycleRate(self.io_cycle_rate_ms));
        }
        if self.mem_available == 0 {
            return Err(ConfigError::InvalidMemoryCeiling(self.mem_available));
        }
        if self.log_target.to_file() && self.log_path.is_none() {
            return Err(ConfigError::MissingLogPath);
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            policy: Policy::FcfsN,
            quantum_cycles: 3,
            mem_available: 10_240,
            cpu_cycle_rate_ms: 10,
            io_cycle_rate_ms: 20,
            log_target: LogTarget::Monitor,
            log_path: None,
            pacing: Pacing::Virtual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(Policy::from_str("fcfs-n").unwrap(), Policy::FcfsN);
        assert_eq!(Policy::from_str("SRTF-P").unwrap(), Policy::SrtfP);
        assert_eq!(Policy::from_str("rr-p").unwrap(), Policy::RrP);
        assert!(Policy::from_str("invalid").is_err());
    }

    #[test]
    fn test_policy_preemption_tags() {
        assert!(!Policy::FcfsN.is_preemptive());
        assert!(!Policy::SjfN.is_preemptive());
        assert!(Policy::FcfsP.is_preemptive());
        assert!(Policy::SrtfP.is_preemptive());
        assert!(Policy::RrP.is_preemptive());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimConfig::default();
        assert!(config.validate().is_ok());

        config.policy = Policy::RrP;
        config.quantum_cycles = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidQuantum(0)));

        let mut config = SimConfig::default();
        config.cpu_cycle_rate_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.log_target = LogTarget::File;
        assert_eq!(config.validate(), Err(ConfigError::MissingLogPath));
    }

    #[test]
    fn test_policy_serde_round_trip() {
        let json = serde_json::to_string(&Policy::SrtfP).unwrap();
        assert_eq!(json, "\"SRTF-P\"");
        let back: Policy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Policy::SrtfP);
    }
}
