//! # Config Module
//!
//! Validates command-line arguments into a [`MonitorConfig`]. Any error here is
//! fatal to startup.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::cli::Args;
use crate::models::{Plan, PlanLimits};
use crate::utils::{default_data_paths, discover_data_paths, local_offset};
use crate::window::WindowConfig;

pub const DEFAULT_REFRESH_SECS: u64 = 3;
pub const MIN_REFRESH_SECS: u64 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid plan '{0}'; valid plans are: pro, max5, max20, custom_max, auto")]
    InvalidPlan(String),
    #[error("refresh interval must be at least {MIN_REFRESH_SECS} second, got {0}")]
    RefreshTooShort(u64),
}

/// Requested plan before any history-based detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanChoice {
    Auto,
    Fixed(Plan),
}

impl FromStr for PlanChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        Plan::from_str(s)
            .map(Self::Fixed)
            .map_err(|_| ConfigError::InvalidPlan(s.to_string()))
    }
}

impl PlanChoice {
    /// `auto` always detects; an explicit `pro` detects unless disabled.
    pub fn wants_detection(&self, auto_detect: bool) -> bool {
        match self {
            Self::Auto => true,
            Self::Fixed(Plan::Pro) => auto_detect,
            Self::Fixed(_) => false,
        }
    }

    /// Plan to use when detection is skipped.
    pub fn fallback(&self) -> Plan {
        match self {
            Self::Auto => Plan::Pro,
            Self::Fixed(p) => *p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub plan: PlanChoice,
    pub auto_detect: bool,
    /// Roots passed on the command line; empty means use the defaults
    pub explicit_paths: Vec<PathBuf>,
    pub refresh: Duration,
    pub once: bool,
    pub json: bool,
    pub window: WindowConfig,
    pub limits: PlanLimits,
}

impl MonitorConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let plan = PlanChoice::from_str(&args.plan)?;
        if args.refresh < MIN_REFRESH_SECS {
            return Err(ConfigError::RefreshTooShort(args.refresh));
        }
        Ok(Self {
            plan,
            auto_detect: !args.no_auto_detect,
            explicit_paths: args.data_path.clone(),
            refresh: Duration::from_secs(args.refresh),
            once: args.once || args.json,
            json: args.json,
            window: WindowConfig::default().with_offset(local_offset()),
            limits: PlanLimits::default(),
        })
    }

    /// Directories to scan. Explicit roots are used as given; default
    /// candidates are filtered to existing directories.
    pub fn data_roots(&self) -> Vec<PathBuf> {
        if self.explicit_paths.is_empty() {
            discover_data_paths(&default_data_paths())
        } else {
            self.explicit_paths.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["cctracker"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_plan_choice_parsing() {
        assert_eq!("auto".parse::<PlanChoice>(), Ok(PlanChoice::Auto));
        assert_eq!("AUTO".parse::<PlanChoice>(), Ok(PlanChoice::Auto));
        assert_eq!("max20".parse::<PlanChoice>(), Ok(PlanChoice::Fixed(Plan::Max20)));
        assert_eq!(
            "custom_max".parse::<PlanChoice>(),
            Ok(PlanChoice::Fixed(Plan::CustomMax))
        );
        assert_eq!(
            "enterprise".parse::<PlanChoice>(),
            Err(ConfigError::InvalidPlan("enterprise".into()))
        );
    }

    #[test]
    fn test_detection_rules() {
        assert!(PlanChoice::Auto.wants_detection(false));
        assert!(PlanChoice::Fixed(Plan::Pro).wants_detection(true));
        assert!(!PlanChoice::Fixed(Plan::Pro).wants_detection(false));
        assert!(!PlanChoice::Fixed(Plan::Max5).wants_detection(true));
        assert_eq!(PlanChoice::Auto.fallback(), Plan::Pro);
        assert_eq!(PlanChoice::Fixed(Plan::Max20).fallback(), Plan::Max20);
    }

    #[test]
    fn test_from_args_validation() {
        let cfg = MonitorConfig::from_args(&args(&[])).unwrap();
        assert_eq!(cfg.plan, PlanChoice::Auto);
        assert_eq!(cfg.refresh, Duration::from_secs(3));
        assert!(cfg.auto_detect);
        assert!(!cfg.once);

        let cfg = MonitorConfig::from_args(&args(&["--json", "--no-auto-detect"])).unwrap();
        assert!(cfg.once && cfg.json && !cfg.auto_detect);

        assert_eq!(
            MonitorConfig::from_args(&args(&["-r", "0"])).unwrap_err(),
            ConfigError::RefreshTooShort(0)
        );
        assert!(matches!(
            MonitorConfig::from_args(&args(&["--plan", "team"])),
            Err(ConfigError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_explicit_roots_are_kept_verbatim() {
        let cfg = MonitorConfig::from_args(&args(&["-d", "/does/not/exist"])).unwrap();
        assert_eq!(cfg.data_roots(), vec![PathBuf::from("/does/not/exist")]);
    }
}
