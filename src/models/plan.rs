use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Subscription tier the usage is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Pro,
    Max5,
    Max20,
    /// Ceiling taken from the heaviest block seen in history
    CustomMax,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Max5 => "max5",
            Self::Max20 => "max20",
            Self::CustomMax => "custom_max",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan '{0}'")]
pub struct UnknownPlan(pub String);

impl FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pro" => Ok(Self::Pro),
            "max5" => Ok(Self::Max5),
            "max20" => Ok(Self::Max20),
            "custom_max" => Ok(Self::CustomMax),
            _ => Err(UnknownPlan(s.to_string())),
        }
    }
}

/// Weighted-token ceilings for the fixed tiers. Each is roughly 5x the
/// actual token allowance (~7k / ~35k / ~140k).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub pro: u64,
    pub max5: u64,
    pub max20: u64,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            pro: 44_000,
            max5: 220_000,
            max20: 880_000,
        }
    }
}

impl PlanLimits {
    /// Ceiling for a fixed tier; `None` for `CustomMax`, which is resolved from history.
    pub fn fixed(&self, plan: Plan) -> Option<u64> {
        match plan {
            Plan::Pro => Some(self.pro),
            Plan::Max5 => Some(self.max5),
            Plan::Max20 => Some(self.max20),
            Plan::CustomMax => None,
        }
    }
}
