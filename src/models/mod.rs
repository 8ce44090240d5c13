pub mod block;
pub mod entry;
pub mod plan;
pub mod raw;
pub mod snapshot;

pub use block::{SessionBlock, TokenCounts};
pub use entry::UsageEntry;
pub use plan::{Plan, PlanLimits};
pub use raw::{RawUsage, RawUsageLine};
pub use snapshot::{
    BurnRate, BurnRateLevel, MonitorSnapshot, PlanTransition, TokenStatus, UsageProjection,
};
