use crate::models::entry::UsageEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
    pub cache_create: u64,
    pub cache_read: u64,
}

impl TokenCounts {
    pub fn add(&mut self, e: &UsageEntry) {
        self.input = self.input.saturating_add(e.input);
        self.output = self.output.saturating_add(e.output);
        self.cache_create = self.cache_create.saturating_add(e.cache_create);
        self.cache_read = self.cache_read.saturating_add(e.cache_read);
    }

    pub fn total(&self) -> u64 {
        self.input
            .saturating_add(self.output)
            .saturating_add(self.cache_create)
            .saturating_add(self.cache_read)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionBlock {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Timestamp of the last entry added; `None` for gaps
    pub actual_end: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_gap: bool,
    #[serde(skip_serializing)]
    pub entries: Vec<UsageEntry>,
    pub tokens: TokenCounts,
    pub cost_usd: f64,
    pub models: Vec<String>,
    pub duration_minutes: i64,
}

impl SessionBlock {
    /// An empty block covering the idle interval `[start, end)`.
    pub fn gap(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: format!("gap_{}", start.timestamp_millis()),
            start,
            end,
            actual_end: None,
            is_active: false,
            is_gap: true,
            entries: Vec::new(),
            tokens: TokenCounts::default(),
            cost_usd: 0.0,
            models: Vec::new(),
            duration_minutes: (end - start).num_minutes(),
        }
    }
}
