use chrono::{DateTime, Utc};

/// One billable event read from a usage log line.
#[derive(Clone, Debug, PartialEq)]
pub struct UsageEntry {
    pub ts: DateTime<Utc>,
    pub input: u64,
    pub output: u64,
    pub cache_create: u64,
    pub cache_read: u64,
    pub cost_usd: Option<f64>,
    /// Model identifier; empty when the line carried none
    pub model: String,
    pub message_id: Option<String>,
    pub request_id: Option<String>,
}

impl UsageEntry {
    /// A zero-usage entry at `ts`, handy as a base for struct update syntax.
    pub fn at(ts: DateTime<Utc>) -> Self {
        Self {
            ts,
            input: 0,
            output: 0,
            cache_create: 0,
            cache_read: 0,
            cost_usd: None,
            model: String::new(),
            message_id: None,
            request_id: None,
        }
    }

    /// `message_id:request_id`, only when both ids are present.
    pub fn dedup_key(&self) -> Option<String> {
        match (&self.message_id, &self.request_id) {
            (Some(m), Some(r)) => Some(format!("{m}:{r}")),
            _ => None,
        }
    }
}
