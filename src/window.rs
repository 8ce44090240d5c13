//! # Window Module
//!
//! Partitions a chronological stream of usage entries into fixed-length
//! session blocks aligned to reset hours, with explicit gap blocks between
//! idle stretches longer than one session.
//!
//! Entries are expected in ascending timestamp order; out-of-order input is
//! not reordered and simply flows through the sequential algorithm.

use crate::models::{SessionBlock, TokenCounts, UsageEntry};
use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Timelike, Utc};

pub const DEFAULT_SESSION_HOURS: i64 = 5;
pub const DEFAULT_RESET_HOURS: [u32; 5] = [4, 9, 14, 18, 23];

/// Windowing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub session_hours: i64,
    /// Hours of day (0-23) at which a new session may start, ascending
    pub reset_hours: Vec<u32>,
    /// Offset the reset hours are expressed in
    pub utc_offset: FixedOffset,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            session_hours: DEFAULT_SESSION_HOURS,
            reset_hours: DEFAULT_RESET_HOURS.to_vec(),
            utc_offset: Utc.fix(),
        }
    }
}

impl WindowConfig {
    pub fn session_length(&self) -> Duration {
        Duration::hours(self.session_hours)
    }

    /// Same windows, with reset hours read in the given offset.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }
}

/// Floor `ts` to the latest reset hour at or before its hour of day.
///
/// When the hour precedes every configured reset hour the block started at
/// the last reset hour of the previous day.
pub fn align_to_reset_hour(ts: DateTime<Utc>, cfg: &WindowConfig) -> DateTime<Utc> {
    let local = ts.with_timezone(&cfg.utc_offset);
    let hour = local.hour();
    let (aligned_hour, previous_day) = match cfg.reset_hours.iter().rev().find(|h| **h <= hour) {
        Some(h) => (*h, false),
        None => match cfg.reset_hours.last() {
            Some(h) => (*h, true),
            // No reset hours configured: plain hour floor
            None => (hour, false),
        },
    };
    let mut day = local.date_naive();
    if previous_day {
        day = day.pred_opt().unwrap_or(day);
    }
    day.and_hms_opt(aligned_hour, 0, 0)
        .and_then(|naive| cfg.utc_offset.from_local_datetime(&naive).single())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(ts)
}

/// Accumulates entries for one session block; `finalize` produces the
/// immutable block with its derived duration.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    actual_end: Option<DateTime<Utc>>,
    entries: Vec<UsageEntry>,
    tokens: TokenCounts,
    cost_usd: f64,
    models: Vec<String>,
}

impl BlockBuilder {
    pub fn new(start: DateTime<Utc>, cfg: &WindowConfig) -> Self {
        Self {
            start,
            end: start + cfg.session_length(),
            actual_end: None,
            entries: Vec::new(),
            tokens: TokenCounts::default(),
            cost_usd: 0.0,
            models: Vec::new(),
        }
    }

    /// Start a block for the entry's aligned window (the entry is not added).
    pub fn for_entry(entry: &UsageEntry, cfg: &WindowConfig) -> Self {
        Self::new(align_to_reset_hour(entry.ts, cfg), cfg)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn actual_end(&self) -> Option<DateTime<Utc>> {
        self.actual_end
    }

    /// Whether `entry` falls past this block's window
    pub fn is_past_end(&self, entry: &UsageEntry) -> bool {
        entry.ts > self.end
    }

    pub fn add(&mut self, entry: &UsageEntry) {
        self.tokens.add(entry);
        if let Some(c) = entry.cost_usd {
            self.cost_usd += c;
        }
        if !entry.model.is_empty() && !self.models.iter().any(|m| m == &entry.model) {
            self.models.push(entry.model.clone());
        }
        self.actual_end = Some(entry.ts);
        self.entries.push(entry.clone());
    }

    pub fn finalize(self, now: DateTime<Utc>) -> SessionBlock {
        let duration_minutes = (self.actual_end.unwrap_or(now) - self.start).num_minutes();
        SessionBlock {
            id: format!("session_{}", self.start.timestamp_millis()),
            start: self.start,
            end: self.end,
            actual_end: self.actual_end,
            is_active: false,
            is_gap: false,
            entries: self.entries,
            tokens: self.tokens,
            cost_usd: self.cost_usd,
            models: self.models,
            duration_minutes,
        }
    }
}

/// Group entries into session blocks and gap blocks.
///
/// `now` decides which blocks are still active and the duration of a block
/// that never received an entry.
pub fn identify_blocks(
    entries: &[UsageEntry],
    cfg: &WindowConfig,
    now: DateTime<Utc>,
) -> Vec<SessionBlock> {
    let mut blocks: Vec<SessionBlock> = Vec::new();
    let mut current: Option<BlockBuilder> = None;
    let gap_threshold = cfg.session_hours * 60;

    for entry in entries {
        let needs_new = current.as_ref().is_none_or(|b| b.is_past_end(entry));
        if needs_new {
            if let Some(prev) = current.take() {
                let prev_end = prev.end();
                let last_seen = prev.actual_end();
                blocks.push(prev.finalize(now));

                let idle_from = last_seen.unwrap_or(prev_end);
                if (entry.ts - idle_from).num_minutes() > gap_threshold {
                    blocks.push(SessionBlock::gap(idle_from, entry.ts));
                }
            }
            current = Some(BlockBuilder::for_entry(entry, cfg));
        }
        if let Some(b) = current.as_mut() {
            b.add(entry);
        }
    }

    if let Some(last) = current {
        blocks.push(last.finalize(now));
    }

    mark_active_blocks(&mut blocks, now);
    blocks
}

/// Recompute `is_active` for every block against `now`.
pub fn mark_active_blocks(blocks: &mut [SessionBlock], now: DateTime<Utc>) {
    for b in blocks.iter_mut() {
        b.is_active = !b.is_gap && b.end > now;
    }
}

/// Most recent active, non-gap block
pub fn active_block(blocks: &[SessionBlock]) -> Option<&SessionBlock> {
    blocks.iter().rev().find(|b| b.is_active && !b.is_gap)
}
