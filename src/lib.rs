//! # Claude Tracker
//!
//! A terminal monitor for Claude Code rate limits. It reads the assistant's
//! local JSONL usage logs and reports weighted token consumption for the
//! current 5-hour session against the subscription plan's ceiling.
//!
//! ## Overview
//!
//! Each refresh recomputes everything from the logs:
//! - Usage entries are parsed and deduplicated across files
//! - Entries are grouped into reset-hour aligned session blocks, with gaps
//! - The active block is weighted (opus counts 5x) and compared to the plan limit
//! - A trailing-hour burn rate drives the projection and depletion time
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// Burn rate, projection and depletion time
pub mod burn;

/// Command-line argument parsing
pub mod cli;

/// Validated runtime configuration
pub mod config;

/// Display formatting for text and JSON output
pub mod display;

/// User-facing string table
pub mod messages;

/// Data models for entries, blocks, plans and snapshots
pub mod models;

/// Refresh cycle and monitoring loop
pub mod monitor;

/// Plan auto-detection from usage history
pub mod plan;

/// Token weighting and plan limit resolution
pub mod tokens;

/// Log discovery and usage line parsing
pub mod usage;

/// Utility functions for paths, formatting and logging
pub mod utils;

/// Session block windowing
pub mod window;
