// src/error.rs
//! Failure classification at the orchestrator seams.
//!
//! Adapters and stores use plain `anyhow` internally; the orchestrator wraps
//! their failures into one of these categories so logs and counters can tell
//! a dead upstream apart from a broken webhook. None of them aborts a run on
//! its own — only the subscription read and the ledger snapshot are fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadarError {
    /// Network/HTTP/parse failure from either adapter. Per-entity, skippable.
    #[error("source unavailable: {0:#}")]
    SourceUnavailable(anyhow::Error),

    /// Ledger append failed; the item may be re-notified next run.
    #[error("ledger write failed: {0:#}")]
    LedgerWrite(anyhow::Error),

    /// Notification send failed; the ledger append is still attempted.
    #[error("sink delivery failed: {0:#}")]
    SinkDelivery(anyhow::Error),
}

impl RadarError {
    /// Label used in logs and the per-category failure counter.
    pub fn category(&self) -> &'static str {
        match self {
            RadarError::SourceUnavailable(_) => "source_unavailable",
            RadarError::LedgerWrite(_) => "ledger_write",
            RadarError::SinkDelivery(_) => "sink_delivery",
        }
    }
}
