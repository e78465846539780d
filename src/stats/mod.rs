//! Observability counters for the muxer

pub mod metrics;

pub use metrics::MuxerStats;
