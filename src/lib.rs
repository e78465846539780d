//! FLV tag muxer for RTMP-style streaming transports.
//!
//! This crate turns already-encoded media units (raw AAC frames, AVCC-framed
//! H.264 access units) into FLV tag bodies ready to be carried as RTMP
//! audio/video messages. It owns the codec header bytes, the sequence-header
//! vs. data distinction, composition-time-offset encoding for B-frame
//! streams, and the per-stream timestamp-delta bookkeeping. Everything else
//! (encoders, the connection, chunking) lives outside.
//!
//! # Example
//! ```
//! use bytes::Bytes;
//! use flvmux_rs::{EncodedSample, FormatConfig, TagMuxer};
//!
//! let mut muxer = TagMuxer::new(Vec::new());
//!
//! // AudioSpecificConfig: AAC-LC, 44.1 kHz, stereo
//! muxer.set_config(&FormatConfig::Audio(Bytes::from_static(&[0x12, 0x10])));
//!
//! // Raw AAC frames, presentation timestamps in seconds
//! muxer.write_sample(&EncodedSample::audio(
//!     Bytes::from_static(&[0x21, 0x00, 0x49]),
//!     0.000,
//! ));
//!
//! let tags = muxer.into_sink();
//! assert_eq!(tags.len(), 2); // sequence header + one data tag
//! assert_eq!(tags[0].delta_ms, 0);
//! ```

pub mod error;
pub mod media;
pub mod muxer;
pub mod stats;

pub use error::{MediaError, Result};
pub use muxer::{
    ChannelSink, EncodedSample, FormatConfig, StreamKind, Tag, TagKind, TagMuxer, TagSink,
};
pub use stats::MuxerStats;
