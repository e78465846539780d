//! Tag muxer
//!
//! Converts encoded media units into FLV tag bodies plus a per-stream
//! timestamp delta, and hands them to an injected [`TagSink`]. Two
//! independent pipelines (audio, video) share one muxer instance and its
//! lifecycle; they interact in no other way.
//!
//! Anomalous input never fails a call: an absent or malformed format config
//! and an unreadable sample both degrade to "skip this unit" so one bad
//! input cannot halt the stream. Skips are counted in [`MuxerStats`] and
//! logged at debug level.

pub mod sample;
pub mod sink;

use bytes::{BufMut, Bytes, BytesMut};

use crate::media::{aac::AudioSpecificConfig, avc::AvcConfig, flv};
use crate::stats::MuxerStats;

pub use sample::{EncodedSample, FormatConfig, StreamKind};
pub use sink::{ChannelSink, Tag, TagKind, TagSink};

/// Compute a tag's timestamp delta in milliseconds.
///
/// Timestamps are seconds; the delta is rounded to the nearest whole
/// millisecond (ties away from zero). An unset last timestamp means this is
/// the first data tag of the stream and the delta is 0.
fn delta_ms(last: Option<f64>, ts: f64) -> i64 {
    match last {
        None => 0,
        Some(prev) => ((ts - prev) * 1000.0).round() as i64,
    }
}

/// FLV tag muxer
///
/// Owns the minimal per-stream state needed to compute timestamp deltas:
/// the timestamp of the most recently emitted data tag per stream, unset at
/// construction and after [`reset`](TagMuxer::reset).
///
/// All methods are bounded synchronous transformations; nothing blocks or
/// retries. The audio and video pipelines touch disjoint state, but every
/// method takes `&mut self`, so callers delivering samples from two encoder
/// threads must serialize access (a lock around the muxer, or a dedicated
/// muxing thread). The same applies to `reset` versus in-flight emission.
///
/// # Example
/// ```
/// use bytes::Bytes;
/// use flvmux_rs::{EncodedSample, FormatConfig, TagMuxer};
///
/// let mut muxer = TagMuxer::new(Vec::new());
/// muxer.set_config(&FormatConfig::Audio(Bytes::from_static(&[0x12, 0x10])));
/// muxer.write_sample(&EncodedSample::audio(Bytes::from_static(&[0x21]), 0.0));
/// assert_eq!(muxer.stats().total_tags(), 2);
/// ```
#[derive(Debug)]
pub struct TagMuxer<S> {
    sink: S,
    last_audio_ts: Option<f64>,
    last_video_ts: Option<f64>,
    stats: MuxerStats,
}

impl<S: TagSink> TagMuxer<S> {
    /// Create a muxer that emits tags to `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last_audio_ts: None,
            last_video_ts: None,
            stats: MuxerStats::new(),
        }
    }

    /// Emit a sequence/config tag for one stream.
    ///
    /// Called by the encoder whenever the format description changes; each
    /// call re-emits a fresh sequence tag with delta 0. The sequence tag
    /// must precede the stream's data tags, and never advances the delta
    /// state. An empty or malformed config is a deliberate no-op.
    pub fn set_config(&mut self, config: &FormatConfig) {
        match config {
            FormatConfig::Audio(data) => {
                let asc = match AudioSpecificConfig::parse(data.clone()) {
                    Ok(asc) => asc,
                    Err(e) => {
                        self.stats.skipped_configs += 1;
                        tracing::debug!(error = %e, "Audio config rejected");
                        return;
                    }
                };
                tracing::debug!(
                    frequency = asc.sampling_frequency,
                    channels = asc.channels(),
                    "Audio config accepted"
                );
                let header = flv::aac_tag_header(flv::AacPacketType::SequenceHeader);
                self.emit(TagKind::AudioSequence, &header, data, 0);
            }
            FormatConfig::Video(data) => {
                let avcc = match AvcConfig::parse(data.clone()) {
                    Ok(avcc) => avcc,
                    Err(e) => {
                        self.stats.skipped_configs += 1;
                        tracing::debug!(error = %e, "Video config rejected");
                        return;
                    }
                };
                tracing::debug!(
                    profile = avcc.profile_name(),
                    level = %avcc.level_string(),
                    "Video config accepted"
                );
                // Sequence headers are always marked as keyframes
                let header = flv::avc_tag_header(
                    flv::VideoFrameType::Key,
                    flv::AvcPacketType::SequenceHeader,
                    0,
                );
                self.emit(TagKind::VideoSequence, &header, data, 0);
            }
        }
    }

    /// Build and emit a data tag for one encoded sample.
    ///
    /// The payload goes through verbatim. The delta is keyed on the
    /// presentation timestamp for audio and on the decode timestamp for
    /// video, rounded to the nearest whole millisecond (ties away from
    /// zero); the first data tag of a stream after construction or reset
    /// carries delta 0. A sample whose payload cannot be read (empty) or
    /// whose presentation timestamp is not finite is skipped: no tag, no
    /// state change.
    pub fn write_sample(&mut self, sample: &EncodedSample) {
        if sample.payload.is_empty() || !sample.pts.is_finite() {
            self.stats.skipped_samples += 1;
            tracing::debug!(kind = ?sample.kind, pts = sample.pts, "Sample skipped");
            return;
        }
        match sample.kind {
            StreamKind::Audio => self.write_audio(sample),
            StreamKind::Video => self.write_video(sample),
        }
    }

    fn write_audio(&mut self, sample: &EncodedSample) {
        let header = flv::aac_tag_header(flv::AacPacketType::Raw);
        let delta = delta_ms(self.last_audio_ts, sample.pts);

        self.emit(TagKind::AudioData, &header, &sample.payload, delta);
        self.last_audio_ts = Some(sample.pts);

        tracing::trace!(delta_ms = delta, size = sample.payload.len(), "Audio tag");
    }

    fn write_video(&mut self, sample: &EncodedSample) {
        // A sample without a valid decode timestamp has no reordering:
        // decode time is presentation time and the composition offset is 0.
        let (dts, cto) = match sample.dts.filter(|d| d.is_finite()) {
            None => (sample.pts, 0i32),
            Some(dts) => (dts, ((sample.pts - dts) * 1000.0).round() as i32),
        };

        let frame_type = if sample.is_keyframe() {
            flv::VideoFrameType::Key
        } else {
            flv::VideoFrameType::Inter
        };

        let header = flv::avc_tag_header(frame_type, flv::AvcPacketType::Nalu, cto);
        let delta = delta_ms(self.last_video_ts, dts);

        self.emit(TagKind::VideoData, &header, &sample.payload, delta);
        self.last_video_ts = Some(dts);
        if sample.is_keyframe() {
            self.stats.keyframes += 1;
        }

        tracing::trace!(
            delta_ms = delta,
            cto_ms = cto,
            keyframe = sample.is_keyframe(),
            size = sample.payload.len(),
            "Video tag"
        );
    }

    fn emit(&mut self, kind: TagKind, header: &[u8], payload: &Bytes, delta_ms: i64) {
        let mut data = BytesMut::with_capacity(header.len() + payload.len());
        data.put_slice(header);
        data.extend_from_slice(payload);

        self.stats.record_tag(kind, data.len());
        self.sink.on_tag(Tag {
            kind,
            data: data.freeze(),
            delta_ms,
        });
    }

    /// Return both streams to the unset state.
    ///
    /// Called on session teardown or restart (e.g. a reconnect); the next
    /// data tag of each stream carries delta 0 again. Stats counters are
    /// cumulative and unaffected.
    pub fn reset(&mut self) {
        self.last_audio_ts = None;
        self.last_video_ts = None;
        tracing::debug!("Muxer reset");
    }

    /// Cumulative counters for this muxer.
    pub fn stats(&self) -> &MuxerStats {
        &self.stats
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the muxer and return the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
