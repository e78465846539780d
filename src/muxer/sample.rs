//! Encoder output values
//!
//! The muxer has no dependency on any platform media-buffer type. Encoders
//! hand it these neutral values: a payload that is already encoder-framed
//! (a raw AAC frame, or length-prefixed NAL units) plus clock and
//! dependency metadata.

use bytes::Bytes;

use crate::media::avc;

/// Which of the two muxer pipelines a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Video,
}

/// A single encoded media unit
///
/// Timestamps are seconds on the encoder's media clock. The decode
/// timestamp is only meaningful for video; `None` (or a non-finite value)
/// means the stream has no frame reordering.
#[derive(Debug, Clone)]
pub struct EncodedSample {
    /// Stream kind
    pub kind: StreamKind,
    /// Encoded payload, passed through verbatim
    pub payload: Bytes,
    /// Presentation timestamp in seconds
    pub pts: f64,
    /// Decode timestamp in seconds (video only)
    pub dts: Option<f64>,
    /// Encoder dependency metadata (video only). A unit that depends on no
    /// other unit (`Some(false)`) is a keyframe; `None` means the encoder
    /// supplied no metadata and the unit is treated as an inter frame.
    pub depends_on_others: Option<bool>,
}

impl EncodedSample {
    /// Create an audio sample.
    pub fn audio(payload: Bytes, pts: f64) -> Self {
        Self {
            kind: StreamKind::Audio,
            payload,
            pts,
            dts: None,
            depends_on_others: None,
        }
    }

    /// Create a video sample with encoder-supplied dependency metadata.
    pub fn video(payload: Bytes, pts: f64, dts: Option<f64>, depends_on_others: bool) -> Self {
        Self {
            kind: StreamKind::Video,
            payload,
            pts,
            dts,
            depends_on_others: Some(depends_on_others),
        }
    }

    /// Create a video sample from an AVCC buffer, deriving the dependency
    /// flag by scanning the length-prefixed NAL units for an IDR slice.
    ///
    /// For encoders that expose no dependency metadata. Assumes 4-byte
    /// length prefixes.
    pub fn video_from_nalus(payload: Bytes, pts: f64, dts: Option<f64>) -> Self {
        let keyframe = avc::contains_idr(&payload, 4);
        Self::video(payload, pts, dts, !keyframe)
    }

    /// Whether this sample is a keyframe.
    pub fn is_keyframe(&self) -> bool {
        self.depends_on_others == Some(false)
    }
}

/// Codec configuration for one stream, emitted as a sequence tag
///
/// Supplied by the encoder once per stream, or again whenever the format
/// description changes.
#[derive(Debug, Clone)]
pub enum FormatConfig {
    /// AudioSpecificConfig bytes
    Audio(Bytes),
    /// AVCDecoderConfigurationRecord bytes (SPS/PPS bundle)
    Video(Bytes),
}

impl FormatConfig {
    /// Stream kind this config applies to.
    pub fn kind(&self) -> StreamKind {
        match self {
            FormatConfig::Audio(_) => StreamKind::Audio,
            FormatConfig::Video(_) => StreamKind::Video,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_sample() {
        let sample = EncodedSample::audio(Bytes::from_static(&[0x21, 0x00]), 1.5);
        assert_eq!(sample.kind, StreamKind::Audio);
        assert_eq!(sample.pts, 1.5);
        assert!(sample.dts.is_none());
        assert!(!sample.is_keyframe());
    }

    #[test]
    fn test_video_sample_dependency_flag() {
        let payload = Bytes::from_static(&[0x00, 0x00, 0x00, 0x01, 0x41]);

        let key = EncodedSample::video(payload.clone(), 0.2, Some(0.15), false);
        assert!(key.is_keyframe());

        let inter = EncodedSample::video(payload, 0.2, Some(0.15), true);
        assert!(!inter.is_keyframe());
    }

    #[test]
    fn test_video_from_nalus_detects_idr() {
        let idr = Bytes::from_static(&[0x00, 0x00, 0x00, 0x02, 0x65, 0x88]);
        assert!(EncodedSample::video_from_nalus(idr, 0.0, None).is_keyframe());

        let slice = Bytes::from_static(&[0x00, 0x00, 0x00, 0x02, 0x41, 0x9A]);
        assert!(!EncodedSample::video_from_nalus(slice, 0.0, None).is_keyframe());
    }

    #[test]
    fn test_format_config_kind() {
        assert_eq!(
            FormatConfig::Audio(Bytes::new()).kind(),
            StreamKind::Audio
        );
        assert_eq!(FormatConfig::Video(Bytes::new()).kind(), StreamKind::Video);
    }
}
