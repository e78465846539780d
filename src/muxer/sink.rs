//! Output sink contract
//!
//! The muxer never transmits. Every emitted tag goes to an injected
//! [`TagSink`], synchronously, at most once per muxer call and in emission
//! order. The transport layer decides what a tag body plus timestamp delta
//! become on the wire.

use bytes::Bytes;
use tokio::sync::mpsc;

/// Kind of an emitted tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Audio sequence header (AudioSpecificConfig)
    AudioSequence,
    /// Audio data (raw AAC frame)
    AudioData,
    /// Video sequence header (AVCDecoderConfigurationRecord)
    VideoSequence,
    /// Video data (length-prefixed NAL units)
    VideoData,
}

impl TagKind {
    /// Whether this is a sequence/config tag.
    pub fn is_sequence_header(&self) -> bool {
        matches!(self, TagKind::AudioSequence | TagKind::VideoSequence)
    }

    /// Whether this tag belongs to the audio stream.
    pub fn is_audio(&self) -> bool {
        matches!(self, TagKind::AudioSequence | TagKind::AudioData)
    }

    /// Whether this tag belongs to the video stream.
    pub fn is_video(&self) -> bool {
        matches!(self, TagKind::VideoSequence | TagKind::VideoData)
    }
}

/// A transport-ready tag
///
/// `data` is the full tag body: codec header bytes followed by the payload.
/// `delta_ms` is the elapsed time in milliseconds since the previously
/// emitted data tag of the same stream (0 for sequence headers and for the
/// first data tag after construction or reset). It can be negative if the
/// upstream encoder violates timestamp monotonicity; the muxer does not
/// correct that.
///
/// Cheap to clone: the body is reference-counted.
#[derive(Debug, Clone)]
pub struct Tag {
    /// Tag kind
    pub kind: TagKind,
    /// Header bytes followed by payload bytes
    pub data: Bytes,
    /// Timestamp delta in milliseconds
    pub delta_ms: i64,
}

impl Tag {
    /// Whether this is a sequence/config tag.
    pub fn is_sequence_header(&self) -> bool {
        self.kind.is_sequence_header()
    }

    /// Size of the tag body in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Receiver of emitted tags
///
/// Implementations must not block: the muxer calls `on_tag` synchronously
/// from whichever thread the encoder delivers samples on.
pub trait TagSink {
    fn on_tag(&mut self, tag: Tag);
}

/// Collector sink, mostly for tests and offline muxing.
impl TagSink for Vec<Tag> {
    fn on_tag(&mut self, tag: Tag) {
        self.push(tag);
    }
}

/// Sink that forwards tags into a tokio mpsc channel
///
/// Bridges the synchronous muxer into an async transport task. The channel
/// is unbounded so `on_tag` never blocks; tags sent after the receiver is
/// dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Tag>,
}

impl ChannelSink {
    /// Create a sink and the receiving end for the transport task.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Tag>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TagSink for ChannelSink {
    fn on_tag(&mut self, tag: Tag) {
        let _ = self.tx.send(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_kind_predicates() {
        assert!(TagKind::AudioSequence.is_sequence_header());
        assert!(TagKind::VideoSequence.is_sequence_header());
        assert!(!TagKind::AudioData.is_sequence_header());
        assert!(!TagKind::VideoData.is_sequence_header());

        assert!(TagKind::AudioData.is_audio());
        assert!(!TagKind::AudioData.is_video());
        assert!(TagKind::VideoData.is_video());
        assert!(!TagKind::VideoData.is_audio());
    }

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<Tag> = Vec::new();
        for delta_ms in [0, 21, 23] {
            sink.on_tag(Tag {
                kind: TagKind::AudioData,
                data: Bytes::from_static(&[0xAF, 0x01]),
                delta_ms,
            });
        }
        assert_eq!(sink.len(), 3);
        assert_eq!(sink[1].delta_ms, 21);
        assert_eq!(sink[2].size(), 2);
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (mut sink, mut rx) = ChannelSink::new();

        sink.on_tag(Tag {
            kind: TagKind::VideoSequence,
            data: Bytes::from_static(&[0x17, 0x00, 0x00, 0x00, 0x00]),
            delta_ms: 0,
        });
        sink.on_tag(Tag {
            kind: TagKind::VideoData,
            data: Bytes::from_static(&[0x17, 0x01, 0x00, 0x00, 0x00]),
            delta_ms: 33,
        });

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, TagKind::VideoSequence);
        assert_eq!(first.delta_ms, 0);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, TagKind::VideoData);
        assert_eq!(second.delta_ms, 33);
    }

    #[test]
    fn test_channel_sink_receiver_dropped() {
        let (mut sink, rx) = ChannelSink::new();
        drop(rx);

        // Must not panic; the tag is silently discarded
        sink.on_tag(Tag {
            kind: TagKind::AudioData,
            data: Bytes::from_static(&[0xAF, 0x01]),
            delta_ms: 0,
        });
    }
}
