//! FLV Writer - muxes a synthetic A/V stream into an FLV file
//!
//! Run with: cargo run --example flv_writer -- [output.flv]
//!
//! This example demonstrates:
//! - Feeding format configs and encoded samples through `TagMuxer`
//! - Bridging the synchronous muxer into an async task with `ChannelSink`
//! - Turning per-tag timestamp deltas back into the absolute timestamps an
//!   FLV file (or RTMP chunk stream) needs
//!
//! The payloads are synthetic placeholders, so the resulting file will not
//! decode to real pictures or sound, but its framing is valid FLV.
//!
//! # FLV File Format
//!
//! ```text
//! +============+==================+==============+==================+
//! | FLV Header | PrevTagSize0 (0) | Tag 1        | PrevTagSize1 ... |
//! | (9 bytes)  | (4 bytes)        | (11+N bytes) | (4 bytes)        |
//! +============+==================+==============+==================+
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use bytes::Bytes;

use flvmux_rs::{ChannelSink, EncodedSample, FormatConfig, Tag, TagMuxer};

// ============================================================================
// FLV Writing Utilities
// ============================================================================

/// FLV file signature: "FLV" in ASCII
const FLV_SIGNATURE: [u8; 3] = [0x46, 0x4C, 0x56];

/// FLV version (always 1)
const FLV_VERSION: u8 = 0x01;

/// Type flags: bit 0 = video, bit 2 = audio. 0x05 = both
const FLV_TYPE_FLAGS_AV: u8 = 0x05;

/// FLV header is always 9 bytes
const FLV_HEADER_SIZE: u32 = 9;

/// FLV tag type codes
const FLV_TAG_AUDIO: u8 = 8;
const FLV_TAG_VIDEO: u8 = 9;

/// Writes the FLV file header (9 bytes) plus initial PreviousTagSize0 (4 bytes)
fn write_flv_header(writer: &mut impl Write) -> std::io::Result<()> {
    writer.write_all(&FLV_SIGNATURE)?;
    writer.write_all(&[FLV_VERSION])?;
    writer.write_all(&[FLV_TYPE_FLAGS_AV])?;
    writer.write_all(&FLV_HEADER_SIZE.to_be_bytes())?;
    writer.write_all(&0u32.to_be_bytes())?; // PreviousTagSize0 = 0
    Ok(())
}

/// Writes an FLV tag with header, data, and trailing PreviousTagSize
fn write_flv_tag(
    writer: &mut impl Write,
    tag_type: u8,
    timestamp: u32,
    data: &[u8],
) -> std::io::Result<()> {
    let data_size = data.len() as u32;

    writer.write_all(&[tag_type])?;

    // Data size (24-bit BE)
    writer.write_all(&[
        ((data_size >> 16) & 0xFF) as u8,
        ((data_size >> 8) & 0xFF) as u8,
        (data_size & 0xFF) as u8,
    ])?;

    // Timestamp: lower 24 bits, then upper 8 bits (extension byte)
    writer.write_all(&[
        ((timestamp >> 16) & 0xFF) as u8,
        ((timestamp >> 8) & 0xFF) as u8,
        (timestamp & 0xFF) as u8,
        ((timestamp >> 24) & 0xFF) as u8,
    ])?;

    // Stream ID (always 0 in FLV files)
    writer.write_all(&[0, 0, 0])?;

    writer.write_all(data)?;

    // PreviousTagSize = 11 (header) + data length
    writer.write_all(&(11 + data_size).to_be_bytes())?;

    Ok(())
}

// ============================================================================
// Tag Consumer
// ============================================================================

/// Accumulates per-stream deltas into absolute timestamps and writes tags
/// out as an FLV file.
struct FlvFileWriter {
    writer: BufWriter<File>,
    audio_clock_ms: i64,
    video_clock_ms: i64,
    tags_written: u64,
}

impl FlvFileWriter {
    fn create(path: &PathBuf) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_flv_header(&mut writer)?;
        Ok(Self {
            writer,
            audio_clock_ms: 0,
            video_clock_ms: 0,
            tags_written: 0,
        })
    }

    fn write_tag(&mut self, tag: &Tag) -> std::io::Result<()> {
        // Sequence headers carry delta 0, so they land on the stream clock
        let (tag_type, clock) = if tag.kind.is_audio() {
            (FLV_TAG_AUDIO, &mut self.audio_clock_ms)
        } else {
            (FLV_TAG_VIDEO, &mut self.video_clock_ms)
        };
        *clock += tag.delta_ms;
        let timestamp = (*clock).max(0) as u32;

        write_flv_tag(&mut self.writer, tag_type, timestamp, &tag.data)?;
        self.tags_written += 1;
        Ok(())
    }

    fn finish(mut self) -> std::io::Result<u64> {
        self.writer.flush()?;
        Ok(self.tags_written)
    }
}

// ============================================================================
// Synthetic Encoder
// ============================================================================

/// AudioSpecificConfig: AAC-LC, 44.1 kHz, stereo
const ASC: &[u8] = &[0x12, 0x10];

/// AVCDecoderConfigurationRecord: High 3.1, one SPS and one PPS
const AVCC: &[u8] = &[
    0x01, 0x64, 0x00, 0x1F, 0xFF, //
    0xE1, 0x00, 0x04, 0x67, 0x64, 0x00, 0x1F, //
    0x01, 0x00, 0x03, 0x68, 0xEF, 0x38,
];

/// Feed two seconds of synthetic samples through the muxer.
fn produce_samples(muxer: &mut TagMuxer<ChannelSink>) {
    muxer.set_config(&FormatConfig::Audio(Bytes::from_static(ASC)));
    muxer.set_config(&FormatConfig::Video(Bytes::from_static(AVCC)));

    // ~23ms AAC frames (1024 samples at 44.1 kHz)
    let audio_payload = Bytes::from(vec![0x21u8; 64]);
    for i in 0..86 {
        let pts = i as f64 * 1024.0 / 44100.0;
        muxer.write_sample(&EncodedSample::audio(audio_payload.clone(), pts));
    }

    // 30 fps video, a keyframe every 30 frames, IDR/non-IDR AVCC payloads
    let idr = Bytes::from_static(&[0x00, 0x00, 0x00, 0x02, 0x65, 0x88]);
    let slice = Bytes::from_static(&[0x00, 0x00, 0x00, 0x02, 0x41, 0x9A]);
    for i in 0..60u32 {
        let pts = i as f64 / 30.0;
        let payload = if i % 30 == 0 { idr.clone() } else { slice.clone() };
        muxer.write_sample(&EncodedSample::video_from_nalus(payload, pts, None));
    }

    tracing::info!(
        tags = muxer.stats().total_tags(),
        keyframes = muxer.stats().keyframes,
        bytes = muxer.stats().bytes_emitted,
        "Muxing finished"
    );
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flvmux_rs=debug".parse()?)
                .add_directive("flv_writer=info".parse()?),
        )
        .init();

    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output.flv"));

    let (sink, mut rx) = ChannelSink::new();
    let mut muxer = TagMuxer::new(sink);

    // Writer task: consumes tags as the muxer emits them
    let writer_path = output_path.clone();
    let writer = tokio::spawn(async move {
        let mut file = FlvFileWriter::create(&writer_path)?;
        while let Some(tag) = rx.recv().await {
            file.write_tag(&tag)?;
        }
        file.finish()
    });

    produce_samples(&mut muxer);

    // Dropping the muxer closes the channel and ends the writer task
    drop(muxer);
    let tags_written = writer.await??;

    println!("Wrote {} tags to {}", tags_written, output_path.display());
    Ok(())
}
