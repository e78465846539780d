//! Byte-level media layout
//!
//! This module provides:
//! - FLV tag header construction (codec/frame-type bytes, composition time)
//! - AudioSpecificConfig validation for audio sequence headers
//! - AVCDecoderConfigurationRecord validation and NAL unit helpers

pub mod aac;
pub mod avc;
pub mod flv;

pub use aac::AudioSpecificConfig;
pub use avc::{AvcConfig, NaluIterator, NaluType};
pub use flv::{AacPacketType, AvcPacketType, VideoFrameType};
