//! AudioSpecificConfig parsing
//!
//! The audio sequence header carries an AudioSpecificConfig describing the
//! AAC stream. The muxer validates the config before emitting a sequence
//! tag; a config that does not parse is not worth sending downstream.
//!
//! AudioSpecificConfig bit layout:
//! ```text
//! audioObjectType: 5 bits
//! samplingFrequencyIndex: 4 bits
//! if (samplingFrequencyIndex == 0xF) samplingFrequency: 24 bits
//! channelConfiguration: 4 bits
//! ```

use bytes::Bytes;

use crate::error::{MediaError, Result};

/// AudioSpecificConfig (from an audio sequence header)
#[derive(Debug, Clone)]
pub struct AudioSpecificConfig {
    /// Audio object type (2 = AAC-LC, the common case)
    pub audio_object_type: u8,
    /// Sampling frequency index
    pub sampling_frequency_index: u8,
    /// Sampling frequency in Hz
    pub sampling_frequency: u32,
    /// Channel configuration (1=mono, 2=stereo, etc.)
    pub channel_configuration: u8,
    /// Raw config bytes
    pub raw: Bytes,
}

impl AudioSpecificConfig {
    /// Standard sampling frequencies by index
    const SAMPLING_FREQUENCIES: [u32; 13] = [
        96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
    ];

    /// Parse an AudioSpecificConfig byte sequence.
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.len() < 2 {
            return Err(MediaError::InvalidAudioConfig);
        }

        let b0 = data[0];
        let b1 = data[1];

        let audio_object_type = (b0 >> 3) & 0x1F;
        let sampling_frequency_index = ((b0 & 0x07) << 1) | ((b1 >> 7) & 0x01);

        let sampling_frequency = if sampling_frequency_index == 0x0F {
            // Explicit frequency in the next 24 bits
            if data.len() < 5 {
                return Err(MediaError::InvalidAudioConfig);
            }
            let f0 = (data[1] & 0x7F) as u32;
            let f1 = data[2] as u32;
            let f2 = data[3] as u32;
            let f3 = (data[4] >> 7) as u32;
            (f0 << 17) | (f1 << 9) | (f2 << 1) | f3
        } else if (sampling_frequency_index as usize) < Self::SAMPLING_FREQUENCIES.len() {
            Self::SAMPLING_FREQUENCIES[sampling_frequency_index as usize]
        } else {
            return Err(MediaError::InvalidAudioConfig);
        };

        let channel_configuration = (b1 >> 3) & 0x0F;

        Ok(AudioSpecificConfig {
            audio_object_type,
            sampling_frequency_index,
            sampling_frequency,
            channel_configuration,
            raw: data,
        })
    }

    /// Get the channel count
    pub fn channels(&self) -> u8 {
        match self.channel_configuration {
            0 => 0, // Defined in stream
            c @ 1..=6 => c,
            7 => 8, // 7.1
            _ => 0,
        }
    }
}
