//! AVC decoder configuration and NAL unit helpers
//!
//! The video sequence header carries an AVCDecoderConfigurationRecord
//! (SPS/PPS bundle). The muxer validates the record before emitting a
//! sequence tag. Data tags carry length-prefixed NAL units (AVCC framing)
//! passed through verbatim.
//!
//! AVCDecoderConfigurationRecord:
//! ```text
//! configurationVersion (1) | AVCProfileIndication (1) | profile_compatibility (1)
//! | AVCLevelIndication (1) | lengthSizeMinusOne (1, lower 2 bits)
//! | numOfSPS (1, lower 5 bits) | { spsLength (2) | spsNALUnit }*
//! | numOfPPS (1) | { ppsLength (2) | ppsNALUnit }*
//! ```

use bytes::{Buf, Bytes};

use crate::error::{MediaError, Result};

/// NAL unit type (lower 5 bits of the first NALU byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaluType {
    /// Non-IDR slice
    Slice = 1,
    /// IDR slice (keyframe)
    Idr = 5,
    /// Supplemental enhancement information
    Sei = 6,
    /// Sequence parameter set
    Sps = 7,
    /// Picture parameter set
    Pps = 8,
    /// Access unit delimiter
    Aud = 9,
}

impl NaluType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b & 0x1F {
            1 => Some(NaluType::Slice),
            5 => Some(NaluType::Idr),
            6 => Some(NaluType::Sei),
            7 => Some(NaluType::Sps),
            8 => Some(NaluType::Pps),
            9 => Some(NaluType::Aud),
            _ => None,
        }
    }

    pub fn is_keyframe(&self) -> bool {
        matches!(self, NaluType::Idr)
    }
}

/// AVC decoder configuration (from a video sequence header)
#[derive(Debug, Clone)]
pub struct AvcConfig {
    /// AVC profile (66=Baseline, 77=Main, 100=High, etc.)
    pub profile: u8,
    /// Profile compatibility flags
    pub compatibility: u8,
    /// AVC level (e.g., 31 = 3.1)
    pub level: u8,
    /// NALU length prefix size in bytes (usually 4)
    pub nalu_length_size: u8,
    /// Sequence Parameter Sets
    pub sps: Vec<Bytes>,
    /// Picture Parameter Sets
    pub pps: Vec<Bytes>,
    /// Raw AVCDecoderConfigurationRecord bytes
    pub raw: Bytes,
}

impl AvcConfig {
    /// Parse an AVCDecoderConfigurationRecord byte sequence.
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.len() < 7 {
            return Err(MediaError::InvalidVideoConfig);
        }

        let raw = data.clone();
        let mut data = data;

        let version = data.get_u8();
        if version != 1 {
            return Err(MediaError::InvalidVideoConfig);
        }

        let profile = data.get_u8();
        let compatibility = data.get_u8();
        let level = data.get_u8();
        let nalu_length_size = (data.get_u8() & 0x03) + 1;

        let num_sps = (data.get_u8() & 0x1F) as usize;
        let mut sps = Vec::with_capacity(num_sps);
        for _ in 0..num_sps {
            if data.len() < 2 {
                return Err(MediaError::InvalidVideoConfig);
            }
            let sps_len = data.get_u16() as usize;
            if data.len() < sps_len {
                return Err(MediaError::InvalidVideoConfig);
            }
            sps.push(data.copy_to_bytes(sps_len));
        }

        if data.is_empty() {
            return Err(MediaError::InvalidVideoConfig);
        }
        let num_pps = data.get_u8() as usize;
        let mut pps = Vec::with_capacity(num_pps);
        for _ in 0..num_pps {
            if data.len() < 2 {
                return Err(MediaError::InvalidVideoConfig);
            }
            let pps_len = data.get_u16() as usize;
            if data.len() < pps_len {
                return Err(MediaError::InvalidVideoConfig);
            }
            pps.push(data.copy_to_bytes(pps_len));
        }

        Ok(AvcConfig {
            profile,
            compatibility,
            level,
            nalu_length_size,
            sps,
            pps,
            raw,
        })
    }

    /// Get the profile name
    pub fn profile_name(&self) -> &'static str {
        match self.profile {
            66 => "Baseline",
            77 => "Main",
            88 => "Extended",
            100 => "High",
            _ => "Unknown",
        }
    }

    /// Get the level as a string (e.g., "3.1")
    pub fn level_string(&self) -> String {
        format!("{}.{}", self.level / 10, self.level % 10)
    }
}

/// Iterator over NAL units in AVCC (length-prefixed) framing
pub struct NaluIterator<'a> {
    data: &'a [u8],
    offset: usize,
    nalu_length_size: usize,
}

impl<'a> NaluIterator<'a> {
    pub fn new(data: &'a [u8], nalu_length_size: u8) -> Self {
        Self {
            data,
            offset: 0,
            nalu_length_size: nalu_length_size as usize,
        }
    }
}

impl<'a> Iterator for NaluIterator<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset + self.nalu_length_size > self.data.len() {
            return None;
        }

        let mut len: usize = 0;
        for i in 0..self.nalu_length_size {
            len = (len << 8) | (self.data[self.offset + i] as usize);
        }
        self.offset += self.nalu_length_size;

        if self.offset + len > self.data.len() {
            return None;
        }

        let nalu = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Some(nalu)
    }
}

/// Check whether an AVCC buffer contains an IDR slice.
///
/// Used to derive the keyframe flag when the encoder supplies no dependency
/// metadata. Assumes the given length prefix size (4 bytes for nearly all
/// encoders).
pub fn contains_idr(data: &[u8], nalu_length_size: u8) -> bool {
    NaluIterator::new(data, nalu_length_size)
        .any(|nalu| !nalu.is_empty() && NaluType::from_byte(nalu[0]) == Some(NaluType::Idr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nalu_type() {
        assert_eq!(NaluType::from_byte(0x65), Some(NaluType::Idr));
        assert_eq!(NaluType::from_byte(0x67), Some(NaluType::Sps));
        assert_eq!(NaluType::from_byte(0x68), Some(NaluType::Pps));
        assert_eq!(NaluType::from_byte(0x41), Some(NaluType::Slice));
        assert_eq!(NaluType::from_byte(0x0C), None);
        assert!(NaluType::Idr.is_keyframe());
        assert!(!NaluType::Slice.is_keyframe());
    }

    #[test]
    fn test_avc_config_parse() {
        let data = Bytes::from_static(&[
            0x01, // version
            0x64, // profile (High)
            0x00, // compatibility
            0x1F, // level 3.1
            0xFF, // nalu length size = 4
            0xE1, // 1 SPS
            0x00, 0x04, // SPS length
            0x67, 0x64, 0x00, 0x1F, // SPS data
            0x01, // 1 PPS
            0x00, 0x03, // PPS length
            0x68, 0xEF, 0x38, // PPS data
        ]);

        let config = AvcConfig::parse(data.clone()).unwrap();
        assert_eq!(config.profile, 100);
        assert_eq!(config.level, 31);
        assert_eq!(config.nalu_length_size, 4);
        assert_eq!(config.sps.len(), 1);
        assert_eq!(config.pps.len(), 1);
        assert_eq!(config.profile_name(), "High");
        assert_eq!(config.level_string(), "3.1");
        assert_eq!(config.raw, data);
    }

    #[test]
    fn test_avc_config_invalid_version() {
        let data = Bytes::from_static(&[
            0x02, // version must be 1
            0x64, 0x00, 0x1F, 0xFF, 0xE1, 0x00, 0x04, 0x67, 0x64, 0x00, 0x1F, 0x01, 0x00, 0x03,
            0x68, 0xEF, 0x38,
        ]);
        assert!(AvcConfig::parse(data).is_err());
    }

    #[test]
    fn test_avc_config_too_short() {
        assert!(AvcConfig::parse(Bytes::new()).is_err());
        assert!(AvcConfig::parse(Bytes::from_static(&[0x01, 0x64, 0x00])).is_err());
    }

    #[test]
    fn test_avc_config_truncated_sps() {
        let data = Bytes::from_static(&[
            0x01, 0x64, 0x00, 0x1F, 0xFF, //
            0xE1, // claims 1 SPS
            0x00, 0x10, // SPS length 16, but only 2 bytes follow
            0x67, 0x64,
        ]);
        assert_eq!(
            AvcConfig::parse(data).unwrap_err(),
            MediaError::InvalidVideoConfig
        );
    }

    #[test]
    fn test_nalu_iterator() {
        let data: &[u8] = &[
            0x00, 0x00, 0x00, 0x03, // length = 3
            0x67, 0x64, 0x00, // SPS
            0x00, 0x00, 0x00, 0x02, // length = 2
            0x68, 0xEF, // PPS
        ];

        let mut iter = NaluIterator::new(data, 4);

        let nalu1 = iter.next().unwrap();
        assert_eq!(nalu1.len(), 3);
        assert_eq!(NaluType::from_byte(nalu1[0]), Some(NaluType::Sps));

        let nalu2 = iter.next().unwrap();
        assert_eq!(nalu2.len(), 2);
        assert_eq!(NaluType::from_byte(nalu2[0]), Some(NaluType::Pps));

        assert!(iter.next().is_none());
    }

    #[test]
    fn test_nalu_iterator_two_byte_lengths() {
        let data: &[u8] = &[0x00, 0x02, 0x65, 0x88];
        let mut iter = NaluIterator::new(data, 2);
        assert_eq!(iter.next().unwrap().len(), 2);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_nalu_iterator_truncated() {
        // Length claims 10 bytes but only 3 are available
        let data: &[u8] = &[0x00, 0x00, 0x00, 0x0A, 0x67, 0x64, 0x00];
        let mut iter = NaluIterator::new(data, 4);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_contains_idr() {
        let idr: &[u8] = &[
            0x00, 0x00, 0x00, 0x05, // length
            0x65, 0x88, 0x84, 0x00, 0x00, // IDR slice
        ];
        assert!(contains_idr(idr, 4));

        let non_idr: &[u8] = &[
            0x00, 0x00, 0x00, 0x05, // length
            0x41, 0x9A, 0x00, 0x00, 0x00, // non-IDR slice
        ];
        assert!(!contains_idr(non_idr, 4));

        // SEI before the IDR slice
        let sei_then_idr: &[u8] = &[
            0x00, 0x00, 0x00, 0x02, 0x06, 0x05, // SEI
            0x00, 0x00, 0x00, 0x02, 0x65, 0x88, // IDR
        ];
        assert!(contains_idr(sei_then_idr, 4));

        assert!(!contains_idr(&[], 4));
    }
}
