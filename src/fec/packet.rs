//! Wire framing for encoding symbols and the out-of-band block descriptor.

use crate::error::{FountainError, Result};
use log::error;
use serde::{Deserialize, Serialize};

/// Largest ESI representable in the 24-bit header field.
pub const MAX_ESI: u32 = (1 << 24) - 1;

/// Source block number plus 24-bit encoding symbol id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayloadId {
    source_block: u8,
    esi: u32,
}

impl PayloadId {
    pub const LEN: usize = 4;

    pub fn new(source_block: u8, esi: u32) -> Result<Self> {
        if esi > MAX_ESI {
            return Err(FountainError::InvalidSymbolId(esi));
        }
        Ok(Self { source_block, esi })
    }

    pub fn source_block(&self) -> u8 {
        self.source_block
    }

    pub fn esi(&self) -> u32 {
        self.esi
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let esi = self.esi.to_be_bytes();
        [self.source_block, esi[1], esi[2], esi[3]]
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() < Self::LEN {
            error!("from_bytes: payload id truncated ({} bytes)", raw.len());
            return Err(FountainError::MalformedPacket(format!(
                "payload id needs {} bytes, got {}",
                Self::LEN,
                raw.len()
            )));
        }
        Ok(Self {
            source_block: raw[0],
            esi: u32::from_be_bytes([0, raw[1], raw[2], raw[3]]),
        })
    }
}

/// One encoding symbol together with its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingPacket {
    pub payload_id: PayloadId,
    pub data: Vec<u8>,
}

impl EncodingPacket {
    pub fn new(payload_id: PayloadId, data: Vec<u8>) -> Self {
        Self { payload_id, data }
    }

    pub fn esi(&self) -> u32 {
        self.payload_id.esi()
    }

    /// Frame format: `<payload id (4)> <symbol (T)>`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PayloadId::LEN + self.data.len());
        out.extend_from_slice(&self.payload_id.to_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Writes the frame into `buf`, returning the number of bytes used.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<usize> {
        let len = PayloadId::LEN + self.data.len();
        if buf.len() < len {
            error!("write_to: buffer of {} bytes cannot hold {}", buf.len(), len);
            return Err(FountainError::MalformedPacket(format!(
                "buffer too small: {} < {}",
                buf.len(),
                len
            )));
        }
        buf[..PayloadId::LEN].copy_from_slice(&self.payload_id.to_bytes());
        buf[PayloadId::LEN..len].copy_from_slice(&self.data);
        Ok(len)
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let payload_id = PayloadId::from_bytes(raw)?;
        if raw.len() == PayloadId::LEN {
            error!("from_bytes: packet carries no symbol data");
            return Err(FountainError::MalformedPacket("empty symbol".into()));
        }
        Ok(Self {
            payload_id,
            data: raw[PayloadId::LEN..].to_vec(),
        })
    }

    pub fn split(self) -> (PayloadId, Vec<u8>) {
        (self.payload_id, self.data)
    }
}

/// Everything a decoder must learn out of band: payload length and symbol size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransmissionInfo {
    transfer_length: u64,
    symbol_size: u16,
}

impl TransmissionInfo {
    pub const LEN: usize = 12;
    /// Transfer lengths are carried in 40 bits.
    pub const MAX_TRANSFER_LENGTH: u64 = (1 << 40) - 1;

    pub fn new(transfer_length: u64, symbol_size: u16) -> Result<Self> {
        if transfer_length == 0 {
            return Err(FountainError::Config("transfer length must be positive".into()));
        }
        if transfer_length > Self::MAX_TRANSFER_LENGTH {
            return Err(FountainError::Config(format!(
                "transfer length {} exceeds 40 bits",
                transfer_length
            )));
        }
        if symbol_size == 0 {
            return Err(FountainError::Config("symbol size must be positive".into()));
        }
        Ok(Self {
            transfer_length,
            symbol_size,
        })
    }

    pub fn transfer_length(&self) -> u64 {
        self.transfer_length
    }

    pub fn symbol_size(&self) -> u16 {
        self.symbol_size
    }

    /// Number of source symbols K.
    pub fn source_symbols(&self) -> usize {
        self.transfer_length.div_ceil(u64::from(self.symbol_size)) as usize
    }

    /// Layout: 40-bit length, reserved byte, 16-bit symbol size, one source
    /// block, one sub-block, alignment 1.
    pub fn to_bytes(&self) -> [u8; 12] {
        let len = self.transfer_length.to_be_bytes();
        let t = self.symbol_size.to_be_bytes();
        [len[3], len[4], len[5], len[6], len[7], 0, t[0], t[1], 1, 0, 1, 1]
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() < Self::LEN {
            return Err(FountainError::MalformedPacket(format!(
                "transmission info needs {} bytes, got {}",
                Self::LEN,
                raw.len()
            )));
        }
        if raw[8] != 1 {
            return Err(FountainError::MismatchedParameters(format!(
                "{} source blocks, only one is supported",
                raw[8]
            )));
        }
        let transfer_length = u64::from_be_bytes([0, 0, 0, raw[0], raw[1], raw[2], raw[3], raw[4]]);
        let symbol_size = u16::from_be_bytes([raw[6], raw[7]]);
        Self::new(transfer_length, symbol_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_id_layout() {
        let id = PayloadId::new(3, 0x0a0b0c).unwrap();
        assert_eq!(hex::encode(id.to_bytes()), "030a0b0c");
        assert_eq!(PayloadId::from_bytes(&id.to_bytes()).unwrap(), id);
        assert!(matches!(
            PayloadId::new(0, MAX_ESI + 1),
            Err(FountainError::InvalidSymbolId(_))
        ));
    }

    #[test]
    fn packet_frame() {
        let pkt = EncodingPacket::new(PayloadId::new(0, 17).unwrap(), vec![0xaa, 0xbb]);
        let raw = pkt.to_bytes();
        assert_eq!(hex::encode(&raw), "00000011aabb");
        assert_eq!(EncodingPacket::from_bytes(&raw).unwrap(), pkt);

        let mut buf = [0u8; 8];
        assert_eq!(pkt.write_to(&mut buf).unwrap(), 6);
        assert_eq!(&buf[..6], &raw[..]);
        assert!(pkt.write_to(&mut [0u8; 5]).is_err());
    }

    #[test]
    fn truncated_frames_are_rejected() {
        assert!(matches!(
            EncodingPacket::from_bytes(&[0, 0, 1]),
            Err(FountainError::MalformedPacket(_))
        ));
        assert!(matches!(
            EncodingPacket::from_bytes(&[0, 0, 0, 1]),
            Err(FountainError::MalformedPacket(_))
        ));
    }

    #[test]
    fn transmission_info_layout() {
        let info = TransmissionInfo::new(10_000, 1400).unwrap();
        assert_eq!(info.source_symbols(), 8);
        let raw = info.to_bytes();
        assert_eq!(hex::encode(raw), "000000271000057801000101");
        assert_eq!(TransmissionInfo::from_bytes(&raw).unwrap(), info);
        assert!(TransmissionInfo::new(0, 10).is_err());
        assert!(TransmissionInfo::new(10, 0).is_err());
    }
}
