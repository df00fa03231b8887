//! HeapTuplePtr (HTP): a bit-exact 64-bit tuple address. Grounded on
//! the teacher's `ItemIdData`/`ItemPointerData` bitfield pattern,
//! redesigned per the wire layout in section 6:
//! `[blockNo:32][xid:16][bufferNo:8][itemNo:8]`.

use c2rust_bitfields::BitfieldStruct;

use crate::codec::ByteEncoded;
use crate::error::HeapResult;

#[derive(BitfieldStruct, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct HeapTuplePtr {
    #[bitfield(name = "item_no", ty = "u8", bits = "0..=7")]
    #[bitfield(name = "buffer_no", ty = "u8", bits = "8..=15")]
    #[bitfield(name = "xid", ty = "u16", bits = "16..=31")]
    #[bitfield(name = "block_no", ty = "u32", bits = "32..=63")]
    bytes: [u8; 8],
}

impl std::fmt::Debug for HeapTuplePtr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapTuplePtr")
            .field("block_no", &self.block_no())
            .field("xid", &self.xid())
            .field("buffer_no", &self.buffer_no())
            .field("item_no", &self.item_no())
            .finish()
    }
}

impl HeapTuplePtr {
    pub fn new(block_no: u32, xid: u16, buffer_no: u8, item_no: u8) -> Self {
        let mut htp = HeapTuplePtr::default();
        htp.set_block_no(block_no);
        htp.set_xid(xid);
        htp.set_buffer_no(buffer_no);
        htp.set_item_no(item_no);
        htp
    }

    /// The null HTP, used as a `not-yet-placed` sentinel.
    pub const INVALID: HeapTuplePtr = HeapTuplePtr { bytes: [0; 8] };

    pub fn is_valid(&self) -> bool {
        u64::from_le_bytes(self.bytes) != 0
    }

    pub fn as_u64(&self) -> u64 {
        u64::from_le_bytes(self.bytes)
    }

    pub fn from_u64(raw: u64) -> Self {
        HeapTuplePtr {
            bytes: raw.to_le_bytes(),
        }
    }
}

impl ByteEncoded for HeapTuplePtr {
    fn encode(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    fn decode(bytes: &[u8]) -> HeapResult<Self> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes[0..8]);
        Ok(HeapTuplePtr { bytes: buf })
    }

    fn encode_into_writer(&self, writer: &mut impl std::io::Write) -> HeapResult<()> {
        writer.write_all(&self.bytes)?;
        Ok(())
    }

    fn decode_from_reader(reader: &mut impl std::io::Read) -> HeapResult<Self> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(HeapTuplePtr { bytes: buf })
    }

    fn byte_size() -> u16 {
        8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_round_trip_through_the_bit_layout() {
        let htp = HeapTuplePtr::new(0x1234_5678, 0xABCD, 0x12, 0x34);
        assert_eq!(htp.block_no(), 0x1234_5678);
        assert_eq!(htp.xid(), 0xABCD);
        assert_eq!(htp.buffer_no(), 0x12);
        assert_eq!(htp.item_no(), 0x34);
    }

    #[test]
    fn encode_decode_round_trips() {
        let htp = HeapTuplePtr::new(42, 7, 1, 2);
        let encoded = htp.encode();
        let decoded = HeapTuplePtr::decode(&encoded).unwrap();
        assert_eq!(htp, decoded);
    }

    #[test]
    fn invalid_htp_is_the_zero_pattern() {
        assert!(!HeapTuplePtr::INVALID.is_valid());
        assert!(HeapTuplePtr::new(1, 0, 0, 0).is_valid());
    }

    #[test]
    fn bit_layout_matches_the_wire_format() {
        assert_eq!(HeapTuplePtr::new(1, 0, 0, 0).as_u64(), 0x1_0000_0000);
        assert_eq!(
            HeapTuplePtr::new(0x1234_5678, 0xABCD, 0x12, 0x34).as_u64(),
            (0x1234_5678u64 << 32) | (0xABCDu64 << 16) | (0x12u64 << 8) | 0x34u64
        );
    }
}
