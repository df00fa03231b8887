//! HeapTuple: the in-memory payload a page slot points at. Grounded
//! on the teacher's `HeapTupleHeaderData`, with the MVCC visibility
//! fields (`t_xmin`/`t_xmax`/`t_ctid`) dropped -- this engine tracks
//! shard/xid placement in [`crate::htp::HeapTuplePtr`] itself and has
//! no on-disk WAL to replay, so carrying per-tuple transaction fields
//! would be dead weight (see SPEC_FULL.md section 3.1).

use bitflags::bitflags;

use crate::codec::ByteEncoded;
use crate::error::HeapResult;

bitflags! {
    /// Mirrors the subset of the teacher's `t_infomask` bits that
    /// still apply once visibility tracking moves out of the tuple:
    /// nullability and variable-width-payload bookkeeping.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeapTupleFlags: u16 {
        const HAS_NULLS    = 0x0001;
        const HAS_VARWIDTH = 0x0002;
    }
}

/// A single in-memory tuple, stored as a fixed header plus a
/// variable-length payload.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapTuple {
    /// number of catalog fields this tuple carries
    pub num_fields: u16,
    pub flags: HeapTupleFlags,
    /// offset to user data, mirrors `t_hoff` -- kept so a null bitmap
    /// can be inserted ahead of `data` without relayout
    pub data_offset: u8,
    /// null bitmap, one bit per field, present iff `HAS_NULLS` is set
    pub null_bitmap: Vec<u8>,
    pub data: Vec<u8>,
}

impl HeapTuple {
    pub fn new(num_fields: u16, data: Vec<u8>) -> Self {
        HeapTuple {
            num_fields,
            flags: HeapTupleFlags::empty(),
            data_offset: 0,
            null_bitmap: Vec::new(),
            data,
        }
    }

    pub fn with_nulls(mut self, null_bitmap: Vec<u8>) -> Self {
        if null_bitmap.iter().any(|b| *b != 0) {
            self.flags |= HeapTupleFlags::HAS_NULLS;
        }
        self.null_bitmap = null_bitmap;
        self
    }

    pub fn is_field_null(&self, field_idx: u16) -> bool {
        if !self.flags.contains(HeapTupleFlags::HAS_NULLS) {
            return false;
        }
        let byte = (field_idx / 8) as usize;
        let bit = field_idx % 8;
        self.null_bitmap
            .get(byte)
            .map(|b| b & (1 << bit) != 0)
            .unwrap_or(false)
    }
}

impl ByteEncoded for HeapTuple {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend(self.num_fields.encode());
        buf.extend(self.flags.bits().encode());
        buf.extend(self.data_offset.encode());
        buf.extend((self.null_bitmap.len() as u16).encode());
        buf.extend(&self.null_bitmap);
        buf.extend(&self.data);
        buf
    }

    fn decode(bytes: &[u8]) -> HeapResult<Self> {
        Self::decode_from_reader(&mut std::io::Cursor::new(bytes))
    }

    fn encode_into_writer(&self, writer: &mut impl std::io::Write) -> HeapResult<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }

    fn decode_from_reader(reader: &mut impl std::io::Read) -> HeapResult<Self> {
        let num_fields = u16::decode_from_reader(reader)?;
        let flags = HeapTupleFlags::from_bits_truncate(u16::decode_from_reader(reader)?);
        let data_offset = u8::decode_from_reader(reader)?;
        let bitmap_len = u16::decode_from_reader(reader)? as usize;
        let mut null_bitmap = vec![0u8; bitmap_len];
        reader.read_exact(&mut null_bitmap)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(HeapTuple {
            num_fields,
            flags,
            data_offset,
            null_bitmap,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encoding() {
        let tuple = HeapTuple::new(3, vec![1, 2, 3, 4]).with_nulls(vec![0b010]);
        let encoded = tuple.encode();
        let decoded = HeapTuple::decode(&encoded).unwrap();
        assert_eq!(tuple, decoded);
    }

    #[test]
    fn null_bitmap_reports_the_right_field() {
        let tuple = HeapTuple::new(3, vec![]).with_nulls(vec![0b010]);
        assert!(!tuple.is_field_null(0));
        assert!(tuple.is_field_null(1));
        assert!(!tuple.is_field_null(2));
    }

    #[test]
    fn empty_bitmap_means_no_field_is_null() {
        let tuple = HeapTuple::new(2, vec![1, 2]);
        assert!(!tuple.is_field_null(0));
        assert!(!tuple.is_field_null(1));
    }
}
