//! HeapPage: an 8KiB slot-directory page. Grounded on the teacher's
//! `PageHeaderData`/`ItemIdData`/`Page`: a fixed header, a line-pointer
//! directory that grows from just past the header towards higher
//! offsets as tuples are added, and a tuple area that grows from the
//! end of the page towards lower offsets. `pd_lower`/`pd_upper` name
//! the boundary between them exactly as the teacher's page header does.

use c2rust_bitfields::BitfieldStruct;

use crate::codec::{ByteEncoded, GetByteSliceExt};
use crate::error::{HeapError, HeapResult};
use crate::tuple::HeapTuple;

pub const PAGE_SIZE: u16 = 8192;
const HEADER_SIZE: u16 = 8;
const LINE_POINTER_SIZE: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpFlags {
    /// unused, available for immediate re-use
    Unused = 0,
    /// used, has associated tuple storage
    Normal = 1,
    /// dead, storage reclaimable on the next compaction
    Dead = 2,
}

/// A line pointer, packed the same way as the teacher's `ItemIdData`:
/// a 15-bit offset, a 2-bit flag, and a 15-bit length in 4 bytes.
#[derive(BitfieldStruct, Default, PartialEq, Eq, Clone, Copy)]
pub struct LinePointer {
    #[bitfield(name = "lp_off", ty = "u16", bits = "0..=14")]
    #[bitfield(name = "lp_flags", ty = "u8", bits = "15..=16")]
    #[bitfield(name = "lp_len", ty = "u16", bits = "17..=31")]
    lp: [u8; 4],
}

impl std::fmt::Debug for LinePointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinePointer")
            .field("lp_off", &self.lp_off())
            .field("lp_flags", &self.lp_flags())
            .field("lp_len", &self.lp_len())
            .finish()
    }
}

impl LinePointer {
    pub fn flags(&self) -> LpFlags {
        match self.lp_flags() {
            1 => LpFlags::Normal,
            2 => LpFlags::Dead,
            _ => LpFlags::Unused,
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self.flags(), LpFlags::Normal)
    }
}

impl ByteEncoded for LinePointer {
    fn encode(&self) -> Vec<u8> {
        self.lp.to_vec()
    }

    fn decode(bytes: &[u8]) -> HeapResult<Self> {
        let mut lp = [0u8; 4];
        lp.copy_from_slice(bytes.get_byte_slice(0, 4)?);
        Ok(LinePointer { lp })
    }

    fn encode_into_writer(&self, writer: &mut impl std::io::Write) -> HeapResult<()> {
        writer.write_all(&self.lp)?;
        Ok(())
    }

    fn decode_from_reader(reader: &mut impl std::io::Read) -> HeapResult<Self> {
        let mut lp = [0u8; 4];
        reader.read_exact(&mut lp)?;
        Ok(LinePointer { lp })
    }

    fn byte_size() -> u16 {
        4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapPageHeader {
    pub pd_lower: u16,
    pub pd_upper: u16,
    pub pd_special: u16,
    pub pd_flags: u16,
}

const PD_DIRTY: u16 = 0x0001;

impl HeapPageHeader {
    fn fresh() -> Self {
        HeapPageHeader {
            pd_lower: HEADER_SIZE,
            pd_upper: PAGE_SIZE,
            pd_special: PAGE_SIZE,
            pd_flags: 0,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.pd_flags & PD_DIRTY != 0
    }

    fn mark_dirty(&mut self) {
        self.pd_flags |= PD_DIRTY;
    }
}

impl ByteEncoded for HeapPageHeader {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend(self.pd_lower.encode());
        buf.extend(self.pd_upper.encode());
        buf.extend(self.pd_special.encode());
        buf.extend(self.pd_flags.encode());
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
        Ok(HeapPageHeader {
            pd_lower: u16::decode_from_reader(reader)?,
            pd_upper: u16::decode_from_reader(reader)?,
            pd_special: u16::decode_from_reader(reader)?,
            pd_flags: u16::decode_from_reader(reader)?,
        })
    }

    fn byte_size() -> u16 {
        HEADER_SIZE
    }
}

/// An in-memory 8KiB heap page: a directory of [`LinePointer`]s and
/// the tuple bytes they point into.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapPage {
    pub header: HeapPageHeader,
    pub line_pointers: Vec<LinePointer>,
}

impl HeapPage {
    pub fn new() -> Self {
        HeapPage {
            header: HeapPageHeader::fresh(),
            line_pointers: Vec::new(),
        }
    }

    pub fn free_space(&self) -> u16 {
        self.header.pd_upper.saturating_sub(self.header.pd_lower)
    }

    pub fn is_dirty(&self) -> bool {
        self.header.is_dirty()
    }

    /// `vh_heappage_addtuple`: reserves directory + tuple-area space
    /// for `tuple`, serializes it into the page, and returns the
    /// 1-based item number the caller should fold into an HTP.
    pub fn insert_tuple(&mut self, buffer: &mut [u8], tuple: &HeapTuple) -> HeapResult<u16> {
        let encoded = tuple.encode();
        let tuple_size = encoded.len() as u16;
        let needed = tuple_size + LINE_POINTER_SIZE;
        if self.free_space() < needed {
            return Err(HeapError::PageFull {
                needed,
                available: self.free_space(),
            });
        }

        let new_upper = self.header.pd_upper - tuple_size;
        buffer
            .get_byte_slice_mut(new_upper as usize, self.header.pd_upper as usize)?
            .copy_from_slice(&encoded);

        let mut lp = LinePointer::default();
        lp.set_lp_off(new_upper);
        lp.set_lp_len(tuple_size);
        lp.set_lp_flags(LpFlags::Normal as u8);
        self.line_pointers.push(lp);

        self.header.pd_upper = new_upper;
        self.header.pd_lower += LINE_POINTER_SIZE;
        self.header.mark_dirty();

        debug_assert!(self.header.pd_upper >= self.header.pd_lower);
        Ok(self.line_pointers.len() as u16)
    }

    pub fn get_tuple(&self, buffer: &[u8], item_no: u16) -> HeapResult<HeapTuple> {
        let lp = self.line_pointer(item_no)?;
        if !lp.is_normal() {
            return Err(HeapError::UnknownItem(item_no));
        }
        let bytes = buffer.get_byte_slice(lp.lp_off() as usize, (lp.lp_off() + lp.lp_len()) as usize)?;
        HeapTuple::decode(bytes)
    }

    /// `vh_heappage_markdead`: retains the slot but marks it
    /// reclaimable on the next [`HeapPage::compact`].
    pub fn mark_dead(&mut self, item_no: u16) -> HeapResult<()> {
        let idx = self.line_pointer_index(item_no)?;
        self.line_pointers[idx].set_lp_flags(LpFlags::Dead as u8);
        self.header.mark_dirty();
        Ok(())
    }

    /// Reclaims space held by dead tuples by rewriting the tuple area
    /// contiguously. The teacher leaves this as a commented-out stub;
    /// here it is load-bearing, since nothing else ever frees page
    /// space.
    pub fn compact(&mut self, buffer: &mut [u8]) -> HeapResult<()> {
        let mut live: Vec<(usize, Vec<u8>)> = Vec::new();
        for (idx, lp) in self.line_pointers.iter().enumerate() {
            if lp.is_normal() {
                let bytes =
                    buffer.get_byte_slice(lp.lp_off() as usize, (lp.lp_off() + lp.lp_len()) as usize)?;
                live.push((idx, bytes.to_vec()));
            }
        }

        let mut cursor = PAGE_SIZE;
        for (idx, bytes) in &live {
            let new_off = cursor - bytes.len() as u16;
            buffer
                .get_byte_slice_mut(new_off as usize, cursor as usize)?
                .copy_from_slice(bytes);
            self.line_pointers[*idx].set_lp_off(new_off);
            cursor = new_off;
        }

        for lp in self.line_pointers.iter_mut() {
            if !lp.is_normal() {
                *lp = LinePointer::default();
            }
        }

        self.header.pd_upper = cursor;
        Ok(())
    }

    fn line_pointer(&self, item_no: u16) -> HeapResult<&LinePointer> {
        let idx = self.line_pointer_index(item_no)?;
        Ok(&self.line_pointers[idx])
    }

    fn line_pointer_index(&self, item_no: u16) -> HeapResult<usize> {
        if item_no == 0 {
            return Err(HeapError::UnknownItem(item_no));
        }
        self.line_pointers
            .get(item_no as usize - 1)
            .map(|_| item_no as usize - 1)
            .ok_or(HeapError::UnknownItem(item_no))
    }
}

impl Default for HeapPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_buffer() -> Vec<u8> {
        vec![0u8; PAGE_SIZE as usize]
    }

    #[test]
    fn insert_then_read_round_trips() {
        let mut page = HeapPage::new();
        let mut buf = fresh_buffer();
        let tuple = HeapTuple::new(1, vec![1, 2, 3]);
        let item_no = page.insert_tuple(&mut buf, &tuple).unwrap();
        let read_back = page.get_tuple(&buf, item_no).unwrap();
        assert_eq!(read_back, tuple);
        assert!(page.is_dirty());
    }

    #[test]
    fn rejects_insert_when_full() {
        let mut page = HeapPage::new();
        let mut buf = fresh_buffer();
        let huge = HeapTuple::new(1, vec![0u8; PAGE_SIZE as usize]);
        assert!(matches!(
            page.insert_tuple(&mut buf, &huge),
            Err(HeapError::PageFull { .. })
        ));
    }

    #[test]
    fn compaction_reclaims_dead_tuple_space() {
        let mut page = HeapPage::new();
        let mut buf = fresh_buffer();
        let a = page.insert_tuple(&mut buf, &HeapTuple::new(1, vec![1; 100])).unwrap();
        let b = page.insert_tuple(&mut buf, &HeapTuple::new(1, vec![2; 100])).unwrap();

        page.mark_dead(a).unwrap();
        let before = page.free_space();
        page.compact(&mut buf).unwrap();
        assert!(page.free_space() > before);

        let still_live = page.get_tuple(&buf, b).unwrap();
        assert_eq!(still_live.data, vec![2; 100]);
    }

    #[test]
    fn unknown_item_is_an_error() {
        let page = HeapPage::new();
        let buf = fresh_buffer();
        assert!(matches!(
            page.get_tuple(&buf, 1),
            Err(HeapError::UnknownItem(1))
        ));
    }
}
