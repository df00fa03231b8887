//! HeapBuffer: the in-memory page pool. Since durable on-disk storage
//! is an explicit non-goal, every page lives in this pool for its
//! whole life -- there is no eviction-and-refetch-from-disk path, so
//! `buffer_no` in a [`HeapTuplePtr`] is always simply the pool slot
//! the block lives in.

use vh_util::{Arena, ArenaIndex};

use crate::error::{HeapError, HeapResult};
use crate::htp::HeapTuplePtr;
use crate::page::{HeapPage, PAGE_SIZE};
use crate::tuple::HeapTuple;

struct BufferedPage {
    page: HeapPage,
    bytes: Vec<u8>,
}

impl BufferedPage {
    fn fresh() -> Self {
        BufferedPage {
            page: HeapPage::new(),
            bytes: vec![0u8; PAGE_SIZE as usize],
        }
    }
}

/// The heap's page pool, keyed by block number. `insert_tuple` always
/// targets the most recently allocated page with room, mirroring the
/// teacher's "append to the last reserved slot" allocation strategy;
/// a fuller implementation would track a free-space map across
/// blocks, left for a future pass (no caller currently needs it).
pub struct HeapBuffer {
    pages: Arena<BufferedPage>,
    current: Option<ArenaIndex<BufferedPage>>,
}

impl HeapBuffer {
    pub fn new() -> Self {
        HeapBuffer {
            pages: Arena::new(),
            current: None,
        }
    }

    fn allocate_page(&mut self) -> ArenaIndex<BufferedPage> {
        let idx = self.pages.insert(BufferedPage::fresh());
        self.current = Some(idx);
        idx
    }

    /// Inserts `tuple` under transaction `xid`, allocating a fresh
    /// page when the current one has no room, and returns the HTP the
    /// caller should store as the tuple's address.
    pub fn insert_tuple(&mut self, xid: u16, tuple: &HeapTuple) -> HeapResult<HeapTuplePtr> {
        let idx = match self.current {
            Some(idx) if self.pages.get(idx).is_some() => idx,
            _ => self.allocate_page(),
        };

        let item_no = {
            let buffered = self.pages.get_mut(idx).expect("current page must be live");
            match buffered.page.insert_tuple(&mut buffered.bytes, tuple) {
                Ok(item_no) => item_no,
                Err(HeapError::PageFull { .. }) => {
                    let idx = self.allocate_page();
                    let buffered = self.pages.get_mut(idx).expect("just allocated");
                    buffered.page.insert_tuple(&mut buffered.bytes, tuple)?
                }
                Err(err) => return Err(err),
            }
        };

        let current = self.current.expect("allocate_page always sets current");
        Ok(HeapTuplePtr::new(
            current.raw_index(),
            xid,
            current.raw_index() as u8,
            item_no as u8,
        ))
    }

    pub fn get_tuple(&self, htp: HeapTuplePtr) -> HeapResult<HeapTuple> {
        let idx = self.index_for(htp)?;
        let buffered = self.pages.get(idx).ok_or(HeapError::UnknownBlock(htp))?;
        buffered.page.get_tuple(&buffered.bytes, htp.item_no() as u16)
    }

    pub fn mark_dead(&mut self, htp: HeapTuplePtr) -> HeapResult<()> {
        let idx = self.index_for(htp)?;
        let buffered = self.pages.get_mut(idx).ok_or(HeapError::UnknownBlock(htp))?;
        buffered.page.mark_dead(htp.item_no() as u16)
    }

    pub fn compact(&mut self, htp: HeapTuplePtr) -> HeapResult<()> {
        let idx = self.index_for(htp)?;
        let buffered = self.pages.get_mut(idx).ok_or(HeapError::UnknownBlock(htp))?;
        buffered.page.compact(&mut buffered.bytes)
    }

    pub fn is_dirty(&self, htp: HeapTuplePtr) -> HeapResult<bool> {
        let idx = self.index_for(htp)?;
        Ok(self
            .pages
            .get(idx)
            .ok_or(HeapError::UnknownBlock(htp))?
            .page
            .is_dirty())
    }

    fn index_for(&self, htp: HeapTuplePtr) -> HeapResult<ArenaIndex<BufferedPage>> {
        self.pages
            .iter()
            .find(|(idx, _)| idx.raw_index() == htp.block_no())
            .map(|(idx, _)| idx)
            .ok_or(HeapError::UnknownBuffer(htp))
    }
}

impl Default for HeapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let mut buffer = HeapBuffer::new();
        let tuple = HeapTuple::new(1, vec![9, 9, 9]);
        let htp = buffer.insert_tuple(1, &tuple).unwrap();
        assert_eq!(buffer.get_tuple(htp).unwrap(), tuple);
    }

    #[test]
    fn overflowing_a_page_allocates_a_new_one() {
        let mut buffer = HeapBuffer::new();
        let big = HeapTuple::new(1, vec![0u8; 6000]);
        let first = buffer.insert_tuple(1, &big).unwrap();
        let second = buffer.insert_tuple(1, &big).unwrap();
        assert_ne!(first.block_no(), second.block_no());
    }

    #[test]
    fn mark_dead_then_compact_frees_space_without_losing_other_tuples() {
        let mut buffer = HeapBuffer::new();
        let a = buffer.insert_tuple(1, &HeapTuple::new(1, vec![1; 50])).unwrap();
        let b = buffer.insert_tuple(1, &HeapTuple::new(1, vec![2; 50])).unwrap();

        buffer.mark_dead(a).unwrap();
        buffer.compact(b).unwrap();

        assert!(buffer.get_tuple(b).is_ok());
        assert!(buffer.get_tuple(a).is_err());
    }

    #[test]
    fn unknown_block_is_an_error() {
        let buffer = HeapBuffer::new();
        let htp = HeapTuplePtr::new(99, 0, 99, 1);
        assert!(matches!(
            buffer.get_tuple(htp),
            Err(HeapError::UnknownBuffer(_))
        ));
    }
}
