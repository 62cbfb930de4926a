use super::errors::SimError;
use super::reference::MemoryReference;
use super::stats::ProcessStats;
use super::types::{FrameId, PageNumber, ProcessId};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A simulated process: its reference trace, page table and LRU bookkeeping
///
/// The page table is kept as two maps (`page -> frame` and `frame -> page`)
/// that always hold the same pairs. `last_used` has exactly one entry per
/// occupied frame.
#[derive(Debug, Clone)]
pub struct Process {
    id: ProcessId,
    trace: Vec<MemoryReference>,
    /// Index of the next reference to service
    cursor: usize,
    page_table: HashMap<PageNumber, FrameId>,
    frame_pages: HashMap<FrameId, PageNumber>,
    owned_frames: BTreeSet<FrameId>,
    last_used: HashMap<FrameId, u64>,
    clock: u64,
    /// Trace indices that already faulted; never shrinks
    faulted_once: HashSet<usize>,
    faults: usize,
    hits: usize,
    swap_accesses: usize,
    references_processed: usize,
    turns: usize,
}

impl Process {
    /// Create a process owning no frames
    pub fn new(id: ProcessId, trace: Vec<MemoryReference>) -> Self {
        Self {
            id,
            trace,
            cursor: 0,
            page_table: HashMap::new(),
            frame_pages: HashMap::new(),
            owned_frames: BTreeSet::new(),
            last_used: HashMap::new(),
            clock: 0,
            faulted_once: HashSet::new(),
            faults: 0,
            hits: 0,
            swap_accesses: 0,
            references_processed: 0,
            turns: 0,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn trace(&self) -> &[MemoryReference] {
        &self.trace
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_more(&self) -> bool {
        self.cursor < self.trace.len()
    }

    /// Return the reference at the cursor and advance past it
    pub fn next_reference(&mut self) -> Option<MemoryReference> {
        let reference = self.trace.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(reference)
    }

    /// Step the cursor back so the last reference is serviced again
    pub fn rewind_one(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn is_page_resident(&self, page: PageNumber) -> bool {
        self.page_table.contains_key(&page)
    }

    /// Frame holding `page`, if resident
    pub fn frame_of(&self, page: PageNumber) -> Option<FrameId> {
        self.page_table.get(&page).copied()
    }

    /// Page held in `frame`, if occupied
    pub fn page_in(&self, frame: FrameId) -> Option<PageNumber> {
        self.frame_pages.get(&frame).copied()
    }

    pub fn resident_pages(&self) -> usize {
        self.page_table.len()
    }

    pub fn owned_frames(&self) -> &BTreeSet<FrameId> {
        &self.owned_frames
    }

    pub fn owns_frame(&self, frame: FrameId) -> bool {
        self.owned_frames.contains(&frame)
    }

    /// Lowest-numbered owned frame that holds no page
    pub fn free_frame(&self) -> Option<FrameId> {
        self.owned_frames
            .iter()
            .copied()
            .find(|frame| !self.frame_pages.contains_key(frame))
    }

    /// Map `page` into `frame` and stamp the frame as most recently used
    pub fn load_page(&mut self, page: PageNumber, frame: FrameId) -> Result<(), SimError> {
        if !self.owned_frames.contains(&frame) {
            return Err(SimError::FrameNotOwned {
                process: self.id,
                frame,
            });
        }
        if self.frame_pages.contains_key(&frame) {
            return Err(SimError::FrameOccupied {
                process: self.id,
                frame,
            });
        }

        self.page_table.insert(page, frame);
        self.frame_pages.insert(frame, page);
        self.clock += 1;
        self.last_used.insert(frame, self.clock);
        Ok(())
    }

    /// Stamp the frame holding `page` as most recently used
    pub fn touch_page(&mut self, page: PageNumber) -> Result<(), SimError> {
        let frame = self.frame_of(page).ok_or(SimError::PageNotResident {
            process: self.id,
            page,
        })?;
        self.clock += 1;
        self.last_used.insert(frame, self.clock);
        Ok(())
    }

    /// Least recently used occupied frame; ties go to the lowest frame id
    pub fn pick_victim_frame(&self) -> Option<FrameId> {
        self.last_used
            .iter()
            .min_by_key(|(frame, stamp)| (**stamp, **frame))
            .map(|(frame, _)| *frame)
    }

    /// Last-use stamp of an occupied frame
    pub fn last_used(&self, frame: FrameId) -> Option<u64> {
        self.last_used.get(&frame).copied()
    }

    /// Unmap whatever page lives in `frame` and return it
    pub fn evict(&mut self, frame: FrameId) -> Option<PageNumber> {
        let page = self.frame_pages.remove(&frame)?;
        self.page_table.remove(&page);
        self.last_used.remove(&frame);
        Some(page)
    }

    /// Add frames to the owned set; they start out free
    pub fn grant_frames<I: IntoIterator<Item = FrameId>>(&mut self, frames: I) {
        self.owned_frames.extend(frames);
    }

    /// Give up every owned frame, dropping the residency state that referred to them
    pub fn release_frames(&mut self) -> Vec<FrameId> {
        self.page_table.clear();
        self.frame_pages.clear();
        self.last_used.clear();
        std::mem::take(&mut self.owned_frames).into_iter().collect()
    }

    pub fn record_fault(&mut self, index: usize) {
        self.faults += 1;
        self.faulted_once.insert(index);
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_swap(&mut self) {
        self.swap_accesses += 1;
    }

    /// Count a reference as fully serviced
    pub fn record_processed(&mut self) {
        self.references_processed += 1;
    }

    pub fn record_turn(&mut self) {
        self.turns += 1;
    }

    pub fn already_faulted(&self, index: usize) -> bool {
        self.faulted_once.contains(&index)
    }

    pub fn faults(&self) -> usize {
        self.faults
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn swap_accesses(&self) -> usize {
        self.swap_accesses
    }

    pub fn references_processed(&self) -> usize {
        self.references_processed
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn stats(&self) -> ProcessStats {
        ProcessStats {
            process: self.id,
            total: self.trace.len(),
            faults: self.faults,
            hits: self.hits,
            swap_accesses: self.swap_accesses,
            turns: self.turns,
        }
    }
}
