use std::collections::{HashMap, VecDeque};

use crate::memory_manager::page_table::PageTable;
use crate::pcb::Pid;

/// One ledger slot: a frame currently backing some page, plus the
/// reference bit Second-Chance works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEntry {
    pub frame: usize,
    pub reference_bit: bool,
}

/// Ordered ledger of frames with live mappings. A frame appears here iff
/// some page table entry maps to it.
pub type FrameLedger = VecDeque<FrameEntry>;

/// Eviction policy over the frame usage ledger.
pub trait VictimSelection {
    /// Records that `page` was just referenced.
    fn on_access(&mut self, page: usize, page_table: &PageTable, ledger: &mut FrameLedger);

    /// Chooses one frame to evict and removes it from the ledger.
    /// Panics if the ledger is empty: no resident frame means the machine
    /// was configured with no usable memory.
    fn get_victim_frame(
        &mut self,
        ledger: &mut FrameLedger,
        page_tables: &HashMap<Pid, PageTable>,
    ) -> usize;
}

fn touched_frame(page: usize, page_table: &PageTable) -> Option<usize> {
    page_table.frame_of(page)
}

fn move_to_tail(frame: usize, reference_bit: bool, ledger: &mut FrameLedger) {
    if let Some(position) = ledger.iter().position(|entry| entry.frame == frame) {
        ledger.remove(position);
        ledger.push_back(FrameEntry {
            frame,
            reference_bit,
        });
    }
}

/// Evicts in allocation order, ignoring accesses.
#[derive(Default)]
pub struct VictimSelectionFifo;

impl VictimSelection for VictimSelectionFifo {
    fn on_access(&mut self, _page: usize, _page_table: &PageTable, _ledger: &mut FrameLedger) {}

    fn get_victim_frame(
        &mut self,
        ledger: &mut FrameLedger,
        _page_tables: &HashMap<Pid, PageTable>,
    ) -> usize {
        ledger
            .pop_front()
            .expect("no resident frames to evict")
            .frame
    }
}

/// Keeps the ledger in recency order; the head is the least recently used.
#[derive(Default)]
pub struct VictimSelectionLru;

impl VictimSelection for VictimSelectionLru {
    fn on_access(&mut self, page: usize, page_table: &PageTable, ledger: &mut FrameLedger) {
        if let Some(frame) = touched_frame(page, page_table) {
            move_to_tail(frame, true, ledger);
        }
    }

    fn get_victim_frame(
        &mut self,
        ledger: &mut FrameLedger,
        _page_tables: &HashMap<Pid, PageTable>,
    ) -> usize {
        ledger
            .pop_front()
            .expect("no resident frames to evict")
            .frame
    }
}

/// Clock scan: a set reference bit buys the frame one more trip to the
/// tail; the first clear bit found from the head is evicted.
#[derive(Default)]
pub struct VictimSelectionSecondChance;

impl VictimSelection for VictimSelectionSecondChance {
    fn on_access(&mut self, page: usize, page_table: &PageTable, ledger: &mut FrameLedger) {
        if let Some(frame) = touched_frame(page, page_table) {
            move_to_tail(frame, true, ledger);
        }
    }

    fn get_victim_frame(
        &mut self,
        ledger: &mut FrameLedger,
        _page_tables: &HashMap<Pid, PageTable>,
    ) -> usize {
        loop {
            let mut entry = ledger.pop_front().expect("no resident frames to evict");
            if entry.reference_bit {
                entry.reference_bit = false;
                ledger.push_back(entry);
            } else {
                return entry.frame;
            }
        }
    }
}
