use crate::pcb::Pid;

/// One page of a process's address space: the frame it lives in (if any)
/// and whether its content currently sits in the swap cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTableEntry {
    pid: Pid,
    page: usize,
    frame: Option<usize>,
    swapped_out: bool,
}

impl PageTableEntry {
    pub fn new(pid: Pid, page: usize) -> Self {
        PageTableEntry {
            pid,
            page,
            frame: None,
            swapped_out: false,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn frame(&self) -> Option<usize> {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Option<usize>) {
        self.frame = frame;
    }

    pub fn swapped_out(&self) -> bool {
        self.swapped_out
    }

    pub fn set_swapped_out(&mut self, swapped_out: bool) {
        self.swapped_out = swapped_out;
    }
}

/// Per-process virtual-to-physical mapping. Entries start unmapped: pure
/// demand paging, no frame is assigned before the first fault.
#[derive(Debug, Clone)]
pub struct PageTable {
    pid: Pid,
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    pub fn new(pid: Pid, pages: usize) -> Self {
        let entries = (0..pages).map(|page| PageTableEntry::new(pid, page)).collect();
        PageTable { pid, entries }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn entries(&self) -> &[PageTableEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [PageTableEntry] {
        &mut self.entries
    }

    pub fn entry(&self, page: usize) -> &PageTableEntry {
        &self.entries[page]
    }

    pub fn entry_mut(&mut self, page: usize) -> &mut PageTableEntry {
        &mut self.entries[page]
    }

    pub fn frame_of(&self, page: usize) -> Option<usize> {
        self.entries.get(page)?.frame()
    }
}
