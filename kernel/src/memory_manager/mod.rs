pub mod page_table;
pub mod swap;
pub mod victim_selection;

use std::collections::{HashMap, VecDeque};

use hardware::{Memory, MemoryError};

pub use page_table::{PageTable, PageTableEntry};
pub use swap::{CachePolicy, Swap};
pub use victim_selection::{FrameEntry, FrameLedger, VictimSelection};

use crate::pcb::{Pcb, Pid};

/// Orchestrates frame allocation: page tables, the free pool, the usage
/// ledger the victim policy works on, and swap-in/swap-out.
///
/// Every frame belongs to exactly one of {free pool, some page table};
/// the ledger tracks exactly the mapped ones.
pub struct MemoryManager {
    frame_size: usize,
    free_frames: VecDeque<usize>,
    used_frames: FrameLedger,
    page_tables: HashMap<Pid, PageTable>,
    swap: Swap,
    victim: Box<dyn VictimSelection>,
    memory: Memory,
}

impl MemoryManager {
    pub fn new(memory: Memory, frame_size: usize, swap: Swap, victim: Box<dyn VictimSelection>) -> Self {
        let frames = memory.size() / frame_size;
        assert!(frames > 0, "at least one frame is required");
        MemoryManager {
            frame_size,
            free_frames: (0..frames).collect(),
            used_frames: FrameLedger::new(),
            page_tables: HashMap::new(),
            swap,
            victim,
            memory,
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn create_page_table(&mut self, pid: Pid, pages: usize) {
        self.page_tables.insert(pid, PageTable::new(pid, pages));
    }

    pub fn page_table(&self, pid: Pid) -> Option<&PageTable> {
        self.page_tables.get(&pid)
    }

    /// Backs `page` of the given process with a frame, evicting one first
    /// when the free pool is dry, and copies the page content in.
    pub fn alloc_frames(&mut self, pcb: &Pcb, page: usize) -> Result<(), MemoryError> {
        let pid = pcb.pid();
        let frame = match self.free_frames.pop_front() {
            Some(frame) => frame,
            None => self.swap_out()?,
        };
        self.swap_in(pid, page, frame, pcb.path())?;
        self.page_tables
            .get_mut(&pid)
            .unwrap_or_else(|| panic!("no page table for pid {}", pid))
            .entry_mut(page)
            .set_frame(Some(frame));
        self.used_frames.push_back(FrameEntry {
            frame,
            reference_bit: true,
        });
        log::debug!("pid {}: page {} now in frame {}", pid, page, frame);
        Ok(())
    }

    /// Copies the page content into the frame. The source of truth is the
    /// swap cache when the page was evicted, the program image otherwise
    /// (clipped to the image's end for a partial final page).
    fn swap_in(&mut self, pid: Pid, page: usize, frame: usize, path: &str) -> Result<(), MemoryError> {
        let base = frame * self.frame_size;
        let swapped_out = self
            .page_tables
            .get(&pid)
            .unwrap_or_else(|| panic!("no page table for pid {}", pid))
            .entry(page)
            .swapped_out();
        if swapped_out {
            let block = self.swap.read_cache(pid, page);
            for (offset, cell) in block.iter().enumerate().take(self.frame_size) {
                self.memory.write(base + offset, *cell)?;
            }
            if self.swap.policy() == CachePolicy::Reclaim {
                self.page_tables
                    .get_mut(&pid)
                    .unwrap_or_else(|| panic!("no page table for pid {}", pid))
                    .entry_mut(page)
                    .set_swapped_out(false);
            }
        } else {
            let program = self
                .swap
                .program_image(path)
                .unwrap_or_else(|_| panic!("program image {} is missing", path));
            let start = page * self.frame_size;
            let end = usize::min(start + self.frame_size, program.len());
            for (offset, index) in (start..end).enumerate() {
                self.memory
                    .write(base + offset, Some(program.instructions()[index]))?;
            }
        }
        Ok(())
    }

    /// Evicts one frame chosen by the victim policy: its content goes to
    /// the swap cache, every mapping to it is cut, and the frame id is
    /// returned for immediate reuse.
    fn swap_out(&mut self) -> Result<usize, MemoryError> {
        let frame = self
            .victim
            .get_victim_frame(&mut self.used_frames, &self.page_tables);
        let base = frame * self.frame_size;
        let mut block = Vec::with_capacity(self.frame_size);
        for offset in 0..self.frame_size {
            block.push(self.memory.read(base + offset)?);
        }
        let swap = &mut self.swap;
        for table in self.page_tables.values_mut() {
            for entry in table.entries_mut() {
                if entry.frame() == Some(frame) {
                    entry.set_frame(None);
                    entry.set_swapped_out(true);
                    swap.add_cache(entry.pid(), entry.page(), block.clone());
                }
            }
        }
        log::debug!("evicted frame {}", frame);
        Ok(frame)
    }

    /// Releases every resident frame of the process back to the free pool
    /// and drops its page table. Ledger entries of the freed frames go
    /// with them, keeping the frame partition intact.
    pub fn set_free_frames(&mut self, pid: Pid) {
        let Some(mut table) = self.page_tables.remove(&pid) else {
            return;
        };
        for entry in table.entries_mut() {
            if let Some(frame) = entry.frame() {
                entry.set_frame(None);
                self.free_frames.push_back(frame);
                if let Some(position) = self
                    .used_frames
                    .iter()
                    .position(|ledger_entry| ledger_entry.frame == frame)
                {
                    self.used_frames.remove(position);
                }
            }
        }
    }

    /// Tells the victim policy which page the dispatched process is
    /// standing on, so recency and reference bits stay current.
    pub fn reorder_frames(&mut self, pcb: &Pcb) {
        let page = pcb.program_counter() / self.frame_size;
        if let Some(table) = self.page_tables.get(&pcb.pid()) {
            self.victim.on_access(page, table, &mut self.used_frames);
        }
    }

    pub fn swap(&self) -> &Swap {
        &self.swap
    }

    pub fn total_frames(&self) -> usize {
        self.memory.size() / self.frame_size
    }

    pub fn free_frames(&self) -> Vec<usize> {
        self.free_frames.iter().copied().collect()
    }

    pub fn ledger_frames(&self) -> Vec<usize> {
        self.used_frames.iter().map(|entry| entry.frame).collect()
    }

    pub fn mapped_frames(&self) -> Vec<usize> {
        self.page_tables
            .values()
            .flat_map(|table| table.entries().iter().filter_map(|entry| entry.frame()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::victim_selection::VictimSelectionFifo;
    use super::*;
    use crate::file_system::FileSystem;
    use hardware::{asm, Opcode, Program};

    fn manager(memory_size: usize, policy: CachePolicy) -> MemoryManager {
        let file_system = FileSystem::new();
        // CPU IO CPU CPU | CPU CPU CPU EXIT
        file_system.write(
            "prg.exe",
            Program::new(vec![asm::cpu(1), asm::io(), asm::cpu(5)]),
        );
        let memory = Memory::new(memory_size);
        let swap = Swap::new(file_system, policy);
        MemoryManager::new(memory, 4, swap, Box::new(VictimSelectionFifo))
    }

    fn assert_frame_partition(manager: &MemoryManager) {
        let mut free = manager.free_frames();
        let mut mapped = manager.mapped_frames();
        let mut ledger = manager.ledger_frames();
        free.sort_unstable();
        mapped.sort_unstable();
        ledger.sort_unstable();
        assert_eq!(ledger, mapped, "ledger tracks exactly the mapped frames");
        let mut all: Vec<usize> = free.iter().chain(mapped.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..manager.total_frames()).collect::<Vec<_>>());
    }

    #[test]
    fn test_demand_alloc_takes_free_frames_in_order() {
        let mut manager = manager(16, CachePolicy::Retain);
        let pcb = Pcb::new(0, 1, "prg.exe");
        manager.create_page_table(0, 2);
        manager.alloc_frames(&pcb, 0).unwrap();
        manager.alloc_frames(&pcb, 1).unwrap();
        let table = manager.page_table(0).unwrap();
        assert_eq!(table.frame_of(0), Some(0));
        assert_eq!(table.frame_of(1), Some(1));
        assert_frame_partition(&manager);
    }

    #[test]
    fn test_exhausted_pool_triggers_eviction() {
        let mut manager = manager(4, CachePolicy::Retain);
        let pcb = Pcb::new(0, 1, "prg.exe");
        manager.create_page_table(0, 2);
        manager.alloc_frames(&pcb, 0).unwrap();
        manager.alloc_frames(&pcb, 1).unwrap();
        let table = manager.page_table(0).unwrap();
        assert_eq!(table.frame_of(0), None);
        assert!(table.entry(0).swapped_out());
        assert_eq!(table.frame_of(1), Some(0));
        assert_eq!(manager.swap().cached_pages(), 1);
        assert_frame_partition(&manager);
    }

    #[test]
    fn test_swapped_page_round_trips_byte_identical() {
        let mut manager = manager(4, CachePolicy::Retain);
        let pcb = Pcb::new(0, 1, "prg.exe");
        manager.create_page_table(0, 2);
        manager.alloc_frames(&pcb, 0).unwrap();
        let before: Vec<_> = (0..4).map(|address| manager.memory.read(address).unwrap()).collect();
        assert_eq!(
            before,
            vec![
                Some(Opcode::Cpu),
                Some(Opcode::Io),
                Some(Opcode::Cpu),
                Some(Opcode::Cpu)
            ]
        );
        manager.alloc_frames(&pcb, 1).unwrap();
        manager.alloc_frames(&pcb, 0).unwrap();
        let after: Vec<_> = (0..4).map(|address| manager.memory.read(address).unwrap()).collect();
        assert_eq!(after, before);
        assert_frame_partition(&manager);
    }

    #[test]
    fn test_reclaim_policy_consumes_the_cache_entry() {
        let mut manager = manager(4, CachePolicy::Reclaim);
        let pcb = Pcb::new(0, 1, "prg.exe");
        manager.create_page_table(0, 2);
        manager.alloc_frames(&pcb, 0).unwrap();
        manager.alloc_frames(&pcb, 1).unwrap();
        manager.alloc_frames(&pcb, 0).unwrap();
        assert_eq!(manager.swap().cached_pages(), 1); // page 1 only
        assert!(!manager.page_table(0).unwrap().entry(0).swapped_out());
    }

    #[test]
    fn test_free_on_termination_purges_ledger() {
        let mut manager = manager(16, CachePolicy::Retain);
        let pcb = Pcb::new(0, 1, "prg.exe");
        manager.create_page_table(0, 2);
        manager.alloc_frames(&pcb, 0).unwrap();
        manager.alloc_frames(&pcb, 1).unwrap();
        manager.set_free_frames(0);
        assert!(manager.page_table(0).is_none());
        assert_eq!(manager.ledger_frames(), Vec::<usize>::new());
        assert_eq!(manager.free_frames().len(), manager.total_frames());
    }

    #[test]
    fn test_partial_final_page_is_clipped() {
        let mut manager = manager(16, CachePolicy::Retain);
        let file_system = FileSystem::new();
        // 5 instructions + EXIT: the second page holds only 2 cells.
        file_system.write("short.exe", Program::new(vec![asm::cpu(5)]));
        manager.swap = Swap::new(file_system, CachePolicy::Retain);
        let pcb = Pcb::new(0, 1, "short.exe");
        manager.create_page_table(0, 2);
        manager.alloc_frames(&pcb, 1).unwrap();
        let frame = manager.page_table(0).unwrap().frame_of(1).unwrap();
        let base = frame * 4;
        assert_eq!(manager.memory.read(base).unwrap(), Some(Opcode::Cpu));
        assert_eq!(manager.memory.read(base + 1).unwrap(), Some(Opcode::Exit));
        assert_eq!(manager.memory.read(base + 2).unwrap(), None);
    }
}
