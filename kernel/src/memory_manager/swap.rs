use std::collections::HashMap;

use hardware::{Opcode, Program};

use crate::file_system::{FileSystem, FileSystemError};
use crate::pcb::Pid;

/// What happens to a swap-cache entry once the page comes back in.
/// `Retain` keeps entries forever; `Reclaim` consumes them on hit,
/// which is safe because program memory is read-only and the image
/// stays the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Retain,
    Reclaim,
}

/// Cold storage for evicted pages: one frame-sized block per evicted
/// `(pid, page)`, plus access to the program images pages are first
/// loaded from.
pub struct Swap {
    file_system: FileSystem,
    policy: CachePolicy,
    cache: HashMap<(Pid, usize), Vec<Option<Opcode>>>,
}

impl Swap {
    pub fn new(file_system: FileSystem, policy: CachePolicy) -> Self {
        Swap {
            file_system,
            policy,
            cache: HashMap::new(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn add_cache(&mut self, pid: Pid, page: usize, block: Vec<Option<Opcode>>) {
        log::debug!("swap out: caching page {} of pid {}", page, pid);
        self.cache.insert((pid, page), block);
    }

    /// The frame block stored when `(pid, page)` was evicted. Under
    /// `Reclaim` the entry is consumed.
    pub fn read_cache(&mut self, pid: Pid, page: usize) -> Vec<Option<Opcode>> {
        let block = match self.policy {
            CachePolicy::Retain => self.cache.get(&(pid, page)).cloned(),
            CachePolicy::Reclaim => self.cache.remove(&(pid, page)),
        };
        block.unwrap_or_else(|| panic!("page {} of pid {} is not in the swap cache", page, pid))
    }

    pub fn program_image(&self, path: &str) -> Result<Program, FileSystemError> {
        self.file_system.read(path)
    }

    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardware::asm;

    fn swap_with(policy: CachePolicy) -> Swap {
        let file_system = FileSystem::new();
        file_system.write("prg.exe", Program::new(vec![asm::cpu(3)]));
        Swap::new(file_system, policy)
    }

    #[test]
    fn test_retain_keeps_entries_across_hits() {
        let mut swap = swap_with(CachePolicy::Retain);
        swap.add_cache(0, 1, vec![Some(Opcode::Cpu); 4]);
        assert_eq!(swap.read_cache(0, 1), vec![Some(Opcode::Cpu); 4]);
        assert_eq!(swap.cached_pages(), 1);
    }

    #[test]
    fn test_reclaim_consumes_entries() {
        let mut swap = swap_with(CachePolicy::Reclaim);
        swap.add_cache(0, 1, vec![Some(Opcode::Cpu); 4]);
        let _ = swap.read_cache(0, 1);
        assert_eq!(swap.cached_pages(), 0);
    }

    #[test]
    #[should_panic(expected = "not in the swap cache")]
    fn test_missing_cache_entry_panics() {
        let mut swap = swap_with(CachePolicy::Retain);
        let _ = swap.read_cache(3, 0);
    }

    #[test]
    fn test_program_image_lookup() {
        let swap = swap_with(CachePolicy::Retain);
        assert!(swap.program_image("prg.exe").is_ok());
        assert_eq!(
            swap.program_image("nope.exe"),
            Err(FileSystemError::ProgramNotFound)
        );
    }
}
