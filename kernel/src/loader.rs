use hardware::Program;

use crate::memory_manager::MemoryManager;
use crate::pcb::{Pcb, ProcessState};

/// Admits a program: sizes its page table and marks the process Ready.
/// No frame is touched here, demand paging does the rest.
#[derive(Default)]
pub struct Loader;

impl Loader {
    pub fn new() -> Self {
        Loader
    }

    pub fn load(&self, memory_manager: &mut MemoryManager, pcb: &mut Pcb, program: &Program) {
        let frame_size = memory_manager.frame_size();
        let mut pages = program.len() / frame_size;
        if program.len() % frame_size > 0 {
            pages += 1;
        }
        memory_manager.create_page_table(pcb.pid(), pages);
        pcb.set_status(ProcessState::Ready);
        log::debug!("pid {}: {} pages for {}", pcb.pid(), pages, pcb.path());
    }
}
