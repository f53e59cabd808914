use hardware::{Cpu, Mmu};

use crate::memory_manager::PageTable;
use crate::pcb::{Pcb, ProcessState};

/// The only place process context crosses the hardware boundary. `load`
/// and `save` must pair up; the running slot in the PCB table is what
/// keeps them honest.
pub struct Dispatcher {
    cpu: Cpu,
    mmu: Mmu,
}

impl Dispatcher {
    pub fn new(cpu: Cpu, mmu: Mmu) -> Self {
        Dispatcher { cpu, mmu }
    }

    /// Installs the process's resident mappings (unmapped pages are left
    /// out; the first touch faults them in), restores its program counter
    /// and marks it Running.
    pub fn load(&self, pcb: &mut Pcb, page_table: &PageTable) {
        self.mmu.reset_translation_cache();
        for entry in page_table.entries() {
            if let Some(frame) = entry.frame() {
                self.mmu.set_page_frame(entry.page(), frame);
            }
        }
        self.cpu.set_pc(Some(pcb.program_counter()));
        pcb.set_status(ProcessState::Running);
        log::debug!("dispatch: pid {} loaded at pc {}", pcb.pid(), pcb.program_counter());
    }

    /// Saves the live program counter back into the PCB and idles the CPU.
    pub fn save(&self, pcb: &mut Pcb) {
        if let Some(pc) = self.cpu.pc() {
            pcb.set_program_counter(pc);
        }
        self.cpu.set_pc(None);
    }
}
