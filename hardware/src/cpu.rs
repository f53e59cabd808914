use std::sync::{Arc, Mutex};

use crate::interrupt::{InterruptVector, Irq};
use crate::memory::Memory;
use crate::mmu::Mmu;
use crate::program::Opcode;

/// Single execution unit. `pc == None` is the idle sentinel the dispatcher
/// leaves behind when no process owns the CPU.
#[derive(Clone)]
pub struct Cpu {
    pc: Arc<Mutex<Option<usize>>>,
    mmu: Mmu,
    memory: Memory,
    interrupt_vector: InterruptVector,
}

impl Cpu {
    pub fn new(mmu: Mmu, memory: Memory, interrupt_vector: InterruptVector) -> Self {
        Cpu {
            pc: Arc::new(Mutex::new(None)),
            mmu,
            memory,
            interrupt_vector,
        }
    }

    pub fn pc(&self) -> Option<usize> {
        *self.pc.lock().unwrap()
    }

    pub fn set_pc(&self, pc: Option<usize>) {
        *self.pc.lock().unwrap() = pc;
    }

    pub fn is_idle(&self) -> bool {
        self.pc().is_none()
    }

    /// Fetch and execute one instruction. A translation miss raises
    /// PAGE_FAULT and leaves the pc alone so the instruction retries once
    /// the kernel has brought the page in.
    pub fn tick(&self, tick: usize) {
        let Some(pc) = self.pc() else {
            return;
        };
        let Some(address) = self.mmu.translate(pc) else {
            log::debug!("tick {}: page fault at pc {}", tick, pc);
            self.interrupt_vector.raise(Irq::PageFault);
            return;
        };
        let opcode = self
            .memory
            .read(address)
            .expect("translated address out of memory range")
            .expect("fetched an empty memory cell");
        log::debug!("tick {}: exec {:?} at pc {}", tick, opcode, pc);
        match opcode {
            Opcode::Cpu => self.set_pc(Some(pc + 1)),
            Opcode::Io => {
                self.set_pc(Some(pc + 1));
                self.interrupt_vector.raise(Irq::IoIn {
                    instruction: opcode,
                });
            }
            Opcode::Exit => self.interrupt_vector.raise(Irq::Kill),
        }
    }
}
