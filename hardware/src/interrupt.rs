use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::program::{Opcode, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrqKind {
    New,
    Kill,
    IoIn,
    IoOut,
    Timeout,
    PageFault,
    Statistics,
}

/// An interrupt request together with its payload.
#[derive(Debug, Clone)]
pub enum Irq {
    New {
        path: String,
        program: Program,
        priority: u8,
    },
    Kill,
    IoIn {
        instruction: Opcode,
    },
    IoOut,
    Timeout,
    PageFault,
    Statistics {
        tick: usize,
    },
}

impl Irq {
    pub fn kind(&self) -> IrqKind {
        match self {
            Irq::New { .. } => IrqKind::New,
            Irq::Kill => IrqKind::Kill,
            Irq::IoIn { .. } => IrqKind::IoIn,
            Irq::IoOut => IrqKind::IoOut,
            Irq::Timeout => IrqKind::Timeout,
            Irq::PageFault => IrqKind::PageFault,
            Irq::Statistics { .. } => IrqKind::Statistics,
        }
    }
}

/// FIFO of raised interrupts. Hardware components push, the kernel drains
/// and dispatches before the next tick runs.
#[derive(Clone, Default)]
pub struct InterruptVector {
    pending: Arc<Mutex<VecDeque<Irq>>>,
}

impl InterruptVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self, irq: Irq) {
        log::debug!("irq raised: {:?}", irq.kind());
        self.pending.lock().unwrap().push_back(irq);
    }

    pub fn pop(&self) -> Option<Irq> {
        self.pending.lock().unwrap().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().unwrap().is_empty()
    }
}
