use std::sync::{Arc, Mutex};

use crate::cpu::Cpu;
use crate::interrupt::{InterruptVector, Irq};

/// Quantum countdown in front of the CPU. With no quantum configured it
/// just forwards ticks; with one it raises TIMEOUT instead of running the
/// CPU once the running process has used its slice.
#[derive(Clone)]
pub struct Timer {
    inner: Arc<Mutex<TimerState>>,
    cpu: Cpu,
    interrupt_vector: InterruptVector,
}

struct TimerState {
    quantum: Option<usize>,
    count: usize,
}

impl Timer {
    pub fn new(cpu: Cpu, interrupt_vector: InterruptVector) -> Self {
        Timer {
            inner: Arc::new(Mutex::new(TimerState {
                quantum: None,
                count: 0,
            })),
            cpu,
            interrupt_vector,
        }
    }

    pub fn set_quantum(&self, quantum: usize) {
        assert!(quantum > 0, "quantum must be positive");
        self.inner.lock().unwrap().quantum = Some(quantum);
    }

    pub fn quantum(&self) -> Option<usize> {
        self.inner.lock().unwrap().quantum
    }

    pub fn reset(&self) {
        self.inner.lock().unwrap().count = 0;
    }

    pub fn tick(&self, tick: usize) {
        if self.cpu.is_idle() {
            return;
        }
        {
            let mut state = self.inner.lock().unwrap();
            if let Some(quantum) = state.quantum {
                if state.count >= quantum {
                    log::debug!("tick {}: quantum expired", tick);
                    self.interrupt_vector.raise(Irq::Timeout);
                    return;
                }
                state.count += 1;
            }
        }
        self.cpu.tick(tick);
    }
}
