use std::sync::{Arc, Mutex};

use crate::interrupt::{InterruptVector, Irq};
use crate::program::Opcode;

/// Fixed-latency I/O device: an operation keeps it busy for exactly
/// `device_time` ticks. It serves one operation at a time; queueing is
/// the kernel's job (see the device controller in the kernel crate).
#[derive(Clone)]
pub struct IoDevice {
    inner: Arc<Mutex<IoDeviceState>>,
    interrupt_vector: InterruptVector,
}

struct IoDeviceState {
    device_time: usize,
    busy: bool,
    count: usize,
}

impl IoDevice {
    pub fn new(device_time: usize, interrupt_vector: InterruptVector) -> Self {
        IoDevice {
            inner: Arc::new(Mutex::new(IoDeviceState {
                device_time,
                busy: false,
                count: 0,
            })),
            interrupt_vector,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.inner.lock().unwrap().busy
    }

    pub fn execute(&self, instruction: Opcode) {
        let mut state = self.inner.lock().unwrap();
        assert!(!state.busy, "device asked to execute while busy");
        log::debug!("io device starts {:?}", instruction);
        state.busy = true;
        state.count = 0;
    }

    pub fn tick(&self, tick: usize) {
        let mut state = self.inner.lock().unwrap();
        if !state.busy {
            return;
        }
        state.count += 1;
        if state.count >= state.device_time {
            state.busy = false;
            log::debug!("tick {}: io device finished", tick);
            self.interrupt_vector.raise(Irq::IoOut);
        }
    }
}
