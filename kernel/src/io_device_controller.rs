use std::collections::VecDeque;

use hardware::{IoDevice, Opcode};

use crate::pcb::Pid;

/// Serializes access to the single I/O device: at most one operation in
/// flight, the rest wait in FIFO order.
pub struct IoDeviceController {
    device: IoDevice,
    waiting: VecDeque<(Pid, Opcode)>,
    current: Option<Pid>,
}

impl IoDeviceController {
    pub fn new(device: IoDevice) -> Self {
        IoDeviceController {
            device,
            waiting: VecDeque::new(),
            current: None,
        }
    }

    pub fn run_operation(&mut self, pid: Pid, instruction: Opcode) {
        log::debug!("pid {} queues {:?}", pid, instruction);
        self.waiting.push_back((pid, instruction));
        self.dispatch_next();
    }

    /// The process whose operation just completed. Starts the next queued
    /// operation, if any.
    pub fn finished_pid(&mut self) -> Pid {
        let pid = self
            .current
            .take()
            .expect("IO_OUT with no operation in flight");
        self.dispatch_next();
        pid
    }

    pub fn in_flight(&self) -> Option<Pid> {
        self.current
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    fn dispatch_next(&mut self) {
        if self.current.is_none() && self.device.is_idle() {
            if let Some((pid, instruction)) = self.waiting.pop_front() {
                self.current = Some(pid);
                self.device.execute(instruction);
            }
        }
    }
}
