use crate::pcb::{Pcb, Pid};

/// Owns every PCB in the system plus the single running slot. Pids are
/// handed out by a strictly increasing counter and never reused.
#[derive(Default)]
pub struct PcbTable {
    pcbs: Vec<Pcb>,
    running: Option<Pid>,
    next_pid: Pid,
}

impl PcbTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, priority: u8, path: &str) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        self.pcbs.push(Pcb::new(pid, priority, path));
        pid
    }

    pub fn pcb(&self, pid: Pid) -> &Pcb {
        self.pcbs
            .iter()
            .find(|pcb| pcb.pid() == pid)
            .unwrap_or_else(|| panic!("unknown pid {}", pid))
    }

    pub fn pcb_mut(&mut self, pid: Pid) -> &mut Pcb {
        self.pcbs
            .iter_mut()
            .find(|pcb| pcb.pid() == pid)
            .unwrap_or_else(|| panic!("unknown pid {}", pid))
    }

    pub fn running(&self) -> Option<Pid> {
        self.running
    }

    pub fn set_running(&mut self, pid: Option<Pid>) {
        self.running = pid;
    }

    pub fn all_pcbs(&self) -> &[Pcb] {
        &self.pcbs
    }
}
