pub type Pid = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    New,
    Ready,
    Running,
    Waiting,
    Terminated,
}

impl ProcessState {
    /// New -> Ready -> Running -> {Ready, Waiting, Terminated},
    /// Waiting -> Ready. Terminated is absorbing.
    fn can_transition_to(self, next: ProcessState) -> bool {
        use ProcessState::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (New, Ready) | (Ready, Running) | (Waiting, Ready)
                | (Running, Ready)
                | (Running, Waiting)
                | (Running, Terminated)
        )
    }
}

/// Process Control Block: everything the kernel remembers about one
/// process while it is off the CPU.
#[derive(Debug, Clone)]
pub struct Pcb {
    pid: Pid,
    priority: u8,
    status: ProcessState,
    program_counter: usize,
    path: String,
}

impl Pcb {
    pub fn new(pid: Pid, priority: u8, path: &str) -> Self {
        Pcb {
            pid,
            priority,
            status: ProcessState::New,
            program_counter: 0,
            path: String::from(path),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn status(&self) -> ProcessState {
        self.status
    }

    pub fn set_status(&mut self, status: ProcessState) {
        assert!(
            self.status.can_transition_to(status),
            "invalid state transition for pid {}: {:?} -> {:?}",
            self.pid,
            self.status,
            status
        );
        self.status = status;
    }

    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, program_counter: usize) {
        self.program_counter = program_counter;
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
