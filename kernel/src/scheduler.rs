use std::collections::VecDeque;

use hardware::Timer;

use crate::pcb::{Pcb, Pid, ProcessState};

/// Ready-queue ordering and preemption policy. One implementation is
/// chosen per kernel run.
///
/// `get_next` must only be called after checking `is_ready_queue_empty`;
/// an empty queue is a caller bug and panics.
pub trait Scheduler {
    fn is_ready_queue_empty(&self) -> bool;

    /// Queues the process and marks it Ready.
    fn add_to_ready_queue(&mut self, pcb: &mut Pcb);

    fn get_next(&mut self) -> Pid;

    /// Whether `candidate` should take the CPU away from `running`.
    fn must_expropriate(&self, running: &Pcb, candidate: &Pcb) -> bool;
}

/// First come, first served. Never preempts.
#[derive(Default)]
pub struct SchedulerFcfs {
    ready_queue: VecDeque<Pid>,
}

impl SchedulerFcfs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for SchedulerFcfs {
    fn is_ready_queue_empty(&self) -> bool {
        self.ready_queue.is_empty()
    }

    fn add_to_ready_queue(&mut self, pcb: &mut Pcb) {
        pcb.set_status(ProcessState::Ready);
        self.ready_queue.push_back(pcb.pid());
    }

    fn get_next(&mut self) -> Pid {
        self.ready_queue.pop_front().expect("ready queue is empty")
    }

    fn must_expropriate(&self, _running: &Pcb, _candidate: &Pcb) -> bool {
        false
    }
}

/// FIFO queue plus a fixed quantum on the hardware timer. Preemption comes
/// from the TIMEOUT interrupt, never from arrivals.
#[derive(Default)]
pub struct SchedulerRoundRobin {
    ready_queue: VecDeque<Pid>,
}

impl SchedulerRoundRobin {
    pub fn new(quantum: usize, timer: &Timer) -> Self {
        timer.set_quantum(quantum);
        Self::default()
    }
}

impl Scheduler for SchedulerRoundRobin {
    fn is_ready_queue_empty(&self) -> bool {
        self.ready_queue.is_empty()
    }

    fn add_to_ready_queue(&mut self, pcb: &mut Pcb) {
        pcb.set_status(ProcessState::Ready);
        self.ready_queue.push_back(pcb.pid());
    }

    fn get_next(&mut self) -> Pid {
        self.ready_queue.pop_front().expect("ready queue is empty")
    }

    fn must_expropriate(&self, _running: &Pcb, _candidate: &Pcb) -> bool {
        false
    }
}

struct ReadyEntry {
    pid: Pid,
    current_priority: u8,
}

/// Queue ordered by current (aged) priority, FIFO among equals. Every
/// `get_next` ages the entries left behind by one, so a starved process
/// eventually overtakes fresher, higher-priority arrivals.
#[derive(Default)]
struct PriorityReadyQueue {
    entries: Vec<ReadyEntry>,
}

impl PriorityReadyQueue {
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, pid: Pid, priority: u8) {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.current_priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            ReadyEntry {
                pid,
                current_priority: priority,
            },
        );
    }

    fn pop_and_age(&mut self) -> Pid {
        assert!(!self.entries.is_empty(), "ready queue is empty");
        let next = self.entries.remove(0);
        for entry in &mut self.entries {
            entry.current_priority = entry.current_priority.saturating_add(1);
        }
        next.pid
    }
}

pub struct SchedulerPriorityPreemptive {
    queue: PriorityReadyQueue,
}

impl SchedulerPriorityPreemptive {
    pub fn new() -> Self {
        SchedulerPriorityPreemptive {
            queue: PriorityReadyQueue::default(),
        }
    }
}

impl Default for SchedulerPriorityPreemptive {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for SchedulerPriorityPreemptive {
    fn is_ready_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn add_to_ready_queue(&mut self, pcb: &mut Pcb) {
        pcb.set_status(ProcessState::Ready);
        self.queue.push(pcb.pid(), pcb.priority());
    }

    fn get_next(&mut self) -> Pid {
        self.queue.pop_and_age()
    }

    // Expropriation compares static priorities; aging only reorders the
    // queue itself.
    fn must_expropriate(&self, running: &Pcb, candidate: &Pcb) -> bool {
        candidate.priority() > running.priority()
    }
}

pub struct SchedulerPriorityNonPreemptive {
    queue: PriorityReadyQueue,
}

impl SchedulerPriorityNonPreemptive {
    pub fn new() -> Self {
        SchedulerPriorityNonPreemptive {
            queue: PriorityReadyQueue::default(),
        }
    }
}

impl Default for SchedulerPriorityNonPreemptive {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for SchedulerPriorityNonPreemptive {
    fn is_ready_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn add_to_ready_queue(&mut self, pcb: &mut Pcb) {
        pcb.set_status(ProcessState::Ready);
        self.queue.push(pcb.pid(), pcb.priority());
    }

    fn get_next(&mut self) -> Pid {
        self.queue.pop_and_age()
    }

    fn must_expropriate(&self, _running: &Pcb, _candidate: &Pcb) -> bool {
        false
    }
}
