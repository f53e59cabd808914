//! The software half of the emulated machine: process table, scheduler,
//! dispatcher, demand-paged memory manager and the interrupt handlers
//! that tie them to the hardware.

pub mod dispatcher;
pub mod file_system;
pub mod interruption_handler;
pub mod io_device_controller;
pub mod loader;
pub mod memory_manager;
pub mod pcb;
pub mod pcb_table;
pub mod scheduler;
pub mod statistics;

use std::collections::HashMap;
use std::mem;

use hardware::{Clock, Cpu, Hardware, InterruptVector, IoDevice, Irq, IrqKind, Timer};

use dispatcher::Dispatcher;
use file_system::FileSystem;
use interruption_handler::{
    InterruptionHandler, IoInInterruptionHandler, IoOutInterruptionHandler,
    KillInterruptionHandler, NewInterruptionHandler, PageFaultInterruptionHandler,
    StatisticsInterruptionHandler, TimeOutInterruptionHandler,
};
use io_device_controller::IoDeviceController;
use loader::Loader;
use memory_manager::swap::{CachePolicy, Swap};
use memory_manager::victim_selection::VictimSelection;
use memory_manager::MemoryManager;
use pcb::Pid;
use pcb_table::PcbTable;
use scheduler::Scheduler;
use statistics::Statistics;

#[derive(Debug)]
pub enum KernelError {
    ProgramNotFound(String),
}

pub struct Kernel {
    pcb_table: PcbTable,
    scheduler: Box<dyn Scheduler>,
    dispatcher: Dispatcher,
    memory_manager: MemoryManager,
    loader: Loader,
    io_device_controller: IoDeviceController,
    statistics: Statistics,
    file_system: FileSystem,
    handlers: HashMap<IrqKind, Box<dyn InterruptionHandler>>,
    interrupt_vector: InterruptVector,
    cpu: Cpu,
    timer: Timer,
    io_device: IoDevice,
    clock: Clock,
}

impl Kernel {
    pub fn new(
        hardware: &Hardware,
        scheduler: Box<dyn Scheduler>,
        victim_selection: Box<dyn VictimSelection>,
    ) -> Self {
        Self::with_cache_policy(hardware, scheduler, victim_selection, CachePolicy::Retain)
    }

    pub fn with_cache_policy(
        hardware: &Hardware,
        scheduler: Box<dyn Scheduler>,
        victim_selection: Box<dyn VictimSelection>,
        cache_policy: CachePolicy,
    ) -> Self {
        let file_system = FileSystem::new();
        let swap = Swap::new(file_system.clone(), cache_policy);
        let memory_manager = MemoryManager::new(
            hardware.memory(),
            hardware.mmu().frame_size(),
            swap,
            victim_selection,
        );

        let mut handlers: HashMap<IrqKind, Box<dyn InterruptionHandler>> = HashMap::new();
        handlers.insert(IrqKind::New, Box::new(NewInterruptionHandler));
        handlers.insert(IrqKind::Kill, Box::new(KillInterruptionHandler));
        handlers.insert(IrqKind::IoIn, Box::new(IoInInterruptionHandler));
        handlers.insert(IrqKind::IoOut, Box::new(IoOutInterruptionHandler));
        handlers.insert(IrqKind::Timeout, Box::new(TimeOutInterruptionHandler));
        handlers.insert(IrqKind::PageFault, Box::new(PageFaultInterruptionHandler));
        handlers.insert(IrqKind::Statistics, Box::new(StatisticsInterruptionHandler));

        Kernel {
            pcb_table: PcbTable::new(),
            scheduler,
            dispatcher: Dispatcher::new(hardware.cpu(), hardware.mmu()),
            memory_manager,
            loader: Loader::new(),
            io_device_controller: IoDeviceController::new(hardware.io_device()),
            statistics: Statistics::new(hardware.cpu()),
            file_system,
            handlers,
            interrupt_vector: hardware.interrupt_vector(),
            cpu: hardware.cpu(),
            timer: hardware.timer(),
            io_device: hardware.io_device(),
            clock: hardware.clock(),
        }
    }

    /// Handle for seeding programs before `run`.
    pub fn file_system(&self) -> FileSystem {
        self.file_system.clone()
    }

    /// Submits a previously written program for execution.
    pub fn run(&mut self, path: &str, priority: u8) -> Result<(), KernelError> {
        let program = self
            .file_system
            .read(path)
            .map_err(|_| KernelError::ProgramNotFound(String::from(path)))?;
        self.handle(Irq::New {
            path: String::from(path),
            program,
            priority,
        });
        Ok(())
    }

    /// Dispatches one interrupt to its registered handler.
    pub fn handle(&mut self, irq: Irq) {
        let handlers = mem::take(&mut self.handlers);
        match handlers.get(&irq.kind()) {
            Some(handler) => handler.execute(self, &irq),
            None => log::error!("no handler registered for {:?}", irq.kind()),
        }
        self.handlers = handlers;
    }

    /// One full clock tick: device first, then timer/CPU, draining the
    /// interrupt vector after each, then the statistics snapshot.
    ///
    /// A page fault is serviced within the faulting tick: once the page
    /// is resident the interrupted instruction runs to completion, so a
    /// fault costs no tick of its own.
    pub fn tick(&mut self) {
        let tick = self.clock.advance();
        log::trace!("tick {}", tick);
        self.io_device.tick(tick);
        self.service_pending();
        self.timer.tick(tick);
        if self.service_pending() {
            self.cpu.tick(tick);
            self.service_pending();
        }
        self.handle(Irq::Statistics { tick });
        self.service_pending();
    }

    pub fn run_ticks(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    pub fn pcb_table(&self) -> &PcbTable {
        &self.pcb_table
    }

    pub fn memory_manager(&self) -> &MemoryManager {
        &self.memory_manager
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }

    pub fn io_device_controller(&self) -> &IoDeviceController {
        &self.io_device_controller
    }

    /// Drains the interrupt vector. Reports whether a page fault was
    /// among the serviced interrupts; the tick loop then re-runs the
    /// interrupted instruction against the freshly mapped page.
    fn service_pending(&mut self) -> bool {
        let mut page_fault = false;
        while let Some(irq) = self.interrupt_vector.pop() {
            page_fault |= irq.kind() == IrqKind::PageFault;
            self.handle(irq);
        }
        page_fault
    }

    /// Gives the CPU to `pid`: install its context, note it as running
    /// and start a fresh quantum.
    fn load_pcb(&mut self, pid: Pid) {
        self.dispatcher.load(
            self.pcb_table.pcb_mut(pid),
            self.memory_manager
                .page_table(pid)
                .expect("dispatched process has no page table"),
        );
        self.memory_manager.reorder_frames(self.pcb_table.pcb(pid));
        self.pcb_table.set_running(Some(pid));
        self.timer.reset();
    }

    /// Takes the CPU away from `pid` and puts it back on the ready queue.
    fn save_pcb(&mut self, pid: Pid) {
        self.dispatcher.save(self.pcb_table.pcb_mut(pid));
        self.scheduler.add_to_ready_queue(self.pcb_table.pcb_mut(pid));
        self.pcb_table.set_running(None);
    }

    /// Dispatches the head of the ready queue, or leaves the CPU idle
    /// with the timer restarted.
    fn load_the_next(&mut self) {
        if self.scheduler.is_ready_queue_empty() {
            self.timer.reset();
        } else {
            let pid = self.scheduler.get_next();
            self.load_pcb(pid);
        }
    }

    /// A Ready process arrives: dispatch it on an idle CPU, preempt if
    /// the scheduler demands it, queue it otherwise.
    fn admit(&mut self, pid: Pid) {
        match self.pcb_table.running() {
            None => self.load_pcb(pid),
            Some(running) => {
                let expropriate = self
                    .scheduler
                    .must_expropriate(self.pcb_table.pcb(running), self.pcb_table.pcb(pid));
                if expropriate {
                    log::debug!("pid {} expropriates pid {}", pid, running);
                    self.save_pcb(running);
                    self.load_pcb(pid);
                } else {
                    self.scheduler.add_to_ready_queue(self.pcb_table.pcb_mut(pid));
                }
            }
        }
    }
}
