use hardware::Irq;

use crate::pcb::ProcessState;
use crate::Kernel;

/// One handler per interrupt kind, selected once at kernel construction
/// and dispatched by kind lookup. Handlers run to completion; the next
/// tick never observes a half-applied effect.
pub trait InterruptionHandler {
    fn execute(&self, kernel: &mut Kernel, irq: &Irq);
}

/// A program was submitted: create its PCB, size its page table and give
/// it the CPU right away if the scheduler says so.
pub struct NewInterruptionHandler;

impl InterruptionHandler for NewInterruptionHandler {
    fn execute(&self, kernel: &mut Kernel, irq: &Irq) {
        let Irq::New {
            path,
            program,
            priority,
        } = irq
        else {
            return;
        };
        let pid = kernel.pcb_table.create(*priority, path);
        log::info!("pid {}: admitted {} with priority {}", pid, path, priority);
        kernel.statistics.add_pcb(pid);
        kernel.loader.load(
            &mut kernel.memory_manager,
            kernel.pcb_table.pcb_mut(pid),
            program,
        );
        kernel.admit(pid);
    }
}

/// The running process hit its exit instruction.
pub struct KillInterruptionHandler;

impl InterruptionHandler for KillInterruptionHandler {
    fn execute(&self, kernel: &mut Kernel, _irq: &Irq) {
        let pid = kernel
            .pcb_table
            .running()
            .expect("KILL with no running process");
        kernel.memory_manager.set_free_frames(pid);
        kernel.dispatcher.save(kernel.pcb_table.pcb_mut(pid));
        kernel.pcb_table.pcb_mut(pid).set_status(ProcessState::Terminated);
        kernel.pcb_table.set_running(None);
        kernel.load_the_next();
        log::info!("pid {} finished", pid);
    }
}

/// The running process asked for I/O: park it and queue the operation.
pub struct IoInInterruptionHandler;

impl InterruptionHandler for IoInInterruptionHandler {
    fn execute(&self, kernel: &mut Kernel, irq: &Irq) {
        let Irq::IoIn { instruction } = irq else {
            return;
        };
        let pid = kernel
            .pcb_table
            .running()
            .expect("IO_IN with no running process");
        kernel.dispatcher.save(kernel.pcb_table.pcb_mut(pid));
        kernel.pcb_table.pcb_mut(pid).set_status(ProcessState::Waiting);
        kernel.pcb_table.set_running(None);
        kernel.load_the_next();
        kernel.io_device_controller.run_operation(pid, *instruction);
    }
}

/// The device finished: wake the owner and let the scheduler decide
/// between preemption and the ready queue, exactly as for NEW.
pub struct IoOutInterruptionHandler;

impl InterruptionHandler for IoOutInterruptionHandler {
    fn execute(&self, kernel: &mut Kernel, _irq: &Irq) {
        let pid = kernel.io_device_controller.finished_pid();
        kernel.pcb_table.pcb_mut(pid).set_status(ProcessState::Ready);
        kernel.admit(pid);
    }
}

/// Quantum expired. With an empty ready queue the running process just
/// keeps going; the timer restarts either way.
pub struct TimeOutInterruptionHandler;

impl InterruptionHandler for TimeOutInterruptionHandler {
    fn execute(&self, kernel: &mut Kernel, _irq: &Irq) {
        if kernel.scheduler.is_ready_queue_empty() {
            kernel.timer.reset();
            return;
        }
        let running = kernel
            .pcb_table
            .running()
            .expect("TIMEOUT with no running process");
        kernel.save_pcb(running);
        let next = kernel.scheduler.get_next();
        kernel.load_pcb(next);
    }
}

/// The running process touched a page with no frame: bring it in (maybe
/// evicting someone else) and resume at the same instruction.
pub struct PageFaultInterruptionHandler;

impl InterruptionHandler for PageFaultInterruptionHandler {
    fn execute(&self, kernel: &mut Kernel, _irq: &Irq) {
        let pid = kernel
            .pcb_table
            .running()
            .expect("PAGE_FAULT with no running process");
        kernel.dispatcher.save(kernel.pcb_table.pcb_mut(pid));
        let page =
            kernel.pcb_table.pcb(pid).program_counter() / kernel.memory_manager.frame_size();
        if let Err(error) = kernel
            .memory_manager
            .alloc_frames(kernel.pcb_table.pcb(pid), page)
        {
            // A fault that cannot be served means the machine has no
            // usable memory at all.
            panic!("cannot service page fault for pid {}: {:?}", pid, error);
        }
        kernel.dispatcher.load(
            kernel.pcb_table.pcb_mut(pid),
            kernel
                .memory_manager
                .page_table(pid)
                .expect("faulting process has no page table"),
        );
    }
}

/// Periodic snapshot of every PCB's status into the run log.
pub struct StatisticsInterruptionHandler;

impl InterruptionHandler for StatisticsInterruptionHandler {
    fn execute(&self, kernel: &mut Kernel, irq: &Irq) {
        let Irq::Statistics { tick } = irq else {
            return;
        };
        kernel.statistics.gather(*tick, &kernel.pcb_table);
    }
}
