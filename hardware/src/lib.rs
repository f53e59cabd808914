pub mod clock;
pub mod cpu;
pub mod interrupt;
pub mod io_device;
pub mod memory;
pub mod mmu;
pub mod program;
pub mod timer;

pub use clock::Clock;
pub use cpu::Cpu;
pub use interrupt::{InterruptVector, Irq, IrqKind};
pub use io_device::IoDevice;
pub use memory::{Memory, MemoryError};
pub use mmu::Mmu;
pub use program::{asm, Opcode, Program};
pub use timer::Timer;

/// The assembled machine. Every component is a cheap clonable handle, so
/// the kernel keeps its own copies of whatever it drives.
pub struct Hardware {
    memory: Memory,
    mmu: Mmu,
    cpu: Cpu,
    timer: Timer,
    io_device: IoDevice,
    interrupt_vector: InterruptVector,
    clock: Clock,
}

impl Hardware {
    pub fn new(memory_size: usize, frame_size: usize, io_device_time: usize) -> Self {
        assert!(frame_size > 0, "frame size must be positive");
        assert_eq!(
            memory_size % frame_size,
            0,
            "memory size must be a multiple of the frame size"
        );
        assert!(
            memory_size / frame_size > 0,
            "at least one frame is required"
        );
        let interrupt_vector = InterruptVector::new();
        let memory = Memory::new(memory_size);
        let mmu = Mmu::new(frame_size);
        let cpu = Cpu::new(mmu.clone(), memory.clone(), interrupt_vector.clone());
        let timer = Timer::new(cpu.clone(), interrupt_vector.clone());
        let io_device = IoDevice::new(io_device_time, interrupt_vector.clone());
        Hardware {
            memory,
            mmu,
            cpu,
            timer,
            io_device,
            interrupt_vector,
            clock: Clock::new(),
        }
    }

    pub fn memory(&self) -> Memory {
        self.memory.clone()
    }

    pub fn mmu(&self) -> Mmu {
        self.mmu.clone()
    }

    pub fn cpu(&self) -> Cpu {
        self.cpu.clone()
    }

    pub fn timer(&self) -> Timer {
        self.timer.clone()
    }

    pub fn io_device(&self) -> IoDevice {
        self.io_device.clone()
    }

    pub fn interrupt_vector(&self) -> InterruptVector {
        self.interrupt_vector.clone()
    }

    pub fn clock(&self) -> Clock {
        self.clock.clone()
    }
}
