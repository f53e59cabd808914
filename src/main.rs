use hardware::{asm, Hardware, Program};
use kernel::memory_manager::victim_selection::VictimSelectionSecondChance;
use kernel::scheduler::SchedulerRoundRobin;
use kernel::Kernel;

/// Demo run: three interleaving programs on a machine with 20 memory
/// cells, frames of 4 and a 3-tick I/O device, scheduled round robin
/// with a quantum of 3 and second-chance eviction.
fn main() {
    env_logger::init();

    let hardware = Hardware::new(20, 4, 3);
    let mut kernel = Kernel::new(
        &hardware,
        Box::new(SchedulerRoundRobin::new(3, &hardware.timer())),
        Box::new(VictimSelectionSecondChance),
    );

    let file_system = kernel.file_system();
    file_system.write(
        "prg1.exe",
        Program::new(vec![asm::cpu(1), asm::io(), asm::cpu(5), asm::io(), asm::cpu(1)]),
    );
    file_system.write(
        "prg2.exe",
        Program::new(vec![asm::cpu(6), asm::io(), asm::cpu(1)]),
    );
    file_system.write(
        "prg3.exe",
        Program::new(vec![asm::cpu(4), asm::io(), asm::cpu(1)]),
    );

    kernel.run("prg1.exe", 1).expect("prg1.exe was just written");
    kernel.run("prg2.exe", 2).expect("prg2.exe was just written");
    kernel.run("prg3.exe", 3).expect("prg3.exe was just written");

    kernel.run_ticks(36);
    log::info!("simulation stopped after 36 ticks");

    println!("{}", kernel.statistics().render());
}
