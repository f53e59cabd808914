use hardware::{asm, Hardware, Program};
use kernel::memory_manager::swap::CachePolicy;
use kernel::memory_manager::victim_selection::{
    VictimSelectionFifo, VictimSelectionLru, VictimSelectionSecondChance,
};
use kernel::pcb::ProcessState;
use kernel::scheduler::{SchedulerFcfs, SchedulerPriorityPreemptive, SchedulerRoundRobin};
use kernel::{Kernel, KernelError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_all_terminated(kernel: &Kernel) {
    for pcb in kernel.pcb_table().all_pcbs() {
        assert_eq!(
            pcb.status(),
            ProcessState::Terminated,
            "pid {} did not finish",
            pcb.pid()
        );
    }
    assert_eq!(kernel.pcb_table().running(), None);
    assert!(kernel.scheduler().is_ready_queue_empty());
    assert_eq!(kernel.io_device_controller().in_flight(), None);
    assert_eq!(kernel.io_device_controller().waiting_count(), 0);
}

fn assert_all_memory_reclaimed(kernel: &Kernel) {
    let manager = kernel.memory_manager();
    assert_eq!(manager.free_frames().len(), manager.total_frames());
    assert!(manager.ledger_frames().is_empty());
    assert!(manager.mapped_frames().is_empty());
}

#[test]
fn test_round_robin_workload_runs_to_completion() {
    init_logging();
    // 5 frames for 8 pages of programs: eviction and swap-in are exercised.
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

    kernel.run("prg1.exe", 1).unwrap();
    kernel.run("prg2.exe", 2).unwrap();
    kernel.run("prg3.exe", 3).unwrap();

    kernel.run_ticks(36);

    assert_all_terminated(&kernel);
    assert_all_memory_reclaimed(&kernel);
}

#[test]
fn test_round_robin_rotates_fairly() {
    init_logging();
    // Ample memory: the only context switches are quantum expirations.
    let hardware = Hardware::new(64, 4, 3);
    let mut kernel = Kernel::new(
        &hardware,
        Box::new(SchedulerRoundRobin::new(3, &hardware.timer())),
        Box::new(VictimSelectionFifo),
    );

    let file_system = kernel.file_system();
    for path in ["a.exe", "b.exe", "c.exe"] {
        file_system.write(path, Program::new(vec![asm::cpu(5)]));
    }
    kernel.run("a.exe", 1).unwrap();
    kernel.run("b.exe", 1).unwrap();
    kernel.run("c.exe", 1).unwrap();

    let mut sequence = Vec::new();
    for _ in 0..40 {
        kernel.tick();
        if let Some(pid) = kernel.pcb_table().running() {
            if sequence.last() != Some(&pid) {
                sequence.push(pid);
            }
        }
    }

    // Each process needs two slices: six instructions against a quantum
    // of three, with both page faults serviced inside their own tick.
    assert_eq!(sequence, vec![0, 1, 2, 0, 1, 2]);
    assert_all_terminated(&kernel);
}

#[test]
fn test_page_fault_costs_no_tick() {
    init_logging();
    let hardware = Hardware::new(16, 4, 3);
    let mut kernel = Kernel::new(
        &hardware,
        Box::new(SchedulerFcfs::new()),
        Box::new(VictimSelectionFifo),
    );
    kernel
        .file_system()
        .write("prg.exe", Program::new(vec![asm::cpu(2)]));
    kernel.run("prg.exe", 1).unwrap();

    // Three instructions, one page fault: the fault is serviced within
    // the faulting tick, so three ticks suffice.
    kernel.run_ticks(3);
    assert_all_terminated(&kernel);
}

#[test]
fn test_priority_arrival_expropriates_the_cpu() {
    init_logging();
    let hardware = Hardware::new(64, 4, 3);
    let mut kernel = Kernel::new(
        &hardware,
        Box::new(SchedulerPriorityPreemptive::new()),
        Box::new(VictimSelectionFifo),
    );

    let file_system = kernel.file_system();
    file_system.write("low.exe", Program::new(vec![asm::cpu(8)]));
    file_system.write("high.exe", Program::new(vec![asm::cpu(2)]));

    kernel.run("low.exe", 1).unwrap();
    kernel.run_ticks(2);
    assert_eq!(kernel.pcb_table().running(), Some(0));

    kernel.run("high.exe", 5).unwrap();
    assert_eq!(kernel.pcb_table().running(), Some(1));
    assert_eq!(kernel.pcb_table().pcb(0).status(), ProcessState::Ready);

    kernel.run_ticks(40);
    assert_all_terminated(&kernel);
    assert_all_memory_reclaimed(&kernel);
}

#[test]
fn test_fcfs_finishes_in_arrival_order() {
    init_logging();
    let hardware = Hardware::new(32, 4, 3);
    let mut kernel = Kernel::new(
        &hardware,
        Box::new(SchedulerFcfs::new()),
        Box::new(VictimSelectionFifo),
    );

    let file_system = kernel.file_system();
    file_system.write("first.exe", Program::new(vec![asm::cpu(3)]));
    file_system.write("second.exe", Program::new(vec![asm::cpu(2)]));
    kernel.run("first.exe", 1).unwrap();
    kernel.run("second.exe", 1).unwrap();

    kernel.run_ticks(15);
    assert_all_terminated(&kernel);

    let first_done = kernel
        .statistics()
        .row(0)
        .iter()
        .position(|cell| cell == "-")
        .unwrap();
    let second_done = kernel
        .statistics()
        .row(1)
        .iter()
        .position(|cell| cell == "-")
        .unwrap();
    assert!(first_done < second_done);
}

#[test]
fn test_statistics_gather_once_per_tick() {
    init_logging();
    let hardware = Hardware::new(32, 4, 3);
    let mut kernel = Kernel::new(
        &hardware,
        Box::new(SchedulerFcfs::new()),
        Box::new(VictimSelectionFifo),
    );
    kernel
        .file_system()
        .write("prg.exe", Program::new(vec![asm::cpu(2)]));
    kernel.run("prg.exe", 1).unwrap();
    kernel.run_ticks(10);
    assert_eq!(kernel.statistics().row(0).len(), 10);
}

#[test]
fn test_unknown_program_is_rejected() {
    init_logging();
    let hardware = Hardware::new(16, 4, 3);
    let mut kernel = Kernel::new(
        &hardware,
        Box::new(SchedulerFcfs::new()),
        Box::new(VictimSelectionFifo),
    );
    let result = kernel.run("missing.exe", 1);
    assert!(matches!(result, Err(KernelError::ProgramNotFound(_))));
    assert!(kernel.pcb_table().all_pcbs().is_empty());
}

#[test]
fn test_random_workload_under_memory_pressure() {
    init_logging();
    // 5 frames shared by up to 5 four-page programs, with the swap cache
    // reclaimed on every hit.
    let hardware = Hardware::new(20, 4, 3);
    let mut kernel = Kernel::with_cache_policy(
        &hardware,
        Box::new(SchedulerRoundRobin::new(2, &hardware.timer())),
        Box::new(VictimSelectionLru),
        CachePolicy::Reclaim,
    );

    let mut rng = StdRng::seed_from_u64(7);
    let file_system = kernel.file_system();
    for index in 0..5 {
        let mut blocks = Vec::new();
        for _ in 0..rng.gen_range(1..=3) {
            blocks.push(asm::cpu(rng.gen_range(1..=4)));
            if rng.gen_bool(0.5) {
                blocks.push(asm::io());
            }
        }
        let path = format!("prg{}.exe", index);
        file_system.write(&path, Program::new(blocks));
        kernel.run(&path, 1).unwrap();
    }

    kernel.run_ticks(1000);

    assert_all_terminated(&kernel);
    assert_all_memory_reclaimed(&kernel);
}
