use std::collections::HashMap;

use hardware::Cpu;

use crate::pcb::{Pid, ProcessState};
use crate::pcb_table::PcbTable;

/// Per-tick status table of every process: one row per pid, one column
/// per gathered tick. Rendered into the log on each gather.
pub struct Statistics {
    cpu: Cpu,
    ticks: Vec<usize>,
    rows: HashMap<Pid, Vec<String>>,
}

impl Statistics {
    pub fn new(cpu: Cpu) -> Self {
        Statistics {
            cpu,
            ticks: Vec::new(),
            rows: HashMap::new(),
        }
    }

    /// Registers a process born mid-run; earlier columns are padded.
    pub fn add_pcb(&mut self, pid: Pid) {
        self.rows
            .entry(pid)
            .or_insert_with(|| vec![String::from(" "); self.ticks.len()]);
    }

    pub fn gather(&mut self, tick: usize, pcb_table: &PcbTable) {
        self.ticks.push(tick);
        for pcb in pcb_table.all_pcbs() {
            let cell = match pcb.status() {
                ProcessState::Running => self
                    .cpu
                    .pc()
                    .map(|pc| pc.to_string())
                    .unwrap_or_else(|| String::from("?")),
                ProcessState::Ready => String::from("*"),
                ProcessState::Waiting => String::from("IO"),
                ProcessState::Terminated => String::from("-"),
                ProcessState::New => String::from(" "),
            };
            self.rows
                .get_mut(&pcb.pid())
                .unwrap_or_else(|| panic!("pid {} was never registered", pcb.pid()))
                .push(cell);
        }
        log::debug!("statistics at tick {}\n{}", tick, self.render());
    }

    pub fn render(&self) -> String {
        let mut out = String::from("pid |");
        for tick in &self.ticks {
            out.push_str(&format!("{:>3}", tick));
        }
        let mut pids: Vec<Pid> = self.rows.keys().copied().collect();
        pids.sort_unstable();
        for pid in pids {
            out.push_str(&format!("\n{:>3} |", pid));
            for cell in &self.rows[&pid] {
                out.push_str(&format!("{:>3}", cell));
            }
        }
        out
    }

    pub fn row(&self, pid: Pid) -> &[String] {
        self.rows
            .get(&pid)
            .unwrap_or_else(|| panic!("pid {} was never registered", pid))
    }
}
