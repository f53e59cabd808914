/// One memory cell worth of program text. `Cpu` burns a tick, `Io`
/// requests an operation on the I/O device, `Exit` ends the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Cpu,
    Io,
    Exit,
}

pub mod asm {
    use super::Opcode;

    /// A CPU burst of `ticks` instructions.
    pub fn cpu(ticks: usize) -> Vec<Opcode> {
        vec![Opcode::Cpu; ticks]
    }

    pub fn io() -> Vec<Opcode> {
        vec![Opcode::Io]
    }

    pub fn exit() -> Vec<Opcode> {
        vec![Opcode::Exit]
    }

    pub fn is_exit(opcode: &Opcode) -> bool {
        *opcode == Opcode::Exit
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Opcode>,
}

impl Program {
    /// Flattens the given bursts into a single instruction stream. A program
    /// that does not end in `Exit` gets one appended.
    pub fn new(bursts: Vec<Vec<Opcode>>) -> Self {
        let mut instructions: Vec<Opcode> = bursts.into_iter().flatten().collect();
        match instructions.last() {
            Some(last) if asm::is_exit(last) => {}
            _ => instructions.push(Opcode::Exit),
        }
        Program { instructions }
    }

    pub fn instructions(&self) -> &[Opcode] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
