use std::sync::{Arc, Mutex};

use crate::program::Opcode;

#[derive(Debug, PartialEq, Eq)]
pub enum MemoryError {
    OverCapacity,
}

/// Physical memory: a flat run of cells, addressed in frames by the MMU.
/// Cells start empty and only hold content once a page is swapped in.
#[derive(Clone)]
pub struct Memory {
    cells: Arc<Mutex<Vec<Option<Opcode>>>>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Memory {
            cells: Arc::new(Mutex::new(vec![None; size])),
        }
    }

    pub fn size(&self) -> usize {
        self.cells.lock().unwrap().len()
    }

    pub fn read(&self, address: usize) -> Result<Option<Opcode>, MemoryError> {
        let cells = self.cells.lock().unwrap();
        if address >= cells.len() {
            return Err(MemoryError::OverCapacity);
        }
        Ok(cells[address])
    }

    pub fn write(&self, address: usize, cell: Option<Opcode>) -> Result<(), MemoryError> {
        let mut cells = self.cells.lock().unwrap();
        if address >= cells.len() {
            return Err(MemoryError::OverCapacity);
        }
        cells[address] = cell;
        Ok(())
    }
}
