use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hardware::Program;

#[derive(Debug, PartialEq, Eq)]
pub enum FileSystemError {
    ProgramNotFound,
}

/// Name-keyed store of program images. Write-once in spirit: there is no
/// deletion and no directory structure, it just holds what was submitted.
/// Clones share the same store.
#[derive(Clone, Default)]
pub struct FileSystem {
    programs: Arc<Mutex<HashMap<String, Program>>>,
}

impl FileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, path: &str, program: Program) {
        let mut programs = self.programs.lock().unwrap();
        if programs.insert(String::from(path), program).is_some() {
            log::warn!("program image {} overwritten", path);
        }
    }

    pub fn read(&self, path: &str) -> Result<Program, FileSystemError> {
        self.programs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or(FileSystemError::ProgramNotFound)
    }
}
