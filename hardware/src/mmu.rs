use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Translates logical addresses through the page mappings installed by the
/// dispatcher. A missing mapping is how a page fault shows up.
#[derive(Clone)]
pub struct Mmu {
    inner: Arc<Mutex<MmuState>>,
}

struct MmuState {
    frame_size: usize,
    page_frames: HashMap<usize, usize>,
}

impl Mmu {
    pub fn new(frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame size must be positive");
        Mmu {
            inner: Arc::new(Mutex::new(MmuState {
                frame_size,
                page_frames: HashMap::new(),
            })),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.inner.lock().unwrap().frame_size
    }

    pub fn reset_translation_cache(&self) {
        self.inner.lock().unwrap().page_frames.clear();
    }

    pub fn set_page_frame(&self, page: usize, frame: usize) {
        self.inner.lock().unwrap().page_frames.insert(page, frame);
    }

    /// Logical address to physical, or `None` when the page has no frame.
    pub fn translate(&self, logical: usize) -> Option<usize> {
        let state = self.inner.lock().unwrap();
        let page = logical / state.frame_size;
        let offset = logical % state.frame_size;
        let frame = state.page_frames.get(&page)?;
        Some(frame * state.frame_size + offset)
    }
}
