//! Session flag: whether this run already cleared the backend on load.

/// Marker scoped to one client run. Set once the fresh-load clear has been
/// issued; cleared again on unload so the next load repeats it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionFlag {
    cleared_on_load: bool,
}

impl SessionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.cleared_on_load
    }

    pub fn set(&mut self) {
        self.cleared_on_load = true;
    }

    pub fn clear(&mut self) {
        self.cleared_on_load = false;
    }
}
