use log::{debug, info, warn};

/// Component-scoped front for the `log` facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    pub fn debug(&self, message: &str) {
        debug!("[{}] {}", self.component, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.component, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("placement")
    }
}
