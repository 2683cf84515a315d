use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Model types whose mirror is currently being generated.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    active: Arc<Mutex<HashSet<String>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another request for `model_type` is in flight.
    pub fn try_acquire(&self, model_type: &str) -> Option<InFlightGuard> {
        if !self.active.lock().insert(model_type.to_string()) {
            return None;
        }
        trace!(model = model_type, "acquired generation slot");
        Some(InFlightGuard {
            active: Arc::clone(&self.active),
            model_type: model_type.to_string(),
        })
    }

    pub fn is_in_flight(&self, model_type: &str) -> bool {
        self.active.lock().contains(model_type)
    }

    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.lock().is_empty()
    }
}

/// Releases the slot on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<String>>>,
    model_type: String,
}

impl InFlightGuard {
    pub fn model_type(&self) -> &str {
        &self.model_type
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.model_type);
        trace!(model = %self.model_type, "released generation slot");
    }
}
