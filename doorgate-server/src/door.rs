//! Door actuator stub

use doorgate_core::DoorAction;
use tracing::info;

/// Stand-in for the physical lock. Records the action and does nothing else.
#[derive(Debug, Default, Clone)]
pub struct Door;

impl Door {
    pub fn actuate(&self, action: DoorAction, actor: &str) {
        info!("Door {} requested by {}", action, actor);
    }
}
