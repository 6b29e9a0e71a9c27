use election::{NodeState, NodeStateSaver, Result};
use parking_lot::Mutex;

use std::sync::Arc;

/// Mock for the NodeStateSaver state. Logs only - no persistence.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub struct MockNodeStateSaver;

impl NodeStateSaver for MockNodeStateSaver {
    fn save_node_state(&self, state: &NodeState) -> Result<()> {
        info!("Node state saved: {}", state);

        Ok(())
    }
}

/// Keeps the last saved state in memory. Clones share it, so a test can restart a node
/// from what the previous instance saved.
#[derive(Clone, Debug, Default)]
pub struct MemoryNodeStateSaver {
    state: Arc<Mutex<NodeState>>,
}

impl MemoryNodeStateSaver {
    pub fn new() -> MemoryNodeStateSaver {
        MemoryNodeStateSaver::default()
    }

    pub fn last_saved(&self) -> NodeState {
        self.state.lock().clone()
    }
}

impl NodeStateSaver for MemoryNodeStateSaver {
    fn save_node_state(&self, state: &NodeState) -> Result<()> {
        trace!("Node state saved: {}", state);
        *self.state.lock() = state.clone();

        Ok(())
    }
}
