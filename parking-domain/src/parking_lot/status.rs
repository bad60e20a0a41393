use serde::{Deserialize, Serialize};

/// 停车场占用情况的只读快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub total_capacity: u32,
    pub occupied: u32,
    pub available: u32,
    pub active_tickets: usize,
    pub registered_passes: usize,
}
