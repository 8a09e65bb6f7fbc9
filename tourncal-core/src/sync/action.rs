//! Pass-level results and plans.

/// Aggregate result of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub created: usize,
    pub updated: usize,
    /// Digest matched the persisted record; no remote call issued.
    pub unchanged: usize,
    pub deleted: usize,
    /// Per-event remote failures, absorbed rather than aborting the pass.
    pub failed: usize,
    /// Malformed canonical events skipped before any remote call.
    pub invalid: usize,
}

impl PassStats {
    pub fn changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

/// Result of a repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Stale mappings purged.
    pub repaired: usize,
    /// Records audited.
    pub total: usize,
}

/// Read-only view of what a pass would do, used by `status` and dry runs.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub to_create: Vec<String>,
    pub to_update: Vec<String>,
    pub unchanged: usize,
    pub to_delete: Vec<String>,
    pub invalid: usize,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}
