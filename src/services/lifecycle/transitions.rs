//! Status transition planning.
//!
//! Transitions are unrestricted: any status may follow any other. What the
//! engine does in response depends only on the previous and new state, so the
//! decision is a pure function over two snapshots.

use uuid::Uuid;

use crate::models::TestCaseStatus;

/// The parts of a test case that drive transition reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub status: TestCaseStatus,
    pub responsible_id: Option<Uuid>,
}

/// Reactions owed to a create or update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Status to copy onto the latest script version, inside the transaction.
    pub resync_status: Option<TestCaseStatus>,
    /// Whether the test case just entered a failure status.
    pub failure_cascade: bool,
    /// Newly responsible user to notify after commit.
    pub assignment: Option<Uuid>,
}

impl TransitionPlan {
    /// Whether anything must run after commit.
    pub fn has_side_effects(&self) -> bool {
        self.failure_cascade || self.assignment.is_some()
    }
}

/// Plan for a freshly created test case. There is no previous state, so a
/// failing initial status or any initial responsible user counts as a change.
pub fn plan_create(initial: &Snapshot) -> TransitionPlan {
    TransitionPlan {
        resync_status: None,
        failure_cascade: initial.status.is_failure(),
        assignment: initial.responsible_id,
    }
}

/// Plan for an update from `previous` to `next`.
///
/// Re-saving an unchanged status plans nothing for it, which keeps the failure
/// cascade from refiring. The assignment compares ids, so setting the same
/// responsible user again is silent.
pub fn plan_update(previous: &Snapshot, next: &Snapshot) -> TransitionPlan {
    let status_changed = previous.status != next.status;

    let assignment = match next.responsible_id {
        Some(user_id) if previous.responsible_id != Some(user_id) => Some(user_id),
        _ => None,
    };

    TransitionPlan {
        resync_status: status_changed.then_some(next.status),
        failure_cascade: status_changed && next.status.is_failure(),
        assignment,
    }
}
