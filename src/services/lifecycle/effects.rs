//! Side effects owed after a committed create or update, and their dispatch.
//!
//! Effects are built as plain data from the committed test case, then handed
//! to the collaborators once the transaction is gone. A failed effect is
//! logged and counted; it never reaches the caller.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::transitions::TransitionPlan;
use crate::models::{NewBug, Notice, NotificationKind, TestCase};
use crate::services::collaborators::{BugFiler, NotificationDispatcher};

/// One post-commit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Notify(Notice),
    FileBug(NewBug),
}

/// Outcome counts of a dispatch round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Where a test case can be opened.
pub fn test_case_link(test_case: &TestCase) -> String {
    format!("/projects/{}/test-cases/{}", test_case.project_id, test_case.id)
}

/// Effects owed for `plan`, in dispatch order: the failure cascade first,
/// then the assignment notice.
pub fn build_effects(plan: &TransitionPlan, test_case: &TestCase, member_ids: &[Uuid]) -> Vec<SideEffect> {
    let mut effects = Vec::new();
    if plan.failure_cascade {
        effects.extend(failure_cascade(test_case, member_ids));
    }
    if let Some(user_id) = plan.assignment {
        effects.push(assignment_notice(test_case, user_id));
    }
    effects
}

/// Notify the creator and every project member once each, then file a bug
/// when someone is responsible for bugs.
pub fn failure_cascade(test_case: &TestCase, member_ids: &[Uuid]) -> Vec<SideEffect> {
    let mut recipients: Vec<Uuid> = Vec::with_capacity(member_ids.len() + 1);
    for user_id in std::iter::once(test_case.created_by_id).chain(member_ids.iter().copied()) {
        if !recipients.contains(&user_id) {
            recipients.push(user_id);
        }
    }

    let message = format!(
        "Test case {} {} failed",
        test_case.display_key, test_case.title
    );
    let link = test_case_link(test_case);

    let mut effects: Vec<SideEffect> = recipients
        .into_iter()
        .map(|user_id| {
            SideEffect::Notify(Notice {
                user_id,
                kind: NotificationKind::TestCaseFailed,
                message: message.clone(),
                link: Some(link.clone()),
            })
        })
        .collect();

    if let Some(developer_id) = test_case.bug_responsible_id {
        effects.push(SideEffect::FileBug(NewBug {
            title: format!("{} {}", test_case.display_key, test_case.title),
            description: test_case.description.clone(),
            steps: test_case.steps.clone(),
            expected_result: test_case.expected_result.clone(),
            priority: test_case.priority,
            test_case_id: test_case.id,
            assigned_developer_id: developer_id,
        }));
    }

    effects
}

/// Tell `user_id` they are now responsible for the test case.
pub fn assignment_notice(test_case: &TestCase, user_id: Uuid) -> SideEffect {
    SideEffect::Notify(Notice {
        user_id,
        kind: NotificationKind::TestCaseAssignment,
        message: format!(
            "You are now responsible for test case {} {}",
            test_case.display_key, test_case.title
        ),
        link: Some(test_case_link(test_case)),
    })
}

/// Runs side effects against the configured collaborators.
#[derive(Clone)]
pub struct EffectDispatcher {
    notifier: Arc<dyn NotificationDispatcher>,
    bug_filer: Arc<dyn BugFiler>,
}

impl EffectDispatcher {
    pub fn new(notifier: Arc<dyn NotificationDispatcher>, bug_filer: Arc<dyn BugFiler>) -> Self {
        Self {
            notifier,
            bug_filer,
        }
    }

    /// Run every effect in order. Failures are logged and do not stop the
    /// remaining effects.
    pub async fn dispatch(&self, effects: Vec<SideEffect>) -> DispatchReport {
        let mut report = DispatchReport::default();

        for effect in effects {
            match effect {
                SideEffect::Notify(notice) => match self.notifier.notify(&notice).await {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        warn!(user_id = %notice.user_id, kind = %notice.kind, error = %e, "Notification dropped");
                        report.failed += 1;
                    }
                },
                SideEffect::FileBug(bug) => match self.bug_filer.file_bug(&bug).await {
                    Ok(bug_id) => {
                        info!(bug_id = %bug_id, test_case_id = %bug.test_case_id, title = %bug.title, "Bug filed");
                        report.delivered += 1;
                    }
                    Err(e) => {
                        error!(test_case_id = %bug.test_case_id, error = %e, "Bug filing failed");
                        report.failed += 1;
                    }
                },
            }
        }

        report
    }
}
