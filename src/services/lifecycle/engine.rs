//! The test case lifecycle engine.
//!
//! Every mutating operation runs in one database transaction: sequence
//! allocation, the test case write, script appends and the status resync
//! either all commit or none do. Side effects (notifications, bug filing) and
//! WebSocket events are produced only after commit.

use std::time::Duration;

use chrono::Utc;
use sea_orm::{ActiveValue::Set, DatabaseTransaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::effects::{build_effects, EffectDispatcher};
use super::transitions::{plan_create, plan_update, Snapshot, TransitionPlan};
use crate::db::{catalog, projects, scripts, test_cases, users, DbPool};
use crate::entity::{project, test_case};
use crate::error::{AppError, AppResult};
use crate::models::test_case::attachments_to_json;
use crate::models::{
    AddScriptRequest, Bug, CreateTestCaseRequest, Script, TestCase, TestCaseStatus, TestKind,
    UpdateTestCaseRequest, WsEvent,
};
use crate::services::EventBroadcaster;

/// Creates, mutates and reads test cases.
#[derive(Clone)]
pub struct TestCaseEngine {
    pool: DbPool,
    effects: EffectDispatcher,
    broadcaster: EventBroadcaster,
    lock_timeout: Duration,
}

impl TestCaseEngine {
    pub fn new(
        pool: DbPool,
        effects: EffectDispatcher,
        broadcaster: EventBroadcaster,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            effects,
            broadcaster,
            lock_timeout,
        }
    }

    /// Create a test case, numbering it from the project counter and
    /// versioning the given scripts 1..n.
    pub async fn create(&self, mut req: CreateTestCaseRequest) -> AppResult<TestCase> {
        let kind = req.validate()?;
        let new_scripts = std::mem::take(&mut req.scripts);
        let status = req.status.unwrap_or_default();

        let txn = self.pool.begin().await?;

        let project = projects::find_project(&txn, req.project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", req.project_id)))?;

        users::require_user(&txn, req.created_by_id, "created_by_id").await?;
        check_optional_user(&txn, req.responsible_id, "responsible_id").await?;
        check_optional_user(&txn, req.bug_responsible_id, "bug_responsible_id").await?;
        if let Some(scenario_id) = req.test_scenario_id {
            check_scenario(&txn, &project, scenario_id).await?;
        }
        check_kind(&txn, &project, kind).await?;

        // Project row stays locked until commit or rollback.
        let project =
            projects::lock_and_increment_counter(&txn, project.id, self.lock_timeout).await?;

        let now = Utc::now();
        let (test_type, custom_test_type_id) = kind.columns();

        let model = test_case::ActiveModel {
            id: Set(Uuid::now_v7()),
            project_id: Set(project.id),
            project_sequence_id: Set(project.test_case_sequence),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            steps: Set(req.steps),
            expected_result: Set(req.expected_result),
            status: Set(status.as_str().to_string()),
            priority: Set(req.priority.as_str().to_string()),
            test_type: Set(test_type),
            custom_test_type_id: Set(custom_test_type_id),
            test_scenario_id: Set(req.test_scenario_id),
            created_by_id: Set(req.created_by_id),
            responsible_id: Set(req.responsible_id),
            bug_responsible_id: Set(req.bug_responsible_id),
            estimated_time: Set(req.estimated_time),
            task_link: Set(req.task_link),
            attachments: Set(attachments_to_json(&req.attachments)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let row = test_cases::insert_test_case(&txn, model).await?;
        let script_rows = scripts::append_scripts(&txn, &row, &new_scripts).await?;

        let plan = plan_create(&snapshot_of(&row));
        let member_ids = members_for(&txn, &plan, project.id).await?;

        commit(txn).await?;

        let test_case = TestCase::from_model(row, &project.prefix, script_rows);
        info!(
            test_case_id = %test_case.id,
            project_id = %test_case.project_id,
            display_key = %test_case.display_key,
            status = %test_case.status,
            scripts = test_case.scripts.len(),
            "Test case created"
        );

        self.broadcaster.publish(WsEvent::test_case_created(&test_case));
        self.run_side_effects(&plan, &test_case, &member_ids).await;

        Ok(test_case)
    }

    /// Apply a partial update. Absent fields stay as they are.
    pub async fn update(&self, id: Uuid, mut req: UpdateTestCaseRequest) -> AppResult<TestCase> {
        let kind = req.validate()?;
        let new_scripts = std::mem::take(&mut req.scripts);

        let txn = self.pool.begin().await?;

        let current = test_cases::lock_test_case(&txn, id).await?;
        let project = projects::find_project(&txn, current.project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", current.project_id)))?;

        if let Some(responsible_id) = req.responsible_id {
            check_optional_user(&txn, responsible_id, "responsible_id").await?;
        }
        if let Some(bug_responsible_id) = req.bug_responsible_id {
            check_optional_user(&txn, bug_responsible_id, "bug_responsible_id").await?;
        }
        if let Some(Some(scenario_id)) = req.test_scenario_id {
            check_scenario(&txn, &project, scenario_id).await?;
        }
        if let Some(kind) = kind {
            check_kind(&txn, &project, kind).await?;
        }

        let previous = snapshot_of(&current);
        let row = test_cases::update_test_case(&txn, apply_patch(current, req, kind)).await?;
        let plan = plan_update(&previous, &snapshot_of(&row));

        // Resync before appending so the old head keeps the new status and
        // the appended versions start from it too.
        if let Some(status) = plan.resync_status {
            scripts::resync_latest_version_status(&txn, row.id, status).await?;
        }
        scripts::append_scripts(&txn, &row, &new_scripts).await?;

        let script_rows = scripts::scripts_for_test_case(&txn, row.id).await?;
        let member_ids = members_for(&txn, &plan, project.id).await?;

        commit(txn).await?;

        let test_case = TestCase::from_model(row, &project.prefix, script_rows);
        info!(
            test_case_id = %test_case.id,
            display_key = %test_case.display_key,
            previous_status = %previous.status,
            status = %test_case.status,
            appended_scripts = new_scripts.len(),
            "Test case updated"
        );

        self.broadcaster.publish(WsEvent::test_case_updated(&test_case));
        self.run_side_effects(&plan, &test_case, &member_ids).await;

        Ok(test_case)
    }

    /// Append one script version carrying the current status.
    pub async fn add_script(&self, id: Uuid, req: AddScriptRequest) -> AppResult<TestCase> {
        req.validate()?;

        let txn = self.pool.begin().await?;

        let row = test_cases::lock_test_case(&txn, id).await?;
        let project = projects::find_project(&txn, row.project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", row.project_id)))?;

        let appended = scripts::append_script(&txn, &row, &req.script_path).await?;
        let script_rows = scripts::scripts_for_test_case(&txn, row.id).await?;

        commit(txn).await?;

        info!(test_case_id = %id, version = appended.version, "Script version added");

        let test_case = TestCase::from_model(row, &project.prefix, script_rows);
        self.broadcaster.publish(WsEvent::test_case_updated(&test_case));

        Ok(test_case)
    }

    /// Get a test case with its full script history.
    pub async fn get(&self, id: Uuid) -> AppResult<TestCase> {
        let conn = self.pool.connection();

        let row = test_cases::find_test_case(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;
        let project = projects::find_project(conn, row.project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", row.project_id)))?;
        let script_rows = scripts::scripts_for_test_case(conn, id).await?;

        Ok(TestCase::from_model(row, &project.prefix, script_rows))
    }

    /// All test cases of a project ordered by sequence number.
    pub async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<TestCase>> {
        let conn = self.pool.connection();

        let project = projects::find_project(conn, project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", project_id)))?;

        let rows = test_cases::list_by_project(conn, project_id).await?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut grouped = scripts::scripts_for_test_cases(conn, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let script_rows = grouped.remove(&row.id).unwrap_or_default();
                TestCase::from_model(row, &project.prefix, script_rows)
            })
            .collect())
    }

    /// Delete a test case with its scripts and bugs. Its sequence number is
    /// not handed out again.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let conn = self.pool.connection();

        let row = test_cases::find_test_case(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

        if !test_cases::delete_test_case(conn, id).await? {
            return Err(AppError::NotFound(format!("Test case {}", id)));
        }

        info!(test_case_id = %id, project_id = %row.project_id, sequence = row.project_sequence_id, "Test case deleted");
        self.broadcaster
            .publish(WsEvent::test_case_deleted(id, row.project_id));

        Ok(())
    }

    /// Script versions of a test case in ascending order.
    pub async fn list_scripts(&self, id: Uuid) -> AppResult<Vec<Script>> {
        Ok(self.get(id).await?.scripts)
    }

    /// Bugs filed against a test case.
    pub async fn list_bugs(&self, id: Uuid) -> AppResult<Vec<Bug>> {
        self.require_test_case(id).await?;
        let rows = self.pool.list_bugs_for_test_case(id).await?;
        Ok(rows.into_iter().map(Bug::from).collect())
    }

    /// Every script of a project, newest first.
    pub async fn list_project_scripts(&self, project_id: Uuid) -> AppResult<Vec<Script>> {
        projects::find_project(self.pool.connection(), project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", project_id)))?;

        let rows = self.pool.list_project_scripts(project_id).await?;
        Ok(rows.into_iter().map(Script::from).collect())
    }

    async fn require_test_case(&self, id: Uuid) -> AppResult<test_case::Model> {
        test_cases::find_test_case(self.pool.connection(), id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))
    }

    async fn run_side_effects(&self, plan: &TransitionPlan, test_case: &TestCase, member_ids: &[Uuid]) {
        if !plan.has_side_effects() {
            return;
        }
        let effects = build_effects(plan, test_case, member_ids);
        let report = self.effects.dispatch(effects).await;
        debug!(
            test_case_id = %test_case.id,
            delivered = report.delivered,
            failed = report.failed,
            "Side effects dispatched"
        );
    }
}

fn snapshot_of(row: &test_case::Model) -> Snapshot {
    Snapshot {
        status: TestCaseStatus::parse(&row.status).unwrap_or_default(),
        responsible_id: row.responsible_id,
    }
}

/// Turn a locked row and a patch into the active model to save.
fn apply_patch(
    current: test_case::Model,
    req: UpdateTestCaseRequest,
    kind: Option<TestKind>,
) -> test_case::ActiveModel {
    let mut active: test_case::ActiveModel = current.into();

    if let Some(title) = req.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = req.description {
        active.description = Set(description);
    }
    if let Some(steps) = req.steps {
        active.steps = Set(steps);
    }
    if let Some(expected_result) = req.expected_result {
        active.expected_result = Set(expected_result);
    }
    if let Some(priority) = req.priority {
        active.priority = Set(priority.as_str().to_string());
    }
    if let Some(status) = req.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(kind) = kind {
        let (test_type, custom_test_type_id) = kind.columns();
        active.test_type = Set(test_type);
        active.custom_test_type_id = Set(custom_test_type_id);
    }
    if let Some(responsible_id) = req.responsible_id {
        active.responsible_id = Set(responsible_id);
    }
    if let Some(bug_responsible_id) = req.bug_responsible_id {
        active.bug_responsible_id = Set(bug_responsible_id);
    }
    if let Some(test_scenario_id) = req.test_scenario_id {
        active.test_scenario_id = Set(test_scenario_id);
    }
    if let Some(estimated_time) = req.estimated_time {
        active.estimated_time = Set(estimated_time);
    }
    if let Some(task_link) = req.task_link {
        active.task_link = Set(task_link);
    }
    if let Some(attachments) = req.attachments {
        active.attachments = Set(attachments_to_json(&attachments));
    }
    active.updated_at = Set(Utc::now());

    active
}

async fn check_optional_user(
    txn: &DatabaseTransaction,
    user_id: Option<Uuid>,
    field: &str,
) -> AppResult<()> {
    if let Some(user_id) = user_id {
        users::require_user(txn, user_id, field).await?;
    }
    Ok(())
}

async fn check_scenario(
    txn: &DatabaseTransaction,
    project: &project::Model,
    scenario_id: Uuid,
) -> AppResult<()> {
    let scenario = catalog::find_test_scenario(txn, scenario_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test scenario {}", scenario_id)))?;

    if scenario.project_id != project.id {
        return Err(AppError::InvalidInput(format!(
            "test scenario {} belongs to another project",
            scenario_id
        )));
    }
    Ok(())
}

async fn check_kind(txn: &DatabaseTransaction, project: &project::Model, kind: TestKind) -> AppResult<()> {
    let TestKind::Custom(custom_id) = kind else {
        return Ok(());
    };

    let custom = catalog::find_custom_test_type(txn, custom_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Custom test type {}", custom_id)))?;

    if custom.organization_id != project.organization_id {
        return Err(AppError::InvalidInput(format!(
            "custom test type {} belongs to another organization",
            custom_id
        )));
    }
    Ok(())
}

/// Members are only read when a failure cascade is owed.
async fn members_for(
    txn: &DatabaseTransaction,
    plan: &TransitionPlan,
    project_id: Uuid,
) -> AppResult<Vec<Uuid>> {
    if plan.failure_cascade {
        projects::member_ids(txn, project_id).await
    } else {
        Ok(Vec::new())
    }
}

async fn commit(txn: DatabaseTransaction) -> AppResult<()> {
    txn.commit()
        .await
        .map_err(|e| AppError::from_db("Failed to commit transaction", e))
}
