//! Shared test helpers for engine E2E tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, dev::ServiceResponse, test, web};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use uuid::Uuid;

use testtrack_lib::config::{Config, DatabaseSettings, Environment};
use testtrack_lib::db::{DbPool, catalog, projects, users};
use testtrack_lib::entity::{organization, project, user};
use testtrack_lib::error::SideEffectError;
use testtrack_lib::models::{CreateTestCaseRequest, NewBug, Notice, Priority, TestType};
use testtrack_lib::services::{
    BugFiler, EffectDispatcher, EventBroadcaster, NotificationDispatcher, TestCaseEngine,
};

static MIGRATIONS_RUN: OnceCell<()> = OnceCell::const_new();

/// Config pointing at the test database, or `None` when it is not configured.
pub fn test_config() -> Option<Config> {
    let url = std::env::var("TT_TEST_DATABASE_URL").ok()?;
    Some(Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseSettings {
            url,
            max_connections: 12,
            min_connections: 1,
            connect_timeout_secs: 10,
        },
        sequence_lock_timeout_ms: 5_000,
    })
}

/// Create a fresh DB pool. Migrations run only once per test binary.
pub async fn create_test_pool() -> Option<DbPool> {
    let Some(config) = test_config() else {
        eprintln!("TT_TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let pool = DbPool::new(&config)
        .await
        .expect("Failed to connect to database");

    MIGRATIONS_RUN
        .get_or_init(|| async {
            pool.run_migrations()
                .await
                .expect("Failed to run migrations");
        })
        .await;

    Some(pool)
}

/// An organization with one project and a handful of users.
pub struct Fixture {
    pub organization: organization::Model,
    pub project: project::Model,
    pub creator: user::Model,
    pub member: user::Model,
    pub developer: user::Model,
    pub assignee: user::Model,
}

async fn seed_user(pool: &DbPool, role: &str) -> user::Model {
    let email = format!("{}-{}@testtrack.local", role, Uuid::new_v4());
    users::insert_user(pool.connection(), role, &email)
        .await
        .expect("Failed to insert user")
}

/// Seed a "Test Track" project (prefix `TT`) whose only member is the creator.
pub async fn seed(pool: &DbPool) -> Fixture {
    let conn = pool.connection();
    let organization = catalog::insert_organization(conn, &format!("org-{}", Uuid::new_v4()))
        .await
        .expect("Failed to insert organization");
    let project = projects::insert_project(conn, organization.id, "Test Track")
        .await
        .expect("Failed to insert project");

    let creator = seed_user(pool, "creator").await;
    let member = seed_user(pool, "member").await;
    let developer = seed_user(pool, "developer").await;
    let assignee = seed_user(pool, "assignee").await;

    projects::add_member(conn, project.id, creator.id, "OWNER")
        .await
        .expect("Failed to add member");

    Fixture {
        organization,
        project,
        creator,
        member,
        developer,
        assignee,
    }
}

/// Add `fixture.member` to the project.
pub async fn add_member(pool: &DbPool, fixture: &Fixture) {
    projects::add_member(pool.connection(), fixture.project.id, fixture.member.id, "MEMBER")
        .await
        .expect("Failed to add member");
}

/// Minimal valid create request.
pub fn create_request(fixture: &Fixture, title: &str) -> CreateTestCaseRequest {
    CreateTestCaseRequest {
        project_id: fixture.project.id,
        title: title.to_string(),
        description: "Open the login page and submit".to_string(),
        steps: "1. open\n2. submit".to_string(),
        expected_result: "Dashboard is shown".to_string(),
        priority: Priority::High,
        status: None,
        test_type: Some(TestType::Functional),
        custom_test_type_id: None,
        created_by_id: fixture.creator.id,
        responsible_id: None,
        bug_responsible_id: None,
        test_scenario_id: None,
        estimated_time: None,
        task_link: None,
        attachments: Vec::new(),
        scripts: Vec::new(),
    }
}

/// Records notices instead of storing them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notice>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notice> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn notify(&self, notice: &Notice) -> Result<(), SideEffectError> {
        if self.fail {
            return Err(SideEffectError::Notification {
                user_id: notice.user_id,
                reason: "inbox offline".to_string(),
            });
        }
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

/// Records bugs instead of filing them.
#[derive(Default)]
pub struct RecordingBugFiler {
    pub filed: Mutex<Vec<NewBug>>,
    pub fail: bool,
}

impl RecordingBugFiler {
    pub fn filed(&self) -> Vec<NewBug> {
        self.filed.lock().unwrap().clone()
    }
}

#[async_trait]
impl BugFiler for RecordingBugFiler {
    async fn file_bug(&self, bug: &NewBug) -> Result<Uuid, SideEffectError> {
        if self.fail {
            return Err(SideEffectError::BugFiling {
                test_case_id: bug.test_case_id,
                reason: "tracker offline".to_string(),
            });
        }
        self.filed.lock().unwrap().push(bug.clone());
        Ok(Uuid::now_v7())
    }
}

/// Engine wired to recording collaborators.
pub fn recording_engine(
    pool: &DbPool,
    notifier: Arc<RecordingNotifier>,
    bug_filer: Arc<RecordingBugFiler>,
) -> TestCaseEngine {
    let config = test_config().expect("test config");
    TestCaseEngine::new(
        pool.clone(),
        EffectDispatcher::new(notifier, bug_filer),
        EventBroadcaster::new(),
        config.sequence_lock_timeout(),
    )
}

/// Engine that gives up on the project row lock after `lock_timeout`.
pub fn impatient_engine(pool: &DbPool, lock_timeout: Duration) -> TestCaseEngine {
    TestCaseEngine::new(
        pool.clone(),
        EffectDispatcher::new(
            Arc::new(RecordingNotifier::default()),
            Arc::new(RecordingBugFiler::default()),
        ),
        EventBroadcaster::new(),
        lock_timeout,
    )
}

/// Create a test app with the database-backed collaborators.
pub async fn create_test_app(
    pool: &DbPool,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let config = test_config().expect("test config");
    let broadcaster = EventBroadcaster::new();
    let engine = testtrack_lib::build_engine(&config, pool, &broadcaster);

    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(broadcaster))
            .app_data(web::Data::new(engine))
            .service(
                web::scope("/api/v1")
                    .configure(testtrack_lib::api::configure_test_case_routes)
                    .configure(testtrack_lib::api::configure_notification_routes),
            ),
    )
    .await
}
