//! TestTrack server library.
//!
//! Test case lifecycle engine: project-scoped sequence numbers, versioned
//! scripts carrying status snapshots, and post-commit failure notifications
//! and bug filing, served over an actix-web API.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::services::{
    DbBugFiler, DbNotificationDispatcher, EffectDispatcher, EventBroadcaster, TestCaseEngine,
};

/// Wire the engine to the database-backed collaborators.
pub fn build_engine(config: &Config, pool: &DbPool, broadcaster: &EventBroadcaster) -> TestCaseEngine {
    let effects = EffectDispatcher::new(
        Arc::new(DbNotificationDispatcher::new(pool.clone(), broadcaster.clone())),
        Arc::new(DbBugFiler::new(pool.clone())),
    );
    TestCaseEngine::new(
        pool.clone(),
        effects,
        broadcaster.clone(),
        config.sequence_lock_timeout(),
    )
}
