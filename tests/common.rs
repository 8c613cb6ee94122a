// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database creation and profile/slot seeding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink
#![allow(dead_code)]

//! Shared test utilities for `skilllink_marketplace`

use std::sync::Once;

use anyhow::Result;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use skilllink_marketplace::{
    database::Database,
    models::{
        CreateSlotRequest, CreateTraineeProfileRequest, CreateTrainerProfileRequest, RateMode,
        Slot, TraineeProfile, TrainerProfile,
    },
};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Database::new("sqlite::memory:").await
}

/// File-backed test database, for tests that exercise real concurrent
/// writers across pool connections
pub async fn create_file_database(dir: &tempfile::TempDir) -> Result<Database> {
    init_test_logging();
    let path = dir.path().join("marketplace.db");
    Database::new(&format!("sqlite:{}", path.display())).await
}

/// Create a trainer with the given rates
pub async fn seed_trainer(
    database: &Database,
    hourly_rate: Decimal,
    daily_rate: Decimal,
    rate_mode: RateMode,
) -> Result<TrainerProfile> {
    let trainer = database
        .trainer_profiles()
        .create(&CreateTrainerProfileRequest {
            user_id: Uuid::new_v4(),
            first_name: "Maya".to_string(),
            last_name: "Iyer".to_string(),
            bio: Some("Certified yoga instructor".to_string()),
            hourly_rate,
            daily_rate,
            rate_mode,
            location: Some("Chennai".to_string()),
            main_skill: Some("Yoga".to_string()),
        })
        .await?;
    Ok(trainer)
}

/// Create a trainee profile
pub async fn seed_trainee(database: &Database) -> Result<TraineeProfile> {
    let trainee = database
        .trainee_profiles()
        .create(&CreateTraineeProfileRequest {
            user_id: Uuid::new_v4(),
            first_name: "Alex".to_string(),
            last_name: "Kumar".to_string(),
            current_goal: Some("Learn Piano Basics".to_string()),
        })
        .await?;
    Ok(trainee)
}

/// Publish a one-hour slot starting `offset_hours` from now
pub async fn seed_slot(database: &Database, trainer_id: Uuid, offset_hours: i64) -> Result<Slot> {
    let start_time = Utc::now() + Duration::hours(offset_hours);
    let slot = database
        .slots()
        .create(
            trainer_id,
            &CreateSlotRequest {
                start_time,
                end_time: start_time + Duration::hours(1),
            },
        )
        .await?;
    Ok(slot)
}
