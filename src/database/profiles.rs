// ABOUTME: Database operations for trainer and trainee profiles
// ABOUTME: Minimal create/lookup surface consumed by the booking flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{parse_datetime, parse_decimal, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{
    CreateTraineeProfileRequest, CreateTrainerProfileRequest, RateConfig, RateMode,
    TraineeProfile, TrainerProfile,
};

/// Trainer profile database operations manager
pub struct TrainerProfilesManager {
    pool: SqlitePool,
}

impl TrainerProfilesManager {
    /// Create a new trainer profiles manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a trainer profile
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` on negative rates, or a database error
    pub async fn create(&self, request: &CreateTrainerProfileRequest) -> AppResult<TrainerProfile> {
        if request.hourly_rate.is_sign_negative() || request.daily_rate.is_sign_negative() {
            return Err(AppError::invalid_input("Rates must not be negative"));
        }

        let now = chrono::Utc::now();
        let id = Uuid::new_v4();

        sqlx::query(
            r"
            INSERT INTO trainer_profiles (
                id, user_id, first_name, last_name, bio, hourly_rate, daily_rate,
                rate_mode, location, main_skill, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(id.to_string())
        .bind(request.user_id.to_string())
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.bio)
        .bind(request.hourly_rate.to_string())
        .bind(request.daily_rate.to_string())
        .bind(request.rate_mode.as_str())
        .bind(&request.location)
        .bind(&request.main_skill)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create trainer profile: {e}")))?;

        Ok(TrainerProfile {
            id,
            user_id: request.user_id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            bio: request.bio.clone(),
            hourly_rate: request.hourly_rate,
            daily_rate: request.daily_rate,
            rate_mode: request.rate_mode,
            location: request.location.clone(),
            main_skill: request.main_skill.clone(),
            created_at: now,
        })
    }

}

/// Trainee profile database operations manager
pub struct TraineeProfilesManager {
    pool: SqlitePool,
}

impl TraineeProfilesManager {
    /// Create a new trainee profiles manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a trainee profile
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(&self, request: &CreateTraineeProfileRequest) -> AppResult<TraineeProfile> {
        let now = chrono::Utc::now();
        let id = Uuid::new_v4();

        sqlx::query(
            r"
            INSERT INTO trainee_profiles (
                id, user_id, first_name, last_name, current_goal, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(id.to_string())
        .bind(request.user_id.to_string())
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.current_goal)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create trainee profile: {e}")))?;

        Ok(TraineeProfile {
            id,
            user_id: request.user_id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            current_goal: request.current_goal.clone(),
            created_at: now,
        })
    }

    /// Look up a trainee profile by the owning account id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_by_user_id(&self, user_id: Uuid) -> AppResult<Option<TraineeProfile>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, first_name, last_name, current_goal, created_at
            FROM trainee_profiles
            WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get trainee profile: {e}")))?;

        row.map(|r| row_to_trainee(&r)).transpose()
    }
}

/// Read a trainer's rate snapshot inside the caller's transaction.
///
/// Used by the booking coordinator after the claim, so the snapshot and
/// the booking record commit together.
///
/// # Errors
///
/// Returns an error if the database operation fails
pub async fn rate_config(
    conn: &mut SqliteConnection,
    trainer_id: Uuid,
) -> AppResult<Option<RateConfig>> {
    let row = sqlx::query(
        "SELECT hourly_rate, daily_rate, rate_mode FROM trainer_profiles WHERE id = $1",
    )
    .bind(trainer_id.to_string())
    .fetch_optional(conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to read rate config: {e}")))?;

    row.map(|r| {
        let hourly_rate_str: String = r.get("hourly_rate");
        let daily_rate_str: String = r.get("daily_rate");
        let rate_mode_str: String = r.get("rate_mode");
        Ok(RateConfig {
            hourly_rate: parse_decimal("hourly_rate", &hourly_rate_str)?,
            daily_rate: parse_decimal("daily_rate", &daily_rate_str)?,
            rate_mode: RateMode::parse(&rate_mode_str),
        })
    })
    .transpose()
}

/// Convert a database row to a `TraineeProfile` struct
fn row_to_trainee(row: &SqliteRow) -> AppResult<TraineeProfile> {
    let id_str: String = row.get("id");
    let user_id_str: String = row.get("user_id");
    let created_at_str: String = row.get("created_at");

    Ok(TraineeProfile {
        id: parse_uuid("id", &id_str)?,
        user_id: parse_uuid("user_id", &user_id_str)?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        current_goal: row.get("current_goal"),
        created_at: parse_datetime("created_at", &created_at_str)?,
    })
}
