// ABOUTME: Database operations for availability slots and the reservation engine
// ABOUTME: Slot creation, windowed listing, and the compare-and-swap claim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

//! # Slot storage and the reservation engine
//!
//! The claim is a guarded `UPDATE` on the availability flag (and
//! optionally the version counter), issued as the first write of the
//! surrounding booking transaction. That single statement is the
//! compare-and-swap: among N concurrent claimants exactly one commits,
//! the rest observe a conflict. A plain read-then-write with no guard
//! would reintroduce the double-booking race and is deliberately absent.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{parse_datetime, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{CreateSlotRequest, Slot};

/// Slot database operations manager
pub struct SlotsManager {
    pool: SqlitePool,
}

impl SlotsManager {
    /// Create a new slots manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Publish a new availability slot for a trainer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the interval is empty or inverted,
    /// `NotFound` if the trainer does not exist, or a database error.
    pub async fn create(&self, trainer_id: Uuid, request: &CreateSlotRequest) -> AppResult<Slot> {
        if request.start_time >= request.end_time {
            return Err(AppError::invalid_input(format!(
                "Slot start {} must be before end {}",
                request.start_time, request.end_time
            )));
        }

        let trainer_exists = sqlx::query("SELECT 1 FROM trainer_profiles WHERE id = $1")
            .bind(trainer_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check trainer: {e}")))?
            .is_some();
        if !trainer_exists {
            return Err(AppError::not_found("Trainer"));
        }

        let now = Utc::now();
        let id = Uuid::new_v4();

        sqlx::query(
            r"
            INSERT INTO availability_slots (
                id, trainer_id, start_time, end_time, is_available, version, created_at
            ) VALUES ($1, $2, $3, $4, 1, 0, $5)
            ",
        )
        .bind(id.to_string())
        .bind(trainer_id.to_string())
        .bind(request.start_time.to_rfc3339())
        .bind(request.end_time.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create slot: {e}")))?;

        Ok(Slot {
            id,
            trainer_id,
            start_time: request.start_time,
            end_time: request.end_time,
            is_available: true,
            version: 0,
            created_at: now,
        })
    }

    /// Get a slot by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, slot_id: Uuid) -> AppResult<Option<Slot>> {
        let row = sqlx::query(
            r"
            SELECT id, trainer_id, start_time, end_time, is_available, version, created_at
            FROM availability_slots
            WHERE id = $1
            ",
        )
        .bind(slot_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get slot: {e}")))?;

        row.map(|r| row_to_slot(&r)).transpose()
    }

    /// List a trainer's open slots inside a time window, ordered by
    /// start time. Claimed slots never appear.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the trainer does not exist, or a database
    /// error.
    pub async fn list_open(
        &self,
        trainer_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Slot>> {
        let trainer_exists = sqlx::query("SELECT 1 FROM trainer_profiles WHERE id = $1")
            .bind(trainer_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check trainer: {e}")))?
            .is_some();
        if !trainer_exists {
            return Err(AppError::not_found("Trainer"));
        }

        let rows = sqlx::query(
            r"
            SELECT id, trainer_id, start_time, end_time, is_available, version, created_at
            FROM availability_slots
            WHERE trainer_id = $1
              AND is_available = 1
              AND start_time >= $2
              AND start_time < $3
            ORDER BY start_time
            ",
        )
        .bind(trainer_id.to_string())
        .bind(from.to_rfc3339())
        .bind(to.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list slots: {e}")))?;

        rows.iter().map(row_to_slot).collect()
    }
}

/// Atomically claim a slot inside the caller's transaction.
///
/// The guarded `UPDATE` must be the transaction's first write: losers of
/// the race then serialize on the store's write lock (bounded by its
/// busy timeout) and see zero rows affected, instead of dying on a
/// snapshot upgrade after a stale read.
///
/// Returns the claimed slot. Trainer and time window are the values the
/// claim committed against; only the availability flag and the version
/// counter differ from the slot's pre-claim state.
///
/// # Errors
///
/// `NotFound` if no slot with this id exists, `Conflict` if the slot is
/// already reserved or `expected_version` does not match, or a database
/// error.
pub async fn claim(
    conn: &mut SqliteConnection,
    slot_id: Uuid,
    expected_version: Option<i64>,
) -> AppResult<Slot> {
    let result = match expected_version {
        Some(version) => {
            sqlx::query(
                r"
                UPDATE availability_slots
                SET is_available = 0, version = version + 1
                WHERE id = $1 AND is_available = 1 AND version = $2
                ",
            )
            .bind(slot_id.to_string())
            .bind(version)
            .execute(&mut *conn)
            .await
        }
        None => {
            sqlx::query(
                r"
                UPDATE availability_slots
                SET is_available = 0, version = version + 1
                WHERE id = $1 AND is_available = 1
                ",
            )
            .bind(slot_id.to_string())
            .execute(&mut *conn)
            .await
        }
    }
    .map_err(|e| AppError::database(format!("Failed to claim slot: {e}")))?;

    if result.rows_affected() == 0 {
        // Distinguish the designed race outcome from a bad identifier
        let row = sqlx::query("SELECT is_available FROM availability_slots WHERE id = $1")
            .bind(slot_id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to re-check slot: {e}")))?;

        return match row {
            None => Err(AppError::not_found("Slot")),
            Some(r) => {
                let is_available: i64 = r.get("is_available");
                if is_available == 1 {
                    Err(AppError::conflict(format!(
                        "Slot {slot_id} was modified concurrently, please re-check and retry"
                    )))
                } else {
                    Err(AppError::conflict(format!(
                        "Slot {slot_id} is no longer available, please choose another time"
                    )))
                }
            }
        };
    }

    let row = sqlx::query(
        r"
        SELECT id, trainer_id, start_time, end_time, is_available, version, created_at
        FROM availability_slots
        WHERE id = $1
        ",
    )
    .bind(slot_id.to_string())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to read claimed slot: {e}")))?;

    row_to_slot(&row)
}

/// Convert a database row to a `Slot` struct
pub(crate) fn row_to_slot(row: &SqliteRow) -> AppResult<Slot> {
    let id_str: String = row.get("id");
    let trainer_id_str: String = row.get("trainer_id");
    let start_time_str: String = row.get("start_time");
    let end_time_str: String = row.get("end_time");
    let is_available: i64 = row.get("is_available");
    let version: i64 = row.get("version");
    let created_at_str: String = row.get("created_at");

    Ok(Slot {
        id: parse_uuid("id", &id_str)?,
        trainer_id: parse_uuid("trainer_id", &trainer_id_str)?,
        start_time: parse_datetime("start_time", &start_time_str)?,
        end_time: parse_datetime("end_time", &end_time_str)?,
        is_available: is_available == 1,
        version,
        created_at: parse_datetime("created_at", &created_at_str)?,
    })
}
