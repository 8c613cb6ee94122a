// ABOUTME: Database operations for booking records
// ABOUTME: Transaction-scoped insert plus booking retrieval queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{parse_datetime, parse_decimal, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{Booking, BookingStatus};

/// Booking database operations manager
pub struct BookingsManager {
    pool: SqlitePool,
}

impl BookingsManager {
    /// Create a new bookings manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a booking by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let row = sqlx::query(
            r"
            SELECT id, trainer_id, trainee_id, slot_id, session_start, session_end,
                   total_amount, commission_fee, trainer_payout, status, created_at
            FROM bookings
            WHERE id = $1
            ",
        )
        .bind(booking_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get booking: {e}")))?;

        row.map(|r| row_to_booking(&r)).transpose()
    }

    /// Get the booking referencing a slot, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_for_slot(&self, slot_id: Uuid) -> AppResult<Option<Booking>> {
        let row = sqlx::query(
            r"
            SELECT id, trainer_id, trainee_id, slot_id, session_start, session_end,
                   total_amount, commission_fee, trainer_payout, status, created_at
            FROM bookings
            WHERE slot_id = $1
            ",
        )
        .bind(slot_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get booking for slot: {e}")))?;

        row.map(|r| row_to_booking(&r)).transpose()
    }

    /// List a trainee's bookings, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_for_trainee(&self, trainee_id: Uuid) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query(
            r"
            SELECT id, trainer_id, trainee_id, slot_id, session_start, session_end,
                   total_amount, commission_fee, trainer_payout, status, created_at
            FROM bookings
            WHERE trainee_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(trainee_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list bookings: {e}")))?;

        rows.iter().map(row_to_booking).collect()
    }
}

/// Insert a booking record inside the caller's transaction.
///
/// The unique index on `slot_id` backs up the claim: a second booking
/// for the same slot surfaces as `Conflict` rather than a raw database
/// error.
///
/// # Errors
///
/// `Conflict` on a duplicate slot reference, or a database error.
pub async fn insert(conn: &mut SqliteConnection, booking: &Booking) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO bookings (
            id, trainer_id, trainee_id, slot_id, session_start, session_end,
            total_amount, commission_fee, trainer_payout, status, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ",
    )
    .bind(booking.id.to_string())
    .bind(booking.trainer_id.to_string())
    .bind(booking.trainee_id.to_string())
    .bind(booking.slot_id.to_string())
    .bind(booking.session_start.to_rfc3339())
    .bind(booking.session_end.to_rfc3339())
    .bind(booking.total_amount.to_string())
    .bind(booking.commission_fee.to_string())
    .bind(booking.trainer_payout.to_string())
    .bind(booking.status.as_str())
    .bind(booking.created_at.to_rfc3339())
    .execute(conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::conflict(format!(
            "Slot {} already has a booking",
            booking.slot_id
        )),
        _ => AppError::database(format!("Failed to insert booking: {e}")),
    })?;

    Ok(())
}

/// Convert a database row to a `Booking` struct
fn row_to_booking(row: &SqliteRow) -> AppResult<Booking> {
    let id_str: String = row.get("id");
    let trainer_id_str: String = row.get("trainer_id");
    let trainee_id_str: String = row.get("trainee_id");
    let slot_id_str: String = row.get("slot_id");
    let session_start_str: String = row.get("session_start");
    let session_end_str: String = row.get("session_end");
    let total_amount_str: String = row.get("total_amount");
    let commission_fee_str: String = row.get("commission_fee");
    let trainer_payout_str: String = row.get("trainer_payout");
    let status_str: String = row.get("status");
    let created_at_str: String = row.get("created_at");

    Ok(Booking {
        id: parse_uuid("id", &id_str)?,
        trainer_id: parse_uuid("trainer_id", &trainer_id_str)?,
        trainee_id: parse_uuid("trainee_id", &trainee_id_str)?,
        slot_id: parse_uuid("slot_id", &slot_id_str)?,
        session_start: parse_datetime("session_start", &session_start_str)?,
        session_end: parse_datetime("session_end", &session_end_str)?,
        total_amount: parse_decimal("total_amount", &total_amount_str)?,
        commission_fee: parse_decimal("commission_fee", &commission_fee_str)?,
        trainer_payout: parse_decimal("trainer_payout", &trainer_payout_str)?,
        status: BookingStatus::parse(&status_str),
        created_at: parse_datetime("created_at", &created_at_str)?,
    })
}
