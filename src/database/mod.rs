// ABOUTME: Database management for the marketplace ledger store
// ABOUTME: Pool ownership, schema migrations, and per-aggregate manager access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

//! # Database Management
//!
//! Durable storage for profiles, slots, and bookings. The slot table
//! carries the availability flag and version counter that the
//! reservation engine compare-and-swaps against; the booking table
//! enforces the one-booking-per-slot invariant with a unique index.

pub mod bookings;
pub mod profiles;
pub mod slots;

pub use bookings::BookingsManager;
pub use profiles::{TraineeProfilesManager, TrainerProfilesManager};
pub use slots::SlotsManager;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for marketplace storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Manager for availability slots
    #[must_use]
    pub fn slots(&self) -> SlotsManager {
        SlotsManager::new(self.pool.clone())
    }

    /// Manager for booking records
    #[must_use]
    pub fn bookings(&self) -> BookingsManager {
        BookingsManager::new(self.pool.clone())
    }

    /// Manager for trainer profiles
    #[must_use]
    pub fn trainer_profiles(&self) -> TrainerProfilesManager {
        TrainerProfilesManager::new(self.pool.clone())
    }

    /// Manager for trainee profiles
    #[must_use]
    pub fn trainee_profiles(&self) -> TraineeProfilesManager {
        TraineeProfilesManager::new(self.pool.clone())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_profiles().await?;
        self.migrate_slots().await?;
        self.migrate_bookings().await?;
        Ok(())
    }

    /// Create profile tables
    async fn migrate_profiles(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainer_profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                bio TEXT,
                hourly_rate TEXT NOT NULL,
                daily_rate TEXT NOT NULL,
                rate_mode TEXT NOT NULL DEFAULT 'hour',
                location TEXT,
                main_skill TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainee_profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                current_goal TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create the availability slot table
    async fn migrate_slots(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS availability_slots (
                id TEXT PRIMARY KEY,
                trainer_id TEXT NOT NULL REFERENCES trainer_profiles(id),
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                is_available INTEGER NOT NULL DEFAULT 1,
                version INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_slots_trainer_start
             ON availability_slots(trainer_id, start_time)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create the booking table
    async fn migrate_bookings(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                trainer_id TEXT NOT NULL REFERENCES trainer_profiles(id),
                trainee_id TEXT NOT NULL REFERENCES trainee_profiles(id),
                slot_id TEXT NOT NULL REFERENCES availability_slots(id),
                session_start TEXT NOT NULL,
                session_end TEXT NOT NULL,
                total_amount TEXT NOT NULL,
                commission_fee TEXT NOT NULL,
                trainer_payout TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'confirmed_pending_payment',
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Exactly one booking per slot, even if a claim bug ever slipped
        // past the compare-and-swap
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_slot_unique
             ON bookings(slot_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_trainee
             ON bookings(trainee_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Parse a stored UUID column value
pub(crate) fn parse_uuid(field: &str, value: &str) -> crate::errors::AppResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value).map_err(|e| {
        crate::errors::AppError::internal(format!("Invalid UUID in column {field}: {e}"))
    })
}

/// Parse a stored RFC 3339 timestamp column value
pub(crate) fn parse_datetime(
    field: &str,
    value: &str,
) -> crate::errors::AppResult<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| {
            crate::errors::AppError::internal(format!("Invalid datetime in column {field}: {e}"))
        })
}

/// Parse a stored decimal column value
pub(crate) fn parse_decimal(
    field: &str,
    value: &str,
) -> crate::errors::AppResult<rust_decimal::Decimal> {
    use std::str::FromStr as _;
    rust_decimal::Decimal::from_str(value).map_err(|e| {
        crate::errors::AppError::internal(format!("Invalid decimal in column {field}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
    }
}
