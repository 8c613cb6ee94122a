// ABOUTME: Core data models for the trainer marketplace booking domain
// ABOUTME: Slot, Booking, RateConfig, profile types, and request DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// How a trainer charges for a single booked slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    /// One slot incurs the hourly rate
    #[default]
    Hour,
    /// One slot incurs the daily rate
    Day,
}

impl RateMode {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "day" => Self::Day,
            _ => Self::Hour,
        }
    }
}

impl Display for RateMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            _ => Err(AppError::invalid_input(format!("Invalid rate mode: {s}"))),
        }
    }
}

/// Immutable snapshot of a trainer's pricing at booking time.
///
/// Later rate changes on the profile must not retroactively affect
/// bookings priced from an earlier snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Charge for one hourly slot
    pub hourly_rate: Decimal,
    /// Charge for one daily slot
    pub daily_rate: Decimal,
    /// Which of the two rates applies
    pub rate_mode: RateMode,
}

/// Booking lifecycle status.
///
/// This core only ever writes `ConfirmedPendingPayment`; the later
/// transitions belong to the payment and cancellation processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Slot confirmed, awaiting payment (the only status this core writes)
    #[default]
    ConfirmedPendingPayment,
    /// Payment settled
    Paid,
    /// Booking cancelled
    Cancelled,
    /// Session took place
    Completed,
}

impl BookingStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConfirmedPendingPayment => "confirmed_pending_payment",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => Self::Paid,
            "cancelled" => Self::Cancelled,
            "completed" => Self::Completed,
            _ => Self::ConfirmedPendingPayment,
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One bookable interval offered by a trainer.
///
/// A slot is available until the instant it is claimed, and never
/// returns to available afterwards. The `version` counter increments on
/// every mutation and backs the compare-and-swap claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Unique identifier
    pub id: Uuid,
    /// Trainer offering this interval
    pub trainer_id: Uuid,
    /// Session start
    pub start_time: DateTime<Utc>,
    /// Session end (strictly after `start_time`)
    pub end_time: DateTime<Utc>,
    /// False once the slot has been claimed by a booking
    pub is_available: bool,
    /// Monotonically increasing mutation counter
    pub version: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One confirmed reservation and its financial terms.
///
/// Created exactly once, after the referenced slot has been irreversibly
/// claimed, and never mutated by this core. `commission_fee +
/// trainer_payout == total_amount` holds exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: Uuid,
    /// Trainer delivering the session
    pub trainer_id: Uuid,
    /// Trainee who booked the session
    pub trainee_id: Uuid,
    /// The claimed slot (exactly one booking per slot)
    pub slot_id: Uuid,
    /// Session start, copied from the slot at claim time
    pub session_start: DateTime<Utc>,
    /// Session end, copied from the slot at claim time
    pub session_end: DateTime<Utc>,
    /// Total charge to the trainee
    pub total_amount: Decimal,
    /// Marketplace commission (15% of total, rounded half-up to 2dp)
    pub commission_fee: Decimal,
    /// Remainder due to the trainer
    pub trainer_payout: Decimal,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A trainer's marketplace profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerProfile {
    /// Unique identifier
    pub id: Uuid,
    /// The account this profile belongs to
    pub user_id: Uuid,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Trainer's description of their services
    pub bio: Option<String>,
    /// Charge for one hourly slot
    pub hourly_rate: Decimal,
    /// Charge for one daily slot
    pub daily_rate: Decimal,
    /// Which rate applies to a booked slot
    pub rate_mode: RateMode,
    /// City the trainer operates in
    pub location: Option<String>,
    /// Primary skill taught, e.g. "Yoga" or "Piano"
    pub main_skill: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A trainee's marketplace profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeProfile {
    /// Unique identifier
    pub id: Uuid,
    /// The account this profile belongs to (unique per trainee)
    pub user_id: Uuid,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Learning goal, e.g. "Learn Piano Basics"
    pub current_goal: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Request to publish a new availability slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    /// Session start
    pub start_time: DateTime<Utc>,
    /// Session end (must be after `start_time`)
    pub end_time: DateTime<Utc>,
}

/// Request to book a slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitBookingRequest {
    /// The slot to claim
    pub slot_id: Uuid,
    /// The booking trainee's account id
    pub trainee_user_id: Uuid,
}

/// Request to create a trainer profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrainerProfileRequest {
    /// The account this profile belongs to
    pub user_id: Uuid,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Service description
    pub bio: Option<String>,
    /// Charge for one hourly slot
    pub hourly_rate: Decimal,
    /// Charge for one daily slot
    pub daily_rate: Decimal,
    /// Which rate applies
    #[serde(default)]
    pub rate_mode: RateMode,
    /// City
    pub location: Option<String>,
    /// Primary skill taught
    pub main_skill: Option<String>,
}

/// Request to create a trainee profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTraineeProfileRequest {
    /// The account this profile belongs to
    pub user_id: Uuid,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Learning goal
    pub current_goal: Option<String>,
}
