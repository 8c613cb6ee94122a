// ABOUTME: Booking transaction coordinator for the marketplace core
// ABOUTME: Claims the slot, prices the session, and persists the booking atomically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

//! # Booking Transaction Coordinator
//!
//! `create_booking` is the one place cross-entity atomicity matters: the
//! slot claim and the booking insert commit in a single transaction, so
//! a claimed slot can never be durably left without its booking record.
//! Conflict and not-found outcomes from the claim propagate unchanged;
//! they are the designed results of the race, not bugs.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::constants::limits;
use crate::database::{bookings, profiles, slots, Database};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Booking, BookingStatus, CreateSlotRequest, Slot};
use crate::pricing;

/// Coordinates slot reservation, pricing, and booking persistence
#[derive(Clone)]
pub struct BookingService {
    database: Database,
    booking_timeout: Duration,
}

impl BookingService {
    /// Create a new booking service
    #[must_use]
    pub const fn new(database: Database, booking_timeout: Duration) -> Self {
        Self {
            database,
            booking_timeout,
        }
    }

    /// Publish an availability slot for a trainer
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty or inverted interval, `NotFound` for
    /// an unknown trainer, or a database error.
    pub async fn publish_slot(
        &self,
        trainer_id: Uuid,
        request: &CreateSlotRequest,
    ) -> AppResult<Slot> {
        let slot = self.database.slots().create(trainer_id, request).await?;
        info!(
            slot_id = %slot.id,
            trainer_id = %trainer_id,
            "published availability slot {} - {}",
            slot.start_time,
            slot.end_time
        );
        Ok(slot)
    }

    /// List a trainer's open slots inside a window.
    ///
    /// Defaults to now through one year out when bounds are omitted, as
    /// the display side never needs more.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown trainer, or a database error.
    pub async fn list_open_slots(
        &self,
        trainer_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Slot>> {
        let from = from.unwrap_or_else(Utc::now);
        let to = to.unwrap_or_else(|| {
            Utc::now() + chrono::Duration::days(limits::DEFAULT_SLOT_WINDOW_DAYS)
        });
        self.database.slots().list_open(trainer_id, from, to).await
    }

    /// Get a booking by id
    ///
    /// # Errors
    ///
    /// `NotFound` if no such booking exists, or a database error.
    pub async fn get_booking(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.database
            .bookings()
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking"))
    }

    /// Book a slot for a trainee: the core marketplace transaction.
    ///
    /// The whole operation runs under a wall-clock budget; on expiry the
    /// caller receives the distinct `Timeout` code and must re-check the
    /// slot's state (by listing) rather than blindly resubmitting.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for nil identifiers, `NotFound` for a missing
    /// trainee profile or slot, `Conflict` when the slot is already
    /// reserved, `Timeout` on budget expiry, `FatalInconsistency` if the
    /// booking record cannot be persisted after a successful claim.
    pub async fn create_booking(
        &self,
        slot_id: Uuid,
        trainee_user_id: Uuid,
    ) -> AppResult<Booking> {
        if slot_id.is_nil() || trainee_user_id.is_nil() {
            return Err(AppError::invalid_input(
                "Slot id and trainee user id are required",
            ));
        }

        match tokio::time::timeout(
            self.booking_timeout,
            self.create_booking_inner(slot_id, trainee_user_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(format!(
                "Booking of slot {slot_id} did not complete within {:?}; re-check slot state before retrying",
                self.booking_timeout
            ))),
        }
    }

    async fn create_booking_inner(
        &self,
        slot_id: Uuid,
        trainee_user_id: Uuid,
    ) -> AppResult<Booking> {
        // 1. Resolve the trainee before touching the slot
        let trainee = self
            .database
            .trainee_profiles()
            .get_by_user_id(trainee_user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Trainee profile"))?;

        // 2-4. Claim, price, and persist in one transaction. Dropping
        // the transaction on any error path rolls the claim back, so no
        // slot is ever left reserved without a committed booking.
        let mut tx = self
            .database
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let slot = match slots::claim(&mut tx, slot_id, None).await {
            Ok(slot) => slot,
            Err(e) => {
                if e.code == ErrorCode::ResourceConflict {
                    warn!(slot_id = %slot_id, "booking lost the claim race: {e}");
                }
                return Err(e);
            }
        };

        let rate = profiles::rate_config(&mut tx, slot.trainer_id)
            .await?
            .ok_or_else(|| {
                error!(
                    slot_id = %slot.id,
                    trainer_id = %slot.trainer_id,
                    "claimed slot references a missing trainer profile"
                );
                AppError::fatal_inconsistency(format!(
                    "Slot {} references missing trainer {}",
                    slot.id, slot.trainer_id
                ))
            })?;

        let split = pricing::price(&rate);

        let booking = Booking {
            id: Uuid::new_v4(),
            trainer_id: slot.trainer_id,
            trainee_id: trainee.id,
            slot_id: slot.id,
            session_start: slot.start_time,
            session_end: slot.end_time,
            total_amount: split.total_amount,
            commission_fee: split.commission_fee,
            trainer_payout: split.trainer_payout,
            status: BookingStatus::ConfirmedPendingPayment,
            created_at: Utc::now(),
        };

        if let Err(e) = bookings::insert(&mut tx, &booking).await {
            // The rollback keeps the store consistent, but a failure
            // here still means the claim succeeded and the booking did
            // not, which operators need to see.
            if e.code == ErrorCode::ResourceConflict {
                return Err(e);
            }
            error!(
                slot_id = %slot.id,
                booking_id = %booking.id,
                "booking record could not be persisted after claim, rolling back: {e}"
            );
            return Err(AppError::fatal_inconsistency(format!(
                "Booking for claimed slot {} could not be persisted",
                slot.id
            ))
            .with_source(e));
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit booking: {e}")))?;

        info!(
            booking_id = %booking.id,
            slot_id = %slot.id,
            trainee_id = %trainee.id,
            "booking confirmed: total {} commission {} payout {}",
            booking.total_amount,
            booking.commission_fee,
            booking.trainer_payout
        );

        Ok(booking)
    }
}
