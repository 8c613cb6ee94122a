// ABOUTME: Integration tests for the booking transaction coordinator
// ABOUTME: Covers the financial split, error taxonomy, and the concurrent claim race
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::time::Duration;

use rust_decimal_macros::dec;
use skilllink_marketplace::{
    database::{slots, Database},
    errors::ErrorCode,
    models::{BookingStatus, RateMode},
    services::bookings::BookingService,
};
use uuid::Uuid;

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn service(database: &Database) -> BookingService {
    BookingService::new(database.clone(), TEST_TIMEOUT)
}

#[tokio::test]
async fn test_create_booking_hourly_split() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(1000.00), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    let booking = service(&db)
        .create_booking(slot.id, trainee.user_id)
        .await
        .unwrap();

    assert_eq!(booking.trainer_id, trainer.id);
    assert_eq!(booking.trainee_id, trainee.id);
    assert_eq!(booking.slot_id, slot.id);
    assert_eq!(booking.session_start, slot.start_time);
    assert_eq!(booking.session_end, slot.end_time);
    assert_eq!(booking.total_amount, dec!(1000.00));
    assert_eq!(booking.commission_fee, dec!(150.00));
    assert_eq!(booking.trainer_payout, dec!(850.00));
    assert_eq!(booking.status, BookingStatus::ConfirmedPendingPayment);

    // The booking is durably committed and the slot is gone for good
    let stored = db.bookings().get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.total_amount, dec!(1000.00));
    assert_eq!(
        stored.commission_fee + stored.trainer_payout,
        stored.total_amount
    );

    let claimed_slot = db.slots().get(slot.id).await.unwrap().unwrap();
    assert!(!claimed_slot.is_available);
}

#[tokio::test]
async fn test_create_booking_daily_split() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(500.00), dec!(4000.00), RateMode::Day)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    let booking = service(&db)
        .create_booking(slot.id, trainee.user_id)
        .await
        .unwrap();

    assert_eq!(booking.total_amount, dec!(4000.00));
    assert_eq!(booking.commission_fee, dec!(600.00));
    assert_eq!(booking.trainer_payout, dec!(3400.00));
}

#[tokio::test]
async fn test_split_sums_exactly_for_awkward_rate() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(33.33), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    let booking = service(&db)
        .create_booking(slot.id, trainee.user_id)
        .await
        .unwrap();

    // 33.33 * 0.15 = 4.9995, rounded half-up to 5.00
    assert_eq!(booking.commission_fee, dec!(5.00));
    assert_eq!(booking.trainer_payout, dec!(28.33));
    assert_eq!(
        booking.commission_fee + booking.trainer_payout,
        booking.total_amount
    );
}

#[tokio::test]
async fn test_booking_nonexistent_slot_is_not_found() {
    let db = common::create_test_database().await.unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();

    let err = service(&db)
        .create_booking(Uuid::new_v4(), trainee.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_booking_unknown_trainee_is_not_found() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(500), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    let err = service(&db)
        .create_booking(slot.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // A failed trainee lookup must not touch the slot
    let stored = db.slots().get(slot.id).await.unwrap().unwrap();
    assert!(stored.is_available);
}

#[tokio::test]
async fn test_booking_nil_ids_rejected_before_store_access() {
    let db = common::create_test_database().await.unwrap();

    let err = service(&db)
        .create_booking(Uuid::nil(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = service(&db)
        .create_booking(Uuid::new_v4(), Uuid::nil())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_booking_already_reserved_slot_is_conflict() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(500), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let other_trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    service(&db)
        .create_booking(slot.id, trainee.user_id)
        .await
        .unwrap();

    let err = service(&db)
        .create_booking(slot.id, other_trainee.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);

    // Still exactly one booking for the slot
    let booking = db.bookings().get_for_slot(slot.id).await.unwrap().unwrap();
    assert_eq!(booking.trainee_id, trainee.id);
}

#[tokio::test]
async fn test_booked_slot_disappears_from_listing() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(500), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let booked = common::seed_slot(&db, trainer.id, 24).await.unwrap();
    let open = common::seed_slot(&db, trainer.id, 48).await.unwrap();

    let svc = service(&db);
    svc.create_booking(booked.id, trainee.user_id).await.unwrap();

    let listed = svc.list_open_slots(trainer.id, None, None).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![open.id]);
}

#[tokio::test]
async fn test_rate_changes_do_not_affect_existing_bookings() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(1000.00), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    let booking = service(&db)
        .create_booking(slot.id, trainee.user_id)
        .await
        .unwrap();

    sqlx::query("UPDATE trainer_profiles SET hourly_rate = '9999.00' WHERE id = $1")
        .bind(trainer.id.to_string())
        .execute(db.pool())
        .await
        .unwrap();

    let stored = db.bookings().get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.total_amount, dec!(1000.00));
}

#[tokio::test]
async fn test_missing_trainer_behind_slot_is_fatal_and_rolls_back_claim() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(500), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    // Sever the trainer behind the slot. The referential check blocks
    // the deletion, so it has to be switched off on this connection.
    let mut conn = db.pool().acquire().await.unwrap();
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *conn)
        .await
        .unwrap();
    sqlx::query("DELETE FROM trainer_profiles WHERE id = $1")
        .bind(trainer.id.to_string())
        .execute(&mut *conn)
        .await
        .unwrap();
    drop(conn);

    let err = service(&db)
        .create_booking(slot.id, trainee.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::FatalInconsistency);

    // The claim rolled back with the failed transaction
    let stored = db.slots().get(slot.id).await.unwrap().unwrap();
    assert!(stored.is_available);
    assert_eq!(stored.version, 0);
    assert!(db.bookings().get_for_slot(slot.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_booking_budget_expiry_is_timeout() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(500), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    let svc = BookingService::new(db.clone(), Duration::from_nanos(1));
    let err = svc
        .create_booking(slot.id, trainee.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Timeout);

    // The cancelled transaction committed nothing
    let stored = db.slots().get(slot.id).await.unwrap().unwrap();
    assert!(stored.is_available);
    assert!(db.bookings().get_for_slot(slot.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_booking_not_found() {
    let db = common::create_test_database().await.unwrap();

    let err = service(&db).get_booking(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_list_for_trainee_newest_first() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(500), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let first = common::seed_slot(&db, trainer.id, 24).await.unwrap();
    let second = common::seed_slot(&db, trainer.id, 48).await.unwrap();

    let svc = service(&db);
    let b1 = svc.create_booking(first.id, trainee.user_id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let b2 = svc.create_booking(second.id, trainee.user_id).await.unwrap();

    let bookings = db.bookings().list_for_trainee(trainee.id).await.unwrap();
    let ids: Vec<_> = bookings.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![b2.id, b1.id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let db = common::create_file_database(&dir).await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(1000.00), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    let svc = service(&db);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let svc = svc.clone();
        let slot_id = slot.id;
        let trainee_user_id = trainee.user_id;
        handles.push(tokio::spawn(async move {
            svc.create_booking(slot_id, trainee_user_id).await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => {
                assert_eq!(
                    e.code,
                    ErrorCode::ResourceConflict,
                    "losers must observe a conflict, got: {e}"
                );
                conflicts += 1;
            }
        }
    }

    assert_eq!(successes, 1, "exactly one concurrent claim may win");
    assert_eq!(conflicts, 7);

    let stored = db.slots().get(slot.id).await.unwrap().unwrap();
    assert!(!stored.is_available);

    let booking = db.bookings().get_for_slot(slot.id).await.unwrap().unwrap();
    assert_eq!(booking.slot_id, slot.id);
}

#[tokio::test]
async fn test_direct_claim_then_booking_is_conflict() {
    let db = common::create_test_database().await.unwrap();
    let trainer = common::seed_trainer(&db, dec!(500), dec!(0), RateMode::Hour)
        .await
        .unwrap();
    let trainee = common::seed_trainee(&db).await.unwrap();
    let slot = common::seed_slot(&db, trainer.id, 24).await.unwrap();

    // Reserve the slot out-of-band, leaving no booking behind
    let mut conn = db.pool().acquire().await.unwrap();
    slots::claim(&mut conn, slot.id, None).await.unwrap();
    drop(conn);

    let err = service(&db)
        .create_booking(slot.id, trainee.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceConflict);
}
