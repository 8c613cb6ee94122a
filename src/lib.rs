// ABOUTME: Main library entry point for the SkillLink trainer marketplace
// ABOUTME: Slot reservation, booking transactions, and commission pricing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

#![deny(unsafe_code)]

//! # SkillLink Marketplace
//!
//! Matches trainers offering bookable time slots with trainees and
//! records paid sessions with a marketplace commission split.
//!
//! The core is the booking transaction: a requested slot and a
//! requesting trainee produce, atomically, either a confirmed booking
//! with an exact financial split or a well-defined conflict/failure,
//! even when multiple trainees race for the same slot. Everything else
//! is bookkeeping around it.
//!
//! ## Architecture
//!
//! - **Models**: slots, bookings, profiles, and rate snapshots
//! - **Database**: SQLite-backed ledger store with the compare-and-swap
//!   claim primitive
//! - **Pricing**: pure decimal commission split (15%, exact-sum)
//! - **Services**: the booking transaction coordinator
//! - **Routes**: thin `HTTP` surface over the coordinator

/// Environment-based configuration management
pub mod config;

/// Application constants and default values
pub mod constants;

/// Marketplace database management and per-aggregate managers
pub mod database;

/// Unified error handling with typed codes and `HTTP` response mapping
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// Core data models for the booking domain
pub mod models;

/// Pure pricing calculator for the commission split
pub mod pricing;

/// `HTTP` routes for the booking API
pub mod routes;

/// Domain service layer (booking transaction coordination)
pub mod services;
