// ABOUTME: Domain service layer for business logic above the database managers
// ABOUTME: Protocol-agnostic services reusable from HTTP handlers and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

//! Domain service layer
//!
//! Business logic lives here rather than in route handlers, so the same
//! rules apply regardless of the entry point.

/// Booking transaction coordination: claim, price, persist
pub mod bookings;
