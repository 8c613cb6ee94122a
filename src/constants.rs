// ABOUTME: Application constants and default configuration values
// ABOUTME: Ports, database defaults, and booking limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

/// Default configuration values
pub mod defaults {
    /// Default HTTP port for the marketplace API
    pub const HTTP_PORT: u16 = 8081;

    /// Default SQLite database location
    pub const DATABASE_URL: &str = "sqlite:data/skilllink.db";

    /// Default wall-clock budget for a booking transaction, in seconds
    pub const BOOKING_TIMEOUT_SECS: u64 = 10;
}

/// Operational limits
pub mod limits {
    /// How far into the future the slot listing looks when no upper
    /// bound is supplied
    pub const DEFAULT_SLOT_WINDOW_DAYS: i64 = 365;
}
