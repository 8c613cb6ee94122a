// ABOUTME: Pure pricing calculator for booked sessions with commission split
// ABOUTME: Maps a rate snapshot to total, commission, and trainer payout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SkillLink

//! # Pricing Calculator
//!
//! Pure decimal arithmetic. The payout is derived by subtraction rather
//! than a second rounded multiplication, so `commission + payout ==
//! total` holds exactly for every representable rate.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{RateConfig, RateMode};

/// Marketplace commission: 15% of the total charge
const COMMISSION_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Minor-unit precision of the settlement currency
const CURRENCY_SCALE: u32 = 2;

/// The financial split of a single booked session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSplit {
    /// Total charge to the trainee
    pub total_amount: Decimal,
    /// Marketplace commission
    pub commission_fee: Decimal,
    /// Remainder due to the trainer
    pub trainer_payout: Decimal,
}

/// Price one booked slot from the trainer's rate snapshot.
///
/// A slot always incurs exactly one unit of the configured rate; session
/// duration does not scale the charge. Commission is rounded half-up to
/// the currency's two decimal places.
#[must_use]
pub fn price(rate: &RateConfig) -> PriceSplit {
    let total_amount = match rate.rate_mode {
        RateMode::Day => rate.daily_rate,
        RateMode::Hour => rate.hourly_rate,
    };

    let commission_fee = (total_amount * COMMISSION_RATE)
        .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    let trainer_payout = total_amount - commission_fee;

    PriceSplit {
        total_amount,
        commission_fee,
        trainer_payout,
    }
}
