// src/common/format.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::property::ListingStatus;

/// Compact Indian-rupee rendering used on listing cards.
///
/// Crore and lakh amounts keep one decimal, thousands are shown whole, and
/// anything smaller is printed as-is. Halves round away from zero.
pub fn format_inr(amount: Decimal) -> String {
    let crore = Decimal::from(10_000_000u32);
    let lakh = Decimal::from(100_000u32);
    let thousand = Decimal::from(1_000u32);

    if amount >= crore {
        format!("₹{} Cr", one_decimal(amount / crore))
    } else if amount >= lakh {
        format!("₹{} L", one_decimal(amount / lakh))
    } else if amount >= thousand {
        let thousands = (amount / thousand).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        format!("₹{}K", thousands.normalize())
    } else {
        format!("₹{}", amount.normalize())
    }
}

/// Rentals are quoted per month.
pub fn format_listing_price(amount: Decimal, status: ListingStatus) -> String {
    match status {
        ListingStatus::Rent => format!("{}/mo", format_inr(amount)),
        ListingStatus::Sale => format_inr(amount),
    }
}

fn one_decimal(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_crore_lakh_thousand_and_plain() {
        assert_eq!(format_inr(Decimal::from(12_500_000)), "₹1.3 Cr");
        assert_eq!(format_inr(Decimal::from(250_000)), "₹2.5 L");
        assert_eq!(format_inr(Decimal::from(5_000)), "₹5K");
        assert_eq!(format_inr(Decimal::from(800)), "₹800");
    }

    #[test]
    fn keeps_trailing_decimal_on_round_units() {
        assert_eq!(format_inr(Decimal::from(10_000_000)), "₹1.0 Cr");
        assert_eq!(format_inr(Decimal::from(100_000)), "₹1.0 L");
    }

    #[test]
    fn thousands_round_half_up() {
        assert_eq!(format_inr(Decimal::from(2_500)), "₹3K");
        assert_eq!(format_inr(Decimal::from(99_999)), "₹100K");
    }

    #[test]
    fn small_amounts_drop_trailing_zeros() {
        assert_eq!(format_inr(Decimal::new(80_050, 2)), "₹800.5");
        assert_eq!(format_inr(Decimal::ZERO), "₹0");
    }

    #[test]
    fn rentals_are_monthly() {
        assert_eq!(format_listing_price(Decimal::from(15_000), ListingStatus::Rent), "₹15K/mo");
        assert_eq!(format_listing_price(Decimal::from(15_000_000), ListingStatus::Sale), "₹1.5 Cr");
    }
}
