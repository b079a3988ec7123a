//! Invoice request validation and amount splitting.
//!
//! The portal caps the amount of a single invoice, so a requested total above
//! the cap is split into chunks of `min(remaining, cap)`. Amounts are
//! [`Decimal`] throughout: the chunk amounts must sum to the requested total
//! exactly, with no rounding drift.

use crate::error::{InvoiceError, Result};
use rust_decimal::Decimal;

/// Per-invoice amount ceiling imposed by the portal, in currency units.
pub const MAX_INVOICE_AMOUNT: u32 = 170_000;

/// Keystroke pacing used when filling text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingPace {
    /// Delay between keystrokes to mimic human input
    Human,
    /// Type whole strings at once
    Fast,
}

impl TypingPace {
    pub fn from_fast_flag(fast: bool) -> Self {
        if fast { TypingPace::Fast } else { TypingPace::Human }
    }
}

/// A validated invoicing request, immutable for the rest of the run.
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub total: Decimal,
    pub description: String,
    pub pace: TypingPace,
}

impl InvoiceRequest {
    /// Validate the user-supplied inputs.
    ///
    /// Fails before any browser interaction: the amount must be positive and
    /// the description non-empty.
    pub fn new(total: Decimal, description: impl Into<String>, pace: TypingPace) -> Result<Self> {
        if total <= Decimal::ZERO {
            return Err(InvoiceError::InvalidArgument(format!(
                "amount must be positive, got {}",
                total
            )));
        }

        let description = description.into();
        if description.trim().is_empty() {
            return Err(InvoiceError::InvalidArgument(
                "description must not be empty".to_string(),
            ));
        }

        Ok(Self { total, description, pace })
    }
}

/// Split a total into per-invoice amounts.
///
/// Every chunk except possibly the last equals `cap`; the last carries the
/// remainder. A total that is an exact multiple of the cap produces no
/// zero-amount trailing chunk, and the chunks always sum to `total` exactly.
pub fn chunk_amounts(total: Decimal, cap: Decimal) -> Vec<Decimal> {
    debug_assert!(total > Decimal::ZERO && cap > Decimal::ZERO);

    let mut chunks = Vec::new();
    let mut remaining = total;
    while remaining > cap {
        chunks.push(cap);
        remaining -= cap;
    }
    chunks.push(remaining);
    chunks
}

/// Number of invoices a total will produce: `ceil(total / cap)`.
pub fn chunk_count(total: Decimal, cap: Decimal) -> u64 {
    use rust_decimal::prelude::ToPrimitive;

    (total / cap).ceil().to_u64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CAP: Decimal = dec!(170000);

    #[test]
    fn test_total_at_cap_is_one_invoice() {
        assert_eq!(chunk_amounts(dec!(170000), CAP), vec![dec!(170000)]);
        assert_eq!(chunk_count(dec!(170000), CAP), 1);
    }

    #[test]
    fn test_exact_multiple_has_no_zero_trailing_chunk() {
        assert_eq!(chunk_amounts(dec!(340000), CAP), vec![dec!(170000), dec!(170000)]);
        assert_eq!(chunk_count(dec!(340000), CAP), 2);
    }

    #[test]
    fn test_remainder_goes_last() {
        assert_eq!(chunk_amounts(dec!(250000), CAP), vec![dec!(170000), dec!(80000)]);
        assert_eq!(chunk_count(dec!(250000), CAP), 2);
    }

    #[test]
    fn test_tiny_total_is_one_invoice() {
        assert_eq!(chunk_amounts(dec!(1), CAP), vec![dec!(1)]);
        assert_eq!(chunk_count(dec!(1), CAP), 1);
    }

    #[test]
    fn test_fractional_remainder_is_exact() {
        let chunks = chunk_amounts(dec!(170000.50), CAP);
        assert_eq!(chunks, vec![dec!(170000), dec!(0.50)]);
        assert_eq!(chunks.iter().sum::<Decimal>(), dec!(170000.50));
    }

    #[test]
    fn test_request_rejects_non_positive_amount() {
        assert!(InvoiceRequest::new(dec!(0), "services", TypingPace::Human).is_err());
        assert!(InvoiceRequest::new(dec!(-5), "services", TypingPace::Human).is_err());
    }

    #[test]
    fn test_request_rejects_blank_description() {
        assert!(InvoiceRequest::new(dec!(100), "", TypingPace::Human).is_err());
        assert!(InvoiceRequest::new(dec!(100), "   ", TypingPace::Human).is_err());
    }

    #[test]
    fn test_typing_pace_from_flag() {
        assert_eq!(TypingPace::from_fast_flag(true), TypingPace::Fast);
        assert_eq!(TypingPace::from_fast_flag(false), TypingPace::Human);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn chunks_sum_to_total_exactly(total in 1u64..10_000_000, cap in 10_000u64..1_000_000) {
            let total = Decimal::from(total);
            let cap = Decimal::from(cap);
            let chunks = chunk_amounts(total, cap);

            prop_assert_eq!(chunks.iter().sum::<Decimal>(), total);
        }

        #[test]
        fn all_chunks_but_last_equal_cap(total in 1u64..10_000_000, cap in 10_000u64..1_000_000) {
            let chunks = chunk_amounts(Decimal::from(total), Decimal::from(cap));
            let cap = Decimal::from(cap);

            for chunk in &chunks[..chunks.len() - 1] {
                prop_assert_eq!(*chunk, cap);
            }
            let last = *chunks.last().unwrap();
            prop_assert!(last > Decimal::ZERO && last <= cap);
        }

        #[test]
        fn chunk_count_is_ceiling_division(total in 1u64..10_000_000, cap in 10_000u64..1_000_000) {
            let expected = total.div_ceil(cap);
            let chunks = chunk_amounts(Decimal::from(total), Decimal::from(cap));

            prop_assert_eq!(chunks.len() as u64, expected);
            prop_assert_eq!(chunk_count(Decimal::from(total), Decimal::from(cap)), expected);
        }

        #[test]
        fn centavo_amounts_do_not_drift(units in 1u64..1_000_000, cents in 0u32..100) {
            let total = Decimal::from(units) + Decimal::new(cents as i64, 2);
            let cap = Decimal::from(MAX_INVOICE_AMOUNT);
            let chunks = chunk_amounts(total, cap);

            prop_assert_eq!(chunks.iter().sum::<Decimal>(), total);
        }
    }
}
