//! Sell-price computation from supplier cost and recommended retail price.
//!
//! All arithmetic is done in [`Decimal`], so `100 × 1.45` is exactly `145`
//! and the round-up step never lands one unit high because of binary
//! floating point.

use rust_decimal::{Decimal, RoundingStrategy};

/// Margin policy. Each field can be overridden independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    /// Multiplier on cost when an RRP is present; the result is capped at RRP.
    pub margin_with_rrp: Decimal,
    /// Multiplier on cost when there is no RRP.
    pub margin_no_rrp: Decimal,
    /// Round the marked-up cost up to the nearest multiple of this step.
    pub round_step: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            margin_with_rrp: Decimal::new(145, 2),
            margin_no_rrp: Decimal::new(155, 2),
            round_step: Decimal::ONE,
        }
    }
}

/// Output of [`compute_sell_price`]. All `None` means "not sellable".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SellPrice {
    pub sell_price: Option<Decimal>,
    /// RRP shown struck through when the sell price undercuts it.
    pub compare_at_price: Option<Decimal>,
    pub margin_pct: Option<Decimal>,
}

impl SellPrice {
    /// `true` when there is a strictly positive sell price to publish.
    #[must_use]
    pub fn is_sellable(&self) -> bool {
        self.sell_price.is_some_and(|p| p > Decimal::ZERO)
    }
}

/// `ceil(value / step) * step`.
///
/// A non-positive step, or a computation that would overflow, returns
/// `value` unchanged.
#[must_use]
pub fn round_up_to_nearest(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    value
        .checked_div(step)
        .and_then(|q| q.ceil().checked_mul(step))
        .unwrap_or(value)
}

/// Rounds to two decimal places, halves toward positive infinity.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    value.round_dp_with_strategy(2, strategy)
}

/// Computes the storefront price for a supplier cost.
///
/// - Missing or negative cost: not sellable.
/// - With a non-negative RRP: `min(rrp, round_up(cost × margin_with_rrp))`.
///   The sell price never exceeds RRP; when it is strictly below, RRP becomes
///   the compare-at price.
/// - Without RRP: `round_up(cost × margin_no_rrp)`, no compare-at price.
///
/// `margin_pct` is `(sell − cost) / cost × 100` for a positive sell price.
#[must_use]
pub fn compute_sell_price(
    cost: Option<Decimal>,
    rrp: Option<Decimal>,
    rules: &PricingRules,
) -> SellPrice {
    let Some(cost) = cost.filter(|c| !c.is_sign_negative()) else {
        return SellPrice::default();
    };
    let rrp = rrp.filter(|r| !r.is_sign_negative());

    let (sell_price, compare_at_price) = if let Some(rrp) = rrp {
        let Some(marked_up) = cost.checked_mul(rules.margin_with_rrp) else {
            return SellPrice::default();
        };
        let candidate = round_up_to_nearest(marked_up, rules.round_step);
        let sell = round2(rrp.min(candidate));
        let compare_at = (rrp > sell).then(|| round2(rrp));
        (sell, compare_at)
    } else {
        let Some(marked_up) = cost.checked_mul(rules.margin_no_rrp) else {
            return SellPrice::default();
        };
        (round2(round_up_to_nearest(marked_up, rules.round_step)), None)
    };

    let margin_pct = if sell_price > Decimal::ZERO {
        (sell_price - cost)
            .checked_div(cost)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(round2)
    } else {
        None
    };

    SellPrice {
        sell_price: Some(sell_price),
        compare_at_price,
        margin_pct,
    }
}
