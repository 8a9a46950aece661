//! Share/token conversion at the program's fixed-point share price.
//!
//! Both directions floor. Converting tokens to shares and back can lose up to
//! one raw token unit, never gain one.

use num_traits::Zero;

use crate::constants::{SHARE_PRICE_SCALE, TOKEN_DECIMALS};
use crate::error::{Result, StakeClientError};
use crate::state::UserStake;
use crate::wide::WideU128;

fn validate_price(price: WideU128) -> Result<()> {
    if price.is_zero() {
        return Err(StakeClientError::InvalidSharePrice {
            price: u128::from(price),
        });
    }
    Ok(())
}

/// `floor(tokens * 1e9 / price)`
pub fn tokens_to_shares(tokens: impl Into<WideU128>, price: WideU128) -> Result<WideU128> {
    validate_price(price)?;
    let tokens: WideU128 = tokens.into();
    let numerator = tokens
        .checked_mul(WideU128::from(SHARE_PRICE_SCALE))
        .ok_or(StakeClientError::overflow("tokens_to_shares"))?;
    numerator
        .checked_div(price)
        .ok_or(StakeClientError::InvalidSharePrice { price: 0 })
}

/// `floor(shares * price / 1e9)`
pub fn shares_to_tokens(shares: impl Into<WideU128>, price: WideU128) -> Result<WideU128> {
    validate_price(price)?;
    let shares: WideU128 = shares.into();
    let numerator = shares
        .checked_mul(price)
        .ok_or(StakeClientError::overflow("shares_to_tokens"))?;
    numerator
        .checked_div(WideU128::from(SHARE_PRICE_SCALE))
        .ok_or(StakeClientError::overflow("shares_to_tokens"))
}

/// Raw token amount the program will record for unstaking `shares`.
pub fn unstake_amount(shares: WideU128, price: WideU128) -> Result<u64> {
    shares_to_tokens(shares, price)?
        .to_u64()
        .ok_or(StakeClientError::overflow("unstake_amount"))
}

/// Token value of a position relative to what was deposited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfitAndLoss {
    Gain(WideU128),
    Loss(WideU128),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionValue {
    /// Current token value of the share balance, excluding any pending unstake.
    pub value: WideU128,
    pub cost_basis: WideU128,
}

impl PositionValue {
    pub fn profit_and_loss(&self) -> ProfitAndLoss {
        match self.value.checked_sub(self.cost_basis) {
            Some(gain) => ProfitAndLoss::Gain(gain),
            // value < cost_basis, so the reverse subtraction cannot underflow
            None => ProfitAndLoss::Loss(self.cost_basis - self.value),
        }
    }
}

pub fn value_of_position(record: &UserStake, price: WideU128) -> Result<PositionValue> {
    Ok(PositionValue {
        value: shares_to_tokens(record.shares, price)?,
        cost_basis: record.cost_basis,
    })
}

fn decimal_factor(decimals: u8) -> Result<u64> {
    10u64
        .checked_pow(decimals as u32)
        .ok_or(StakeClientError::overflow("decimal_factor"))
}

/// Parses a human-readable amount such as `"100.5"` into raw units,
/// flooring digits past the token's decimals.
pub fn display_to_raw(display: &str) -> Result<u64> {
    display_to_raw_with_decimals(display, TOKEN_DECIMALS)
}

pub fn display_to_raw_with_decimals(display: &str, decimals: u8) -> Result<u64> {
    let invalid = |reason: &str| StakeClientError::InvalidAmount {
        field: "display amount",
        reason: format!("{reason}: {display:?}"),
    };
    let trimmed = display.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid("not a non-negative decimal"));
    }

    let factor = decimal_factor(decimals)?;
    let mut raw: u64 = 0;
    for digit in whole.bytes() {
        raw = raw
            .checked_mul(10)
            .and_then(|r| r.checked_add((digit - b'0') as u64))
            .ok_or(StakeClientError::overflow("display_to_raw"))?;
    }
    raw = raw
        .checked_mul(factor)
        .ok_or(StakeClientError::overflow("display_to_raw"))?;

    let mut place = factor;
    for digit in fraction.bytes().take(decimals as usize) {
        place /= 10;
        raw = raw
            .checked_add((digit - b'0') as u64 * place)
            .ok_or(StakeClientError::overflow("display_to_raw"))?;
    }
    Ok(raw)
}

/// Renders raw units with trailing fractional zeros trimmed, e.g. `"100.5"`.
pub fn raw_to_display(raw: u64) -> String {
    raw_to_display_with_decimals(raw, TOKEN_DECIMALS)
}

pub fn raw_to_display_with_decimals(raw: u64, decimals: u8) -> String {
    let Ok(factor) = decimal_factor(decimals) else {
        return raw.to_string();
    };
    let whole = raw / factor;
    let fraction = raw % factor;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use test_case::test_case;

    fn w(value: u128) -> WideU128 {
        WideU128::from(value)
    }

    const ONE_TO_ONE: u128 = 1_000_000_000;

    #[test]
    fn two_tokens_per_share() {
        let shares = tokens_to_shares(50_000_000u64, w(2_000_000_000)).unwrap();
        assert_eq!(shares, w(25_000_000));
        assert_eq!(shares_to_tokens(shares, w(2_000_000_000)).unwrap(), w(50_000_000));
    }

    #[test]
    fn one_to_one_is_identity() {
        assert_eq!(tokens_to_shares(100_000_000u64, w(ONE_TO_ONE)).unwrap(), w(100_000_000));
        assert_eq!(shares_to_tokens(100_000_000u64, w(ONE_TO_ONE)).unwrap(), w(100_000_000));
    }

    #[test]
    fn conversions_floor() {
        // 10 tokens at 3 tokens/share -> 3.33 shares
        assert_eq!(tokens_to_shares(10u64, w(3_000_000_000)).unwrap(), w(3));
        // 3 shares at 1.5 tokens/share -> 4.5 tokens
        assert_eq!(shares_to_tokens(3u64, w(1_500_000_000)).unwrap(), w(4));
    }

    #[test]
    fn zero_price_is_rejected() {
        assert_matches!(
            tokens_to_shares(1u64, WideU128::ZERO),
            Err(StakeClientError::InvalidSharePrice { price: 0 })
        );
        assert_matches!(
            shares_to_tokens(1u64, WideU128::ZERO),
            Err(StakeClientError::InvalidSharePrice { price: 0 })
        );
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        assert_matches!(
            tokens_to_shares(WideU128::MAX, w(ONE_TO_ONE)),
            Err(StakeClientError::ArithmeticOverflow { operation: "tokens_to_shares" })
        );
        assert_matches!(
            shares_to_tokens(WideU128::MAX, w(2)),
            Err(StakeClientError::ArithmeticOverflow { operation: "shares_to_tokens" })
        );
        assert_matches!(
            unstake_amount(w(u64::MAX as u128 + 1), w(ONE_TO_ONE)),
            Err(StakeClientError::ArithmeticOverflow { operation: "unstake_amount" })
        );
    }

    #[test]
    fn full_u64_supply_fits_the_intermediate() {
        let shares = tokens_to_shares(u64::MAX, w(1)).unwrap();
        assert_eq!(u128::from(shares), u64::MAX as u128 * ONE_TO_ONE);
    }

    #[test]
    fn position_gain_and_loss() {
        let record = UserStake {
            bump: 255,
            config: Default::default(),
            user: Default::default(),
            guardian_pool: Default::default(),
            shares: w(100),
            cost_basis: w(150),
            commission_accumulator: WideU128::ZERO,
            unstaking_amount: 0,
            unstake_timestamp: 0,
        };
        let at_two = value_of_position(&record, w(2_000_000_000)).unwrap();
        assert_eq!(at_two.value, w(200));
        assert_eq!(at_two.profit_and_loss(), ProfitAndLoss::Gain(w(50)));

        let at_one = value_of_position(&record, w(ONE_TO_ONE)).unwrap();
        assert_eq!(at_one.profit_and_loss(), ProfitAndLoss::Loss(w(50)));
    }

    #[test_case("100", 100_000_000 ; "whole")]
    #[test_case("100.5", 100_500_000 ; "fraction")]
    #[test_case("0.000001", 1 ; "smallest unit")]
    #[test_case("0.0000019", 1 ; "floors extra digits")]
    #[test_case(".25", 250_000 ; "no whole part")]
    #[test_case("7.", 7_000_000 ; "trailing dot")]
    #[test_case(" 3 ", 3_000_000 ; "surrounding whitespace")]
    fn parses_display_amounts(display: &str, raw: u64) {
        assert_eq!(display_to_raw(display).unwrap(), raw);
    }

    #[test_case("" ; "empty")]
    #[test_case("." ; "lone dot")]
    #[test_case("-1" ; "negative")]
    #[test_case("1.2.3" ; "two dots")]
    #[test_case("1e6" ; "exponent")]
    fn rejects_malformed_display_amounts(display: &str) {
        assert_matches!(
            display_to_raw(display),
            Err(StakeClientError::InvalidAmount { field: "display amount", .. })
        );
    }

    #[test]
    fn display_overflow_is_reported() {
        assert_matches!(
            display_to_raw("18446744073710"),
            Err(StakeClientError::ArithmeticOverflow { .. })
        );
    }

    #[test_case(100_000_000, "100")]
    #[test_case(100_500_000, "100.5")]
    #[test_case(1, "0.000001")]
    #[test_case(0, "0")]
    fn renders_display_amounts(raw: u64, display: &str) {
        assert_eq!(raw_to_display(raw), display);
    }

    proptest! {
        #[test]
        fn round_trip_never_gains_and_loses_under_one_unit(
            tokens in 0u64..=u64::MAX,
            price in 1u128..=1_000_000_000_000_000u128,
        ) {
            let shares = tokens_to_shares(tokens, w(price)).unwrap();
            let back = u128::from(shares_to_tokens(shares, w(price)).unwrap());
            prop_assert!(back <= tokens as u128);
            // one share is worth price / 1e9 tokens, so flooring the shares
            // costs less than that plus the final floor
            let max_loss = price / ONE_TO_ONE + 1;
            prop_assert!(tokens as u128 - back <= max_loss);
        }

        #[test]
        fn round_trip_loss_under_one_unit_when_shares_are_finer(
            tokens: u64,
            price in 1u128..=1_000_000_000u128,
        ) {
            let shares = u128::from(tokens_to_shares(tokens, w(price)).unwrap());
            let back = u128::from(shares_to_tokens(shares, w(price)).unwrap());
            prop_assert!(back <= tokens as u128);
            // exact loss before the final floor, in units of 1e-9 tokens
            let scaled_loss = tokens as u128 * ONE_TO_ONE - shares * price;
            prop_assert!(scaled_loss < ONE_TO_ONE);
        }

        #[test]
        fn display_round_trip(raw: u64) {
            prop_assert_eq!(display_to_raw(&raw_to_display(raw)).unwrap(), raw);
        }
    }
}
