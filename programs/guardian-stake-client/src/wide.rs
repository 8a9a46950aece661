//! 128-bit unsigned integer built from two 64-bit halves.
//!
//! All arithmetic here is done on 64-bit words only, so the same code runs
//! on targets whose widest native integer is 64 bits. Conversions to and
//! from `u128` exist for callers that do have it.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use num_traits::{Bounded, CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Zero};

const LOW_32: u64 = 0xffff_ffff;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WideU128 {
    pub lo: u64,
    pub hi: u64,
}

impl WideU128 {
    pub const ZERO: WideU128 = WideU128 { lo: 0, hi: 0 };
    pub const ONE: WideU128 = WideU128 { lo: 1, hi: 0 };
    pub const MAX: WideU128 = WideU128 {
        lo: u64::MAX,
        hi: u64::MAX,
    };

    pub const fn from_parts(lo: u64, hi: u64) -> Self {
        WideU128 { lo, hi }
    }

    pub const fn from_u64(value: u64) -> Self {
        WideU128 { lo: value, hi: 0 }
    }

    /// Narrows to `u64`, `None` if the high half is set.
    pub fn to_u64(self) -> Option<u64> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let (lo, carry) = self.lo.overflowing_add(rhs.lo);
        let hi = self.hi.checked_add(rhs.hi)?.checked_add(carry as u64)?;
        Some(WideU128 { lo, hi })
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        if self < rhs {
            return None;
        }
        Some(self.wrapping_sub(rhs))
    }

    fn wrapping_sub(self, rhs: Self) -> Self {
        let (lo, borrow) = self.lo.overflowing_sub(rhs.lo);
        let hi = self.hi.wrapping_sub(rhs.hi).wrapping_sub(borrow as u64);
        WideU128 { lo, hi }
    }

    fn limbs(self) -> [u64; 4] {
        [
            self.lo & LOW_32,
            self.lo >> 32,
            self.hi & LOW_32,
            self.hi >> 32,
        ]
    }

    /// Schoolbook multiplication on 32-bit limbs; every partial product and
    /// its carries fit in a `u64`.
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        let a = self.limbs();
        let b = rhs.limbs();
        let mut product = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u64;
            for j in 0..4 {
                let t = a[i] * b[j] + product[i + j] + carry;
                product[i + j] = t & LOW_32;
                carry = t >> 32;
            }
            product[i + 4] = carry;
        }
        if product[4..].iter().any(|limb| *limb != 0) {
            return None;
        }
        Some(WideU128 {
            lo: product[0] | (product[1] << 32),
            hi: product[2] | (product[3] << 32),
        })
    }

    /// Quotient and remainder by restoring long division, `None` on a zero divisor.
    pub fn checked_div_rem(self, rhs: Self) -> Option<(Self, Self)> {
        if rhs.is_zero() {
            return None;
        }
        if self < rhs {
            return Some((WideU128::ZERO, self));
        }
        let mut quotient = WideU128::ZERO;
        let mut remainder = WideU128::ZERO;
        for bit in (0..128).rev() {
            let (shifted, carry_out) = remainder.shl1();
            remainder = WideU128 {
                lo: shifted.lo | self.bit(bit) as u64,
                hi: shifted.hi,
            };
            if carry_out || remainder >= rhs {
                remainder = remainder.wrapping_sub(rhs);
                quotient.set_bit(bit);
            }
        }
        Some((quotient, remainder))
    }

    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        self.checked_div_rem(rhs).map(|(quotient, _)| quotient)
    }

    fn shl1(self) -> (Self, bool) {
        let carry_out = self.hi >> 63 == 1;
        let hi = (self.hi << 1) | (self.lo >> 63);
        (WideU128 { lo: self.lo << 1, hi }, carry_out)
    }

    fn bit(self, index: u32) -> bool {
        if index < 64 {
            (self.lo >> index) & 1 == 1
        } else {
            (self.hi >> (index - 64)) & 1 == 1
        }
    }

    fn set_bit(&mut self, index: u32) {
        if index < 64 {
            self.lo |= 1 << index;
        } else {
            self.hi |= 1 << (index - 64);
        }
    }
}

impl Ord for WideU128 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hi.cmp(&other.hi).then(self.lo.cmp(&other.lo))
    }
}

impl PartialOrd for WideU128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for WideU128 {
    fn from(value: u64) -> Self {
        WideU128::from_u64(value)
    }
}

impl From<u128> for WideU128 {
    fn from(value: u128) -> Self {
        WideU128 {
            lo: value as u64,
            hi: (value >> 64) as u64,
        }
    }
}

impl From<WideU128> for u128 {
    fn from(value: WideU128) -> Self {
        ((value.hi as u128) << 64) | value.lo as u128
    }
}

impl fmt::Display for WideU128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&u128::from(*self), f)
    }
}

impl fmt::Debug for WideU128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WideU128({})", self)
    }
}

// Operator impls panic on overflow, matching the primitive integers with
// overflow checks on. Use the checked forms anywhere input is untrusted.

impl Add for WideU128 {
    type Output = WideU128;

    fn add(self, rhs: Self) -> Self {
        WideU128::checked_add(self, rhs).expect("attempt to add with overflow")
    }
}

impl Sub for WideU128 {
    type Output = WideU128;

    fn sub(self, rhs: Self) -> Self {
        WideU128::checked_sub(self, rhs).expect("attempt to subtract with overflow")
    }
}

impl Mul for WideU128 {
    type Output = WideU128;

    fn mul(self, rhs: Self) -> Self {
        WideU128::checked_mul(self, rhs).expect("attempt to multiply with overflow")
    }
}

impl Div for WideU128 {
    type Output = WideU128;

    fn div(self, rhs: Self) -> Self {
        WideU128::checked_div(self, rhs).expect("attempt to divide by zero")
    }
}

impl Zero for WideU128 {
    fn zero() -> Self {
        WideU128::ZERO
    }

    fn is_zero(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }
}

impl One for WideU128 {
    fn one() -> Self {
        WideU128::ONE
    }
}

impl Bounded for WideU128 {
    fn min_value() -> Self {
        WideU128::ZERO
    }

    fn max_value() -> Self {
        WideU128::MAX
    }
}

impl CheckedAdd for WideU128 {
    fn checked_add(&self, v: &Self) -> Option<Self> {
        WideU128::checked_add(*self, *v)
    }
}

impl CheckedSub for WideU128 {
    fn checked_sub(&self, v: &Self) -> Option<Self> {
        WideU128::checked_sub(*self, *v)
    }
}

impl CheckedMul for WideU128 {
    fn checked_mul(&self, v: &Self) -> Option<Self> {
        WideU128::checked_mul(*self, *v)
    }
}

impl CheckedDiv for WideU128 {
    fn checked_div(&self, v: &Self) -> Option<Self> {
        WideU128::checked_div(*self, *v)
    }
}
