//! Big integer operations for high-precision reward math
//!
//! Seconds-per-liquidity values carry an X128 fixed-point scale, so the
//! products and quotients in the reward computation exceed the native `u128`
//! range. This module provides a 4x64-bit-word `U256` with checked
//! arithmetic, and a `U512` intermediate so that `(a * b) / c` never loses
//! precision or wraps.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

/// 256-bit unsigned integer, 4x64-bit words, least-significant word first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct U256 {
    pub words: [u64; 4],
}

impl U256 {
    pub const ZERO: U256 = U256 { words: [0; 4] };
    pub const ONE: U256 = U256 { words: [1, 0, 0, 0] };
    pub const MAX: U256 = U256 { words: [u64::MAX; 4] };

    /// Create U256 from u64
    pub const fn from_u64(value: u64) -> Self {
        U256 { words: [value, 0, 0, 0] }
    }

    /// Create U256 from u128
    pub const fn from_u128(value: u128) -> Self {
        U256 {
            words: [value as u64, (value >> 64) as u64, 0, 0],
        }
    }

    /// Convert to u128 if the value fits
    pub fn to_u128(&self) -> Option<u128> {
        if self.words[2] != 0 || self.words[3] != 0 {
            return None;
        }
        Some(((self.words[1] as u128) << 64) | self.words[0] as u128)
    }

    /// Convert to u64 if the value fits
    pub fn to_u64(&self) -> Option<u64> {
        if self.words[1] != 0 || self.words[2] != 0 || self.words[3] != 0 {
            return None;
        }
        Some(self.words[0])
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Addition with overflow checking
    pub fn checked_add(&self, other: &U256) -> Option<U256> {
        let mut result = U256::ZERO;
        let mut carry = 0u64;

        for i in 0..4 {
            let (sum1, overflow1) = self.words[i].overflowing_add(other.words[i]);
            let (sum2, overflow2) = sum1.overflowing_add(carry);

            result.words[i] = sum2;
            carry = u64::from(overflow1) + u64::from(overflow2);
        }

        if carry != 0 {
            None
        } else {
            Some(result)
        }
    }

    /// Subtraction with underflow checking
    pub fn checked_sub(&self, other: &U256) -> Option<U256> {
        if self < other {
            return None;
        }

        let mut result = U256::ZERO;
        let mut borrow = 0u64;

        for i in 0..4 {
            let (diff1, underflow1) = self.words[i].overflowing_sub(other.words[i]);
            let (diff2, underflow2) = diff1.overflowing_sub(borrow);

            result.words[i] = diff2;
            borrow = u64::from(underflow1) + u64::from(underflow2);
        }

        Some(result)
    }

    /// Schoolbook multiplication into a U512, which cannot overflow
    pub fn full_mul(&self, other: &U256) -> U512 {
        let mut words = [0u64; 8];

        for i in 0..4 {
            if self.words[i] == 0 {
                continue;
            }
            let mut carry = 0u128;
            for j in 0..4 {
                let product = (self.words[i] as u128) * (other.words[j] as u128)
                    + words[i + j] as u128
                    + carry;
                words[i + j] = product as u64;
                carry = product >> 64;
            }
            // words[i + 4] is untouched by earlier rows, and carry < 2^64
            words[i + 4] = carry as u64;
        }

        U512 { words }
    }

    /// Multiplication with overflow checking
    pub fn checked_mul(&self, other: &U256) -> Option<U256> {
        self.full_mul(other).to_u256()
    }

    /// Division with zero checking
    pub fn checked_div(&self, other: &U256) -> Option<U256> {
        let (quotient, _) = U512::from_u256(self).div_rem(&U512::from_u256(other))?;
        quotient.to_u256()
    }

    /// Left shift with overflow checking
    pub fn checked_shl(&self, shift: u32) -> Option<U256> {
        if self.is_zero() {
            return Some(U256::ZERO);
        }
        if shift >= 256 {
            return None;
        }

        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        let mut result = [0u64; 4];

        for i in 0..4 {
            let src = self.words[i];
            if src == 0 {
                continue;
            }
            let pos = i + word_shift;
            let low = if bit_shift == 0 { src } else { src << bit_shift };
            let high = if bit_shift == 0 { 0 } else { src >> (64 - bit_shift) };

            if pos >= 4 {
                return None;
            }
            result[pos] |= low;
            if high != 0 {
                if pos + 1 >= 4 {
                    return None;
                }
                result[pos + 1] |= high;
            }
        }

        Some(U256 { words: result })
    }

    /// High-precision multiply-divide: `(self * numerator) / denominator`
    /// with a 512-bit intermediate product
    pub fn mul_div(&self, numerator: &U256, denominator: &U256, rounding: Rounding) -> Option<U256> {
        if denominator.is_zero() {
            return None;
        }

        let product = self.full_mul(numerator);
        let (quotient, remainder) = product.div_rem(&U512::from_u256(denominator))?;
        let mut result = quotient.to_u256()?;

        if rounding == Rounding::Up && !remainder.is_zero() {
            result = result.checked_add(&U256::ONE)?;
        }

        Some(result)
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.words[i].cmp(&other.words[i]) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256::from_u64(value)
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        U256::from_u128(value)
    }
}

/// 512-bit unsigned integer for intermediate products
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct U512 {
    pub words: [u64; 8],
}

impl U512 {
    pub const ZERO: U512 = U512 { words: [0; 8] };

    /// Zero-extend a U256
    pub const fn from_u256(value: &U256) -> Self {
        let w = value.words;
        U512 {
            words: [w[0], w[1], w[2], w[3], 0, 0, 0, 0],
        }
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Convert to U256 if the value fits
    pub fn to_u256(&self) -> Option<U256> {
        if self.words[4..8].iter().any(|&word| word != 0) {
            return None;
        }
        Some(U256 {
            words: [self.words[0], self.words[1], self.words[2], self.words[3]],
        })
    }

    /// Position of the highest set bit plus one; 0 for a zero value
    fn bit_len(&self) -> u32 {
        for i in (0..8).rev() {
            if self.words[i] != 0 {
                return (i as u32) * 64 + (64 - self.words[i].leading_zeros());
            }
        }
        0
    }

    fn bit(&self, index: u32) -> bool {
        (self.words[(index / 64) as usize] >> (index % 64)) & 1 == 1
    }

    fn set_bit(&mut self, index: u32) {
        self.words[(index / 64) as usize] |= 1u64 << (index % 64);
    }

    /// Shift left by one bit, dropping any bit shifted out of range. Callers
    /// keep the remainder below the divisor, so nothing is ever dropped.
    fn shl1(&mut self) {
        let mut carry = 0u64;
        for word in self.words.iter_mut() {
            let next_carry = *word >> 63;
            *word = (*word << 1) | carry;
            carry = next_carry;
        }
    }

    fn sub_in_place(&mut self, other: &U512) {
        let mut borrow = 0u64;
        for i in 0..8 {
            let (diff1, underflow1) = self.words[i].overflowing_sub(other.words[i]);
            let (diff2, underflow2) = diff1.overflowing_sub(borrow);
            self.words[i] = diff2;
            borrow = u64::from(underflow1) + u64::from(underflow2);
        }
        debug_assert_eq!(borrow, 0);
    }

    fn cmp_words(&self, other: &U512) -> Ordering {
        for i in (0..8).rev() {
            match self.words[i].cmp(&other.words[i]) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }

    /// Long division via binary shift-subtract. Returns `(quotient,
    /// remainder)`, or `None` for a zero divisor.
    pub fn div_rem(&self, divisor: &U512) -> Option<(U512, U512)> {
        if divisor.is_zero() {
            return None;
        }
        if self.cmp_words(divisor) == Ordering::Less {
            return Some((U512::ZERO, *self));
        }

        let mut quotient = U512::ZERO;
        let mut remainder = U512::ZERO;

        for index in (0..self.bit_len()).rev() {
            remainder.shl1();
            if self.bit(index) {
                remainder.words[0] |= 1;
            }
            if remainder.cmp_words(divisor) != Ordering::Less {
                remainder.sub_in_place(divisor);
                quotient.set_bit(index);
            }
        }

        Some((quotient, remainder))
    }
}
