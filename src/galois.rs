//! Single-element arithmetic in GF(2^w) for word sizes 1 through 32.
//!
//! Elements are stored as `u32` values in `[0, 2^w)` using the polynomial
//! basis: bit `b` of a value is the coefficient of `x^b`. Multiplication is
//! reduced modulo a fixed primitive polynomial per word size, so the same
//! `w` always yields the same field. Both the Cauchy matrix builder and the
//! bit-matrix expander go through this module, which keeps the two
//! consistent.
//!
//! Addition in GF(2^w) is XOR and needs no helper.

use crate::error::{Error, Result};

/// Largest supported word size.
pub const MAX_W: u32 = 32;

/// Primitive polynomials indexed by `w`, including the `x^w` term.
///
/// `w = 1` uses `x + 1`, which makes GF(2) arithmetic fall out of the
/// general shift-and-reduce loop.
const PRIMITIVE_POLYS: [u64; 33] = [
    0,
    0x3,
    0x7,
    0xb,
    0x13,
    0x25,
    0x43,
    0x89,
    0x11d,
    0x211,
    0x409,
    0x805,
    0x1053,
    0x201b,
    0x4443,
    0x8003,
    0x1100b,
    0x20009,
    0x40081,
    0x80027,
    0x100009,
    0x200005,
    0x400003,
    0x800021,
    0x1000087,
    0x2000009,
    0x4000047,
    0x8000027,
    0x10000009,
    0x20000005,
    0x40800007,
    0x80000009,
    0x1_0040_0007,
];

/// The field GF(2^w) for one word size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    w: u32,
    poly: u64,
}

impl Field {
    /// Create the field GF(2^w).
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] unless `1 <= w <= 32`.
    pub fn new(w: u32) -> Result<Self> {
        if w == 0 || w > MAX_W {
            return Err(Error::Configuration(format!(
                "word size must be in 1..={MAX_W}, got {w}"
            )));
        }
        Ok(Field {
            w,
            poly: PRIMITIVE_POLYS[w as usize],
        })
    }

    /// The word size `w`.
    pub fn w(&self) -> u32 {
        self.w
    }

    /// Number of elements, `2^w`.
    pub fn order(&self) -> u64 {
        1u64 << self.w
    }

    /// Whether `x` is a member of this field.
    pub fn contains(&self, x: u32) -> bool {
        u64::from(x) < self.order()
    }

    /// Multiply two field elements.
    ///
    /// Both operands must already be members of the field.
    pub fn multiply(&self, a: u32, b: u32) -> u32 {
        debug_assert!(self.contains(a) && self.contains(b));

        let high = self.order();
        let mut a = u64::from(a);
        let mut b = u64::from(b);
        let mut result = 0u64;

        while b > 0 {
            if b & 1 != 0 {
                result ^= a;
            }
            b >>= 1;
            a <<= 1;
            if a & high != 0 {
                a ^= self.poly;
            }
        }

        result as u32
    }

    /// Find the multiplicative inverse of `a`.
    ///
    /// Uses `a^(2^w - 2) = a^-1`, which holds for every non-zero element.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] for zero or for a value outside the field.
    pub fn inverse(&self, a: u32) -> Result<u32> {
        self.check(a)?;
        if a == 0 {
            return Err(Error::InvalidInput(format!(
                "cannot invert zero in GF(2^{})",
                self.w
            )));
        }

        let mut exp = self.order() - 2;
        let mut base = a;
        let mut result = 1u32;
        while exp > 0 {
            if exp & 1 != 0 {
                result = self.multiply(result, base);
            }
            base = self.multiply(base, base);
            exp >>= 1;
        }

        Ok(result)
    }

    /// Compute `a / b`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `b` is zero or either operand is
    /// outside the field.
    pub fn divide(&self, a: u32, b: u32) -> Result<u32> {
        self.check(a)?;
        let inv = self.inverse(b)?;
        Ok(self.multiply(a, inv))
    }

    fn check(&self, x: u32) -> Result<()> {
        if !self.contains(x) {
            return Err(Error::InvalidInput(format!(
                "{x} is not an element of GF(2^{})",
                self.w
            )));
        }
        Ok(())
    }
}

/// Multiply `x` by `y` in GF(2^w).
pub fn field_multiply(x: u32, y: u32, w: u32) -> Result<u32> {
    let field = Field::new(w)?;
    field.check(x)?;
    field.check(y)?;
    Ok(field.multiply(x, y))
}

/// Multiplicative inverse of `x` in GF(2^w).
pub fn field_inverse(x: u32, w: u32) -> Result<u32> {
    Field::new(w)?.inverse(x)
}

/// Compute `x / y` in GF(2^w).
pub fn field_divide(x: u32, y: u32, w: u32) -> Result<u32> {
    Field::new(w)?.divide(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_size_bounds() {
        assert!(Field::new(0).is_err());
        assert!(Field::new(33).is_err());
        assert!(Field::new(1).is_ok());
        assert!(Field::new(32).is_ok());
    }

    #[test]
    fn test_gf2_is_boolean_and() {
        let f = Field::new(1).unwrap();
        assert_eq!(f.multiply(0, 0), 0);
        assert_eq!(f.multiply(0, 1), 0);
        assert_eq!(f.multiply(1, 0), 0);
        assert_eq!(f.multiply(1, 1), 1);
        assert_eq!(f.inverse(1).unwrap(), 1);
    }

    #[test]
    fn test_known_products() {
        // GF(4), x^2 + x + 1: x * (x + 1) = 1
        assert_eq!(field_multiply(2, 3, 2).unwrap(), 1);
        // GF(16), x^4 + x + 1: x * x^3 = x + 1
        assert_eq!(field_multiply(2, 8, 4).unwrap(), 3);
        // GF(256), 0x11d: x * x^7 = x^4 + x^3 + x^2 + 1
        assert_eq!(field_multiply(2, 0x80, 8).unwrap(), 0x1d);
    }

    #[test]
    fn test_multiply_identity_and_zero() {
        for w in [3, 8, 16, 32] {
            let f = Field::new(w).unwrap();
            let x = (0x9E37_79B9u64 & (f.order() - 1)) as u32;
            assert_eq!(f.multiply(x, 1), x);
            assert_eq!(f.multiply(1, x), x);
            assert_eq!(f.multiply(x, 0), 0);
        }
    }

    #[test]
    fn test_every_nonzero_element_has_inverse_small_w() {
        for w in 1..=12 {
            let f = Field::new(w).unwrap();
            for a in 1..f.order() as u32 {
                let inv = f.inverse(a).unwrap();
                assert_eq!(f.multiply(a, inv), 1, "w={w}, a={a}");
            }
        }
    }

    #[test]
    fn test_inverse_large_w_samples() {
        for w in 13..=MAX_W {
            let f = Field::new(w).unwrap();
            let mask = f.order() - 1;
            for seed in [1u64, 2, 3, 0x1234_5678, 0xDEAD_BEEF, u64::MAX] {
                let a = (seed & mask) as u32;
                if a == 0 {
                    continue;
                }
                let inv = f.inverse(a).unwrap();
                assert_eq!(f.multiply(a, inv), 1, "w={w}, a={a:#x}");
            }
        }
    }

    #[test]
    fn test_every_table_polynomial_yields_a_field() {
        for w in 2..=MAX_W {
            let f = Field::new(w).unwrap();
            assert_eq!(f.poly, PRIMITIVE_POLYS[w as usize]);
            assert_eq!(f.poly >> w, 1, "w={w}: missing x^w term");
            let mask = f.order() - 1;
            for seed in [2u64, 3, 5, 7, 0x9E37_79B9, 0x1234_5678, u64::MAX] {
                let a = (seed & mask) as u32;
                if a == 0 {
                    continue;
                }
                let inv = f.inverse(a).unwrap();
                assert_eq!(f.multiply(a, inv), 1, "w={w}, a={a:#x}");
            }
        }
    }

    #[test]
    fn test_gf_2_30_inverse() {
        let f = Field::new(30).unwrap();
        for a in 1..=64u32 {
            assert_eq!(f.multiply(a, f.inverse(a).unwrap()), 1, "a={a}");
        }
    }

    #[test]
    fn test_inverse_of_zero_fails() {
        assert!(matches!(field_inverse(0, 8), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_out_of_range_operands_rejected() {
        assert!(field_multiply(16, 1, 4).is_err());
        assert!(field_inverse(8, 3).is_err());
        assert!(field_divide(1, 4, 2).is_err());
    }

    #[test]
    fn test_divide_undoes_multiply() {
        let f = Field::new(8).unwrap();
        for a in [1u32, 7, 0x53, 0xCA, 0xFF] {
            for b in [1u32, 2, 0x1d, 0x80] {
                let p = f.multiply(a, b);
                assert_eq!(f.divide(p, b).unwrap(), a);
            }
        }
        assert_eq!(field_divide(1, 2, 2).unwrap(), 3);
    }
}
