//! Bit-matrices over GF(2) and the expansion of field matrices into them.
//!
//! Multiplying a `w`-bit symbol by a fixed field element `e` is linear over
//! GF(2), so it can be written as a `w x w` binary matrix. Expanding every
//! entry of an `m x k` generator this way yields an `(m*w) x (k*w)`
//! bit-matrix, and encoding turns into XORs of whole bit-planes.
//!
//! Rows are packed into `u64` words with an explicit row stride, so row
//! operations during inversion work a word at a time and each row can be
//! viewed as a [`BitSlice`] for iterating over its set bits.

use std::fmt;

use bitvec::prelude::*;
use log::debug;

use crate::cauchy::GeneratorMatrix;
use crate::error::{Error, Result};

const WORD_BITS: usize = u64::BITS as usize;

/// A dense binary matrix with word-aligned rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    /// Width of one field-element block, used when printing
    w: usize,
    /// Words per row; the row stride in bits is `words_per_row * 64`
    words_per_row: usize,
    bits: BitVec<u64, Lsb0>,
}

impl BitMatrix {
    /// Create an all-zero matrix.
    ///
    /// `w` is the block width used to group bits when the matrix is printed.
    pub fn new(rows: usize, cols: usize, w: usize) -> Self {
        let words_per_row = cols.div_ceil(WORD_BITS);
        BitMatrix {
            rows,
            cols,
            w: w.max(1),
            words_per_row,
            bits: BitVec::repeat(false, rows * words_per_row * WORD_BITS),
        }
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize, w: usize) -> Self {
        let mut matrix = BitMatrix::new(n, n, w);
        for i in 0..n {
            matrix.set(i, i, true);
        }
        matrix
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Block width.
    pub fn w(&self) -> usize {
        self.w
    }

    fn stride(&self) -> usize {
        self.words_per_row * WORD_BITS
    }

    /// Bit at row `r`, column `c`.
    pub fn get(&self, r: usize, c: usize) -> bool {
        assert!(r < self.rows && c < self.cols, "bit ({r}, {c}) out of range");
        self.bits[r * self.stride() + c]
    }

    /// Set the bit at row `r`, column `c`.
    pub fn set(&mut self, r: usize, c: usize, value: bool) {
        assert!(r < self.rows && c < self.cols, "bit ({r}, {c}) out of range");
        let idx = r * self.stride() + c;
        self.bits.set(idx, value);
    }

    /// Row `r` as a bit slice of length `cols`.
    pub fn row(&self, r: usize) -> &BitSlice<u64, Lsb0> {
        let start = r * self.stride();
        &self.bits[start..start + self.cols]
    }

    /// Number of set bits in the whole matrix.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    fn row_words(&self, r: usize) -> &[u64] {
        let wpr = self.words_per_row;
        &self.bits.as_raw_slice()[r * wpr..(r + 1) * wpr]
    }

    /// Overwrite row `dst` with row `src` of `other`, which must have the same width.
    pub(crate) fn copy_row_from(&mut self, dst: usize, other: &BitMatrix, src: usize) {
        debug_assert_eq!(self.cols, other.cols);
        let wpr = self.words_per_row;
        let raw = self.bits.as_raw_mut_slice();
        raw[dst * wpr..(dst + 1) * wpr].copy_from_slice(other.row_words(src));
    }

    /// XOR row `src` into row `dst`.
    fn xor_row(&mut self, dst: usize, src: usize) {
        let wpr = self.words_per_row;
        let raw = self.bits.as_raw_mut_slice();
        for i in 0..wpr {
            let word = raw[src * wpr + i];
            raw[dst * wpr + i] ^= word;
        }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        let wpr = self.words_per_row;
        let raw = self.bits.as_raw_mut_slice();
        for i in 0..wpr {
            raw.swap(a * wpr + i, b * wpr + i);
        }
    }

    /// Invert the matrix over GF(2) by Gauss-Jordan elimination.
    ///
    /// Works on a copy augmented with the identity, swapping rows whenever
    /// the diagonal bit is clear. Returns `None` if the matrix is not square
    /// or is singular.
    pub fn invert(&self) -> Option<BitMatrix> {
        if self.rows != self.cols {
            return None;
        }
        let n = self.rows;
        let mut work = self.clone();
        let mut inverse = BitMatrix::identity(n, self.w);

        for i in 0..n {
            if !work.get(i, i) {
                let pivot = (i + 1..n).find(|&r| work.get(r, i))?;
                work.swap_rows(i, pivot);
                inverse.swap_rows(i, pivot);
            }
            for r in 0..n {
                if r != i && work.get(r, i) {
                    work.xor_row(r, i);
                    inverse.xor_row(r, i);
                }
            }
        }

        Some(inverse)
    }

    /// Matrix product over GF(2).
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if `self.cols() != rhs.rows()`.
    pub fn multiply(&self, rhs: &BitMatrix) -> Result<BitMatrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }
        let mut product = BitMatrix::new(self.rows, rhs.cols, self.w);
        let wpr = product.words_per_row;
        for r in 0..self.rows {
            for c in self.row(r).iter_ones() {
                let src = rhs.row_words(c);
                let raw = product.bits.as_raw_mut_slice();
                for (dst, word) in raw[r * wpr..(r + 1) * wpr].iter_mut().zip(src) {
                    *dst ^= *word;
                }
            }
        }
        Ok(product)
    }
}

/// Prints one row per line with a space between `w`-bit groups and a blank
/// line between groups of `w` rows.
impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            if r != 0 && r % self.w == 0 {
                writeln!(f)?;
            }
            for c in 0..self.cols {
                if c != 0 && c % self.w == 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", u8::from(self.get(r, c)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Expand an `m x k` generator matrix into its `(m*w) x (k*w)` bit-matrix.
///
/// The `w x w` block for entry `e` at `(i, j)` holds `e * 2^c` in column
/// `j*w + c`, with bit `b` of that product at row `i*w + b`. Multiplying the
/// block by the bit-vector of a symbol `s` therefore yields the bit-vector
/// of `e * s`.
pub fn expand_to_bitmatrix(matrix: &GeneratorMatrix) -> BitMatrix {
    let (k, m) = (matrix.k(), matrix.m());
    let w = matrix.w() as usize;
    let field = matrix.field();
    let mut bitmatrix = BitMatrix::new(m * w, k * w, w);

    for i in 0..m {
        for j in 0..k {
            let mut elt = matrix.get(i, j);
            for c in 0..w {
                for b in 0..w {
                    if elt & (1 << b) != 0 {
                        bitmatrix.set(i * w + b, j * w + c, true);
                    }
                }
                if c + 1 < w {
                    elt = field.multiply(elt, 2);
                }
            }
        }
    }

    debug!(
        "expanded {}x{} generator into {}x{} bit-matrix with {} ones",
        m,
        k,
        bitmatrix.rows(),
        bitmatrix.cols(),
        bitmatrix.count_ones()
    );

    bitmatrix
}
