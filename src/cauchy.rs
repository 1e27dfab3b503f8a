//! Cauchy generator matrices over GF(2^w).
//!
//! Row `i`, column `j` of the `m x k` generator holds `1 / (i XOR (m + j))`.
//! Row indices `0..m` and column indices `m..m+k` are disjoint, so every
//! denominator is non-zero, and every square submatrix of the stacked
//! `(k + m) x k` matrix (identity on top, generator below) is invertible.
//! That is what lets any `k` surviving devices reconstruct the rest.

use log::debug;

use crate::config::validate_geometry;
use crate::error::Result;
use crate::galois::Field;

/// An `m x k` Cauchy generator matrix, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorMatrix {
    k: usize,
    m: usize,
    field: Field,
    elements: Vec<u32>,
}

impl GeneratorMatrix {
    /// Number of data devices (columns).
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of coding devices (rows).
    pub fn m(&self) -> usize {
        self.m
    }

    /// Word size of the field the entries live in.
    pub fn w(&self) -> u32 {
        self.field.w()
    }

    /// The field GF(2^w) the entries live in.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Entry at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.elements[i * self.k + j]
    }

    /// Row `i` as a slice of `k` elements.
    pub fn row(&self, i: usize) -> &[u32] {
        &self.elements[i * self.k..(i + 1) * self.k]
    }

    /// All entries, row-major.
    pub fn as_slice(&self) -> &[u32] {
        &self.elements
    }
}

/// Build the `m x k` Cauchy generator matrix over GF(2^w).
///
/// # Arguments
/// * `k` - Number of data devices
/// * `m` - Number of coding devices
/// * `w` - Word size, `1..=32`
///
/// # Errors
/// Returns [`Error::Configuration`](crate::Error::Configuration) if `k` or
/// `m` is zero, `w` is out of range, or `k + m > 2^w`. No matrix is built in
/// that case.
pub fn build_generator_matrix(k: usize, m: usize, w: u32) -> Result<GeneratorMatrix> {
    validate_geometry(k, m, w)?;
    let field = Field::new(w)?;

    let mut elements = Vec::with_capacity(m * k);
    for i in 0..m {
        for j in 0..k {
            elements.push(field.inverse((i ^ (m + j)) as u32)?);
        }
    }

    debug!("built {}x{} cauchy generator matrix over GF(2^{})", m, k, w);

    Ok(GeneratorMatrix {
        k,
        m,
        field,
        elements,
    })
}
