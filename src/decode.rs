//! Erasure decoding.
//!
//! Stacking the `(k*w) x (k*w)` identity (one block per data device) on top
//! of the generator bit-matrix (one block per coding device) gives a matrix
//! that maps data bit-planes to every device's bit-planes. Taking the blocks
//! of the first `k` surviving devices and inverting them gives a matrix that
//! maps surviving planes back to data planes. Erased data devices are
//! recovered through that inverse; erased coding devices are then
//! re-encoded from the complete data.

use log::{debug, trace};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bitmatrix::BitMatrix;
use crate::config::{validate_geometry, validate_size};
use crate::encode::{bitmatrix_dotprod, check_bitmatrix, check_buffers};
use crate::error::{Error, Result};

/// A validated set of erased device indices.
///
/// Data devices are `0..k`, coding devices `k..k+m`. A set holds at most
/// `m` indices and never the same index twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErasureSet {
    indices: Vec<usize>,
}

impl ErasureSet {
    /// Build an erasure set for a `k + m` device code.
    ///
    /// # Errors
    /// Returns [`Error::UnrecoverableErasure`] if there are more than `m`
    /// indices, an index is `>= k + m`, or an index repeats.
    pub fn new(indices: impl IntoIterator<Item = usize>, k: usize, m: usize) -> Result<Self> {
        let set = ErasureSet {
            indices: indices.into_iter().collect(),
        };
        set.validate(k, m)?;
        Ok(set)
    }

    /// Build an erasure set from a list terminated by a negative sentinel,
    /// usually `-1`. Entries after the sentinel are ignored; a list without a
    /// sentinel is read to its end.
    ///
    /// # Errors
    /// Same as [`ErasureSet::new`].
    pub fn from_terminated(list: &[i32], k: usize, m: usize) -> Result<Self> {
        let indices = list
            .iter()
            .take_while(|&&i| i >= 0)
            .map(|&i| i as usize);
        Self::new(indices, k, m)
    }

    /// Erased indices in the order given.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of erased devices.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing is erased.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether device `index` is erased.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Check the set against a `k + m` device code.
    pub fn validate(&self, k: usize, m: usize) -> Result<()> {
        if self.indices.len() > m {
            return Err(Error::UnrecoverableErasure(format!(
                "{} devices erased but only {m} can be recovered",
                self.indices.len()
            )));
        }
        let devices = k.checked_add(m).ok_or_else(|| {
            Error::UnrecoverableErasure(format!("a code with k={k} and m={m} is too large"))
        })?;
        if let Some(&index) = self.indices.iter().find(|&&index| index >= devices) {
            return Err(Error::UnrecoverableErasure(format!(
                "device {index} does not exist in a {devices}-device code"
            )));
        }

        let mut sorted = self.indices.clone();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::UnrecoverableErasure(format!("device {} erased twice", pair[0])));
        }
        Ok(())
    }
}

/// The inverted decoding bit-matrix and the devices it reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodingMatrix {
    /// `(k*w) x (k*w)` inverse; row block `i` rebuilds data device `i`
    pub inverse: BitMatrix,
    /// The `k` surviving device indices, in column block order
    pub survivors: Vec<usize>,
}

/// Build and invert the decoding bit-matrix for an erasure pattern.
///
/// The first `k` surviving devices, in index order, supply the rows.
///
/// # Errors
/// Returns [`Error::UnrecoverableErasure`] for an invalid erasure set,
/// [`Error::ShapeMismatch`] for a bit-matrix of the wrong size, and
/// [`Error::InternalConsistency`] if the matrix turns out to be singular.
pub fn make_decoding_bitmatrix(
    k: usize,
    m: usize,
    w: u32,
    bitmatrix: &BitMatrix,
    erasures: &ErasureSet,
) -> Result<DecodingMatrix> {
    validate_geometry(k, m, w)?;
    check_bitmatrix(k, m, w, bitmatrix)?;
    erasures.validate(k, m)?;

    let w = w as usize;
    let survivors: Vec<usize> = (0..k + m)
        .filter(|&d| !erasures.contains(d))
        .take(k)
        .collect();

    let mut matrix = BitMatrix::new(k * w, k * w, w);
    for (block, &device) in survivors.iter().enumerate() {
        for x in 0..w {
            if device < k {
                matrix.set(block * w + x, device * w + x, true);
            } else {
                matrix.copy_row_from(block * w + x, bitmatrix, (device - k) * w + x);
            }
        }
    }

    let inverse = matrix.invert().ok_or_else(|| {
        Error::InternalConsistency(format!(
            "decoding bit-matrix for survivors {survivors:?} is singular"
        ))
    })?;

    Ok(DecodingMatrix { inverse, survivors })
}

/// Reconstruct every erased device in place.
///
/// Erased data devices are rebuilt through the inverted decoding matrix.
/// Erased coding devices are then re-encoded from the complete data. Returns
/// the indices that were rebuilt. Nothing is written unless validation and
/// inversion both succeed.
///
/// # Errors
/// Returns [`Error::Configuration`], [`Error::ShapeMismatch`],
/// [`Error::UnrecoverableErasure`] or [`Error::InternalConsistency`].
#[allow(clippy::too_many_arguments)]
pub fn decode<D, C>(
    k: usize,
    m: usize,
    w: u32,
    bitmatrix: &BitMatrix,
    erasures: &ErasureSet,
    data: &mut [D],
    coding: &mut [C],
    size: usize,
    packetsize: usize,
) -> Result<Vec<usize>>
where
    D: AsRef<[u8]> + AsMut<[u8]>,
    C: AsRef<[u8]> + AsMut<[u8]>,
{
    validate_geometry(k, m, w)?;
    validate_size(w, size, packetsize)?;
    check_bitmatrix(k, m, w, bitmatrix)?;
    check_buffers("data", k, size, data.iter().map(|d| d.as_ref().len()))?;
    check_buffers("coding", m, size, coding.iter().map(|c| c.as_ref().len()))?;
    erasures.validate(k, m)?;

    let (lost_data, lost_coding): (Vec<usize>, Vec<usize>) =
        erasures.indices().iter().partition(|&&i| i < k);

    debug!(
        "decoding {} erased data and {} erased coding devices: k={}, m={}, w={}, size={}",
        lost_data.len(),
        lost_coding.len(),
        k,
        m,
        w,
        size
    );

    let wu = w as usize;

    if !lost_data.is_empty() {
        let decoding = make_decoding_bitmatrix(k, m, w, bitmatrix, erasures)?;
        let sources: Vec<&[u8]> = decoding
            .survivors
            .iter()
            .map(|&d| {
                if d < k {
                    data[d].as_ref()
                } else {
                    coding[d - k].as_ref()
                }
            })
            .collect();

        let rebuild = |&i: &usize| {
            trace!("rebuilding data device {} from {:?}", i, decoding.survivors);
            let mut buf = vec![0u8; size];
            bitmatrix_dotprod(&decoding.inverse, i * wu, wu, &sources, &mut buf, packetsize);
            (i, buf)
        };

        #[cfg(feature = "parallel")]
        let recovered: Vec<(usize, Vec<u8>)> = lost_data.par_iter().map(rebuild).collect();
        #[cfg(not(feature = "parallel"))]
        let recovered: Vec<(usize, Vec<u8>)> = lost_data.iter().map(rebuild).collect();

        for (i, buf) in recovered {
            data[i].as_mut().copy_from_slice(&buf);
        }
    }

    if !lost_coding.is_empty() {
        let sources: Vec<&[u8]> = data.iter().map(AsRef::as_ref).collect();
        for &i in &lost_coding {
            trace!("re-encoding coding device {}", i - k);
            bitmatrix_dotprod(
                bitmatrix,
                (i - k) * wu,
                wu,
                &sources,
                coding[i - k].as_mut(),
                packetsize,
            );
        }
    }

    Ok(erasures.indices().to_vec())
}
