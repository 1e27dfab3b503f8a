//! Bit-matrix encoding.
//!
//! Each device buffer is a sequence of blocks of `w * packetsize` bytes, and
//! each block is `w` bit-planes of `packetsize` bytes. Coding device `i`'s
//! plane `b` is the XOR of every data plane `(j, c)` whose bit
//! `(i*w + b, j*w + c)` is set in the bit-matrix.

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bitmatrix::BitMatrix;
use crate::config::{validate_geometry, validate_size};
use crate::error::{Error, Result};

/// Encode `k` data devices into `m` coding devices.
///
/// # Arguments
/// * `k`, `m`, `w` - Code geometry
/// * `bitmatrix` - The `(m*w) x (k*w)` expanded generator
/// * `data` - `k` buffers of `size` bytes, left untouched
/// * `coding` - `m` buffers of `size` bytes, overwritten
/// * `size` - Bytes per device, a multiple of `w * packetsize`
/// * `packetsize` - Bytes per bit-plane
///
/// # Errors
/// Returns [`Error::Configuration`] for invalid `k`, `m`, `w` and
/// [`Error::ShapeMismatch`] if the matrix or any buffer has the wrong size.
#[allow(clippy::too_many_arguments)]
pub fn encode<D, C>(
    k: usize,
    m: usize,
    w: u32,
    bitmatrix: &BitMatrix,
    data: &[D],
    coding: &mut [C],
    size: usize,
    packetsize: usize,
) -> Result<()>
where
    D: AsRef<[u8]>,
    C: AsMut<[u8]> + Send,
{
    validate_geometry(k, m, w)?;
    let blocks = validate_size(w, size, packetsize)?;
    check_bitmatrix(k, m, w, bitmatrix)?;
    check_buffers("data", k, size, data.iter().map(|d| d.as_ref().len()))?;
    check_buffers("coding", m, size, coding.iter_mut().map(|c| c.as_mut().len()))?;

    let w = w as usize;
    let sources: Vec<&[u8]> = data.iter().map(AsRef::as_ref).collect();

    debug!(
        "encoding {} data devices into {} coding devices: w={}, size={}, packetsize={}, blocks={}",
        k, m, w, size, packetsize, blocks
    );

    #[cfg(feature = "parallel")]
    coding.par_iter_mut().enumerate().for_each(|(i, dest)| {
        bitmatrix_dotprod(bitmatrix, i * w, w, &sources, dest.as_mut(), packetsize);
    });

    #[cfg(not(feature = "parallel"))]
    for (i, dest) in coding.iter_mut().enumerate() {
        bitmatrix_dotprod(bitmatrix, i * w, w, &sources, dest.as_mut(), packetsize);
    }

    Ok(())
}

/// Fill `dest` with the product of bit-rows `first_row..first_row + w` and
/// the bit-planes of `sources`.
///
/// Column `j*w + c` of the matrix selects plane `c` of `sources[j]`. Shapes
/// must already have been checked by the caller.
pub(crate) fn bitmatrix_dotprod(
    matrix: &BitMatrix,
    first_row: usize,
    w: usize,
    sources: &[&[u8]],
    dest: &mut [u8],
    packetsize: usize,
) {
    let block = w * packetsize;
    for offset in (0..dest.len()).step_by(block) {
        for b in 0..w {
            let start = offset + b * packetsize;
            let plane = &mut dest[start..start + packetsize];
            plane.fill(0);
            for col in matrix.row(first_row + b).iter_ones() {
                let src = offset + (col % w) * packetsize;
                xor_into(plane, &sources[col / w][src..src + packetsize]);
            }
        }
    }
}

#[inline]
fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

pub(crate) fn check_bitmatrix(k: usize, m: usize, w: u32, bitmatrix: &BitMatrix) -> Result<()> {
    let w = w as usize;
    if bitmatrix.rows() != m * w || bitmatrix.cols() != k * w {
        return Err(Error::ShapeMismatch(format!(
            "bit-matrix is {}x{}, expected {}x{}",
            bitmatrix.rows(),
            bitmatrix.cols(),
            m * w,
            k * w
        )));
    }
    Ok(())
}

pub(crate) fn check_buffers(
    label: &str,
    expected: usize,
    size: usize,
    lens: impl ExactSizeIterator<Item = usize>,
) -> Result<()> {
    if lens.len() != expected {
        return Err(Error::ShapeMismatch(format!(
            "expected {expected} {label} devices, got {}",
            lens.len()
        )));
    }
    for (i, len) in lens.enumerate() {
        if len != size {
            return Err(Error::ShapeMismatch(format!(
                "{label} device {i} has {len} bytes, expected {size}"
            )));
        }
    }
    Ok(())
}
