//! Coding configuration.
//!
//! A [`CodingConfig`] carries everything a coding session needs to know
//! about its geometry: `k` data devices, `m` coding devices, the word size
//! `w` of GF(2^w), and the packet size used as the XOR granularity. It is
//! validated once and then passed explicitly to every session.

use crate::error::{Error, Result};
use crate::galois::MAX_W;

/// Machine word size in bytes. Packet sizes must be a multiple of it.
pub const WORD_SIZE: usize = std::mem::size_of::<u64>();

/// Validated parameters of a Cauchy bit-matrix code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodingConfig {
    /// Number of data devices
    k: usize,
    /// Number of coding devices
    m: usize,
    /// Word size of the field GF(2^w)
    w: u32,
    /// Bytes per bit-plane
    packetsize: usize,
}

impl CodingConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    /// * `k` - Number of data devices
    /// * `m` - Number of coding devices
    /// * `w` - Word size, `1..=32`
    /// * `packetsize` - Bytes per bit-plane, a non-zero multiple of [`WORD_SIZE`]
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if any parameter is out of range or
    /// `k + m > 2^w`.
    pub fn new(k: usize, m: usize, w: u32, packetsize: usize) -> Result<Self> {
        validate_geometry(k, m, w)?;
        validate_packetsize(packetsize)?;
        Ok(CodingConfig {
            k,
            m,
            w,
            packetsize,
        })
    }

    /// Number of data devices.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of coding devices.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Word size of the field.
    pub fn w(&self) -> u32 {
        self.w
    }

    /// Bytes per bit-plane.
    pub fn packetsize(&self) -> usize {
        self.packetsize
    }

    /// Total number of devices, `k + m`.
    pub fn total_devices(&self) -> usize {
        self.k + self.m
    }

    /// Bytes in one block of a device, `w * packetsize`.
    pub fn device_size(&self) -> usize {
        self.w as usize * self.packetsize
    }

    /// Number of `w * packetsize` blocks in a device of `size` bytes.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if `size` is zero or not a multiple
    /// of [`device_size`](Self::device_size).
    pub fn blocks(&self, size: usize) -> Result<usize> {
        validate_size(self.w, size, self.packetsize)
    }
}

/// Smallest word size whose field can hold `k + m` distinct Cauchy indices.
///
/// # Errors
/// Returns [`Error::Configuration`] if `k` or `m` is zero or no supported
/// word size is large enough.
pub fn min_word_size(k: usize, m: usize) -> Result<u32> {
    (1..=MAX_W)
        .find(|&w| validate_geometry(k, m, w).is_ok())
        .ok_or_else(|| {
            Error::Configuration(format!("no word size up to {MAX_W} fits k={k}, m={m}"))
        })
}

/// Check `k`, `m` and `w` against the Cauchy construction requirements.
pub(crate) fn validate_geometry(k: usize, m: usize, w: u32) -> Result<()> {
    if k == 0 {
        return Err(Error::Configuration("k must be positive".to_string()));
    }
    if m == 0 {
        return Err(Error::Configuration("m must be positive".to_string()));
    }
    if w == 0 || w > MAX_W {
        return Err(Error::Configuration(format!(
            "word size must be in 1..={MAX_W}, got {w}"
        )));
    }
    let total = (k as u64).saturating_add(m as u64);
    if total > 1u64 << w {
        return Err(Error::Configuration(format!(
            "k + m = {total} exceeds 2^{w} = {}",
            1u64 << w
        )));
    }
    Ok(())
}

fn validate_packetsize(packetsize: usize) -> Result<()> {
    if packetsize == 0 || packetsize % WORD_SIZE != 0 {
        return Err(Error::Configuration(format!(
            "packet size must be a positive multiple of {WORD_SIZE}, got {packetsize}"
        )));
    }
    Ok(())
}

/// Check that `size` splits into whole `w * packetsize` blocks and return the block count.
pub(crate) fn validate_size(w: u32, size: usize, packetsize: usize) -> Result<usize> {
    if packetsize == 0 || packetsize % WORD_SIZE != 0 {
        return Err(Error::ShapeMismatch(format!(
            "packet size must be a positive multiple of {WORD_SIZE}, got {packetsize}"
        )));
    }
    let block = w as usize * packetsize;
    if size == 0 || size % block != 0 {
        return Err(Error::ShapeMismatch(format!(
            "device size {size} is not a positive multiple of w * packetsize = {block}"
        )));
    }
    Ok(size / block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let config = CodingConfig::new(4, 2, 4, 8).unwrap();
        assert_eq!(config.k(), 4);
        assert_eq!(config.m(), 2);
        assert_eq!(config.w(), 4);
        assert_eq!(config.packetsize(), 8);
        assert_eq!(config.total_devices(), 6);
        assert_eq!(config.device_size(), 32);
    }

    #[test]
    fn test_rejects_zero_counts() {
        assert!(matches!(
            CodingConfig::new(0, 2, 4, 8),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            CodingConfig::new(4, 0, 4, 8),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_word_size() {
        assert!(CodingConfig::new(1, 1, 0, 8).is_err());
        assert!(CodingConfig::new(1, 1, 33, 8).is_err());
        assert!(CodingConfig::new(1, 1, 32, 8).is_ok());
    }

    #[test]
    fn test_rejects_too_many_devices() {
        // 10 + 1 > 2^3
        assert!(matches!(
            CodingConfig::new(10, 1, 3, 8),
            Err(Error::Configuration(_))
        ));
        // 2^3 exactly is allowed
        assert!(CodingConfig::new(7, 1, 3, 8).is_ok());
    }

    #[test]
    fn test_rejects_packetsize() {
        assert!(CodingConfig::new(2, 1, 2, 0).is_err());
        assert!(CodingConfig::new(2, 1, 2, 12).is_err());
        assert!(CodingConfig::new(2, 1, 2, 16).is_ok());
    }

    #[test]
    fn test_blocks() {
        let config = CodingConfig::new(2, 1, 3, 8).unwrap();
        assert_eq!(config.blocks(24).unwrap(), 1);
        assert_eq!(config.blocks(72).unwrap(), 3);
        assert!(matches!(config.blocks(0), Err(Error::ShapeMismatch(_))));
        assert!(matches!(config.blocks(30), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_min_word_size() {
        assert_eq!(min_word_size(1, 1).unwrap(), 1);
        assert_eq!(min_word_size(2, 1).unwrap(), 2);
        assert_eq!(min_word_size(4, 2).unwrap(), 3);
        assert_eq!(min_word_size(10, 1).unwrap(), 4);
        assert_eq!(min_word_size(200, 56).unwrap(), 8);
        assert!(min_word_size(0, 1).is_err());
    }
}
