//! Coding sessions and arena-backed device buffers.
//!
//! [`CauchyCode`] builds the generator and its bit-matrix once for a
//! [`CodingConfig`] and reuses them for every encode and decode call.
//! [`Stripe`] owns the buffers of all `k + m` devices in one contiguous
//! arena, laid out data devices first, each `device_size` bytes long.

use std::ops::Range;

use crate::bitmatrix::{expand_to_bitmatrix, BitMatrix};
use crate::cauchy::{build_generator_matrix, GeneratorMatrix};
use crate::config::CodingConfig;
use crate::decode::{decode, make_decoding_bitmatrix, DecodingMatrix, ErasureSet};
use crate::encode::encode;
use crate::error::{Error, Result};

/// A Cauchy bit-matrix code for one configuration.
#[derive(Debug, Clone)]
pub struct CauchyCode {
    config: CodingConfig,
    generator: GeneratorMatrix,
    bitmatrix: BitMatrix,
}

impl CauchyCode {
    /// Build the generator matrix and bit-matrix for `config`.
    pub fn new(config: CodingConfig) -> Result<Self> {
        let generator = build_generator_matrix(config.k(), config.m(), config.w())?;
        let bitmatrix = expand_to_bitmatrix(&generator);
        Ok(CauchyCode {
            config,
            generator,
            bitmatrix,
        })
    }

    /// The configuration this code was built for.
    pub fn config(&self) -> &CodingConfig {
        &self.config
    }

    /// The `m x k` field generator.
    pub fn generator(&self) -> &GeneratorMatrix {
        &self.generator
    }

    /// The `(m*w) x (k*w)` expanded generator.
    pub fn bitmatrix(&self) -> &BitMatrix {
        &self.bitmatrix
    }

    /// Encode `data` into `coding`. Every buffer must have the same length,
    /// a multiple of [`CodingConfig::device_size`].
    pub fn encode<D, C>(&self, data: &[D], coding: &mut [C]) -> Result<()>
    where
        D: AsRef<[u8]>,
        C: AsMut<[u8]> + Send,
    {
        let size = data.first().map_or(0, |d| d.as_ref().len());
        encode(
            self.config.k(),
            self.config.m(),
            self.config.w(),
            &self.bitmatrix,
            data,
            coding,
            size,
            self.config.packetsize(),
        )
    }

    /// Rebuild the devices in `erasures` in place and return their indices.
    pub fn decode<D, C>(
        &self,
        erasures: &ErasureSet,
        data: &mut [D],
        coding: &mut [C],
    ) -> Result<Vec<usize>>
    where
        D: AsRef<[u8]> + AsMut<[u8]>,
        C: AsRef<[u8]> + AsMut<[u8]>,
    {
        let size = data.first().map_or(0, |d| d.as_ref().len());
        decode(
            self.config.k(),
            self.config.m(),
            self.config.w(),
            &self.bitmatrix,
            erasures,
            data,
            coding,
            size,
            self.config.packetsize(),
        )
    }

    /// The inverted decoding matrix for an erasure pattern, for callers
    /// that want to cache it.
    pub fn decoding_matrix(&self, erasures: &ErasureSet) -> Result<DecodingMatrix> {
        make_decoding_bitmatrix(
            self.config.k(),
            self.config.m(),
            self.config.w(),
            &self.bitmatrix,
            erasures,
        )
    }
}

/// Buffers for all `k + m` devices of one stripe, in a single allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripe {
    k: usize,
    m: usize,
    device_size: usize,
    arena: Vec<u8>,
}

impl Stripe {
    /// Allocate a zeroed stripe whose devices hold `blocks` blocks of
    /// `w * packetsize` bytes each.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if `blocks` is zero.
    pub fn new(config: &CodingConfig, blocks: usize) -> Result<Self> {
        if blocks == 0 {
            return Err(Error::ShapeMismatch(
                "a stripe needs at least one block per device".to_string(),
            ));
        }
        let device_size = config.device_size() * blocks;
        Ok(Stripe {
            k: config.k(),
            m: config.m(),
            device_size,
            arena: vec![0; config.total_devices() * device_size],
        })
    }

    /// Bytes per device.
    pub fn device_size(&self) -> usize {
        self.device_size
    }

    /// Number of devices, `k + m`.
    pub fn devices(&self) -> usize {
        self.k + self.m
    }

    fn span(&self, index: usize) -> Range<usize> {
        index * self.device_size..(index + 1) * self.device_size
    }

    /// Contents of device `index`; data devices come first.
    pub fn device(&self, index: usize) -> Option<&[u8]> {
        (index < self.devices()).then(|| &self.arena[self.span(index)])
    }

    /// Mutable contents of device `index`.
    pub fn device_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.devices() {
            return None;
        }
        let span = self.span(index);
        Some(&mut self.arena[span])
    }

    /// Zero device `index`, simulating its loss.
    ///
    /// # Errors
    /// Returns [`Error::UnrecoverableErasure`] if the device does not exist.
    pub fn erase(&mut self, index: usize) -> Result<()> {
        let devices = self.devices();
        self.device_mut(index)
            .ok_or_else(|| {
                Error::UnrecoverableErasure(format!(
                    "device {index} does not exist in a {devices}-device stripe"
                ))
            })?
            .fill(0);
        Ok(())
    }

    /// Recompute the coding devices from the data devices.
    pub fn encode(&mut self, code: &CauchyCode) -> Result<()> {
        let size = self.device_size;
        let (data, coding) = self.arena.split_at_mut(self.k * size);
        let data: Vec<&[u8]> = data.chunks_exact(size).collect();
        let mut coding: Vec<&mut [u8]> = coding.chunks_exact_mut(size).collect();
        code.encode(&data, &mut coding)
    }

    /// Rebuild the erased devices in place and return their indices.
    pub fn decode(&mut self, code: &CauchyCode, erasures: &ErasureSet) -> Result<Vec<usize>> {
        let size = self.device_size;
        let (data, coding) = self.arena.split_at_mut(self.k * size);
        let mut data: Vec<&mut [u8]> = data.chunks_exact_mut(size).collect();
        let mut coding: Vec<&mut [u8]> = coding.chunks_exact_mut(size).collect();
        code.decode(erasures, &mut data, &mut coding)
    }
}
