//! Zones: ordered pixel index sequences, computed once at startup.

use heapless::Vec;

use crate::error::ConfigError;

/// Pixel selection for an animator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixels<'a> {
    /// Every pixel of the strip, in strip order.
    All,
    /// The given indices, in the given order. Empty selects nothing.
    Indices(&'a [u16]),
}

/// Ordered, immutable sequence of pixel indices.
///
/// Indices need not be contiguous or monotonic. Every index is checked
/// against the strip's pixel count when the zone is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone<const N: usize> {
    indices: Vec<u16, N>,
}

impl<const N: usize> Zone<N> {
    /// Build a zone from a stepped range: `start`, `start + step`, ... up to
    /// but excluding `stop`. A negative step walks downwards.
    pub fn stepped(
        start: i32,
        stop: i32,
        step: i32,
        pixel_count: usize,
    ) -> Result<Self, ConfigError> {
        if step == 0 {
            return Err(ConfigError::ZeroStep);
        }

        let mut indices = Vec::new();
        let mut index = start;
        while (step > 0 && index < stop) || (step < 0 && index > stop) {
            let checked = check_index(index, pixel_count)?;
            indices
                .push(checked)
                .map_err(|_| ConfigError::ZoneTooLarge { capacity: N })?;
            // Past i32 range means past `stop` as well
            index = match index.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(Self { indices })
    }

    /// Build a zone from an explicit index list.
    pub fn from_indices(indices: &[u16], pixel_count: usize) -> Result<Self, ConfigError> {
        let mut zone = Vec::new();
        for &index in indices {
            if usize::from(index) >= pixel_count {
                return Err(ConfigError::IndexOutOfRange {
                    index: usize::from(index),
                    len: pixel_count,
                });
            }
            zone.push(index)
                .map_err(|_| ConfigError::ZoneTooLarge { capacity: N })?;
        }

        Ok(Self { indices: zone })
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn pixels(&self) -> Pixels<'_> {
        Pixels::Indices(&self.indices)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

fn check_index(index: i32, pixel_count: usize) -> Result<u16, ConfigError> {
    let unsigned = usize::try_from(index).map_err(|_| ConfigError::NegativeIndex { index })?;
    if unsigned >= pixel_count {
        return Err(ConfigError::IndexOutOfRange {
            index: unsigned,
            len: pixel_count,
        });
    }
    u16::try_from(unsigned).map_err(|_| ConfigError::IndexOutOfRange {
        index: unsigned,
        len: pixel_count,
    })
}

/// A zone together with how its two stages light it.
///
/// Stage two lights the whole zone; stage one lights it from
/// `stage1_skip` onwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSetup<const N: usize> {
    zone: Zone<N>,
    stage1_skip: usize,
}

impl<const N: usize> ZoneSetup<N> {
    pub fn new(zone: Zone<N>, stage1_skip: usize) -> Result<Self, ConfigError> {
        if stage1_skip > zone.len() {
            return Err(ConfigError::SkipOutOfRange {
                skip: stage1_skip,
                len: zone.len(),
            });
        }
        Ok(Self { zone, stage1_skip })
    }

    /// Whole zone.
    pub fn pixels(&self) -> Pixels<'_> {
        self.zone.pixels()
    }

    /// Part of the zone lit in stage one.
    pub fn stage1_pixels(&self) -> Pixels<'_> {
        Pixels::Indices(&self.zone.indices()[self.stage1_skip..])
    }

    pub fn zone(&self) -> &Zone<N> {
        &self.zone
    }
}
