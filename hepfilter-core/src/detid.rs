//! Calorimeter cell identifiers.
//!
//! Raw identifiers pack the detector code in bits 28-31 and the
//! subdetector code in bits 25-27. The remaining bits hold the cell
//! coordinates, whose layout depends on the subdetector:
//!
//! - Barrel: `iphi` in bits 0-8, `|ieta|` in bits 9-15, eta sign in bit 16.
//! - Endcap: `iy` in bits 0-6, `ix` in bits 7-13, z side in bit 14.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const DETECTOR_SHIFT: u32 = 28;
const SUBDET_SHIFT: u32 = 25;
const ECAL_DETECTOR: u32 = 3;

const BARREL_IETA_MASK: u32 = 0x7F;
const BARREL_IPHI_MASK: u32 = 0x1FF;
const ENDCAP_XY_MASK: u32 = 0x7F;

/// Raw detector-cell identifier. A raw value of zero is the null sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DetId(pub u32);

impl DetId {
    /// Creates an identifier from its raw value.
    #[inline]
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Returns true for the null sentinel.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Detector code (bits 28-31).
    #[inline]
    #[must_use]
    pub fn detector(&self) -> u32 {
        self.0 >> DETECTOR_SHIFT
    }

    /// Subdetector region, if this is a calorimeter cell.
    #[must_use]
    pub fn subdetector(&self) -> Option<Subdetector> {
        if self.detector() != ECAL_DETECTOR {
            return None;
        }
        match (self.0 >> SUBDET_SHIFT) & 0x7 {
            1 => Some(Subdetector::Barrel),
            2 => Some(Subdetector::Endcap),
            _ => None,
        }
    }
}

impl fmt::Display for DetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calorimeter region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Subdetector {
    /// Central barrel.
    Barrel,
    /// Forward endcaps.
    Endcap,
}

impl Subdetector {
    fn code(self) -> u32 {
        match self {
            Self::Barrel => 1,
            Self::Endcap => 2,
        }
    }

    fn base(self) -> u32 {
        (ECAL_DETECTOR << DETECTOR_SHIFT) | (self.code() << SUBDET_SHIFT)
    }
}

impl fmt::Display for Subdetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Barrel => write!(f, "EB"),
            Self::Endcap => write!(f, "EE"),
        }
    }
}

/// Decoded barrel cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrelCell {
    /// Signed crystal eta index (never zero).
    pub ieta: i32,
    /// Crystal phi index.
    pub iphi: u32,
}

impl BarrelCell {
    /// Creates a barrel cell.
    ///
    /// Encodable cells have `1 <= |ieta| <= 127` and `iphi <= 511`.
    #[must_use]
    pub fn new(ieta: i32, iphi: u32) -> Self {
        Self { ieta, iphi }
    }

    /// Decodes a barrel identifier.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn from_id(id: DetId) -> Option<Self> {
        if id.subdetector() != Some(Subdetector::Barrel) {
            return None;
        }
        let raw = id.raw();
        let ieta_abs = ((raw >> 9) & BARREL_IETA_MASK) as i32;
        let ieta = if raw & 0x1_0000 != 0 { ieta_abs } else { -ieta_abs };
        Some(Self {
            ieta,
            iphi: raw & BARREL_IPHI_MASK,
        })
    }

    /// Encodes the cell as an identifier.
    ///
    /// Out-of-range coordinates are truncated to their bit fields; use
    /// [`checked_id`](Self::checked_id) to reject them instead.
    #[must_use]
    pub fn id(&self) -> DetId {
        let sign = if self.ieta > 0 { 0x1_0000 } else { 0 };
        let ieta = self.ieta.unsigned_abs() & BARREL_IETA_MASK;
        DetId(Subdetector::Barrel.base() | sign | (ieta << 9) | (self.iphi & BARREL_IPHI_MASK))
    }

    /// Encodes the cell, or `None` if a coordinate does not fit its field.
    #[must_use]
    pub fn checked_id(&self) -> Option<DetId> {
        let ieta = self.ieta.unsigned_abs();
        (ieta != 0 && ieta <= BARREL_IETA_MASK && self.iphi <= BARREL_IPHI_MASK)
            .then(|| self.id())
    }
}

/// Decoded endcap cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndcapCell {
    /// Crystal x index.
    pub ix: u32,
    /// Crystal y index.
    pub iy: u32,
    /// Endcap side, +1 or -1.
    pub zside: i32,
}

impl EndcapCell {
    /// Creates an endcap cell.
    ///
    /// Encodable cells have `ix` and `iy` at most 127.
    #[must_use]
    pub fn new(ix: u32, iy: u32, zside: i32) -> Self {
        Self { ix, iy, zside }
    }

    /// Decodes an endcap identifier.
    #[must_use]
    pub fn from_id(id: DetId) -> Option<Self> {
        if id.subdetector() != Some(Subdetector::Endcap) {
            return None;
        }
        let raw = id.raw();
        Some(Self {
            ix: (raw >> 7) & ENDCAP_XY_MASK,
            iy: raw & ENDCAP_XY_MASK,
            zside: if raw & 0x4000 != 0 { 1 } else { -1 },
        })
    }

    /// Encodes the cell as an identifier.
    ///
    /// Out-of-range coordinates are truncated to their bit fields; use
    /// [`checked_id`](Self::checked_id) to reject them instead.
    #[must_use]
    pub fn id(&self) -> DetId {
        let side = if self.zside > 0 { 0x4000 } else { 0 };
        let ix = self.ix & ENDCAP_XY_MASK;
        let iy = self.iy & ENDCAP_XY_MASK;
        DetId(Subdetector::Endcap.base() | side | (ix << 7) | iy)
    }

    /// Encodes the cell, or `None` if a coordinate does not fit its field.
    #[must_use]
    pub fn checked_id(&self) -> Option<DetId> {
        (self.ix <= ENDCAP_XY_MASK && self.iy <= ENDCAP_XY_MASK).then(|| self.id())
    }
}
