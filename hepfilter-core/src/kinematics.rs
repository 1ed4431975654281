//! Directions, four-momenta and the ΔR metric.

use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const TWO_PI: f64 = 2.0 * PI;

/// Anything with a direction in (pseudorapidity, azimuth) space.
///
/// This is the only view the matching algorithms need of an object.
pub trait Direction: Send + Sync {
    /// Pseudorapidity.
    fn eta(&self) -> f64;

    /// Azimuthal angle in radians.
    fn phi(&self) -> f64;
}

/// Maps an azimuthal difference into `[-π, π]`.
#[inline]
#[must_use]
pub fn reduce_range(x: f64) -> f64 {
    if x.abs() <= PI {
        return x;
    }
    x - (x / TWO_PI).round() * TWO_PI
}

/// Azimuthal separation with wraparound.
#[inline]
#[must_use]
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    reduce_range(phi1 - phi2)
}

/// Squared angular distance between two directions.
#[inline]
pub fn delta_r2<A: Direction + ?Sized, B: Direction + ?Sized>(a: &A, b: &B) -> f64 {
    let deta = a.eta() - b.eta();
    let dphi = delta_phi(a.phi(), b.phi());
    deta * deta + dphi * dphi
}

/// Angular distance ΔR = sqrt(Δη² + Δφ²).
#[inline]
pub fn delta_r<A: Direction + ?Sized, B: Direction + ?Sized>(a: &A, b: &B) -> f64 {
    delta_r2(a, b).sqrt()
}

/// Four-momentum in (pt, eta, phi, mass) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct P4 {
    /// Transverse momentum (GeV).
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle (radians).
    pub phi: f64,
    /// Invariant mass (GeV).
    #[cfg_attr(feature = "serde", serde(default))]
    pub mass: f64,
}

impl P4 {
    /// Creates a new four-momentum.
    #[inline]
    #[must_use]
    pub fn new(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self { pt, eta, phi, mass }
    }
}

impl Direction for P4 {
    #[inline]
    fn eta(&self) -> f64 {
        self.eta
    }

    #[inline]
    fn phi(&self) -> f64 {
        self.phi
    }
}

/// Generator-level jet.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenJet {
    /// Jet four-momentum.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub p4: P4,
    /// Number of clustered constituents.
    #[cfg_attr(feature = "serde", serde(default))]
    pub constituents: u32,
}

impl GenJet {
    /// Creates a jet with no constituent count.
    #[must_use]
    pub fn new(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self {
            p4: P4::new(pt, eta, phi, mass),
            constituents: 0,
        }
    }

    /// Transverse momentum.
    #[inline]
    #[must_use]
    pub fn pt(&self) -> f64 {
        self.p4.pt
    }
}

impl Direction for GenJet {
    #[inline]
    fn eta(&self) -> f64 {
        self.p4.eta
    }

    #[inline]
    fn phi(&self) -> f64 {
        self.p4.phi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reduce_range_inside() {
        assert_relative_eq!(reduce_range(1.0), 1.0);
        assert_relative_eq!(reduce_range(-PI), -PI);
    }

    #[test]
    fn test_reduce_range_wraps() {
        assert_relative_eq!(reduce_range(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(reduce_range(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(reduce_range(5.0 * TWO_PI + 0.25), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_delta_r_same_direction() {
        let a = P4::new(30.0, 0.1, 0.1, 0.0);
        assert_relative_eq!(delta_r(&a, &a), 0.0);
    }

    #[test]
    fn test_delta_r_wraparound() {
        let eps = 0.01;
        let a = P4::new(30.0, 0.0, PI - eps, 0.0);
        let b = P4::new(30.0, 0.0, -PI + eps, 0.0);
        assert_relative_eq!(delta_r(&a, &b), 2.0 * eps, epsilon = 1e-9);
    }

    #[test]
    fn test_delta_r_pythagorean() {
        let a = P4::new(30.0, 0.0, 0.0, 0.0);
        let b = P4::new(30.0, 0.3, 0.4, 0.0);
        assert_relative_eq!(delta_r(&a, &b), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_gen_jet_direction() {
        let jet = GenJet::new(25.0, -1.2, 2.5, 4.0);
        assert_relative_eq!(jet.eta(), -1.2);
        assert_relative_eq!(jet.phi(), 2.5);
        assert_relative_eq!(jet.pt(), 25.0);
    }
}
