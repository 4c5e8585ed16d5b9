//! Periodic lattice replication and Bloch phases.
//!
//! A periodic direction tiles the simulation cell with copies spaced one
//! lattice period apart; a field sampled in copy `n` equals the stored field
//! times the Bloch factor raised to `n`. [`PeriodicLattice`] records, per
//! direction, whether such tiling applies and with which period and factor,
//! and converts integer shift vectors into continuous offsets and accumulated
//! phases.

use num_complex::Complex64;
use num_traits::One;

use crate::geometry::{Direction, IntVector, Vector};

/// One periodic direction: its period and the unit-magnitude Bloch factor
/// picked up per positive lattice step.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PeriodicAxis {
    period: f64,
    factor: Complex64,
}

impl PeriodicAxis {
    /// Declares a periodic direction.
    ///
    /// # Panics
    ///
    /// Panics if `period` is not a positive finite length or `factor` is not
    /// unit-magnitude; both indicate a configuration bug, not bad input.
    pub fn new(period: f64, factor: Complex64) -> Self {
        assert!(
            period.is_finite() && period > 0.0,
            "lattice period must be positive and finite, got {period}"
        );
        assert!(
            (factor.norm() - 1.0).abs() < 1e-9,
            "Bloch factor must have unit magnitude, got |{factor}| = {}",
            factor.norm()
        );
        PeriodicAxis { period, factor }
    }

    /// A periodic direction with the Bloch factor `exp(i k period)` for wave
    /// vector component `k`.
    pub fn bloch(period: f64, k: f64) -> Self {
        Self::new(period, Complex64::from_polar(1.0, k * period))
    }

    /// A periodic direction with no phase (factor one).
    pub fn plain(period: f64) -> Self {
        Self::new(period, Complex64::one())
    }

    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    #[inline]
    pub fn factor(&self) -> Complex64 {
        self.factor
    }
}

/// Per-direction periodicity of the simulation cell.
///
/// Non-periodic directions have no entry; shift vectors are zero there by
/// construction and contribute no offset or phase.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PeriodicLattice {
    axes: [Option<PeriodicAxis>; 3],
}

impl PeriodicLattice {
    /// A lattice with no periodic directions.
    pub fn aperiodic() -> Self {
        Self::default()
    }

    /// Declares `direction` periodic.
    pub fn with_axis(mut self, direction: Direction, axis: PeriodicAxis) -> Self {
        self.axes[direction.index()] = Some(axis);
        self
    }

    #[inline]
    pub fn axis(&self, direction: Direction) -> Option<&PeriodicAxis> {
        self.axes[direction.index()].as_ref()
    }

    #[inline]
    pub fn is_periodic(&self, direction: Direction) -> bool {
        self.axes[direction.index()].is_some()
    }

    /// The continuous offset of the copy reached by `steps` lattice steps.
    pub fn shift_vector(&self, steps: IntVector) -> Vector {
        let mut out = Vector::zero();
        for d in Direction::ALL {
            if let Some(axis) = self.axis(d) {
                out[d] = axis.period() * steps[d] as f64;
            }
        }
        out
    }

    /// The accumulated Bloch phase of the copy reached by `steps`, the
    /// product of `factor^n` over the periodic directions.
    pub fn shift_phase(&self, steps: IntVector) -> Complex64 {
        let mut phase = Complex64::one();
        for d in Direction::ALL {
            if let Some(axis) = self.axis(d) {
                phase *= axis.factor().powi(steps[d] as i32);
            }
        }
        phase
    }
}
