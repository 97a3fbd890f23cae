//! Central attractor force field
//!
//! CPU reference for the acceleration evaluated in `integrate.wgsl`.
//! Acceleration depends only on the particle's own position, so particles
//! never read each other's slots.

use crate::constants::ATTRACTOR_STRENGTH;
use glam::Vec3;

/// Radial falloff of the attractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Falloff {
    /// a = K / r²
    #[default]
    InverseSquare,
    /// a = K / r
    InverseLinear,
}

impl Falloff {
    /// Power of `r` in the denominator, as passed to the shader
    pub fn exponent(self) -> f32 {
        match self {
            Falloff::InverseSquare => 2.0,
            Falloff::InverseLinear => 1.0,
        }
    }

    /// The other falloff, for switching at runtime
    pub fn toggled(self) -> Self {
        match self {
            Falloff::InverseSquare => Falloff::InverseLinear,
            Falloff::InverseLinear => Falloff::InverseSquare,
        }
    }

    fn denominator(self, r: f32) -> f32 {
        match self {
            Falloff::InverseSquare => r * r,
            Falloff::InverseLinear => r,
        }
    }
}

/// Attractor fixed at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceField {
    /// `K` in `K / r^p`
    pub strength: f32,
    pub falloff: Falloff,
    /// Radius floor for the magnitude. `0.0` disables the clamp and lets the
    /// origin singularity propagate as NaN/Inf.
    pub min_distance: f32,
}

impl Default for ForceField {
    fn default() -> Self {
        Self {
            strength: ATTRACTOR_STRENGTH,
            falloff: Falloff::default(),
            min_distance: 0.0,
        }
    }
}

impl ForceField {
    pub fn new(strength: f32, falloff: Falloff) -> Self {
        Self {
            strength,
            falloff,
            min_distance: 0.0,
        }
    }

    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.min_distance = min_distance.max(0.0);
        self
    }

    /// Acceleration at `position`: `-normalize(position) * K / r^p`.
    pub fn acceleration(&self, position: Vec3) -> Vec3 {
        let r = position.length();

        let effective_r = if self.min_distance > 0.0 {
            if r == 0.0 {
                return Vec3::ZERO;
            }
            r.max(self.min_distance)
        } else {
            // Unclamped: r = 0 gives 0/0 and K/0 below
            r
        };

        -position / r * (self.strength / self.falloff.denominator(effective_r))
    }
}
