//! Aggregate measurements over the whole swarm, used for diagnostics logging

use crate::particle::ParticleStore;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwarmStats {
    /// Mean distance to the attractor over finite particles
    pub mean_radius: f32,
    /// Largest speed over finite particles
    pub max_speed: f32,
    /// Σ ½|v|² over finite particles (unit mass)
    pub kinetic_energy: f32,
    /// Particles whose position or velocity contains NaN/Inf
    pub non_finite: usize,
}

impl SwarmStats {
    pub fn measure(store: &ParticleStore) -> Self {
        let mut stats = SwarmStats::default();
        let mut radius_sum = 0.0_f64;
        let mut finite = 0usize;

        for i in 0..store.len() {
            let p = store.position(i);
            let v = store.velocity(i);
            if !p.is_finite() || !v.is_finite() {
                stats.non_finite += 1;
                continue;
            }
            finite += 1;
            radius_sum += p.length() as f64;
            let speed = v.length();
            stats.max_speed = stats.max_speed.max(speed);
            stats.kinetic_energy += 0.5 * speed * speed;
        }

        if finite > 0 {
            stats.mean_radius = (radius_sum / finite as f64) as f32;
        }
        stats
    }
}

impl std::fmt::Display for SwarmStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mean radius {:.2}, max speed {:.2}, kinetic energy {:.1}, non-finite {}",
            self.mean_radius, self.max_speed, self.kinetic_energy, self.non_finite
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDims;
    use glam::Vec3;

    #[test]
    fn measures_radius_speed_and_energy() {
        let dims = GridDims::new(2, 1, 1).unwrap();
        let store = ParticleStore::from_parts(
            dims,
            vec![[3.0, 4.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
            vec![[0.0, 2.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0]],
        )
        .unwrap();

        let stats = SwarmStats::measure(&store);
        assert!((stats.mean_radius - 3.0).abs() < 1e-6);
        assert!((stats.max_speed - 2.0).abs() < 1e-6);
        assert!((stats.kinetic_energy - 2.5).abs() < 1e-6);
        assert_eq!(stats.non_finite, 0);
    }

    #[test]
    fn non_finite_particles_are_counted_and_excluded() {
        let dims = GridDims::new(2, 1, 1).unwrap();
        let mut store =
            ParticleStore::from_parts(dims, vec![[2.0, 0.0, 0.0, 0.0]; 2], vec![[0.0; 4]; 2]).unwrap();
        store.set_position(0, Vec3::splat(f32::NAN));

        let stats = SwarmStats::measure(&store);
        assert_eq!(stats.non_finite, 1);
        assert!((stats.mean_radius - 2.0).abs() < 1e-6);
    }
}
