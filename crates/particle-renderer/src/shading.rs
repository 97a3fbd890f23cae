//! CPU mirrors of the particle vertex and fragment stages
//!
//! `particle.wgsl` evaluates the same functions per vertex and per instance;
//! these exist so the transform and coloring rules can be checked without a
//! device.

use crate::camera::CameraUniform;
use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use particle_physics::{GridDims, BASE_TINT_DUSK, BASE_TINT_NEUTRAL};

/// Base tint that instance colors are offset from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub base_tint: Vec3,
}

impl Palette {
    pub const NEUTRAL: Palette = Palette {
        base_tint: Vec3::from_array(BASE_TINT_NEUTRAL),
    };

    pub const DUSK: Palette = Palette {
        base_tint: Vec3::from_array(BASE_TINT_DUSK),
    };

    /// Next built-in palette. Custom tints fall back to neutral.
    pub fn cycled(self) -> Self {
        if self == Self::NEUTRAL {
            Self::DUSK
        } else {
            Self::NEUTRAL
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Render-stage uniform: tint and grid extents for instance coloring
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderParams {
    // rgb: base tint, a: padding
    pub base_tint: [f32; 4],
    // xyz: grid dimensions, w: padding
    pub grid: [u32; 4],
}

impl RenderParams {
    pub fn new(palette: Palette, dims: GridDims) -> Self {
        Self {
            base_tint: palette.base_tint.extend(0.0).to_array(),
            grid: dims.to_array(),
        }
    }
}

/// Clip-space position of one mesh vertex of one particle instance:
/// `projection * view * (instance + local)`.
pub fn vertex_transform(local: Vec3, instance: Vec3, camera: &CameraUniform) -> Vec4 {
    camera.projection_matrix() * camera.view_matrix() * (instance + local).extend(1.0)
}

/// Flat color of instance `index`, computed in the vertex stage.
///
/// Grid coordinates are scaled into [0, 1] per axis, swizzled to
/// `(x, z, y)`, normalized and added at half strength to the base tint.
/// Instance 0 sits at the grid origin and gets the bare tint.
pub fn instance_color(index: u32, dims: GridDims, palette: Palette) -> Vec3 {
    let scaled = dims.decode(index).as_vec3() / dims.as_vec3();
    let swizzled = Vec3::new(scaled.x, scaled.z, scaled.y);
    palette.base_tint + 0.5 * swizzled.normalize_or_zero()
}

/// Fragment stage: the interpolated color, fully opaque.
pub fn fragment_color(interpolated: Vec3) -> Vec4 {
    interpolated.extend(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use glam::UVec3;

    fn assert_close(a: Vec4, b: Vec4) {
        assert!((a - b).abs().max_element() < 1e-5, "{a} != {b}");
    }

    fn shaded(index: u32, dims: GridDims, palette: Palette) -> Vec4 {
        fragment_color(instance_color(index, dims, palette))
    }

    #[test]
    fn corner_colors_follow_swizzled_normalized_coordinates() {
        let dims = GridDims::new(2, 2, 2).unwrap();
        let palette = Palette::NEUTRAL;
        let tint = Vec3::splat(0.5);

        for index in 0..8 {
            let c = dims.decode(index);
            let scaled = Vec3::new(c.x as f32 / 2.0, c.z as f32 / 2.0, c.y as f32 / 2.0);
            let expected = if scaled == Vec3::ZERO {
                tint
            } else {
                tint + 0.5 * scaled / scaled.length()
            };
            assert_close(shaded(index, dims, palette), expected.extend(1.0));
        }
    }

    #[test]
    fn known_corner_values() {
        let dims = GridDims::new(2, 2, 2).unwrap();
        let palette = Palette::DUSK;

        // index 1 -> (1, 0, 0): red axis only
        assert_close(
            shaded(1, dims, palette),
            Vec4::new(0.8, 0.1, 0.3, 1.0),
        );
        // index 2 -> (0, 1, 0): y lands in the blue channel
        assert_close(
            shaded(2, dims, palette),
            Vec4::new(0.3, 0.1, 0.8, 1.0),
        );
        // index 4 -> (0, 0, 1): z lands in the green channel
        assert_close(
            shaded(4, dims, palette),
            Vec4::new(0.3, 0.6, 0.3, 1.0),
        );
        // index 0 -> origin: bare tint
        assert_close(
            shaded(0, dims, palette),
            Vec4::new(0.3, 0.1, 0.3, 1.0),
        );
    }

    #[test]
    fn color_uses_the_grid_codec() {
        let dims = GridDims::new(4, 3, 2).unwrap();
        let index = dims.encode(UVec3::new(3, 2, 1));
        let scaled = Vec3::new(3.0 / 4.0, 1.0 / 2.0, 2.0 / 3.0);
        let expected = Palette::NEUTRAL.base_tint + 0.5 * scaled.normalize();
        assert_close(
            shaded(index, dims, Palette::NEUTRAL),
            expected.extend(1.0),
        );
    }

    #[test]
    fn alpha_is_always_opaque() {
        let dims = GridDims::new(3, 3, 3).unwrap();
        assert!((0..27).all(|i| shaded(i, dims, Palette::DUSK).w == 1.0));
    }

    #[test]
    fn fragment_passes_color_through() {
        let color = Vec3::new(0.2, 0.4, 0.6);
        assert_eq!(fragment_color(color), Vec4::new(0.2, 0.4, 0.6, 1.0));
    }

    #[test]
    fn palettes_cycle_between_builtins() {
        assert_eq!(Palette::NEUTRAL.cycled(), Palette::DUSK);
        assert_eq!(Palette::DUSK.cycled(), Palette::NEUTRAL);
        let custom = Palette {
            base_tint: Vec3::new(0.1, 0.2, 0.3),
        };
        assert_eq!(custom.cycled(), Palette::NEUTRAL);
    }

    #[test]
    fn vertex_transform_adds_local_offset_to_instance() {
        let camera = Camera::new(800, 800).to_uniform();
        let local = Vec3::new(0.5, -0.5, 0.5);
        let instance = Vec3::new(10.0, 2.0, -3.0);

        let clip = vertex_transform(local, instance, &camera);
        let expected = camera.projection_matrix()
            * camera.view_matrix()
            * Vec4::new(10.5, 1.5, -2.5, 1.0);
        assert_close(clip, expected);
    }

    #[test]
    fn point_in_front_of_camera_lands_inside_clip_volume() {
        let camera = Camera::new(800, 800).to_uniform();
        // Default camera sits at z = 300 looking down -z
        let clip = vertex_transform(Vec3::ZERO, Vec3::ZERO, &camera);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn render_params_pack_tint_and_grid() {
        let dims = GridDims::new(8, 8, 4).unwrap();
        let params = RenderParams::new(Palette::DUSK, dims);
        assert_eq!(params.base_tint, [0.3, 0.1, 0.3, 0.0]);
        assert_eq!(params.grid, [8, 8, 4, 0]);
        assert_eq!(std::mem::size_of::<RenderParams>(), 32);
    }
}
