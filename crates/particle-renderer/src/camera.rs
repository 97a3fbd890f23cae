//! Camera system for 3D visualization

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Camera uniform for GPU
///
/// `inverse_view` is uploaded for shaders that need world-space camera data;
/// the particle vertex stage only uses `projection * view`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub inverse_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    pub fn inverse_view_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.inverse_view)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection)
    }
}

/// Free-flying perspective camera
pub struct Camera {
    pub eye: Vec3,
    /// Unit view direction
    pub direction: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 300.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            aspect: width as f32 / height.max(1) as f32,
            fovy: 60.0_f32.to_radians(),
            znear: 0.1,
            zfar: 40000.0,
        }
    }

    pub fn right(&self) -> Vec3 {
        self.direction.cross(self.up).normalize()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.direction, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn to_uniform(&self) -> CameraUniform {
        let view = self.view();
        CameraUniform {
            view: view.to_cols_array_2d(),
            inverse_view: view.inverse().to_cols_array_2d(),
            projection: self.projection().to_cols_array_2d(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_three_matrices() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 3 * 64);
    }

    #[test]
    fn inverse_view_undoes_view() {
        let mut camera = Camera::new(1280, 720);
        camera.eye = Vec3::new(3.0, -2.0, 10.0);
        camera.direction = Vec3::new(0.3, 0.1, -1.0).normalize();

        let uniform = camera.to_uniform();
        let identity = uniform.inverse_view_matrix() * uniform.view_matrix();
        assert!(identity.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn eye_maps_to_view_space_origin() {
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::new(5.0, 1.0, -4.0);
        let view = camera.to_uniform().view_matrix();
        assert!(view.transform_point3(camera.eye).length() < 1e-5);
    }

    #[test]
    fn right_is_perpendicular() {
        let camera = Camera::new(800, 600);
        assert!(camera.right().dot(camera.direction).abs() < 1e-6);
        assert!((camera.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn resize_ignores_zero_height() {
        let mut camera = Camera::new(800, 600);
        camera.resize(1024, 0);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        camera.resize(1000, 500);
        assert_eq!(camera.aspect, 2.0);
    }
}
