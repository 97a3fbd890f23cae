//! Free-fly camera controls: WASD to move, Space/Shift for up/down, mouse to
//! look, wheel and arrow keys to change speed.

use glam::{Quat, Vec3};
use particle_renderer::Camera;
use std::f32::consts::FRAC_PI_2;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pair of keys driving one movement axis
struct Axis {
    negative: KeyCode,
    positive: KeyCode,
    negative_pressed: bool,
    positive_pressed: bool,
}

impl Axis {
    fn new(negative: KeyCode, positive: KeyCode) -> Self {
        Self {
            negative,
            positive,
            negative_pressed: false,
            positive_pressed: false,
        }
    }

    fn process(&mut self, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed;
        match event.physical_key {
            PhysicalKey::Code(code) if code == self.positive => self.positive_pressed = pressed,
            PhysicalKey::Code(code) if code == self.negative => self.negative_pressed = pressed,
            _ => {}
        }
    }

    fn value(&self) -> f32 {
        f32::from(self.positive_pressed) - f32::from(self.negative_pressed)
    }
}

pub struct CameraController {
    pub speed: f32,
    pub sensitivity: f32,
    yaw: f32,
    pitch: f32,
    strafe: Axis,
    forward: Axis,
    lift: Axis,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            yaw: 0.0,
            pitch: 0.0,
            strafe: Axis::new(KeyCode::KeyA, KeyCode::KeyD),
            forward: Axis::new(KeyCode::KeyS, KeyCode::KeyW),
            lift: Axis::new(KeyCode::ShiftLeft, KeyCode::Space),
        }
    }

    pub fn process_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.strafe.process(event);
                self.forward.process(event);
                self.lift.process(event);

                if event.state == ElementState::Pressed {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::ArrowUp) => self.speed *= 1.2,
                        PhysicalKey::Code(KeyCode::ArrowDown) => self.speed /= 1.2,
                        _ => {}
                    }
                }
            }
            WindowEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(_, y),
                ..
            } => {
                self.speed = (self.speed * (1.0 + y * 0.1)).max(0.01);
            }
            _ => {}
        }
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.yaw -= delta.0 as f32 * self.sensitivity;
            self.pitch = (self.pitch - delta.1 as f32 * self.sensitivity)
                .clamp(-FRAC_PI_2 + 0.001, FRAC_PI_2 - 0.001);
        }
    }

    pub fn update(&self, camera: &mut Camera, dt: f32) {
        let rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        camera.direction = rotation * Vec3::NEG_Z;

        let movement = self.strafe.value() * camera.right()
            + self.forward.value() * camera.direction
            + self.lift.value() * camera.up;

        if movement != Vec3::ZERO {
            camera.eye += movement.normalize() * self.speed * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_controller_keeps_default_view() {
        let controller = CameraController::new(10.0, 0.005);
        let mut camera = Camera::new(800, 600);
        let eye = camera.eye;
        controller.update(&mut camera, 0.5);
        assert_eq!(camera.eye, eye);
        assert!((camera.direction - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped_short_of_vertical() {
        let mut controller = CameraController::new(10.0, 1.0);
        controller.process_device_event(&DeviceEvent::MouseMotion { delta: (0.0, -10.0) });
        let mut camera = Camera::new(800, 600);
        controller.update(&mut camera, 0.0);
        assert!(camera.direction.y < 1.0);
        assert!(camera.direction.y > 0.99);
    }
}
