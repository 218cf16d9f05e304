//! First-person camera controller

use crate::core::camera::{Camera, Movement};
use crate::core::input::InputState;
use winit::keyboard::KeyCode;

const MOVEMENT_KEYS: [(KeyCode, Movement); 4] = [
    (KeyCode::KeyW, Movement::Forward),
    (KeyCode::KeyS, Movement::Backward),
    (KeyCode::KeyA, Movement::Left),
    (KeyCode::KeyD, Movement::Right),
];

/// Drives a [`Camera`] from WASD keys, pointer look and the scroll wheel
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraController;

impl CameraController {
    pub fn new() -> Self {
        Self
    }

    /// Apply one frame of input to the camera
    ///
    /// Consumes the look and scroll deltas accumulated in `input`.
    pub fn update(&self, camera: &mut Camera, input: &mut InputState, elapsed_secs: f32) {
        for (key, movement) in MOVEMENT_KEYS {
            if input.is_key_pressed(key) {
                camera.translate(movement, elapsed_secs);
            }
        }

        let (dx, dy) = input.take_look_delta();
        if dx != 0.0 || dy != 0.0 {
            camera.look(dx, dy);
        }

        let scroll = input.take_scroll();
        if scroll != 0.0 {
            camera.scroll(scroll);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;

    #[test]
    fn test_wasd_moves_camera() {
        let controller = CameraController::new();
        let mut camera = Camera::default();
        let mut input = InputState::new();

        input.key_pressed(KeyCode::KeyW);
        controller.update(&mut camera, &mut input, 1.0);
        let speed = camera.settings().speed;
        assert!((camera.position - Vec3::new(0.0, 1.0, 6.0 - speed)).length() < 1e-4);

        input.key_released(KeyCode::KeyW);
        input.key_pressed(KeyCode::KeyD);
        controller.update(&mut camera, &mut input, 0.5);
        assert!((camera.position.x - speed * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let controller = CameraController::new();
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.key_pressed(KeyCode::KeyA);
        input.key_pressed(KeyCode::KeyD);
        controller.update(&mut camera, &mut input, 0.3);
        assert!((camera.position - Vec3::new(0.0, 1.0, 6.0)).length() < 1e-4);
    }

    #[test]
    fn test_look_and_scroll_are_consumed() {
        let controller = CameraController::new();
        let mut camera = Camera::default();
        let mut input = InputState::new();

        input.pointer_moved(0.0, 0.0);
        input.pointer_moved(100.0, -50.0);
        input.scrolled(5.0);
        controller.update(&mut camera, &mut input, 0.0);

        let sensitivity = camera.settings().sensitivity;
        assert!((camera.yaw() - (Camera::DEFAULT_YAW + 100.0 * sensitivity)).abs() < 1e-4);
        assert!((camera.pitch() - 50.0 * sensitivity).abs() < 1e-4);
        assert_eq!(camera.zoom(), 40.0);

        // Nothing left over for the next frame
        controller.update(&mut camera, &mut input, 0.0);
        assert_eq!(camera.zoom(), 40.0);
    }
}
