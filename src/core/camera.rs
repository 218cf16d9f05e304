//! Free-flying yaw/pitch camera

use crate::core::config::CameraConfig;
use crate::core::types::{Mat4, Vec3};

/// Direction of a keyboard-driven camera step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Tunables that bound how input maps onto the camera
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSettings {
    /// Movement speed in world units per second
    pub speed: f32,
    /// Degrees of rotation per pixel of pointer motion
    pub sensitivity: f32,
    /// Narrowest vertical field of view in degrees
    pub zoom_min: f32,
    /// Widest vertical field of view in degrees
    pub zoom_max: f32,
    /// Largest absolute pitch in degrees, strictly below 90
    pub pitch_limit: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            speed: 2.5,
            sensitivity: 0.1,
            zoom_min: 1.0,
            zoom_max: 45.0,
            pitch_limit: 89.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl From<&CameraConfig> for CameraSettings {
    fn from(config: &CameraConfig) -> Self {
        Self {
            speed: config.speed,
            sensitivity: config.sensitivity,
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            pitch_limit: config.pitch_limit,
            near: config.near,
            far: config.far,
        }
    }
}

/// Camera with Euler orientation and a derived orthonormal basis
#[derive(Clone, Debug)]
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Rotation around the world up axis, in degrees
    yaw: f32,
    /// Elevation above the horizon, in degrees
    pitch: f32,
    /// Vertical field of view in degrees
    zoom: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    settings: CameraSettings,
}

impl Camera {
    pub const DEFAULT_YAW: f32 = -90.0;
    pub const DEFAULT_PITCH: f32 = 0.0;

    /// Create a camera looking down -Z
    pub fn new(position: Vec3, settings: CameraSettings) -> Self {
        Self::with_orientation(position, Self::DEFAULT_YAW, Self::DEFAULT_PITCH, settings)
    }

    /// Create a camera with an explicit orientation (degrees)
    pub fn with_orientation(position: Vec3, yaw: f32, pitch: f32, settings: CameraSettings) -> Self {
        let mut camera = Self {
            position,
            yaw,
            pitch: 0.0,
            zoom: settings.zoom_max,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            settings,
        };
        camera.pitch = camera.clamp_pitch(pitch);
        camera.update_basis();
        camera
    }

    /// Build a camera from configuration
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::with_orientation(
            Vec3::from_array(config.position),
            config.yaw,
            config.pitch,
            CameraSettings::from(config),
        );
        camera.set_zoom(config.zoom);
        camera
    }

    /// Step along the current basis, scaled by speed and elapsed time
    pub fn translate(&mut self, direction: Movement, elapsed_secs: f32) {
        let distance = self.settings.speed * elapsed_secs;
        let offset = match direction {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Left => -self.right,
            Movement::Right => self.right,
        };
        self.position += offset * distance;
    }

    /// Apply a pointer delta in pixels (positive dy looks up)
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.settings.sensitivity;
        self.pitch = self.clamp_pitch(self.pitch + dy * self.settings.sensitivity);
        self.update_basis();
    }

    /// Apply a scroll delta; scrolling up narrows the field of view
    pub fn scroll(&mut self, dy: f32) {
        self.set_zoom(self.zoom - dy);
    }

    /// Set the vertical field of view, clamped to the configured range
    pub fn set_zoom(&mut self, zoom: f32) {
        // NaN falls back to the widest view
        let zoom = if zoom.is_nan() { self.settings.zoom_max } else { zoom };
        self.zoom = zoom.clamp(self.settings.zoom_min, self.settings.zoom_max);
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(
            self.zoom.to_radians(),
            aspect,
            self.settings.near,
            self.settings.far,
        )
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    fn clamp_pitch(&self, pitch: f32) -> f32 {
        let limit = self.settings.pitch_limit.clamp(0.0, 89.9);
        if pitch.is_nan() {
            return 0.0;
        }
        pitch.clamp(-limit, limit)
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 6.0), CameraSettings::default())
    }
}
