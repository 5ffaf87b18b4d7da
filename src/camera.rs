use glam::{Mat4, Vec3};
use crate::config::CameraConfig;

/// Direction of a keyboard-driven camera step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera driven by yaw/pitch angles in degrees.
///
/// `front`, `right` and `up` are derived from `yaw`, `pitch` and `world_up`
/// and are rebuilt every time an angle changes, so they always form an
/// orthonormal basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    zoom_min: f32,
    zoom_max: f32,
    pitch_limit: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let defaults = CameraConfig::default();
        Self::with_orientation(
            position,
            Vec3::from(defaults.world_up),
            defaults.yaw,
            defaults.pitch,
        )
    }

    /// Only the sign of `world_up.y` is kept: pitch is measured from the
    /// y axis, so the reference up is either +y or -y.
    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let config = CameraConfig {
            position: position.into(),
            world_up: world_up.into(),
            yaw,
            pitch,
            ..CameraConfig::default()
        };
        Self::from_config(&config)
    }

    /// Expects a config that passed `Config::validate`.
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: Vec3::from(config.position),
            front: -Vec3::unit_z(),
            up: Vec3::unit_y(),
            right: Vec3::unit_x(),
            world_up: vertical(Vec3::from(config.world_up)),
            yaw: config.yaw,
            pitch: config.pitch.clamp(-config.pitch_limit, config.pitch_limit),
            zoom: config.zoom.clamp(config.zoom_min, config.zoom_max),
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            pitch_limit: config.pitch_limit,
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Moves along `front` or `right`. `delta_time` is in seconds and must
    /// not be negative; a negative value moves the camera backwards along
    /// the requested direction and is not checked.
    pub fn translate(&mut self, direction: Movement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        let step = match direction {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Left => -self.right,
            Movement::Right => self.right,
        };
        self.position += step * velocity;
    }

    /// Turns the camera by raw mouse offsets. Yaw wraps freely, pitch is
    /// clamped to the pitch limit.
    pub fn rotate(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;
        self.pitch = self.pitch.clamp(-self.pitch_limit, self.pitch_limit);
        self.update_vectors();
    }

    /// Scrolling up narrows the field of view.
    pub fn zoom_by(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(self.zoom_min, self.zoom_max);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32, z_near: f32, z_far: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect_ratio, z_near, z_far)
    }

    fn update_vectors(&mut self) {
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

fn vertical(up: Vec3) -> Vec3 {
    if up.y < 0.0 {
        -Vec3::unit_y()
    } else {
        Vec3::unit_y()
    }
}
