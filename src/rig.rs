use glam::{Mat4, Vec3};
use crate::camera::Camera;
use crate::config::{Config, Mode, OrbitConfig};

/// Field of view used by the rigs that have no zoom control.
pub const FIXED_FOV: f32 = 45.0;

const TARGET_HOME: [f32; 3] = [0.0, 0.0, 5.0];

/// Circles the origin at a fixed radius, always looking at it.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    /// Degrees around the y axis, zero on +z.
    pub angle: f32,
    pub height: f32,
    pub radius: f32,
    pub step_degrees: f32,
    pub lift: f32,
}

impl Orbit {
    pub fn from_config(config: &OrbitConfig) -> Self {
        Self {
            angle: 0.0,
            height: 0.0,
            radius: config.radius,
            step_degrees: config.step_degrees,
            lift: config.lift,
        }
    }

    pub fn turn(&mut self, steps: f32) {
        self.angle += steps * self.step_degrees;
    }

    pub fn raise(&mut self, steps: f32) {
        self.height += steps * self.lift;
    }

    pub fn eye(&self) -> Vec3 {
        let angle = self.angle.to_radians();
        Vec3::new(angle.sin() * self.radius, self.height, angle.cos() * self.radius)
    }
}

/// Eye moved in whole-unit steps, always looking at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub eye: Vec3,
}

impl Default for Target {
    fn default() -> Self {
        Self { eye: Vec3::from(TARGET_HOME) }
    }
}

impl Target {
    pub fn nudge(&mut self, offset: Vec3) {
        self.eye += offset;
    }

    pub fn reset(&mut self) {
        self.eye = Vec3::from(TARGET_HOME);
    }
}

/// The view-matrix source the window is running.
#[derive(Debug, Clone, PartialEq)]
pub enum Rig {
    Fly(Camera),
    Orbit(Orbit),
    Target(Target),
}

impl Rig {
    pub fn from_config(config: &Config) -> Self {
        match config.mode {
            Mode::Fly => Rig::Fly(Camera::from_config(&config.camera)),
            Mode::Orbit => Rig::Orbit(Orbit::from_config(&config.orbit)),
            Mode::Target => Rig::Target(Target::default()),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Rig::Fly(_) => Mode::Fly,
            Rig::Orbit(_) => Mode::Orbit,
            Rig::Target(_) => Mode::Target,
        }
    }

    pub fn eye(&self) -> Vec3 {
        match self {
            Rig::Fly(camera) => camera.position,
            Rig::Orbit(orbit) => orbit.eye(),
            Rig::Target(target) => target.eye,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        match self {
            Rig::Fly(camera) => camera.view_matrix(),
            Rig::Orbit(_) | Rig::Target(_) => {
                Mat4::look_at_rh(self.eye(), Vec3::zero(), Vec3::unit_y())
            }
        }
    }

    /// Vertical field of view in degrees.
    pub fn fov_degrees(&self) -> f32 {
        match self {
            Rig::Fly(camera) => camera.zoom(),
            _ => FIXED_FOV,
        }
    }

    pub fn projection_matrix(&self, aspect_ratio: f32, z_near: f32, z_far: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees().to_radians(), aspect_ratio, z_near, z_far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn mode_follows_config() {
        for &mode in [Mode::Fly, Mode::Orbit, Mode::Target].iter() {
            let config = Config { mode, ..Config::default() };
            assert_eq!(Rig::from_config(&config).mode(), mode);
        }
    }

    #[test]
    fn fly_rig_starts_at_configured_position() {
        let rig = Rig::from_config(&Config::default());
        assert!(rig.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), EPS));
        assert_eq!(rig.fov_degrees(), 45.0);
    }

    #[test]
    fn orbit_circles_origin() {
        let mut orbit = Orbit::from_config(&OrbitConfig::default());
        assert!(orbit.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), EPS));

        orbit.turn(18.0);
        assert!(orbit.eye().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-4));

        orbit.raise(10.0);
        assert!((orbit.eye().y - 1.0).abs() < EPS);
        let flat = Vec3::new(orbit.eye().x, 0.0, orbit.eye().z);
        assert!((flat.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn orbit_view_looks_at_origin() {
        let mut orbit = Orbit::from_config(&OrbitConfig::default());
        orbit.turn(-7.0);
        orbit.raise(3.0);
        let rig = Rig::Orbit(orbit);
        let origin = rig.view_matrix() * Vec3::zero().extend(1.0);
        let distance = rig.eye().length();
        assert!(origin.truncate().abs_diff_eq(Vec3::new(0.0, 0.0, -distance), 1e-4));
    }

    #[test]
    fn target_nudges_and_resets() {
        let mut target = Target::default();
        target.nudge(Vec3::new(-1.0, 0.0, 0.0));
        target.nudge(Vec3::new(0.0, 1.0, 0.0));
        target.nudge(Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(target.eye, Vec3::new(-1.0, 1.0, 4.0));
        target.reset();
        assert_eq!(target.eye, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn fixed_rigs_ignore_zoom() {
        let rig = Rig::Target(Target::default());
        assert_eq!(rig.fov_degrees(), FIXED_FOV);
        let expected = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::zero(), Vec3::unit_y());
        assert!(rig.view_matrix().abs_diff_eq(expected, EPS));
    }
}
