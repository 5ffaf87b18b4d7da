use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;

pub const CONFIG_ENV: &str = "FLYCAM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "flycam.toml";

const WORLD_UP_TOLERANCE: f32 = 1e-4;

/// Which of the three view-matrix styles the window runs.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Fly,
    Orbit,
    Target,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Fly
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub mode: Mode,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub projection: ProjectionConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "flycam".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// First-person camera parameters. Angles are in degrees.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub world_up: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    /// World units per second.
    pub movement_speed: f32,
    /// Degrees per unit of mouse motion.
    pub mouse_sensitivity: f32,
    /// Initial vertical field of view.
    pub zoom: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Pitch is held inside [-pitch_limit, pitch_limit].
    pub pitch_limit: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            world_up: [0.0, 1.0, 0.0],
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
            zoom_min: 1.0,
            zoom_max: 45.0,
            pitch_limit: 89.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrbitConfig {
    pub radius: f32,
    /// Degrees turned per frame while an arrow key is held.
    pub step_degrees: f32,
    /// Height change per frame while an arrow key is held.
    pub lift: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            step_degrees: 5.0,
            lift: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 100.0,
        }
    }
}

/// `$FLYCAM_CONFIG` if set, `flycam.toml` otherwise.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl Config {
    /// Loads and validates the file at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        let [px, py, pz] = camera.position;
        let [ux, uy, uz] = camera.world_up;
        let finite = [
            ("camera.position", px),
            ("camera.position", py),
            ("camera.position", pz),
            ("camera.world_up", ux),
            ("camera.world_up", uy),
            ("camera.world_up", uz),
            ("camera.yaw", camera.yaw),
            ("camera.pitch", camera.pitch),
            ("camera.movement_speed", camera.movement_speed),
            ("camera.mouse_sensitivity", camera.mouse_sensitivity),
            ("camera.zoom", camera.zoom),
            ("camera.zoom_min", camera.zoom_min),
            ("camera.pitch_limit", camera.pitch_limit),
            ("orbit.radius", self.orbit.radius),
            ("orbit.step_degrees", self.orbit.step_degrees),
            ("orbit.lift", self.orbit.lift),
            ("projection.near", self.projection.near),
            ("projection.far", self.projection.far),
        ];
        for &(name, value) in finite.iter() {
            if !value.is_finite() {
                bail!("{} must be finite, got {}", name, value);
            }
        }
        // an unbounded zoom_max is allowed, NaN is not
        if camera.zoom_max.is_nan() {
            bail!("camera.zoom_max must be a number");
        }
        if !(camera.pitch_limit > 0.0 && camera.pitch_limit < 90.0) {
            bail!("camera.pitch_limit must be inside (0, 90), got {}", camera.pitch_limit);
        }
        if !(camera.zoom_min > 0.0) || camera.zoom_min > camera.zoom_max {
            bail!(
                "camera zoom bounds must satisfy 0 < zoom_min <= zoom_max, got [{}, {}]",
                camera.zoom_min,
                camera.zoom_max
            );
        }
        if !(camera.movement_speed > 0.0) {
            bail!("camera.movement_speed must be positive");
        }
        if !(camera.mouse_sensitivity > 0.0) {
            bail!("camera.mouse_sensitivity must be positive");
        }
        // pitch is measured from the y axis, so world_up has to lie on it
        let up_length = (ux * ux + uy * uy + uz * uz).sqrt();
        if up_length == 0.0 || (uy.abs() / up_length - 1.0).abs() > WORLD_UP_TOLERANCE {
            bail!("camera.world_up must point along +y or -y, got {:?}", camera.world_up);
        }
        if !(self.orbit.radius > 0.0) {
            bail!("orbit.radius must be positive");
        }
        if !(self.projection.near > 0.0) || self.projection.far <= self.projection.near {
            bail!(
                "projection planes must satisfy 0 < near < far, got near={} far={}",
                self.projection.near,
                self.projection.far
            );
        }
        if self.window.width == 0 || self.window.height == 0 {
            bail!("window dimensions must be non-zero");
        }
        Ok(())
    }
}
