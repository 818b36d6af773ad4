use finder_kernel::WorldSpaceInfo;
use finder_render::{Camera, Material, camera::MAX_FOV_DEGREES, camera::MIN_FOV_DEGREES};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Confine and hide the cursor for mouse look.
    pub grab_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Finder Engine".into(),
            width: 1280,
            height: 720,
            grab_cursor: true,
        }
    }
}

/// Asset paths, relative to the config file when loaded from one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub texture: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture: "textures/checker.ppm".into(),
            vertex_shader: "shaders/textured_cube.vert.wgsl".into(),
            fragment_shader: "shaders/textured_cube.frag.wgsl".into(),
        }
    }
}

/// Runtime configuration of the engine and its default scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    /// Symmetric bound on transform positions and scales.
    pub world_bound: Vec3,
    /// Camera field of view in degrees.
    pub fov: f32,
    pub assets: AssetConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            world_bound: Vec3::splat(100.0),
            fov: 120.0,
            assets: AssetConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read and validate a YAML config. Relative asset paths are resolved
    /// against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&text)?;
        if let Some(dir) = path.parent() {
            config.assets = config.assets.relative_to(dir);
        }
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        if !self.world_bound.cmpgt(Vec3::ZERO).all() || !self.world_bound.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "world bound {} must be positive and finite",
                self.world_bound
            )));
        }
        if !(MIN_FOV_DEGREES..=MAX_FOV_DEGREES).contains(&self.fov) {
            return Err(ConfigError::Invalid(format!(
                "fov {} outside [{MIN_FOV_DEGREES}, {MAX_FOV_DEGREES}]",
                self.fov
            )));
        }
        Ok(())
    }

    pub fn world_space(&self) -> WorldSpaceInfo {
        WorldSpaceInfo::new(self.world_bound)
    }

    /// Camera for a scene shown in the configured window.
    pub fn camera(&self) -> Camera {
        let mut camera = Camera::default();
        camera.set_fov(self.fov);
        camera.set_viewport(self.window.width, self.window.height);
        camera
    }

    pub fn material(&self) -> Material {
        Material {
            texture: self.assets.texture.clone(),
            vertex_shader: self.assets.vertex_shader.clone(),
            fragment_shader: self.assets.fragment_shader.clone(),
        }
    }
}

impl AssetConfig {
    fn relative_to(self, dir: &Path) -> Self {
        let join = |p: PathBuf| if p.is_absolute() { p } else { dir.join(p) };
        Self {
            texture: join(self.texture),
            vertex_shader: join(self.vertex_shader),
            fragment_shader: join(self.fragment_shader),
        }
    }
}
