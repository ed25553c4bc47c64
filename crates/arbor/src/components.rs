//! Auxiliary components every scene understands.
//!
//! None of these are required by the hierarchy itself. They exist so the
//! editor outline, duplication and persistence have something to show and
//! carry: a display name, an enabled flag, an id that survives save/load, a
//! prefab source marker, and a camera whose aspect tracks the viewport.

use serde::{Deserialize, Serialize};

/// Display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Enabled flag. An entity without `Active` counts as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Active(pub bool);

impl Default for Active {
    fn default() -> Self {
        Self(true)
    }
}

/// Identifier that is stable across save/load and duplication-aware: a
/// duplicate always receives a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StableId(pub u64);

impl StableId {
    pub fn random() -> Self {
        Self(fastrand::u64(1..))
    }
}

/// Marks the root of a prefab instance. `path` is where the prefab was
/// loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prefab {
    pub path: String,
}

/// Perspective camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y_radians: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 1000.0,
            aspect_ratio: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// Projection matrix for the current aspect ratio.
    pub fn projection(&self) -> glam::Mat4 {
        glam::Mat4::perspective_rh(self.fov_y_radians, self.aspect_ratio, self.near, self.far)
    }

    /// Recompute the aspect ratio from a viewport size. A zero-height
    /// viewport (minimised window) leaves the ratio unchanged.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_ignores_zero_height_viewport() {
        let mut cam = Camera::default();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect_ratio, 2.0);
        cam.set_viewport(800, 0);
        assert_eq!(cam.aspect_ratio, 2.0);
    }

    #[test]
    fn stable_ids_are_never_zero() {
        for _ in 0..64 {
            assert_ne!(StableId::random().0, 0);
        }
    }
}
