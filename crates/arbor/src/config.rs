//! Scene configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "name": "Level 1", "viewport_width": 1920 }
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Display name, also used in log lines.
    pub name: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Give every entity created through the scene a [`StableId`](crate::StableId).
    pub assign_stable_ids: bool,
}

impl SceneConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn stable_ids(mut self, assign: bool) -> Self {
        self.assign_stable_ids = assign;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            viewport_width: 1280,
            viewport_height: 720,
            assign_stable_ids: true,
        }
    }
}
