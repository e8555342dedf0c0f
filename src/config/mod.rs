//! Drag configuration.
//!
//! One serializable [`DragConfig`] carries every behavior switch: classes,
//! cursors, and one nested section per built-in plugin, each with an
//! explicit `enabled` flag. Missing keys fall back to defaults, so a config
//! file only needs to spell out what it changes:
//!
//! ```json
//! { "snap": { "enabled": true, "threshold": 16 } }
//! ```
//!
//! Files are JSON with camelCase keys. [`ConfigWatcher`] reloads a file when
//! it changes on disk.

mod watcher;

pub use watcher::ConfigWatcher;

use crate::constants::{
    DEFAULT_CURSOR, DEFAULT_SCROLL_INTERVAL_MS, DEFAULT_SCROLL_SPEED, DEFAULT_SCROLL_THRESHOLD,
    DEFAULT_SHADOW_OPACITY, DEFAULT_SNAP_THRESHOLD,
};
use crate::error::{ConfigError, ConfigResult};
use crate::geometry::ElementId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Name of the config file inside the platform config directory
const CONFIG_FILE_NAME: &str = "drag.json";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DragConfig {
    /// Only update the in-memory record, never the element's position
    pub virtual_axis: bool,
    /// Start disabled. Ignored by option updates.
    pub disabled: bool,
    pub classes: ClassNames,
    pub cursor: CursorConfig,
    pub direction: DirectionConfig,
    pub boundary: BoundaryConfig,
    pub snap: SnapConfig,
    pub scroll: ScrollConfig,
    pub shadow: ShadowConfig,
}

/// Class names applied to targets during a drag. Absent names are skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassNames {
    /// From press until release
    pub active: Option<String>,
    /// From press until another target is pressed
    pub activated: Option<String>,
    /// Once the pointer moves, until release
    pub moving: Option<String>,
}

/// When in the interaction a cursor is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorPhase {
    Over,
    Out,
    Down,
    Up,
    Moving,
}

/// Cursor per interaction phase. `None` for `out` and `up` means restore
/// whatever cursor was there before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CursorConfig {
    pub over: Option<String>,
    pub out: Option<String>,
    pub down: Option<String>,
    pub up: Option<String>,
    pub moving: Option<String>,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            over: Some(DEFAULT_CURSOR.to_string()),
            out: None,
            down: None,
            up: None,
            moving: Some(DEFAULT_CURSOR.to_string()),
        }
    }
}

impl CursorConfig {
    pub fn get(&self, phase: CursorPhase) -> Option<&str> {
        match phase {
            CursorPhase::Over => self.over.as_deref(),
            CursorPhase::Out => self.out.as_deref(),
            CursorPhase::Down => self.down.as_deref(),
            CursorPhase::Up => self.up.as_deref(),
            CursorPhase::Moving => self.moving.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Only x moves
    #[default]
    Horizontal,
    /// Only y moves
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectionConfig {
    pub enabled: bool,
    pub axis: Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoundaryConfig {
    /// Keep the element inside its offset parent's scroll box
    pub enabled: bool,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Axes edge snapping applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapOrient {
    X,
    Y,
    #[default]
    Both,
}

impl SnapOrient {
    pub fn includes_x(self) -> bool {
        self != Self::Y
    }

    pub fn includes_y(self) -> bool {
        self != Self::X
    }
}

/// Edge a force snap moves the element to on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapEdge {
    Left,
    Right,
    Top,
    Bottom,
    /// Left or right, whichever half of the parent the pointer is in
    #[default]
    X,
    /// Top or bottom, whichever half of the parent the pointer is in
    Y,
}

impl SnapEdge {
    /// True when the edge is decided on the horizontal axis
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::X)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapConfig {
    pub enabled: bool,
    /// Distance from an edge at which snapping kicks in
    pub threshold: f64,
    pub orient: SnapOrient,
    /// Snap to an edge on release instead of while moving
    pub force: bool,
    pub force_orient: SnapEdge,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_SNAP_THRESHOLD,
            orient: SnapOrient::Both,
            force: false,
            force_orient: SnapEdge::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollConfig {
    pub enabled: bool,
    /// Container to scroll; the target's offset parent when unset.
    /// Element ids are host-local, so this is never persisted.
    #[serde(skip)]
    pub container: Option<ElementId>,
    /// Distance from the container edge that triggers scrolling
    pub threshold: f64,
    /// Pixels per step
    pub speed: f64,
    pub interval_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            container: None,
            threshold: DEFAULT_SCROLL_THRESHOLD,
            speed: DEFAULT_SCROLL_SPEED,
            interval_ms: DEFAULT_SCROLL_INTERVAL_MS,
        }
    }
}

impl ScrollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowConfig {
    pub enabled: bool,
    /// Position the shadow against the viewport
    pub fixed: bool,
    /// Extra class names for the shadow element
    pub class: Option<String>,
    pub opacity: f64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fixed: false,
            class: None,
            opacity: DEFAULT_SHADOW_OPACITY,
        }
    }
}

impl DragConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        debug!(path = %path.display(), "Loaded drag config");
        Ok(config)
    }

    /// Write the config, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), "Saved drag config");
        Ok(())
    }

    /// Reject values the plugins cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.snap.threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "snap.threshold must be non-negative, got {}",
                self.snap.threshold
            )));
        }
        if !(self.scroll.threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scroll.threshold must be non-negative, got {}",
                self.scroll.threshold
            )));
        }
        if !(self.scroll.speed >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scroll.speed must be non-negative, got {}",
                self.scroll.speed
            )));
        }
        if self.scroll.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "scroll.intervalMs must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.shadow.opacity) {
            return Err(ConfigError::Invalid(format!(
                "shadow.opacity must be within 0..=1, got {}",
                self.shadow.opacity
            )));
        }
        Ok(())
    }
}

/// Default location of the config file, e.g. `~/.config/dragcore/drag.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dragcore").join(CONFIG_FILE_NAME))
}
