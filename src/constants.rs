//! Engine-wide constants.
//!
//! Centralizes plugin priorities and behavior defaults so plugins and the
//! config layer agree on them.

// ============================================================================
// Plugin Priorities
// ============================================================================

/// Priority bands for behavior plugins. Lower runs first on shared channels.
pub mod priority {
    /// First band
    pub const GROUND: i32 = 1000;
    /// Second band, where the built-in geometry plugins live
    pub const SKY: i32 = 2000;
    pub const TROPOSPHERE: i32 = 3000;
    pub const STRATOSPHERE: i32 = 4000;
    pub const MESOSPHERE: i32 = 5000;
    /// Visual-only plugins that must observe final coordinates
    pub const THERMOSPHERE: i32 = 6000;
    pub const OUTER_SPACE: i32 = 7000;
}

// ============================================================================
// Cursor
// ============================================================================

/// Cursor shown while hovering a handle and while moving
pub const DEFAULT_CURSOR: &str = "move";

// ============================================================================
// Snap
// ============================================================================

/// Distance from an edge at which the element snaps to it
pub const DEFAULT_SNAP_THRESHOLD: f64 = 10.0;

// ============================================================================
// Auto-scroll
// ============================================================================

/// Distance from the container edge that triggers auto-scroll
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 40.0;

/// Pixels scrolled per step
pub const DEFAULT_SCROLL_SPEED: f64 = 10.0;

/// Milliseconds between auto-scroll steps
pub const DEFAULT_SCROLL_INTERVAL_MS: u64 = 100;

// ============================================================================
// Shadow
// ============================================================================

/// Opacity of the drag shadow
pub const DEFAULT_SHADOW_OPACITY: f64 = 0.5;

// ============================================================================
// Profiling
// ============================================================================

/// A single coordinate-commit pass slower than this is logged
pub const SLOW_COMMIT_MS: f64 = 2.0;
