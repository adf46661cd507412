//! Shared constants for the model crate.

// ── Model format ────────────────────────────────────────────────

/// Version written into every exported model.
pub const MODEL_VERSION: &str = "3.0.0";

/// Major version prefix accepted on import.
pub const MODEL_VERSION_PREFIX: &str = "3.";

// ── Relationships ───────────────────────────────────────────────

/// Start and end of a freshly created relationship path.
pub const DEFAULT_PATH: [(f64, f64); 2] = [(0.0, 0.0), (200.0, 100.0)];

// ── Palette ─────────────────────────────────────────────────────

/// Width of the swarm shown in the palette, larger than its minimum.
pub const PALETTE_SWARM_WIDTH: f64 = 250.0;

/// Height of the swarm shown in the palette.
pub const PALETTE_SWARM_HEIGHT: f64 = 200.0;
