pub mod body;
pub mod collision;

pub use body::Body;
pub use collision::{sweep, SweepReport, WallResponse};

/// Downward acceleration per tick, in pixels.
pub const GRAVITY: f32 = 0.5;
/// Terminal fall speed per tick.
pub const MAX_FALL: f32 = 10.0;
