/// Shadow module - depth-only pass rendered from the light's point of view
///
/// Disabled entirely by configuration: with the technique set to `None`
/// nothing here allocates a single GPU object and every accessor is a
/// safe no-op.

pub mod shadow_projection;
pub mod shadow_map;
pub mod shadow_pass;
pub mod shadow_system;

pub use shadow_projection::*;
pub use shadow_map::*;
pub use shadow_pass::*;
pub use shadow_system::*;
