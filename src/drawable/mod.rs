/// Drawable module - everything one registered drawable owns
///
/// A drawable is described once (`DrawableSpec`), then compiled into a
/// `Renderable`: mesh buffers and per-frame uniform buffers (`AddOns`),
/// per-frame descriptor sets (`Descriptors`), a pipeline shaped by the
/// `Customizer` flags, and optionally a slot in the shared dynamic
/// uniform buffer.

// Module declarations
pub mod customizer;
pub mod mesh;
pub mod drawable_spec;
pub mod shader_cache;
pub mod dynamic_uniform;
pub mod addons;
pub mod descriptors;
pub mod renderable;

// Re-exports
pub use customizer::*;
pub use mesh::*;
pub use drawable_spec::*;
pub use shader_cache::*;
pub use dynamic_uniform::*;
pub use addons::*;
pub use descriptors::*;
pub use renderable::*;
