/// Graphics device module - the backend trait seam
///
/// Everything the orchestration layer needs from a GPU backend, expressed as
/// trait objects. A backend crate (Vulkan, Direct3D 12, ...) provides the
/// concrete types; unit tests use the mock device.

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod texture;
pub mod shader;
pub mod pipeline;
pub mod render_pass;
pub mod frame_buffer;
pub mod swapchain;
pub mod command_list;
pub mod descriptor;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use texture::*;
pub use shader::*;
pub use pipeline::*;
pub use render_pass::*;
pub use frame_buffer::*;
pub use swapchain::*;
pub use command_list::*;
pub use descriptor::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
