/*!
# Prism Render

A drawable-orchestration layer over an explicit graphics API.

This crate describes a 3D scene as drawable objects and submits them to the
GPU every frame, while correctly handling device-resource lifecycle (surface
resize, descriptor rebuild) and multi-frame-in-flight command-buffer
scheduling. The low-level GPU backend is a collaborator, reached through the
trait-object seam in [`graphics_device`]; a backend (Vulkan, Direct3D 12,
etc.) provides concrete types implementing those traits.

## Architecture

- **GraphicsDevice**: factory trait for GPU resources (buffers, textures,
  pipelines, render passes, descriptor pools, command lists)
- **RenderContext**: the device, swapchain, depth buffer, main render pass
  and framebuffers, threaded explicitly through all calls
- **Renderable**: one drawable object: AddOns (buffers/textures) +
  Descriptors (per-frame sets) + Pipeline + mesh reference
- **Renderables**: registry grouping renderables into recording-cadence
  buckets
- **CommandControl**: per-frame command-buffer scheduler and owner of the
  recreation cascade
- **ShadowSystem**: optional per-frame depth-only pass, zero-cost when
  disabled
- **RenderSystem**: the application-facing facade
*/

// Internal modules
mod error;
pub mod log;
mod clock;
mod context;
pub mod graphics_device;
pub mod drawable;
pub mod registry;
pub mod command;
pub mod shadow;
mod render_system;
pub mod utils;

// Main prism namespace module
pub mod prism {
    // Error types
    pub use crate::error::{Error, Result};

    // Frame clock
    pub use crate::clock::FrameClock;

    // Render context (explicit, no singletons)
    pub use crate::context::{RenderContext, RenderContextDesc};

    // Application facade
    pub use crate::render_system::{DynamicUniformDesc, RenderSystem, RenderSystemDesc};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Device sub-module with the backend trait seam
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Drawable sub-module
    pub mod drawable {
        pub use crate::drawable::*;
    }

    // Registry sub-module
    pub mod registry {
        pub use crate::registry::*;
    }

    // Command scheduling sub-module
    pub mod command {
        pub use crate::command::*;
    }

    // Shadow mapping sub-module
    pub mod shadow {
        pub use crate::shadow::*;
    }
}

// Re-export math library at crate root
pub use glam;
