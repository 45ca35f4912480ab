//! Error types for Prism Render
//!
//! This module defines the error types used throughout the crate,
//! covering GPU object creation, resource binding, and per-frame updates.

use std::fmt;

/// Result type for Prism Render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism Render errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, DirectX, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, descriptor set, etc.)
    InvalidResource(String),

    /// Initialization failed (context, swapchain, subsystems)
    InitializationFailed(String),

    /// A drawable's host-side uniform block does not match its allocated
    /// GPU buffer size. This is fatal: the layout contract with the shader
    /// is broken and no partial upload is meaningful.
    UniformSizeMismatch {
        /// Name of the owning drawable
        name: String,
        /// Allocated GPU buffer size in bytes
        expected: u64,
        /// Host-side uniform block size in bytes
        actual: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UniformSizeMismatch { name, expected, actual } => write!(
                f,
                "Uniform size mismatch for '{}': GPU buffer is {} bytes, host block is {} bytes",
                name, expected, actual
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Build an [`Error::InvalidResource`], logging it through the engine logger.
///
/// Produces an expression, for use with `ok_or_else` / `map_err`:
///
/// ```ignore
/// let lod = lods.get(i)
///     .ok_or_else(|| engine_err!("prism::Renderable", "LOD {} out of range", i))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::prism::Error::InvalidResource(message)
    }};
}

/// Log an error and early-return it from the enclosing function.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
