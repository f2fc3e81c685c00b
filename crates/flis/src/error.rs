//! Error type shared by the whole renderer.
//!
//! Errors fall into three groups:
//!
//! - **Preconditions** the caller must fix: a zero-sized viewport, a batch
//!   capacity the device can't hold, a zero-area rectangle, a slot index past
//!   the end of the batch.
//! - **Usage order**: submitting or ending a batch that was never begun,
//!   beginning one twice. These are programming mistakes and are reported,
//!   never silently ignored.
//! - **Collaborator failures** from wgpu (adapter, device, surface, shader
//!   validation) and from config loading. These propagate unchanged.
//!
//! Nothing in the crate retries. Every failure is a deterministic result of
//! caller input or environment setup.

use std::fmt;

/// Errors produced by the batch renderer and its GPU backend.
#[derive(Debug)]
pub enum RenderError {
    /// Viewport width or height is zero.
    InvalidViewport { width: u32, height: u32 },
    /// Batch capacity is zero or exceeds what the backend can hold.
    InvalidCapacity { capacity: u32, max: u32 },
    /// A rectangle with zero width or height was submitted.
    DegenerateRect { width: u32, height: u32 },
    /// A per-slot update addressed a slot outside `0..capacity`.
    SlotOutOfRange { slot: usize, capacity: usize },
    /// `submit` or `end` was called while no batch was in progress.
    NotBegun,
    /// `begin` was called while a batch was already in progress.
    AlreadyBegun,
    /// No compatible GPU adapter was found.
    Adapter(String),
    /// The GPU device could not be created.
    Device(String),
    /// The window surface could not be created.
    Surface(String),
    /// Acquiring the next surface texture failed.
    SurfaceTexture(wgpu::SurfaceError),
    /// The quad shader failed validation or pipeline creation.
    ShaderLink(String),
    /// Reading a config file failed.
    ConfigIo(std::io::Error),
    /// A config file contained invalid JSON or invalid values.
    ConfigParse(serde_json::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidViewport { width, height } => {
                write!(f, "invalid viewport {width}x{height}: both sides must be positive")
            }
            RenderError::InvalidCapacity { capacity, max } => {
                write!(f, "invalid batch capacity {capacity} (supported: 1..={max})")
            }
            RenderError::DegenerateRect { width, height } => {
                write!(f, "cannot batch a {width}x{height} rectangle: both sides must be positive")
            }
            RenderError::SlotOutOfRange { slot, capacity } => {
                write!(f, "batch slot {slot} out of range (capacity {capacity})")
            }
            RenderError::NotBegun => write!(f, "sprite batch used before begin()"),
            RenderError::AlreadyBegun => write!(f, "begin() called twice without end()"),
            RenderError::Adapter(e) => write!(f, "no suitable GPU adapter: {e}"),
            RenderError::Device(e) => write!(f, "GPU device creation failed: {e}"),
            RenderError::Surface(e) => write!(f, "surface creation failed: {e}"),
            RenderError::SurfaceTexture(e) => write!(f, "failed to acquire frame: {e}"),
            RenderError::ShaderLink(e) => write!(f, "quad shader failed to link: {e}"),
            RenderError::ConfigIo(e) => write!(f, "failed to read config: {e}"),
            RenderError::ConfigParse(e) => write!(f, "failed to parse config: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::SurfaceTexture(e) => Some(e),
            RenderError::ConfigIo(e) => Some(e),
            RenderError::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        RenderError::SurfaceTexture(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let e = RenderError::SlotOutOfRange { slot: 12, capacity: 8 };
        assert_eq!(e.to_string(), "batch slot 12 out of range (capacity 8)");

        let e = RenderError::InvalidViewport { width: 0, height: 600 };
        assert!(e.to_string().contains("0x600"));
    }

    #[test]
    fn config_errors_expose_their_source() {
        use std::error::Error;

        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let e = RenderError::ConfigParse(parse);
        assert!(e.source().is_some());
        assert!(RenderError::NotBegun.source().is_none());
    }
}
