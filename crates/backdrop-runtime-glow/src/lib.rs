//! backdrop runtime (glow/OpenGL backend)
//
// This crate contains only the GPU side of the camera backdrop:
// - compile/link the YUV -> RGB program
// - own the static full-screen quad
// - composite one frame into a context shared with a host renderer, restoring its state
//
// It does NOT contain windowing, frame acquisition or scene management.
#![allow(clippy::missing_safety_doc)]
#![deny(missing_debug_implementations)]

pub mod compositor;
pub mod context;
pub mod program;
pub mod quad;
pub mod shaders;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backdrop_core::BackdropError;

pub use compositor::{CompositeOutcome, FrameCompositor, RenderReport};
pub use context::GpuContext;
pub use program::YuvProgram;
pub use quad::{QuadVertexState, QUAD_POSITIONS, QUAD_TEX_COORDS, QUAD_VERTEX_COUNT};
pub use shaders::{yuv_sources, ShaderSources};
pub use state::{GpuStateSnapshot, ProgramGuard, SnapshotOf, StateGuard, VertexInputGuard};
