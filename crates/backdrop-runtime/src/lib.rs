#![forbid(unsafe_code)]

//! Backend-agnostic runtime contracts.
//!
//! This crate defines what a frame source, a pose source and a scene camera must provide, plus
//! the camera sync step and lifecycle subscriptions. GPU backends implement the compositing
//! itself; nothing here touches a graphics API.
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

pub mod camera;
pub mod frame;
pub mod lifecycle;

pub use backdrop_core::{BackdropError, ClipPlanes, CompositorConfig};

pub use camera::{sync_camera, CameraSync, ManualPoseTarget, PoseError, SceneCamera};
pub use frame::{
    CameraFrame, DisplayTransform, FrameData, PerspectivePose, PoseSource, TexturePair,
};
pub use lifecycle::{EventHub, Subscription, Theme};
