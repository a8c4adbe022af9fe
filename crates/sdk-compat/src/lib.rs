//! Compile-only compatibility crate.
//!
//! This crate exists to ensure the public SDK surface remains usable by third-party
//! consumers. It is not shipped or run; it must only build.

use std::path::Path;

use backdrop_core::{parse_config, ClipPlanes, ColorMatrix, CompositorConfig, TextureUnits};
use backdrop_runtime::{
    sync_camera, CameraFrame, DisplayTransform, EventHub, FrameData, ManualPoseTarget,
    PerspectivePose, PoseSource, SceneCamera, TexturePair, Theme,
};

/// A host-side frame type implementing the frame contract with its own texture handle.
struct HostFrame {
    planes: (u32, u32),
    pose: Option<PerspectivePose>,
}

impl CameraFrame for HostFrame {
    type Texture = u32;
    type Pose = dyn PoseSource;

    fn camera_textures(&self) -> TexturePair<u32> {
        TexturePair::new(self.planes.0, self.planes.1)
    }

    fn display_transform(&self) -> DisplayTransform {
        DisplayTransform::IDENTITY
    }

    fn camera(&self) -> Option<&(dyn PoseSource + 'static)> {
        self.pose.as_ref().map(|p| p as &(dyn PoseSource + 'static))
    }
}

#[allow(dead_code)]
pub fn _compile_witness() {
    // Config is constructible with explicit values and parseable from text.
    let cfg = CompositorConfig {
        units: TextureUnits {
            luma: 5,
            chroma: 6,
            host_reserved: 5,
        },
        clip: ClipPlanes {
            near: 0.001,
            far: 1000.0,
        },
        color_matrix: ColorMatrix::Bt709,
        ..CompositorConfig::default()
    };
    let _ = cfg.validate();
    let _ = parse_config(Path::new("inline.json"), "{}");

    // Frame contract is implementable outside the SDK, with an unsized pose type.
    let frame = HostFrame {
        planes: (1, 2),
        pose: None,
    };
    let _ = frame.camera_textures().complete();

    // Camera sync accepts any ManualPoseTarget, including trait objects.
    let mut camera = SceneCamera::default();
    let target: &mut dyn ManualPoseTarget = &mut camera;
    let _ = sync_camera(frame.camera(), target, cfg.clip);

    // Owned frame value with the default pose type.
    let owned = FrameData::<u32>::new(TexturePair::none());
    let _ = sync_camera(owned.camera(), &mut camera, cfg.clip);

    // Lifecycle subscriptions.
    let hub = EventHub::<Theme>::new();
    let sub = hub.subscribe(|_| {});
    sub.unsubscribe();
}
