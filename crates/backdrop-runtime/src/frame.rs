use glam::Mat4;

/// Luma/chroma texture handles for one tick.
///
/// Either side may be missing (no frame decoded yet, dropped frame). Only a complete pair is
/// drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexturePair<T> {
    pub y: Option<T>,
    pub uv: Option<T>,
}

impl<T> Default for TexturePair<T> {
    fn default() -> Self {
        Self { y: None, uv: None }
    }
}

impl<T: Copy> TexturePair<T> {
    pub fn new(y: T, uv: T) -> Self {
        Self {
            y: Some(y),
            uv: Some(uv),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// `(luma, chroma)` when both planes are present.
    pub fn complete(&self) -> Option<(T, T)> {
        match (self.y, self.uv) {
            (Some(y), Some(uv)) => Some((y, uv)),
            _ => None,
        }
    }
}

/// 3×3 sensor→display orientation correction.
///
/// Treated opaquely: the nine floats are uploaded to the `displayTransform` uniform as-is
/// (no transpose), in whatever order the frame source produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform(pub [f32; 9]);

impl DisplayTransform {
    pub const IDENTITY: DisplayTransform =
        DisplayTransform([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 9]> for DisplayTransform {
    fn from(m: [f32; 9]) -> Self {
        Self(m)
    }
}

/// Supplies the camera pose for the current tick. Matrices are 4×4, column-major.
pub trait PoseSource {
    /// World → camera transform.
    fn view_matrix(&self) -> [f32; 16];

    /// Projection for the given clip distances.
    fn projection_matrix(&self, near: f32, far: f32) -> [f32; 16];
}

/// One tick's worth of camera input, as handed over by the frame source.
pub trait CameraFrame {
    type Texture: Copy;
    type Pose: PoseSource + ?Sized;

    fn camera_textures(&self) -> TexturePair<Self::Texture>;

    fn display_transform(&self) -> DisplayTransform;

    fn camera(&self) -> Option<&Self::Pose>;
}

/// A fixed view with a GL-style right-handed perspective projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectivePose {
    pub view: [f32; 16],
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
}

impl PerspectivePose {
    pub fn new(view: Mat4, fov_y: f32, aspect: f32) -> Self {
        Self {
            view: view.to_cols_array(),
            fov_y,
            aspect,
        }
    }
}

impl PoseSource for PerspectivePose {
    fn view_matrix(&self) -> [f32; 16] {
        self.view
    }

    fn projection_matrix(&self, near: f32, far: f32) -> [f32; 16] {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, near, far).to_cols_array()
    }
}

/// Owned frame value for hosts that assemble the tick's inputs themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameData<T, P = PerspectivePose> {
    pub textures: TexturePair<T>,
    pub display_transform: DisplayTransform,
    pub pose: Option<P>,
}

impl<T: Copy, P: PoseSource> FrameData<T, P> {
    pub fn new(textures: TexturePair<T>) -> Self {
        Self {
            textures,
            display_transform: DisplayTransform::IDENTITY,
            pose: None,
        }
    }

    pub fn with_display_transform(mut self, m: DisplayTransform) -> Self {
        self.display_transform = m;
        self
    }

    pub fn with_pose(mut self, pose: P) -> Self {
        self.pose = Some(pose);
        self
    }
}

impl<T: Copy, P: PoseSource> CameraFrame for FrameData<T, P> {
    type Texture = T;
    type Pose = P;

    fn camera_textures(&self) -> TexturePair<T> {
        self.textures
    }

    fn display_transform(&self) -> DisplayTransform {
        self.display_transform
    }

    fn camera(&self) -> Option<&P> {
        self.pose.as_ref()
    }
}
