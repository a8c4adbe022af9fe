//! YUV → RGB conversion matrices.
//!
//! The GLSL fragment stage is generated from these same coefficients, so `convert` is the CPU
//! reference for what the GPU computes per texel (before the display pipeline clamps).

use serde::{Deserialize, Serialize};

/// Offset subtracted from stored chroma texels to recentre them around zero.
pub const CHROMA_BIAS: f32 = 0.5;

/// Coefficients of the (full-range) YUV → RGB transform.
///
/// ```text
/// R = Y + r_v * V
/// G = Y - g_u * U - g_v * V
/// B = Y + b_u * U
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YuvToRgb {
    pub r_v: f32,
    pub g_u: f32,
    pub g_v: f32,
    pub b_u: f32,
}

impl YuvToRgb {
    pub const BT601: YuvToRgb = YuvToRgb {
        r_v: 1.402,
        g_u: 0.344,
        g_v: 0.714,
        b_u: 1.772,
    };

    pub const BT709: YuvToRgb = YuvToRgb {
        r_v: 1.5748,
        g_u: 0.1873,
        g_v: 0.4681,
        b_u: 1.8556,
    };

    /// Convert one texel. `y` is the luma sample, `u_raw`/`v_raw` the stored (biased) chroma
    /// samples in [0, 1]. Output is unclamped.
    pub fn convert(&self, y: f32, u_raw: f32, v_raw: f32) -> [f32; 3] {
        let u = u_raw - CHROMA_BIAS;
        let v = v_raw - CHROMA_BIAS;
        [
            y + self.r_v * v,
            y - self.g_u * u - self.g_v * v,
            y + self.b_u * u,
        ]
    }
}

/// Named colour matrix preset, selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMatrix {
    #[default]
    Bt601,
    Bt709,
}

impl ColorMatrix {
    pub fn coefficients(self) -> YuvToRgb {
        match self {
            ColorMatrix::Bt601 => YuvToRgb::BT601,
            ColorMatrix::Bt709 => YuvToRgb::BT709,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn bt601_saturated_chroma_matches_reference_values() {
        let rgb = YuvToRgb::BT601.convert(1.0, 1.0, 1.0);
        assert!(close(rgb, [1.701, 0.471, 1.886]), "got {rgb:?}");
    }

    #[test]
    fn neutral_chroma_is_grey() {
        for m in [ColorMatrix::Bt601, ColorMatrix::Bt709] {
            let rgb = m.coefficients().convert(0.25, 0.5, 0.5);
            assert!(close(rgb, [0.25, 0.25, 0.25]), "{m:?} got {rgb:?}");
        }
    }

    #[test]
    fn zero_chroma_pulls_green_up() {
        // U = V = -0.5: red and blue drop below luma, green rises above it.
        let [r, g, b] = YuvToRgb::BT601.convert(0.5, 0.0, 0.0);
        assert!((r - (0.5 - 0.701)).abs() < 1e-4);
        assert!((g - (0.5 + 0.172 + 0.357)).abs() < 1e-4);
        assert!((b - (0.5 - 0.886)).abs() < 1e-4);
    }
}
