#[cfg(test)]
mod tests {
    use backdrop_core::{ColorMatrix, CompositorConfig, ShaderDialect, YuvToRgb};
    use backdrop_runtime::{DisplayTransform, TexturePair};
    use backdrop_runtime_glow::testing::RecordingContext;
    use backdrop_runtime_glow::{yuv_sources, CompositeOutcome, FrameCompositor};

    fn assert_rgb(got: [f32; 3], want: [f32; 3]) {
        for (g, w) in got.iter().zip(want.iter()) {
            assert!((g - w).abs() < 1e-4, "got {got:?}, want {want:?}");
        }
    }

    /// Y = 1, U-plane.r = 1, V-plane.a = 1.
    #[test]
    fn saturated_sample_converts_to_reference_rgb() {
        let rgb = ColorMatrix::default().coefficients().convert(1.0, 1.0, 1.0);
        assert_rgb(rgb, [1.701, 0.471, 1.886]);
    }

    #[test]
    fn output_is_not_clamped() {
        let [r, _, b] = YuvToRgb::BT601.convert(1.0, 1.0, 1.0);
        assert!(r > 1.0 && b > 1.0);
        let [r, _, b] = YuvToRgb::BT601.convert(0.0, 0.0, 0.0);
        assert!(r < 0.0 && b < 0.0);
    }

    #[test]
    fn fragment_stage_reads_u_from_red_and_v_from_alpha() {
        for dialect in [ShaderDialect::Glsl330Core, ShaderDialect::GlslEs100] {
            let src = yuv_sources(dialect, YuvToRgb::BT601);
            assert!(src.frag.contains("uv.r - 0.5"), "{dialect:?}");
            assert!(src.frag.contains("uv.a - 0.5"), "{dialect:?}");
            assert!(src.frag.contains("y_texture, v_texCoord).r"), "{dialect:?}");
        }
    }

    #[test]
    fn every_matrix_and_dialect_builds_and_draws() {
        for dialect in [ShaderDialect::Glsl330Core, ShaderDialect::GlslEs100] {
            for color_matrix in [ColorMatrix::Bt601, ColorMatrix::Bt709] {
                let gl = RecordingContext::new();
                let config = CompositorConfig {
                    dialect,
                    color_matrix,
                    ..CompositorConfig::default()
                };
                let c = unsafe { FrameCompositor::new(&gl, config) }
                    .unwrap_or_else(|e| panic!("{dialect:?}/{color_matrix:?}: {e}"));
                let pair = TexturePair::new(gl.create_texture(), gl.create_texture());
                let out = unsafe { c.composite(&gl, pair, &DisplayTransform::IDENTITY) };
                assert_eq!(out, CompositeOutcome::Drawn);
                unsafe { c.destroy(&gl) };
            }
        }
    }
}
