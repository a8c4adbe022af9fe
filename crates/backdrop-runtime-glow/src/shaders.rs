//! GLSL for the YUV → RGB composite.
//!
//! Sources are generated so the fragment stage bakes in exactly the coefficients of the
//! selected [`YuvToRgb`] matrix.

use backdrop_core::{ShaderDialect, YuvToRgb, CHROMA_BIAS};

pub const ATTR_POSITION: &str = "a_position";
pub const ATTR_TEX_COORD: &str = "a_texCoord";
pub const UNIFORM_DISPLAY_TRANSFORM: &str = "displayTransform";
pub const UNIFORM_Y_TEXTURE: &str = "y_texture";
pub const UNIFORM_UV_TEXTURE: &str = "uv_texture";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vert: String,
    pub frag: String,
}

/// GLSL float literal (always carries a decimal point).
fn lit(v: f32) -> String {
    format!("{v:?}")
}

/// The quad position is multiplied as `vec3(pos, 0)`; only the upper-left 2×2 and the third
/// row of `displayTransform` reach clip space.
pub fn yuv_sources(dialect: ShaderDialect, m: YuvToRgb) -> ShaderSources {
    let (header, attr, vary_out, vary_in, sample, frag_out, frag_decl) = match dialect {
        ShaderDialect::Glsl330Core => (
            "#version 330 core\n",
            "in",
            "out",
            "in",
            "texture",
            "o_color",
            "out vec4 o_color;\n",
        ),
        ShaderDialect::GlslEs100 => (
            "#version 100\nprecision highp float;\n",
            "attribute",
            "varying",
            "varying",
            "texture2D",
            "gl_FragColor",
            "",
        ),
    };

    let vert = format!(
        "{header}\
{attr} vec2 {ATTR_POSITION};
{attr} vec2 {ATTR_TEX_COORD};
uniform mat3 {UNIFORM_DISPLAY_TRANSFORM};
{vary_out} vec2 v_texCoord;
void main() {{
    vec3 p = {UNIFORM_DISPLAY_TRANSFORM} * vec3({ATTR_POSITION}, 0.0);
    gl_Position = vec4(p, 1.0);
    v_texCoord = {ATTR_TEX_COORD};
}}
"
    );

    let bias = lit(CHROMA_BIAS);
    let frag = format!(
        "{header}\
{vary_in} vec2 v_texCoord;
{frag_decl}uniform sampler2D {UNIFORM_Y_TEXTURE};
uniform sampler2D {UNIFORM_UV_TEXTURE};
void main() {{
    float y = {sample}({UNIFORM_Y_TEXTURE}, v_texCoord).r;
    vec4 uv = {sample}({UNIFORM_UV_TEXTURE}, v_texCoord);
    float u = uv.r - {bias};
    float v = uv.a - {bias};
    float r = y + {r_v} * v;
    float g = y - {g_u} * u - {g_v} * v;
    float b = y + {b_u} * u;
    {frag_out} = vec4(r, g, b, 1.0);
}}
",
        r_v = lit(m.r_v),
        g_u = lit(m.g_u),
        g_v = lit(m.g_v),
        b_u = lit(m.b_u),
    );

    ShaderSources { vert, frag }
}
