#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

pub mod color;
pub mod config;
pub mod error;

pub use error::BackdropError;

pub use color::{ColorMatrix, YuvToRgb, CHROMA_BIAS};
pub use config::{
    load_config_from, load_typed_json, parse_config, ClipPlanes, CompositorConfig, ShaderDialect,
    TextureUnits, DEFAULT_CHROMA_UNIT, DEFAULT_FAR, DEFAULT_LUMA_UNIT, DEFAULT_NEAR,
    HOST_RESERVED_UNITS,
};
