pub mod config;
pub mod convert;
pub mod registry;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DefaultsConfig,
};
pub use convert::{
    ConversionOutcome, ConversionProgress, ConversionRequest, ConvertError, Dispatcher, Engine,
    EngineConfig, FfmpegEngine, RasterEngine,
};
pub use registry::{
    EngineKind, FormatClass, FormatDescriptor, FormatRegistry, FormatToken, ImageFormat,
    OutputFormat, Quality, RegistryError, VideoFormat, VideoPreset,
};
