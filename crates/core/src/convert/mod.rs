//! Conversion dispatch: request validation, output-path defaulting, and
//! delegation to the engines that do the byte-level work.
//!
//! # Example
//!
//! ```ignore
//! use recast_core::convert::{ConversionRequest, Dispatcher, EngineConfig};
//! use recast_core::registry::{FormatClass, FormatRegistry, FormatToken, Quality};
//!
//! let dispatcher = Dispatcher::new(FormatRegistry::new(), EngineConfig::default());
//!
//! let request = ConversionRequest::new(
//!     "/photos/cat.png",
//!     FormatClass::Image,
//!     FormatToken::parse("jpeg")?,
//! )
//! .with_quality(Quality::Image(90));
//!
//! let outcome = dispatcher.convert(request).await?;
//! println!("wrote {}", outcome.output_path.display());
//! ```

mod config;
mod dispatcher;
mod error;
mod ffmpeg;
mod pdf;
mod raster;
mod traits;
mod types;

pub use config::EngineConfig;
pub use dispatcher::Dispatcher;
pub use error::ConvertError;
pub use ffmpeg::FfmpegEngine;
pub use raster::RasterEngine;
pub use traits::Engine;
pub use types::{ConversionOutcome, ConversionPlan, ConversionProgress, ConversionRequest};
