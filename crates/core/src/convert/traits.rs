//! Trait definitions for conversion engines.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::ConvertError;
use super::types::{ConversionPlan, ConversionProgress};

/// An engine that can carry out a validated conversion plan.
///
/// Engines write to the plan's (temporary) output path and nothing else;
/// the dispatcher owns placement of the final file.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Validates that the engine is ready to convert.
    async fn validate(&self) -> Result<(), ConvertError>;

    /// Executes the plan, writing the output file.
    async fn convert(&self, plan: &ConversionPlan) -> Result<(), ConvertError>;

    /// Executes the plan with progress reporting.
    ///
    /// If the receiver is dropped, conversion continues without progress.
    /// Engines whose conversions complete too quickly to be worth reporting
    /// may ignore the sender.
    async fn convert_with_progress(
        &self,
        plan: &ConversionPlan,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<(), ConvertError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ImageFormat, OutputFormat, Quality};
    use std::path::PathBuf;

    struct MockEngine;

    #[async_trait]
    impl Engine for MockEngine {
        fn name(&self) -> &str {
            "mock"
        }

        async fn validate(&self) -> Result<(), ConvertError> {
            Ok(())
        }

        async fn convert(&self, plan: &ConversionPlan) -> Result<(), ConvertError> {
            tokio::fs::write(&plan.output_path, b"converted").await?;
            Ok(())
        }

        async fn convert_with_progress(
            &self,
            plan: &ConversionPlan,
            _progress_tx: mpsc::Sender<ConversionProgress>,
        ) -> Result<(), ConvertError> {
            self.convert(plan).await
        }
    }

    #[tokio::test]
    async fn test_mock_engine_writes_output() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("out.jpg");
        let plan = ConversionPlan {
            input_path: PathBuf::from("/test/input.png"),
            output_path: output.clone(),
            format: OutputFormat::Image(ImageFormat::Jpeg),
            quality: Quality::Image(85),
            codec: None,
            supports_multiframe: false,
        };
        MockEngine.convert(&plan).await.unwrap();
        assert!(output.exists());
    }
}
