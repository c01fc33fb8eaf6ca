//! FFmpeg-based conversion engine.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration, Instant};

use super::config::EngineConfig;
use super::error::ConvertError;
use super::traits::Engine;
use super::types::{ConversionPlan, ConversionProgress};
use crate::registry::{ImageFormat, OutputFormat, Quality, VideoFormat, VideoPreset};

/// Conversion engine that shells out to ffmpeg.
///
/// Handles every video container plus the two raster formats (heic, avif)
/// the in-process codec stack cannot encode.
pub struct FfmpegEngine {
    config: EngineConfig,
}

impl FfmpegEngine {
    /// Creates a new engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Maps an operator-supplied codec name to ffmpeg's encoder name.
    /// Unknown names pass through for ffmpeg to accept or reject.
    fn map_codec(codec: &str) -> &str {
        match codec.to_ascii_lowercase().as_str() {
            "h264" | "libx264" => "libx264",
            "h265" | "hevc" | "libx265" => "libx265",
            "vp9" => "libvpx-vp9",
            "vp8" => "libvpx",
            "av1" => "libaom-av1",
            _ => codec,
        }
    }

    /// Builds ffmpeg arguments for a video container conversion.
    fn build_video_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        format: VideoFormat,
        preset: VideoPreset,
        codec: Option<&str>,
    ) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
        ];

        match preset.crf_and_speed() {
            Some((crf, speed)) => {
                // Explicit codec wins over the container default.
                let encoder = match codec {
                    Some(name) => Some(Self::map_codec(name).to_string()),
                    None => format.default_codec().map(str::to_string),
                };
                if let Some(encoder) = encoder {
                    args.extend(["-c:v".to_string(), encoder]);
                }
                args.extend([
                    "-crf".to_string(),
                    crf.to_string(),
                    "-preset".to_string(),
                    speed.to_string(),
                    "-c:a".to_string(),
                    "aac".to_string(),
                ]);
            }
            None => {
                // Stream copy: no re-encoding, codec override ignored.
                args.extend([
                    "-c:v".to_string(),
                    "copy".to_string(),
                    "-c:a".to_string(),
                    "copy".to_string(),
                ]);
            }
        }

        self.push_common_args(&mut args, output_path);
        args
    }

    /// Builds ffmpeg arguments for a single-frame image conversion.
    ///
    /// The 1-100 image quality maps onto the encoder's CRF range
    /// (lower CRF is better, so quality 100 becomes CRF 0).
    fn build_still_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        format: ImageFormat,
        quality: u8,
    ) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
        ];

        match format {
            ImageFormat::Heic => {
                let crf = ((100 - quality as u32) * 51) / 100;
                args.extend([
                    "-c:v".to_string(),
                    "libx265".to_string(),
                    "-crf".to_string(),
                    crf.to_string(),
                ]);
            }
            ImageFormat::Avif => {
                let crf = ((100 - quality as u32) * 63) / 100;
                args.extend([
                    "-c:v".to_string(),
                    "libaom-av1".to_string(),
                    "-crf".to_string(),
                    crf.to_string(),
                ]);
            }
            // Only heic/avif are routed here by the registry.
            other => {
                args.extend(["-f".to_string(), other.name().to_string()]);
            }
        }

        args.extend(["-frames:v".to_string(), "1".to_string()]);
        self.push_common_args(&mut args, output_path);
        args
    }

    fn push_common_args(&self, args: &mut Vec<String>, output_path: &Path) {
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
        ]);
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(output_path.to_string_lossy().to_string());
    }

    fn args_for_plan(&self, plan: &ConversionPlan) -> Result<Vec<String>, ConvertError> {
        match (plan.format, plan.quality) {
            (OutputFormat::Video(format), Quality::Video(preset)) => Ok(self.build_video_args(
                &plan.input_path,
                &plan.output_path,
                format,
                preset,
                plan.codec.as_deref(),
            )),
            (OutputFormat::Image(format), Quality::Image(quality)) => {
                Ok(self.build_still_args(&plan.input_path, &plan.output_path, format, quality))
            }
            _ => Err(ConvertError::engine(
                "quality class does not match target format",
            )),
        }
    }

    /// Runs ffmpeg for the plan, parsing progress lines off stderr.
    async fn run(
        &self,
        plan: &ConversionPlan,
        progress_tx: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<(), ConvertError> {
        let args = self.args_for_plan(plan)?;
        tracing::debug!(?args, "spawning ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConvertError::engine_unavailable(
                        "ffmpeg",
                        format!("not found at {}", self.config.ffmpeg_path.display()),
                    )
                } else {
                    ConvertError::Io(e)
                }
            })?;

        let stderr = child.stderr.take().expect("stderr should be captured");
        let mut reader = BufReader::new(stderr).lines();

        let time_regex = Regex::new(r"out_time_ms=(\d+)").ok();
        let speed_regex = Regex::new(r"speed=(\d+\.?\d*)x").ok();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut current_time = 0.0;
            let mut current_speed = None;
            let mut last_progress_send = Instant::now();
            let progress_interval = Duration::from_millis(500);
            let mut error_output = String::new();

            while let Ok(Some(line)) = reader.next_line().await {
                if line.contains("Error") || line.contains("error") {
                    error_output.push_str(&line);
                    error_output.push('\n');
                }

                if let Some(ref re) = time_regex {
                    if let Some(caps) = re.captures(&line) {
                        if let Some(us) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
                            current_time = us / 1_000_000.0;
                        }
                    }
                }

                if let Some(ref re) = speed_regex {
                    if let Some(caps) = re.captures(&line) {
                        if let Some(speed) = caps.get(1) {
                            current_speed = Some(format!("{}x", speed.as_str()));
                        }
                    }
                }

                if let Some(ref tx) = progress_tx {
                    if last_progress_send.elapsed() >= progress_interval {
                        let _ = tx.try_send(ConversionProgress {
                            time_secs: current_time,
                            speed: current_speed.clone(),
                        });
                        last_progress_send = Instant::now();
                    }
                }
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    return Err(ConvertError::engine_with_stderr(
                        format!("ffmpeg exited with code: {:?}", status.code()),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
            }
            Ok(Err(e)) => return Err(ConvertError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(ConvertError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        // The muxer can exit zero without producing output on some
        // argument mistakes; treat that as a failed conversion.
        tokio::fs::metadata(&plan.output_path)
            .await
            .map_err(|_| ConvertError::engine("ffmpeg produced no output file"))?;

        Ok(())
    }
}

#[async_trait]
impl Engine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn validate(&self) -> Result<(), ConvertError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(ConvertError::engine_unavailable(
                "ffmpeg",
                format!("version probe exited with code {:?}", status.code()),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConvertError::engine_unavailable(
                    "ffmpeg",
                    format!("not found at {}", self.config.ffmpeg_path.display()),
                ))
            }
            Err(e) => Err(ConvertError::Io(e)),
        }
    }

    async fn convert(&self, plan: &ConversionPlan) -> Result<(), ConvertError> {
        self.run(plan, None).await
    }

    async fn convert_with_progress(
        &self,
        plan: &ConversionPlan,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<(), ConvertError> {
        self.run(plan, Some(progress_tx)).await
    }
}
