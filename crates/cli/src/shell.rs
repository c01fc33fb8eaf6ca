//! Interactive conversion shell.
//!
//! Presents the menus, assembles a `ConversionRequest` from operator
//! answers, and reports the dispatcher's outcome. Returns the process
//! exit code: 0 on success or operator exit, 2 for validation mistakes,
//! 1 for engine and output failures.

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

use recast_core::{
    ConversionProgress, ConversionRequest, ConvertError, Dispatcher, FormatClass, FormatDescriptor,
    FormatToken, OutputFormat, Quality, VideoPreset,
};

use crate::prompt::Prompt;

const BANNER_WIDTH: usize = 50;

pub struct Shell {
    dispatcher: Dispatcher,
    prompt: Prompt,
}

impl Shell {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            prompt: Prompt::new(),
        }
    }

    /// Runs the top-level menu and one conversion.
    pub async fn run(&mut self) -> Result<i32> {
        println!("{}", "=".repeat(BANNER_WIDTH));
        println!("       FILE CONVERTER");
        println!("{}", "=".repeat(BANNER_WIDTH));
        println!();
        println!("What would you like to convert?");
        println!("  1) Images (JPEG, PNG, GIF, WEBP, PDF, etc.)");
        println!("  2) Videos (MP4, AVI, MOV, MKV, WEBM, etc.)");
        println!("  3) Exit");

        loop {
            let Some(choice) = self
                .prompt
                .read_line("\nEnter your choice (1, 2, or 3): ")
                .await?
            else {
                return Ok(0);
            };

            let class = match choice.as_str() {
                "1" => FormatClass::Image,
                "2" => FormatClass::Video,
                "3" => {
                    println!("Goodbye!");
                    return Ok(0);
                }
                _ => {
                    println!("Invalid choice. Please enter 1, 2, or 3.");
                    continue;
                }
            };

            println!("\n{}", "=".repeat(BANNER_WIDTH));
            let code = self.convert_flow(class).await?;
            println!("\n{}", "=".repeat(BANNER_WIDTH));
            return Ok(code);
        }
    }

    async fn convert_flow(&mut self, class: FormatClass) -> Result<i32> {
        match class {
            FormatClass::Image => println!("=== Image Converter ===\n"),
            FormatClass::Video => {
                println!("=== Video Converter ===\n");
                // Surface a missing binary before asking any questions.
                if let Err(e) = self.dispatcher.validate_ffmpeg().await {
                    eprintln!("Error: {e}");
                    return Ok(1);
                }
            }
        }

        println!("Supported output formats:");
        for (i, descriptor) in self.dispatcher.registry().formats(class).iter().enumerate() {
            println!("  {}) {}", i + 1, descriptor.format.name().to_uppercase());
        }

        let Some(raw) = self
            .prompt
            .read_line("\nEnter output format (name or number): ")
            .await?
        else {
            return Ok(0);
        };
        let token = match FormatToken::parse(&raw) {
            Ok(token) => token,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(2);
            }
        };
        let descriptor = match self.dispatcher.registry().resolve(class, &token) {
            Ok(descriptor) => descriptor.clone(),
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(2);
            }
        };

        let Some(input_raw) = self
            .prompt
            .read_path(&format!("\nEnter path to input {} file: ", class.label()))
            .await?
        else {
            return Ok(0);
        };
        if input_raw.is_empty() {
            println!("No input provided, exiting.");
            return Ok(0);
        }
        let input_path = PathBuf::from(input_raw);
        let default_output = input_path.with_extension(descriptor.format.extension());

        let Some(output_raw) = self
            .prompt
            .read_path(&format!(
                "Enter output path [default: {}]: ",
                default_output.display()
            ))
            .await?
        else {
            return Ok(0);
        };

        let mut request = ConversionRequest::new(input_path, class, token);
        if !output_raw.is_empty() {
            request = request.with_output_path(output_raw);
        }

        let request = match class {
            FormatClass::Image => match self.ask_image_quality(&descriptor, request).await? {
                Ok(request) => request,
                Err(code) => return Ok(code),
            },
            FormatClass::Video => match self.ask_video_options(request).await? {
                Ok(request) => request,
                Err(code) => return Ok(code),
            },
        };

        println!("\nConverting:");
        println!("  Input: {}", request.input_path.display());
        println!(
            "  Output: {}",
            request
                .output_path
                .as_deref()
                .unwrap_or(&default_output)
                .display()
        );
        println!("  Format: {}", descriptor.format.name().to_uppercase());
        if let Some(Quality::Video(preset)) = request.quality {
            println!("  Quality: {}", preset.name());
            if let Some(ref codec) = request.codec {
                println!("  Codec: {}", codec);
            }
            println!("\nThis may take a while...");
        }

        Ok(self.dispatch(request, class == FormatClass::Video).await)
    }

    /// Asks for an image quality where the target honors one.
    /// The inner `Err` carries an exit code for invalid answers.
    async fn ask_image_quality(
        &mut self,
        descriptor: &FormatDescriptor,
        request: ConversionRequest,
    ) -> Result<std::result::Result<ConversionRequest, i32>> {
        let OutputFormat::Image(format) = descriptor.format else {
            return Ok(Ok(request));
        };
        if !format.uses_quality() {
            return Ok(Ok(request));
        }
        let Quality::Image(default_quality) = descriptor.default_quality else {
            return Ok(Ok(request));
        };

        let Some(raw) = self
            .prompt
            .read_line(&format!(
                "Enter quality (1-100) [default: {}]: ",
                default_quality
            ))
            .await?
        else {
            return Ok(Err(0));
        };
        if raw.is_empty() {
            return Ok(Ok(request));
        }
        match raw.parse::<u8>() {
            Ok(quality) => Ok(Ok(request.with_quality(Quality::Image(quality)))),
            Err(_) => {
                eprintln!("Error: invalid quality: expected an integer between 1 and 100, got '{raw}'");
                Ok(Err(2))
            }
        }
    }

    async fn ask_video_options(
        &mut self,
        request: ConversionRequest,
    ) -> Result<std::result::Result<ConversionRequest, i32>> {
        println!("\nQuality options:");
        println!("  1) Low (faster, larger file)");
        println!("  2) Medium (balanced)");
        println!("  3) High (slower, smaller file)");
        println!("  4) Copy (no re-encoding, fastest)");

        let Some(raw) = self
            .prompt
            .read_line("Enter quality (1-4) [default: 2]: ")
            .await?
        else {
            return Ok(Err(0));
        };
        let preset = match parse_preset_choice(&raw) {
            Ok(preset) => preset,
            Err(message) => {
                eprintln!("Error: {message}");
                return Ok(Err(2));
            }
        };
        let mut request = request.with_quality(Quality::Video(preset));

        if preset != VideoPreset::Copy {
            let Some(codec) = self
                .prompt
                .read_line("Enter codec (h264, h265, vp9, or press Enter for default): ")
                .await?
            else {
                return Ok(Err(0));
            };
            if !codec.is_empty() {
                request = request.with_codec(codec.to_ascii_lowercase());
            }
        }

        Ok(Ok(request))
    }

    async fn dispatch(&self, request: ConversionRequest, show_progress: bool) -> i32 {
        let result = if show_progress {
            let (tx, mut rx) = mpsc::channel::<ConversionProgress>(16);
            let printer = tokio::spawn(async move {
                while let Some(progress) = rx.recv().await {
                    match progress.speed {
                        Some(speed) => {
                            print!("\r  processed {:.1}s ({speed})", progress.time_secs)
                        }
                        None => print!("\r  processed {:.1}s", progress.time_secs),
                    }
                    let _ = std::io::stdout().flush();
                }
            });
            let result = self.dispatcher.convert_with_progress(request, tx).await;
            let _ = printer.await;
            println!();
            result
        } else {
            self.dispatcher.convert(request).await
        };

        match result {
            Ok(outcome) => {
                println!(
                    "✓ Successfully converted to: {}",
                    outcome.output_path.display()
                );
                0
            }
            Err(e) => {
                report_error(&e);
                if e.is_usage_error() {
                    2
                } else {
                    1
                }
            }
        }
    }
}

fn report_error(error: &ConvertError) {
    eprintln!("Error: {error}");
    if let ConvertError::Engine {
        stderr: Some(stderr),
        ..
    } = error
    {
        let mut tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        tail.reverse();
        for line in tail {
            eprintln!("  {line}");
        }
    }
}

/// Maps the 1-4 quality menu answer (or a preset name) to a preset.
/// Empty input takes the default.
fn parse_preset_choice(raw: &str) -> std::result::Result<VideoPreset, String> {
    match raw.trim() {
        "" | "2" => Ok(VideoPreset::Medium),
        "1" => Ok(VideoPreset::Low),
        "3" => Ok(VideoPreset::High),
        "4" => Ok(VideoPreset::Copy),
        other => VideoPreset::parse(other).ok_or_else(|| {
            format!("invalid quality: expected 1-4 or low/medium/high/copy, got '{other}'")
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preset_choice_menu_numbers() {
        assert_eq!(parse_preset_choice(""), Ok(VideoPreset::Medium));
        assert_eq!(parse_preset_choice("1"), Ok(VideoPreset::Low));
        assert_eq!(parse_preset_choice("2"), Ok(VideoPreset::Medium));
        assert_eq!(parse_preset_choice("3"), Ok(VideoPreset::High));
        assert_eq!(parse_preset_choice("4"), Ok(VideoPreset::Copy));
    }

    #[test]
    fn test_parse_preset_choice_names() {
        assert_eq!(parse_preset_choice("high"), Ok(VideoPreset::High));
        assert_eq!(parse_preset_choice("Copy"), Ok(VideoPreset::Copy));
    }

    #[test]
    fn test_parse_preset_choice_invalid() {
        assert!(parse_preset_choice("5").is_err());
        assert!(parse_preset_choice("ultra").is_err());
    }
}
