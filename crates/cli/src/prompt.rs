//! Line-oriented prompting over stdin.

use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Reads operator answers one line at a time.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prints the prompt text and reads one trimmed line.
    /// Returns `None` on end of input.
    pub async fn read_line(&mut self, text: &str) -> io::Result<Option<String>> {
        print!("{text}");
        io::stdout().flush()?;
        let line = self.lines.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    /// Reads a path answer, stripping surrounding double quotes as pasted
    /// from file managers.
    pub async fn read_path(&mut self, text: &str) -> io::Result<Option<String>> {
        Ok(self
            .read_line(text)
            .await?
            .map(|l| strip_quotes(&l).to_string()))
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"/home/user/a file.png\""), "/home/user/a file.png");
        assert_eq!(strip_quotes("  plain.png  "), "plain.png");
        assert_eq!(strip_quotes("\"\""), "");
    }
}
