//! Configuration types for kv-attention-tour.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest value any diagram dimension may take (keeps grids on screen).
pub const MAX_DIMENSION: usize = 16;

/// Shape constants every diagram is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    /// Prompt length L (tokens already seen before decoding).
    pub seq_len: usize,
    /// Model (hidden) dimension D.
    pub model_dim: usize,
    /// Number of attention heads.
    pub num_heads: usize,
    /// Per-head dimension dk.
    pub head_dim: usize,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            seq_len: 6,
            model_dim: 6,
            num_heads: 2,
            head_dim: 3,
        }
    }
}

impl Dimensions {
    /// Sequence length once the decoded token is appended (L + 1).
    pub fn extended_len(&self) -> usize {
        self.seq_len + 1
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("seq_len", self.seq_len),
            ("model_dim", self.model_dim),
            ("num_heads", self.num_heads),
            ("head_dim", self.head_dim),
        ] {
            if value == 0 || value > MAX_DIMENSION {
                return Err(Error::Config(format!(
                    "{name} must be in 1..={MAX_DIMENSION}, got {value}"
                )));
            }
        }
        if self.num_heads * self.head_dim != self.model_dim {
            return Err(Error::Config(format!(
                "model_dim ({}) must equal num_heads ({}) x head_dim ({})",
                self.model_dim, self.num_heads, self.head_dim
            )));
        }
        Ok(())
    }
}

/// Autoplay timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Milliseconds between automatic step advances.
    pub interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { interval_ms: 2000 }
    }
}

impl PlaybackConfig {
    /// Interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Token labels printed next to input rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// One label per prompt position.
    pub prompt: Vec<String>,
    /// Label of the token being decoded.
    pub next: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            prompt: ["The", "capital", "of", "France", "is", "a"]
                .into_iter()
                .map(String::from)
                .collect(),
            next: "Paris".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Diagram shape constants.
    pub dimensions: Dimensions,
    /// Autoplay timing.
    pub playback: PlaybackConfig,
    /// Token labels.
    pub tokens: TokenConfig,
}

impl TourConfig {
    /// Load and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.dimensions.validate()?;
        if self.playback.interval_ms == 0 {
            return Err(Error::Config("playback.interval_ms must be > 0".into()));
        }
        if self.tokens.prompt.len() != self.dimensions.seq_len {
            return Err(Error::Config(format!(
                "tokens.prompt has {} labels but seq_len is {}",
                self.tokens.prompt.len(),
                self.dimensions.seq_len
            )));
        }
        Ok(())
    }

    /// Set the prompt length, padding or truncating token labels to match.
    pub fn with_seq_len(mut self, seq_len: usize) -> Self {
        self.dimensions.seq_len = seq_len;
        let prompt = &mut self.tokens.prompt;
        prompt.truncate(seq_len);
        while prompt.len() < seq_len {
            prompt.push(format!("t{}", prompt.len()));
        }
        self
    }

    /// Set the autoplay interval.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.playback.interval_ms = interval_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TourConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.playback.interval(), Duration::from_millis(2000));
        assert_eq!(config.dimensions.extended_len(), 7);
    }

    #[test]
    fn test_head_split_must_match_model_dim() {
        let mut config = TourConfig::default();
        config.dimensions.head_dim = 4;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_with_seq_len_pads_labels() {
        let config = TourConfig::default().with_seq_len(8);
        assert_eq!(config.tokens.prompt.len(), 8);
        assert_eq!(config.tokens.prompt[7], "t7");
        assert!(config.validate().is_ok());

        let config = TourConfig::default().with_seq_len(2);
        assert_eq!(config.tokens.prompt, vec!["The", "capital"]);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = TourConfig::default().with_interval_ms(0);
        assert!(config.validate().is_err());
    }
}
