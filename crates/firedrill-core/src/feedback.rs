//! User-facing feedback: the instruction overlay and blocking notices

use serde::{Deserialize, Serialize};

use crate::geometry::Rgb;

pub const DEFAULT_PROMPT: &str = "FIRE DETECTED! Click the extinguisher to put it out.";
pub const DEFAULT_CONFIRMATION: &str = "Good job! Fire extinguished.";

pub const WHITE: Rgb = [1.0, 1.0, 1.0];
pub const GREEN: Rgb = [0.0, 0.5, 0.0];

/// Overlay label settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_confirmation")]
    pub confirmation: String,
    #[serde(default = "default_prompt_color")]
    pub prompt_color: Rgb,
    #[serde(default = "default_confirmation_color")]
    pub confirmation_color: Rgb,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Vertical offset from the screen center, pixels (negative is up)
    #[serde(default = "default_top_px")]
    pub top_px: f32,
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_confirmation() -> String {
    DEFAULT_CONFIRMATION.to_string()
}

fn default_prompt_color() -> Rgb {
    WHITE
}

fn default_confirmation_color() -> Rgb {
    GREEN
}

fn default_font_size() -> f32 {
    24.0
}

fn default_top_px() -> f32 {
    -40.0
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            confirmation: default_confirmation(),
            prompt_color: default_prompt_color(),
            confirmation_color: default_confirmation_color(),
            font_size: default_font_size(),
            top_px: default_top_px(),
        }
    }
}

/// How the scene tells the user the fire is out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FeedbackConfig {
    /// Persistent overlay text that changes on extinguish
    Label(LabelConfig),
    /// One blocking notice on extinguish
    Notification {
        #[serde(default = "default_confirmation")]
        message: String,
    },
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        FeedbackConfig::Label(LabelConfig::default())
    }
}

/// Live overlay text
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionLabel {
    pub text: String,
    pub color: Rgb,
    pub font_size: f32,
    pub top_px: f32,
    confirmation: String,
    confirmation_color: Rgb,
}

impl InstructionLabel {
    pub fn new(config: &LabelConfig) -> Self {
        Self {
            text: config.prompt.clone(),
            color: config.prompt_color,
            font_size: config.font_size,
            top_px: config.top_px,
            confirmation: config.confirmation.clone(),
            confirmation_color: config.confirmation_color,
        }
    }

    /// Switch to the confirmation text and color
    pub fn confirm(&mut self) {
        self.text = self.confirmation.clone();
        self.color = self.confirmation_color;
    }

    pub fn is_confirmed(&self) -> bool {
        self.text == self.confirmation && self.color == self.confirmation_color
    }
}

/// A blocking notice the host must show (browser alert, modal window)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_starts_with_prompt() {
        let label = InstructionLabel::new(&LabelConfig::default());
        assert_eq!(label.text, DEFAULT_PROMPT);
        assert_eq!(label.color, WHITE);
        assert!(!label.is_confirmed());
    }

    #[test]
    fn test_label_confirm() {
        let mut label = InstructionLabel::new(&LabelConfig::default());
        label.confirm();
        assert_eq!(label.text, DEFAULT_CONFIRMATION);
        assert_eq!(label.color, GREEN);
        assert!(label.is_confirmed());
    }

    #[test]
    fn test_feedback_config_from_toml() {
        let feedback: FeedbackConfig = toml::from_str("mode = \"notification\"").unwrap();
        assert_eq!(
            feedback,
            FeedbackConfig::Notification {
                message: DEFAULT_CONFIRMATION.to_string()
            }
        );
    }
}
