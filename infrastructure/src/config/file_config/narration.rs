//! Narration configuration from TOML (`[narration]` section)

use mana_application::NarrationParams;
use mana_domain::{ConfigIssue, ConfigIssueCode, MixSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where rendered narration goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrationOutput {
    /// Default audio output device.
    #[default]
    Device,
    /// One WAV file per narration.
    Wav,
    /// Rendered and discarded.
    None,
}

impl std::str::FromStr for NarrationOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "device" | "speaker" => Ok(NarrationOutput::Device),
            "wav" | "file" => Ok(NarrationOutput::Wav),
            "none" | "null" | "off" => Ok(NarrationOutput::None),
            _ => Err(format!("Invalid narration output: {}", s)),
        }
    }
}

/// Raw narration configuration from TOML
///
/// # Example
///
/// ```toml
/// [narration]
/// enabled = true
/// impulse_path = "~/.config/mana-chat/hall.wav"
/// dry_gain = 0.6
/// wet_gain = 0.4
/// pan = 0.0
/// output = "wav"            # "device", "wav" or "none"
/// wav_dir = "narrations"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNarrationConfig {
    pub enabled: bool,
    /// Impulse response WAV; a synthetic room is used when unset.
    pub impulse_path: Option<String>,
    pub dry_gain: f32,
    pub wet_gain: f32,
    pub pan: f32,
    pub output: String,
    /// Directory for `output = "wav"` (default: current directory).
    pub wav_dir: Option<String>,
}

impl Default for FileNarrationConfig {
    fn default() -> Self {
        let mix = MixSettings::default();
        Self {
            enabled: true,
            impulse_path: None,
            dry_gain: mix.dry_gain,
            wet_gain: mix.wet_gain,
            pan: mix.pan,
            output: "device".to_string(),
            wav_dir: None,
        }
    }
}

impl FileNarrationConfig {
    /// Parse `output`, falling back to the device with a warning.
    pub fn parse_output(&self) -> (NarrationOutput, Vec<ConfigIssue>) {
        match self.output.parse::<NarrationOutput>() {
            Ok(output) => (output, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "narration.output".to_string(),
                        value: self.output.clone(),
                        valid_values: vec![
                            "device".to_string(),
                            "wav".to_string(),
                            "none".to_string(),
                        ],
                    },
                    format!(
                        "narration.output: unknown value '{}', falling back to 'device'",
                        self.output
                    ),
                );
                (NarrationOutput::default(), vec![issue])
            }
        }
    }

    pub fn to_params(&self) -> NarrationParams {
        NarrationParams {
            enabled: self.enabled,
            mix: MixSettings {
                dry_gain: self.dry_gain,
                wet_gain: self.wet_gain,
                pan: self.pan,
            },
        }
    }

    pub fn impulse_path(&self) -> Option<PathBuf> {
        self.impulse_path.as_deref().map(expand_home)
    }

    pub fn wav_dir(&self) -> PathBuf {
        self.wav_dir
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, value) in [
            ("narration.dry_gain", self.dry_gain),
            ("narration.wet_gain", self.wet_gain),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(out_of_range(field, value, "0.0..=1.0"));
            }
        }
        if !(-1.0..=1.0).contains(&self.pan) {
            issues.push(out_of_range("narration.pan", self.pan, "-1.0..=1.0"));
        }

        issues.extend(self.parse_output().1);
        issues
    }
}

fn out_of_range(field: &str, value: f32, range: &str) -> ConfigIssue {
    ConfigIssue::error(
        ConfigIssueCode::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
        },
        format!("{}: {} is outside {}", field, value, range),
    )
}

/// Expand a leading `~/` to the home directory.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
