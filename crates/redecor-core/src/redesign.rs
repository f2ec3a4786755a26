//! Room redesign request types.
//!
//! A redesign is the credit-gated feature: the caller uploads a room photo elsewhere,
//! picks a style, and pays for the generation with credits.

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Credits charged for one redesign unless configured otherwise.
pub const DEFAULT_GENERATION_COST_CREDITS: i64 = 1;

/// Maximum length of the optional free-text prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 2000;

/// Decor style applied to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedesignStyle {
    /// Tropical.
    Tropical,
    /// Modern.
    Modern,
    /// Minimalist.
    Minimalist,
    /// Industrial.
    Industrial,
    /// Scandinavian.
    Scandinavian,
}

impl RedesignStyle {
    /// The wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tropical => "tropical",
            Self::Modern => "modern",
            Self::Minimalist => "minimalist",
            Self::Industrial => "industrial",
            Self::Scandinavian => "scandinavian",
        }
    }
}

/// Image-generation model used for the redesign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationModel {
    /// Stable Diffusion.
    #[default]
    StableDiffusion,
    /// DALL-E 2.
    DallE,
}

impl GenerationModel {
    /// The wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StableDiffusion => "stable_diffusion",
            Self::DallE => "dall_e",
        }
    }
}

/// A request to redesign a room photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedesignRequest {
    /// URL of the uploaded room photo.
    pub image_url: String,

    /// Target decor style.
    pub style: RedesignStyle,

    /// Generation model.
    #[serde(default)]
    pub model: GenerationModel,

    /// Extra instructions for the model.
    #[serde(default)]
    pub prompt: Option<String>,
}

impl RedesignRequest {
    /// Check the request before any credits are charged.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidRequest` if the image URL is not an http(s) URL
    /// or the prompt is too long.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let url = self.image_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(LedgerError::InvalidRequest(
                "image_url must be an http(s) URL".into(),
            ));
        }

        if let Some(prompt) = &self.prompt {
            if prompt.chars().count() > MAX_PROMPT_CHARS {
                return Err(LedgerError::InvalidRequest(format!(
                    "prompt exceeds {MAX_PROMPT_CHARS} characters"
                )));
            }
        }

        Ok(())
    }

    /// Description recorded on the usage transaction.
    #[must_use]
    pub fn usage_description(&self) -> String {
        format!(
            "{} redesign ({})",
            self.style.as_str(),
            self.model.as_str()
        )
    }
}
