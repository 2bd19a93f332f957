use thiserror::Error;
use url::Url;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

/// Persisted generative-AI settings.
///
/// Every field is optional; unset models and base URL fall back to the defaults above.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppSettings {
    api_key: Option<String>,
    text_model: Option<String>,
    image_model: Option<String>,
    base_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AppSettingsDraft {
    pub api_key: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl AppSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a draft from existing settings so callers can change one field.
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            text_model: settings.text_model.clone(),
            image_model: settings.image_model.clone(),
            base_url: settings.base_url.clone(),
        }
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// Blank strings become `None`.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the base URL is present but invalid.
    pub fn validate(self) -> Result<AppSettings, AppSettingsError> {
        let api_key = normalize_optional(self.api_key);
        let text_model = normalize_optional(self.text_model);
        let image_model = normalize_optional(self.image_model);
        let base_url = normalize_optional(self.base_url);

        if let Some(url) = base_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(AppSettingsError::InvalidBaseUrl(url.clone()));
            }
        }

        Ok(AppSettings {
            api_key,
            text_model,
            image_model,
            base_url,
        })
    }
}

impl AppSettings {
    /// Rehydrate settings from storage.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the stored base URL is invalid.
    pub fn from_persisted(draft: AppSettingsDraft) -> Result<Self, AppSettingsError> {
        draft.validate()
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// True when an API key is present, i.e. AI generation can be attempted.
    #[must_use]
    pub fn is_ai_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn text_model(&self) -> Option<&str> {
        self.text_model.as_deref()
    }

    #[must_use]
    pub fn image_model(&self) -> Option<&str> {
        self.image_model.as_deref()
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[must_use]
    pub fn effective_text_model(&self) -> &str {
        self.text_model().unwrap_or(DEFAULT_TEXT_MODEL)
    }

    #[must_use]
    pub fn effective_image_model(&self) -> &str {
        self.image_model().unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    #[must_use]
    pub fn effective_base_url(&self) -> &str {
        self.base_url().unwrap_or(DEFAULT_GEMINI_BASE_URL)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_normalize_to_none() {
        let settings = AppSettingsDraft {
            api_key: Some("   ".into()),
            text_model: Some(" gemini-x ".into()),
            ..AppSettingsDraft::default()
        }
        .validate()
        .unwrap();

        assert!(!settings.is_ai_configured());
        assert_eq!(settings.text_model(), Some("gemini-x"));
        assert_eq!(settings.effective_image_model(), DEFAULT_IMAGE_MODEL);
        assert_eq!(settings.effective_base_url(), DEFAULT_GEMINI_BASE_URL);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = AppSettingsDraft {
            base_url: Some("not a url".into()),
            ..AppSettingsDraft::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppSettingsError::InvalidBaseUrl(_)));
    }
}
