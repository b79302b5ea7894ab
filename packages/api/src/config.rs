//! API client configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `PLACE_MAPPER_CONFIG` | Path to the TOML file (when none is given explicitly) |
//! | `PLACE_MAPPER_API_URL` | Overrides `base_url` |
//! | `PLACE_MAPPER_TOKEN` | Overrides `token` |
//!
//! ```toml
//! base_url = "https://example.org/api/v1"
//! token = "..."
//! roster_limit = 1000
//! include_children = true
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ApiError;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Admin API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://example.org/api/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for admin endpoints.
    #[serde(default)]
    pub token: Option<String>,
    /// `limit` sent when listing the roster.
    #[serde(default = "default_roster_limit")]
    pub roster_limit: u32,
    /// Whether the roster listing includes child places.
    #[serde(default = "default_true")]
    pub include_children: bool,
    /// Per-request timeout. `None` leaves the client default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_roster_limit() -> u32 {
    1000
}

const fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            roster_limit: default_roster_limit(),
            include_children: true,
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the document is malformed.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ApiError> {
        toml::de::from_str(toml_str).map_err(|e| ApiError::Config {
            message: format!("Invalid API config: {e}"),
        })
    }

    /// Loads the configuration.
    ///
    /// Reads `path`, else the file named by `PLACE_MAPPER_CONFIG`, else
    /// starts from defaults; environment overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ApiError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("PLACE_MAPPER_CONFIG").ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                log::debug!("Loading API config from {}", path.display());
                let contents = std::fs::read_to_string(&path).map_err(|e| ApiError::Config {
                    message: format!("Failed to read {}: {e}", path.display()),
                })?;
                Self::from_toml_str(&contents)?
            }
            None => Self::default(),
        };

        config.apply_overrides(
            std::env::var("PLACE_MAPPER_API_URL").ok(),
            std::env::var("PLACE_MAPPER_TOKEN").ok(),
        );
        config.validate()?;

        Ok(config)
    }

    /// Applies non-empty overrides for the base URL and token.
    pub fn apply_overrides(&mut self, base_url: Option<String>, token: Option<String>) {
        if let Some(base_url) = base_url.filter(|s| !s.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(token) = token.filter(|s| !s.trim().is_empty()) {
            self.token = Some(token.trim().to_string());
        }
    }

    /// Checks that the base URL is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the base URL is empty or not HTTP(S).
    pub fn validate(&self) -> Result<(), ApiError> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ApiError::Config {
                message: format!("base_url must be an http(s) URL, got '{base}'"),
            });
        }
        if self.token.is_none() {
            log::warn!("No admin token configured; admin endpoints will reject requests");
        }
        Ok(())
    }

    /// Joins `path` onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ApiConfig::from_toml_str("").unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.roster_limit, 1000);
        assert!(config.include_children);
    }

    #[test]
    fn parses_full_document() {
        let config = ApiConfig::from_toml_str(
            r#"
            base_url = "https://tour.example/api/v1/"
            token = "secret"
            roster_limit = 250
            include_children = false
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.roster_limit, 250);
        assert!(!config.include_children);
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(
            config.url("/admin/places"),
            "https://tour.example/api/v1/admin/places"
        );
    }

    #[test]
    fn malformed_document_is_config_error() {
        let err = ApiConfig::from_toml_str("roster_limit = \"lots\"").unwrap_err();
        assert!(matches!(err, ApiError::Config { .. }));
    }

    #[test]
    fn overrides_ignore_blank_values() {
        let mut config = ApiConfig::default();
        config.apply_overrides(Some("  ".to_string()), Some("tok ".to_string()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token.as_deref(), Some("tok"));

        config.apply_overrides(Some("https://other/api".to_string()), None);
        assert_eq!(config.base_url, "https://other/api");
        assert_eq!(config.token.as_deref(), Some("tok"));
    }

    #[test]
    fn validate_rejects_non_http_urls() {
        let config = ApiConfig {
            base_url: "ftp://nope".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
