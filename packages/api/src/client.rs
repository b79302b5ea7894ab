//! `reqwest` implementation of [`PlacesApi`].
//!
//! Endpoints:
//!
//! * `GET /admin/places?limit=N&include_children=true`
//! * `POST /admin/places`
//! * `PUT /admin/places/{id}`
//! * `DELETE /admin/places/{id}`
//!
//! Non-2xx responses become [`ApiError::Status`] carrying the `detail`
//! field of the error body when the server sends one.

use std::time::Duration;

use async_trait::async_trait;
use place_mapper_place_models::{NewPlace, Place, PlaceId, PlaceUpdate};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::{ApiError, PlacesApi};

/// Admin places API over HTTP with bearer authentication.
pub struct HttpPlacesApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpPlacesApi {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn place_url(&self, id: PlaceId) -> String {
        self.config.url(&format!("admin/places/{id}"))
    }
}

#[async_trait]
impl PlacesApi for HttpPlacesApi {
    async fn list_places(&self) -> Result<Vec<Place>, ApiError> {
        let limit = self.config.roster_limit.to_string();
        let include_children = self.config.include_children.to_string();

        let resp = self
            .authorize(self.client.get(self.config.url("admin/places")))
            .query(&[
                ("limit", limit.as_str()),
                ("include_children", include_children.as_str()),
            ])
            .send()
            .await?;

        let places: Vec<Place> = read_json(resp).await?;
        log::debug!("Fetched {} places", places.len());
        Ok(places)
    }

    async fn create_place(&self, body: &NewPlace) -> Result<Place, ApiError> {
        log::info!(
            "Creating place '{}' with {} boundary points",
            body.name,
            body.boundary_points.len()
        );

        let resp = self
            .authorize(self.client.post(self.config.url("admin/places")))
            .json(body)
            .send()
            .await?;

        read_json(resp).await
    }

    async fn update_place(&self, id: PlaceId, body: &PlaceUpdate) -> Result<Place, ApiError> {
        log::info!(
            "Updating place {id} with {} boundary points",
            body.boundary_points.len()
        );

        let resp = self
            .authorize(self.client.put(self.place_url(id)))
            .json(body)
            .send()
            .await?;

        read_json(resp).await
    }

    async fn delete_place(&self, id: PlaceId) -> Result<(), ApiError> {
        log::info!("Deleting place {id}");

        let resp = self
            .authorize(self.client.delete(self.place_url(id)))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        Ok(())
    }
}

/// Decodes a successful response, or turns a failed one into
/// [`ApiError::Status`].
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(status_error(status.as_u16(), &body));
    }

    Ok(serde_json::from_str(&body)?)
}

fn status_error(status: u16, body: &str) -> ApiError {
    let detail = parse_detail(body);
    log::warn!(
        "Admin API returned HTTP {status}: {}",
        detail.as_deref().unwrap_or("<no detail>")
    );
    ApiError::Status { status, detail }
}

/// Extracts the `detail` field from an error body.
///
/// String details are returned as-is; structured details (validation
/// error lists) are returned as compact JSON.
fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_detail() {
        assert_eq!(
            parse_detail(r#"{"detail": "Place not found"}"#).as_deref(),
            Some("Place not found")
        );
    }

    #[test]
    fn parses_structured_detail_as_json() {
        let detail = parse_detail(r#"{"detail": [{"loc": ["body", "name"], "msg": "field required"}]}"#)
            .unwrap();
        assert!(detail.contains("field required"));
        assert!(detail.starts_with('['));
    }

    #[test]
    fn missing_or_unparseable_detail_is_none() {
        assert!(parse_detail("").is_none());
        assert!(parse_detail("Internal Server Error").is_none());
        assert!(parse_detail(r#"{"status": "error"}"#).is_none());
        assert!(parse_detail(r#"{"detail": null}"#).is_none());
        assert!(parse_detail(r#"{"detail": "  "}"#).is_none());
    }

    #[test]
    fn status_error_keeps_code_and_detail() {
        let err = status_error(409, r#"{"detail": "Place is referenced by a tour"}"#);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.detail(), Some("Place is referenced by a tour"));
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let config = ApiConfig {
            base_url: "localhost:8000".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(
            HttpPlacesApi::new(config),
            Err(ApiError::Config { .. })
        ));
    }

    #[test]
    fn place_url_includes_id() {
        let api = HttpPlacesApi::new(ApiConfig::default()).unwrap();
        assert_eq!(
            api.place_url(PlaceId(42)),
            "http://localhost:8000/api/v1/admin/places/42"
        );
    }
}
