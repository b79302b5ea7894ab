#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place, coordinate, and boundary path types for the location mapper.
//!
//! These types mirror the admin places API: a [`Place`] is a point of
//! interest with an optional walked [`BoundaryPath`] and an optional
//! parent place. The request bodies for creating and updating places
//! ([`NewPlace`], [`PlaceUpdate`]) live here too so that every crate
//! serialises them identically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Short description written when a place is created without one.
pub const DEFAULT_SHORT_DESCRIPTION: &str = "Auto-created by Location Mapper";

/// Kind assigned to places created from the mapper.
pub const DEFAULT_PLACE_KIND: PlaceKind = PlaceKind::Historical;

/// A single sampled position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in signed degrees.
    pub lat: f64,
    /// Longitude in signed degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Ordered sequence of sampled coordinates describing a place's perimeter.
///
/// Insertion order is sampling order. On the wire this is a plain array of
/// `{ "lat": .., "lng": .. }` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryPath(Vec<Coordinate>);

impl BoundaryPath {
    /// Creates an empty path.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a sample to the end of the path.
    pub fn push(&mut self, point: Coordinate) {
        self.0.push(point);
    }

    /// Removes every sample.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of samples in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First sample, used as a created place's point location.
    #[must_use]
    pub fn first(&self) -> Option<Coordinate> {
        self.0.first().copied()
    }

    /// Most recent sample.
    #[must_use]
    pub fn last(&self) -> Option<Coordinate> {
        self.0.last().copied()
    }

    /// Samples in sampling order.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    /// Whether the path has enough points to draw a line (at least 2).
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.0.len() >= 2
    }

    /// Whether the path encloses a meaningful area (at least 3 points).
    #[must_use]
    pub fn is_area(&self) -> bool {
        self.0.len() >= 3
    }
}

impl From<Vec<Coordinate>> for BoundaryPath {
    fn from(points: Vec<Coordinate>) -> Self {
        Self(points)
    }
}

impl FromIterator<Coordinate> for BoundaryPath {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Server-assigned place identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub i64);

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Category of a place as stored in the `type` column.
///
/// Unknown values are preserved verbatim in [`PlaceKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PlaceKind {
    /// Historical site (the mapper's default).
    Historical,
    /// Museum.
    Museum,
    /// Restaurant.
    Restaurant,
    /// Any other value the server returns.
    #[strum(default)]
    Other(String),
}

impl PlaceKind {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Historical => "historical",
            Self::Museum => "museum",
            Self::Restaurant => "restaurant",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PlaceKind {
    fn from(value: String) -> Self {
        Self::from_str(&value).unwrap_or(Self::Other(value))
    }
}

impl From<PlaceKind> for String {
    fn from(value: PlaceKind) -> Self {
        value.as_str().to_string()
    }
}

impl Serialize for PlaceKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlaceKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// A place record as returned by `GET /admin/places`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Server-assigned identifier.
    pub id: PlaceId,
    /// Display name. Used by the mapper as a case-insensitive lookup key.
    pub name: String,
    /// Walked perimeter, if one has been recorded.
    #[serde(default)]
    pub boundary_points: Option<BoundaryPath>,
    /// Short description shown in lists.
    #[serde(default)]
    pub short_desc: Option<String>,
    /// Legacy description field.
    #[serde(default)]
    pub description: Option<String>,
    /// Long-form description.
    #[serde(default)]
    pub long_desc: Option<String>,
    /// Parent place, for sub-locations.
    #[serde(default)]
    pub parent_id: Option<PlaceId>,
    /// Point location latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Point location longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Place category.
    #[serde(default, rename = "type")]
    pub kind: Option<PlaceKind>,
    /// Whether the place is published.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Place {
    /// Creates a bare place with only an identifier and a name.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: PlaceId(id),
            name: name.into(),
            boundary_points: None,
            short_desc: None,
            description: None,
            long_desc: None,
            parent_id: None,
            latitude: None,
            longitude: None,
            kind: None,
            is_active: None,
        }
    }

    /// Sets the parent place.
    #[must_use]
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(PlaceId(parent_id));
        self
    }

    /// Sets the boundary path.
    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundaryPath) -> Self {
        self.boundary_points = Some(boundary);
        self
    }

    /// Sets the short description.
    #[must_use]
    pub fn with_short_desc(mut self, short_desc: impl Into<String>) -> Self {
        self.short_desc = Some(short_desc.into());
        self
    }

    /// Description to load into the editor: the short description, else
    /// the legacy description, else empty.
    #[must_use]
    pub fn display_description(&self) -> &str {
        self.short_desc
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.description.as_deref())
            .unwrap_or("")
    }

    /// Whether the place has a recorded boundary.
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.boundary_points
            .as_ref()
            .is_some_and(|path| !path.is_empty())
    }

    /// Whether the place has no parent.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the typed `name` refers to this place.
    ///
    /// The typed name is trimmed; the comparison is case-insensitive.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// Body of `POST /admin/places`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlace {
    /// Trimmed display name.
    pub name: String,
    /// Place category.
    #[serde(rename = "type")]
    pub kind: PlaceKind,
    /// Latitude of the first recorded sample.
    pub latitude: f64,
    /// Longitude of the first recorded sample.
    pub longitude: f64,
    /// Full recorded path.
    pub boundary_points: BoundaryPath,
    /// Short description, defaulted when empty.
    pub short_desc: String,
    /// Description as typed.
    pub description: String,
    /// Resolved parent, serialised as `null` when absent.
    pub parent_id: Option<PlaceId>,
    /// Always empty for mapper-created places.
    pub long_desc: String,
    /// Always `true` for mapper-created places.
    pub is_active: bool,
}

impl NewPlace {
    /// Builds a create request anchored at the first sample of `boundary`.
    ///
    /// Returns `None` when `boundary` is empty, since a place cannot be
    /// created without a point location.
    #[must_use]
    pub fn from_boundary(
        name: &str,
        description: &str,
        boundary: &BoundaryPath,
        parent_id: Option<PlaceId>,
    ) -> Option<Self> {
        let anchor = boundary.first()?;

        let short_desc = if description.is_empty() {
            DEFAULT_SHORT_DESCRIPTION.to_string()
        } else {
            description.to_string()
        };

        Some(Self {
            name: name.trim().to_string(),
            kind: DEFAULT_PLACE_KIND,
            latitude: anchor.lat,
            longitude: anchor.lng,
            boundary_points: boundary.clone(),
            short_desc,
            description: description.to_string(),
            parent_id,
            long_desc: String::new(),
            is_active: true,
        })
    }
}

/// Body of `PUT /admin/places/{id}`.
///
/// The description is written to both `short_desc` and `description`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceUpdate {
    /// Replacement boundary.
    pub boundary_points: BoundaryPath,
    /// Short description.
    pub short_desc: String,
    /// Legacy description, kept in sync with `short_desc`.
    pub description: String,
    /// Resolved parent, serialised as `null` to detach.
    pub parent_id: Option<PlaceId>,
}

impl PlaceUpdate {
    /// Builds an update request.
    #[must_use]
    pub fn new(boundary: &BoundaryPath, description: &str, parent_id: Option<PlaceId>) -> Self {
        Self {
            boundary_points: boundary.clone(),
            short_desc: description.to_string(),
            description: description.to_string(),
            parent_id,
        }
    }
}
