#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Roster snapshot, name resolution, and hierarchy filtering.
//!
//! The [`Roster`] is the mapper's in-memory copy of every known place. It
//! is a plain snapshot: it is never patched locally, only replaced
//! wholesale through a [`store::RosterStore`] refresh after each mutation.
//!
//! Names are used as a convenience index over the snapshot. The server's
//! identifier stays authoritative; when two places share a name (ignoring
//! case) the one with the lowest identifier wins.

pub mod filter;
pub mod store;

use place_mapper_place_models::{Place, PlaceId};

/// Snapshot of all places known to the mapper, in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    places: Vec<Place>,
}

impl Roster {
    /// Wraps a list of places as returned by the server.
    #[must_use]
    pub const fn new(places: Vec<Place>) -> Self {
        Self { places }
    }

    /// All places, in server order.
    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Number of places in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Looks up a place by identifier.
    #[must_use]
    pub fn find_by_id(&self, id: PlaceId) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    /// Resolves a typed name to a place.
    ///
    /// Matching is case-insensitive and exact after trimming the typed
    /// name. An empty name never matches. When several places match, the
    /// one with the lowest identifier is returned.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Place> {
        if name.trim().is_empty() {
            return None;
        }

        let mut matches = self.places.iter().filter(|p| p.matches_name(name));
        let first = matches.next()?;
        let mut best = first;
        let mut duplicates = 0usize;

        for candidate in matches {
            duplicates += 1;
            if candidate.id < best.id {
                best = candidate;
            }
        }

        if duplicates > 0 {
            log::warn!(
                "{} places share the name '{}', resolving to id {}",
                duplicates + 1,
                name.trim(),
                best.id
            );
        }

        Some(best)
    }

    /// Resolves a typed parent name to a parent identifier.
    ///
    /// A miss is not an error: it yields `None`, which produces an
    /// un-parented place.
    #[must_use]
    pub fn resolve_parent_id(&self, parent_name: &str) -> Option<PlaceId> {
        if parent_name.trim().is_empty() {
            return None;
        }

        let resolved = self.find_by_name(parent_name).map(|p| p.id);
        if resolved.is_none() {
            log::debug!("Parent '{}' not found in roster", parent_name.trim());
        }
        resolved
    }

    /// Name of `place`'s parent.
    ///
    /// Returns `None` for top-level places and for parents that are not in
    /// the snapshot.
    #[must_use]
    pub fn parent_name(&self, place: &Place) -> Option<&str> {
        place
            .parent_id
            .and_then(|id| self.find_by_id(id))
            .map(|parent| parent.name.as_str())
    }
}

impl From<Vec<Place>> for Roster {
    fn from(places: Vec<Place>) -> Self {
        Self::new(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![
            Place::new(7, "Harem"),
            Place::new(8, "Throne Room").with_parent(7),
            Place::new(9, "Kalta Minor"),
            Place::new(10, "Orphan").with_parent(99),
        ])
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let roster = roster();
        assert_eq!(roster.find_by_name("harem").unwrap().id, PlaceId(7));
        assert_eq!(roster.find_by_name("HAREM").unwrap().id, PlaceId(7));
        assert_eq!(roster.find_by_name("  Harem  ").unwrap().id, PlaceId(7));
    }

    #[test]
    fn find_by_name_requires_exact_match() {
        let roster = roster();
        assert!(roster.find_by_name("Hare").is_none());
        assert!(roster.find_by_name("").is_none());
        assert!(roster.find_by_name("   ").is_none());
    }

    #[test]
    fn duplicate_names_resolve_to_lowest_id() {
        let roster = Roster::new(vec![
            Place::new(12, "Gate"),
            Place::new(4, "gate"),
            Place::new(30, "GATE"),
        ]);
        assert_eq!(roster.find_by_name("Gate").unwrap().id, PlaceId(4));
    }

    #[test]
    fn parent_resolution_miss_is_none() {
        let roster = roster();
        assert_eq!(roster.resolve_parent_id("harem"), Some(PlaceId(7)));
        assert_eq!(roster.resolve_parent_id("NoSuchParent"), None);
        assert_eq!(roster.resolve_parent_id(""), None);
    }

    #[test]
    fn parent_name_handles_dangling_parent() {
        let roster = roster();
        let child = roster.find_by_id(PlaceId(8)).unwrap();
        assert_eq!(roster.parent_name(child), Some("Harem"));

        let orphan = roster.find_by_id(PlaceId(10)).unwrap();
        assert_eq!(roster.parent_name(orphan), None);

        let top = roster.find_by_id(PlaceId(9)).unwrap();
        assert_eq!(roster.parent_name(top), None);
    }
}
