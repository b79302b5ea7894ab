//! Hierarchy filtering for the mapper's picker lists.
//!
//! The parent-name field doubles as a filter: when it names a place, only
//! that place's direct children are listed. The parent suggestion list
//! offers top-level places only, never the place being edited.

use place_mapper_place_models::Place;

use crate::Roster;

/// Places to list for the current parent filter.
///
/// * Empty filter: the whole roster, in server order.
/// * Filter names a place: that place's direct children.
/// * Filter names nothing: an empty list (not a fallback to everything).
#[must_use]
pub fn visible_set<'a>(roster: &'a Roster, selected_parent_name: &str) -> Vec<&'a Place> {
    if selected_parent_name.trim().is_empty() {
        return roster.places().iter().collect();
    }

    let Some(parent) = roster.find_by_name(selected_parent_name) else {
        return Vec::new();
    };

    roster
        .places()
        .iter()
        .filter(|p| p.parent_id == Some(parent.id))
        .collect()
}

/// Top-level places to suggest as parents, excluding `exclude_name` so a
/// place is never offered as its own parent.
#[must_use]
pub fn top_level_candidates<'a>(roster: &'a Roster, exclude_name: &str) -> Vec<&'a Place> {
    let exclude = !exclude_name.trim().is_empty();

    roster
        .places()
        .iter()
        .filter(|p| p.is_top_level())
        .filter(|p| !(exclude && p.matches_name(exclude_name)))
        .collect()
}

/// Heading for the picker list, e.g. `Children of Harem (3)`.
#[must_use]
pub fn visible_heading(roster: &Roster, selected_parent_name: &str) -> String {
    let count = visible_set(roster, selected_parent_name).len();
    match roster.find_by_name(selected_parent_name) {
        Some(parent) => format!("Children of {} ({count})", parent.name),
        None => format!("Registered Places ({count})"),
    }
}

#[cfg(test)]
mod tests {
    use place_mapper_place_models::PlaceId;

    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![
            Place::new(7, "Harem"),
            Place::new(8, "Throne Room").with_parent(7),
            Place::new(9, "Kalta Minor"),
            Place::new(11, "Courtyard").with_parent(7),
            Place::new(12, "Alcove").with_parent(8),
        ])
    }

    fn ids(places: &[&Place]) -> Vec<PlaceId> {
        places.iter().map(|p| p.id).collect()
    }

    #[test]
    fn empty_filter_returns_full_roster_in_order() {
        let roster = roster();
        let visible = visible_set(&roster, "");
        assert_eq!(
            ids(&visible),
            vec![PlaceId(7), PlaceId(8), PlaceId(9), PlaceId(11), PlaceId(12)]
        );
    }

    #[test]
    fn parent_filter_returns_direct_children_only() {
        let roster = roster();
        let visible = visible_set(&roster, "harem");
        assert_eq!(ids(&visible), vec![PlaceId(8), PlaceId(11)]);
    }

    #[test]
    fn unknown_parent_filter_returns_nothing() {
        let roster = roster();
        assert!(visible_set(&roster, "Nonexistent").is_empty());
    }

    #[test]
    fn candidates_exclude_children_and_self() {
        let roster = roster();
        assert_eq!(
            ids(&top_level_candidates(&roster, "")),
            vec![PlaceId(7), PlaceId(9)]
        );
        assert_eq!(
            ids(&top_level_candidates(&roster, "Harem")),
            vec![PlaceId(9)]
        );
        assert_eq!(
            ids(&top_level_candidates(&roster, "HAREM")),
            vec![PlaceId(9)]
        );
    }

    #[test]
    fn heading_reflects_filter() {
        let roster = roster();
        assert_eq!(visible_heading(&roster, ""), "Registered Places (5)");
        assert_eq!(visible_heading(&roster, "harem"), "Children of Harem (2)");
    }
}
