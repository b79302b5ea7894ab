//! Actions shared by the subcommands and the interactive menu.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dialoguer::Confirm;
use place_mapper_api::PlacesApi;
use place_mapper_api::roster::ApiRosterStore;
use place_mapper_cli_utils::{IndicatifProgress, MultiProgress};
use place_mapper_place_models::{Place, PlaceId};
use place_mapper_recorder::source::{PositionSource, UnavailablePositionSource};
use place_mapper_recorder::track::TrackFilePositionSource;
use place_mapper_resolver::PlaceResolver;
use place_mapper_roster::Roster;
use place_mapper_session::{MapperSession, delete_prompt};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Options for replaying a track into a place.
pub struct RecordArgs {
    pub name: String,
    pub parent: Option<String>,
    pub description: Option<String>,
    pub track: PathBuf,
    pub interval: Option<Duration>,
}

async fn open_session(
    api: Arc<dyn PlacesApi>,
    source: Arc<dyn PositionSource>,
) -> Result<MapperSession, Box<dyn std::error::Error>> {
    let store = ApiRosterStore::new(api.clone());
    let mut session = MapperSession::new(Box::new(store), PlaceResolver::new(api), source);
    session.refresh().await?;
    Ok(session)
}

async fn open_read_only(
    api: Arc<dyn PlacesApi>,
) -> Result<MapperSession, Box<dyn std::error::Error>> {
    open_session(api, Arc::new(UnavailablePositionSource)).await
}

/// One listing line: id, name, and the mapped / sub-location markers.
fn place_row(roster: &Roster, place: &Place) -> String {
    let mapped = if place.is_mapped() { "Mapped" } else { "" };
    let parent = match place.parent_id {
        Some(_) => format!(
            "Sub-location of {}",
            roster.parent_name(place).unwrap_or("Unknown")
        ),
        None => String::new(),
    };

    format!("{:<6} {:<32} {:<7} {parent}", place.id.0, place.name, mapped)
        .trim_end()
        .to_string()
}

fn print_places(roster: &Roster, heading: &str, places: &[&Place]) {
    println!();
    println!("{heading}");
    println!("{}", "-".repeat(72));

    if places.is_empty() {
        println!("No places found.");
        return;
    }

    for place in places {
        println!("{}", place_row(roster, place));
    }
}

/// Lists the roster, or the children of `parent`.
pub async fn list_places(api: Arc<dyn PlacesApi>, parent: Option<&str>) -> CommandResult {
    let mut session = open_read_only(api).await?;
    session.set_parent_name(parent.unwrap_or_default());

    print_places(
        session.roster(),
        &session.visible_heading(),
        &session.visible_places(),
    );

    Ok(())
}

/// Lists top-level places that may be used as parents.
pub async fn list_parents(api: Arc<dyn PlacesApi>, exclude: Option<&str>) -> CommandResult {
    let mut session = open_read_only(api).await?;
    session.set_place_name(exclude.unwrap_or_default());

    let candidates = session.parent_candidates();
    print_places(
        session.roster(),
        &format!("Parent candidates ({})", candidates.len()),
        &candidates,
    );

    Ok(())
}

/// Replays a GPS track through the recorder and saves it under
/// `args.name`.
pub async fn record(
    api: Arc<dyn PlacesApi>,
    multi: &MultiProgress,
    args: RecordArgs,
) -> CommandResult {
    let mut source = TrackFilePositionSource::new(&args.track);
    if let Some(interval) = args.interval {
        source = source.with_interval(interval);
    }

    let mut session = open_session(api, Arc::new(source))
        .await?
        .with_progress(IndicatifProgress::points_spinner(multi, "Recording"));

    session.set_place_name(args.name);
    if let Some(parent) = args.parent {
        session.set_parent_name(parent);
    }
    if let Some(description) = args.description {
        session.set_description(description);
    }

    session.start_recording()?;
    while let Some(sample) = session.pump().await {
        sample?;
    }
    session.stop_recording();
    println!("{}", session.status());

    if let Some(last) = session.last_point_label() {
        println!("{last}");
    }

    let outcome = session.save().await?;
    log::info!("Saved place {}", outcome.id());
    println!("{}", session.status());

    Ok(())
}

/// Prints the SVG preview path of the place named `name`.
pub async fn preview(api: Arc<dyn PlacesApi>, name: &str) -> CommandResult {
    let mut session = open_read_only(api).await?;

    if session.roster().find_by_name(name).is_none() {
        println!("No place named '{name}'.");
        return Ok(());
    }

    session.set_place_name(name);
    println!("{}", session.status());
    println!("Points: {}", session.path().len());

    if let Some(last) = session.last_point_label() {
        println!("{last}");
    }

    let svg = session.svg_path();
    if svg.is_empty() {
        println!("Not enough points to draw a preview.");
    } else {
        println!("<svg viewBox=\"0 0 100 100\"><path d=\"{svg}\"/></svg>");
    }

    Ok(())
}

/// Deletes place `id`, asking first unless `assume_yes`.
pub async fn delete(api: Arc<dyn PlacesApi>, id: i64, assume_yes: bool) -> CommandResult {
    let id = PlaceId(id);
    let mut session = open_read_only(api).await?;

    let Some(name) = session.roster().find_by_id(id).map(|p| p.name.clone()) else {
        println!("No place with id {id}.");
        return Ok(());
    };

    let confirmed = assume_yes
        || Confirm::new()
            .with_prompt(delete_prompt(&name))
            .default(false)
            .interact()?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    session.delete(id, true).await?;
    println!("{}", session.status());

    Ok(())
}

#[cfg(test)]
mod tests {
    use place_mapper_place_models::{BoundaryPath, Coordinate};

    use super::*;

    fn roster() -> Roster {
        let boundary: BoundaryPath =
            vec![Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)].into();
        Roster::new(vec![
            Place::new(7, "Harem").with_boundary(boundary),
            Place::new(8, "Pool").with_parent(7),
            Place::new(9, "Gate").with_parent(42),
        ])
    }

    #[test]
    fn row_marks_mapped_places() {
        let roster = roster();
        let row = place_row(&roster, &roster.places()[0]);
        assert!(row.starts_with("7"));
        assert!(row.contains("Harem"));
        assert!(row.ends_with("Mapped"));
    }

    #[test]
    fn row_names_the_parent() {
        let roster = roster();
        let row = place_row(&roster, &roster.places()[1]);
        assert!(row.ends_with("Sub-location of Harem"));
    }

    #[test]
    fn row_flags_dangling_parent() {
        let roster = roster();
        let row = place_row(&roster, &roster.places()[2]);
        assert!(row.ends_with("Sub-location of Unknown"));
    }
}
