//! Interactive menu for the location mapper.
//!
//! Provides a menu-driven interface using `dialoguer` for running mapper
//! actions without memorizing CLI flags.

use std::path::PathBuf;
use std::sync::Arc;

use dialoguer::{Confirm, Input, Select};
use place_mapper_api::PlacesApi;
use place_mapper_cli_utils::MultiProgress;

use crate::commands::{self, RecordArgs};

/// Top-level actions available in the interactive menu.
enum MapperAction {
    ListPlaces,
    ListParents,
    RecordTrack,
    Preview,
    Delete,
}

impl MapperAction {
    const ALL: &[Self] = &[
        Self::ListPlaces,
        Self::ListParents,
        Self::RecordTrack,
        Self::Preview,
        Self::Delete,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ListPlaces => "List places",
            Self::ListParents => "List parent candidates",
            Self::RecordTrack => "Record boundary from GPS track",
            Self::Preview => "Preview a boundary",
            Self::Delete => "Delete a place",
        }
    }
}

fn prompt_optional(prompt: &str) -> Result<Option<String>, dialoguer::Error> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn prompt_required(prompt: &str) -> Result<String, dialoguer::Error> {
    Input::new().with_prompt(prompt).interact_text()
}

/// Prompts for an action and runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected action fails.
pub async fn run(
    api: Arc<dyn PlacesApi>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Location Mapper");
    println!();

    let labels: Vec<&str> = MapperAction::ALL.iter().map(MapperAction::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match MapperAction::ALL[idx] {
        MapperAction::ListPlaces => {
            let parent = prompt_optional("Parent place (empty for all)")?;
            commands::list_places(api, parent.as_deref()).await?;
        }
        MapperAction::ListParents => {
            let exclude = prompt_optional("Place being edited (empty for none)")?;
            commands::list_parents(api, exclude.as_deref()).await?;
        }
        MapperAction::RecordTrack => {
            let name = prompt_required("Place name")?;
            let parent = prompt_optional("Parent place (optional)")?;
            let description = prompt_optional("Short description (optional)")?;
            let track: String = prompt_required("Track file (CSV: lat,lng)")?;

            if !Confirm::new()
                .with_prompt(format!("Save track as '{}'?", name.trim()))
                .default(true)
                .interact()?
            {
                println!("Cancelled.");
                return Ok(());
            }

            let args = RecordArgs {
                name,
                parent,
                description,
                track: PathBuf::from(track.trim()),
                interval: None,
            };
            commands::record(api, multi, args).await?;
        }
        MapperAction::Preview => {
            let name = prompt_required("Place name")?;
            commands::preview(api, &name).await?;
        }
        MapperAction::Delete => {
            let id: i64 = Input::new().with_prompt("Place id").interact_text()?;
            commands::delete(api, id, false).await?;
        }
    }

    Ok(())
}
