//! Rating and navigation commands: show, rate, next, prev, jump, clear.
//!
//! Every command here is one interaction with the form: render the saved
//! rating for the current item, overlay the flags given on the command
//! line, and write the result through.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{open_labeller, progress_line};
use crate::cli::FormArgs;
use crate::error::{Error, Result};
use crate::model::{Item, RatingRecord};
use crate::session::{FormValues, Labeller, Progress};
use crate::storage::StateBackend;

/// Current item as shown after every command.
#[derive(Serialize)]
struct ItemView<'a> {
    /// 1-based position.
    position: usize,
    total: usize,
    key: &'a str,
    item: &'a Item,
    rating: Option<&'a RatingRecord>,
    form: FormValues,
    needs_subcategory: bool,
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    current: ItemView<'a>,
    progress: Progress,
}

#[derive(Serialize)]
struct SaveOutput<'a> {
    saved: RatingRecord,
    strict: bool,
    current: ItemView<'a>,
    progress: Progress,
}

#[derive(Serialize)]
struct MoveOutput<'a> {
    /// Rating written for the item being left.
    saved: RatingRecord,
    moved: bool,
    current: ItemView<'a>,
    progress: Progress,
}

fn current_view<B: StateBackend>(labeller: &Labeller<B>) -> Result<ItemView<'_>> {
    let (index, item) = labeller.current().ok_or(Error::NoDataset)?;
    let key = labeller.current_key().ok_or(Error::NoDataset)?;
    let form = labeller.current_form();
    Ok(ItemView {
        position: index + 1,
        total: labeller.items().len(),
        key: key.as_str(),
        item,
        rating: labeller.current_record(),
        needs_subcategory: form.needs_subcategory(),
        form,
    })
}

/// Execute the show command.
///
/// # Errors
///
/// Returns `NoDataset` if nothing is loaded.
pub fn show(db_path: Option<&PathBuf>, timezone: Option<&str>, json: bool) -> Result<()> {
    let labeller = open_labeller(db_path, timezone)?;
    let current = current_view(&labeller)?;
    let progress = labeller.progress();

    if json {
        let output = ShowOutput { current, progress };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_item(&current);
        println!();
        println!("{}", progress_line(&progress));
    }
    Ok(())
}

/// Execute the rate command: autosave, or a strict save with `strict`.
///
/// # Errors
///
/// Returns `Validation` when a strict save is missing a field,
/// `InvalidArgument` for unknown form values, or `NoDataset`.
pub fn rate(
    form: &FormArgs,
    strict: bool,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut labeller = open_labeller(db_path, timezone)?;
    let values = form.overrides().apply(&labeller.current_form())?;

    let saved = if strict {
        labeller.save_strict(&values)?
    } else {
        labeller.autosave(&values)?
    };

    let current = current_view(&labeller)?;
    let progress = labeller.progress();

    if json {
        let output = SaveOutput {
            saved,
            strict,
            current,
            progress,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let state = if saved.is_complete {
            "complete".green()
        } else {
            "partial".yellow()
        };
        println!("Saved item {} ({state})", current.position);
        println!("  {}", describe_rating(Some(&saved)));
        println!("{}", progress_line(&progress));
    }
    Ok(())
}

/// Execute `next` (`delta = 1`) or `prev` (`delta = -1`).
///
/// The form is saved even when already at the first or last item.
///
/// # Errors
///
/// Returns `InvalidArgument` for unknown form values, or `NoDataset`.
pub fn step(
    delta: isize,
    form: &FormArgs,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut labeller = open_labeller(db_path, timezone)?;
    let values = form.overrides().apply(&labeller.current_form())?;
    let leaving = labeller.current_key().cloned();

    let moved = labeller.navigate(delta, &values)?;
    let saved = leaving
        .and_then(|k| labeller.store().get(&k).cloned())
        .ok_or(Error::NoDataset)?;

    print_move(&labeller, saved, moved, json)
}

/// Execute the jump command with a 1-based position.
///
/// # Errors
///
/// Returns `JumpOutOfRange` or `InvalidArgument` for a bad position; in
/// that case nothing is saved.
pub fn jump(
    position: &str,
    form: &FormArgs,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut labeller = open_labeller(db_path, timezone)?;
    let values = form.overrides().apply(&labeller.current_form())?;
    let leaving = labeller.current_key().cloned();

    let before = labeller.navigator().cursor();
    let index = labeller.jump(position, &values)?;
    let saved = leaving
        .and_then(|k| labeller.store().get(&k).cloned())
        .ok_or(Error::NoDataset)?;

    print_move(&labeller, saved, before != Some(index), json)
}

/// Execute the clear command.
///
/// # Errors
///
/// Returns `NoDataset` if nothing is loaded.
pub fn clear(db_path: Option<&PathBuf>, timezone: Option<&str>, json: bool) -> Result<()> {
    let mut labeller = open_labeller(db_path, timezone)?;
    let saved = labeller.clear_current()?;
    let current = current_view(&labeller)?;
    let progress = labeller.progress();

    if json {
        let output = SaveOutput {
            saved,
            strict: false,
            current,
            progress,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Cleared item {}", current.position);
        println!("{}", progress_line(&progress));
    }
    Ok(())
}

fn print_move<B: StateBackend>(
    labeller: &Labeller<B>,
    saved: RatingRecord,
    moved: bool,
    json: bool,
) -> Result<()> {
    let current = current_view(labeller)?;
    let progress = labeller.progress();

    if json {
        let output = MoveOutput {
            saved,
            moved,
            current,
            progress,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        if !moved {
            println!("{}", "Already at the edge of the dataset.".dimmed());
        }
        print_item(&current);
        println!();
        println!("{}", progress_line(&progress));
    }
    Ok(())
}

fn print_item(view: &ItemView<'_>) {
    let id = view
        .item
        .id
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    println!(
        "{} {}",
        format!("Item {}/{}", view.position, view.total).cyan().bold(),
        format!("[id {id} · key {}]", view.key).dimmed()
    );
    println!();
    println!("{}", view.item.content);
    if let Some(t) = &view.item.transcription {
        println!();
        println!("{} {t}", "Transcription:".bold());
    }
    println!();
    println!("{} {}", "Rating:".bold(), describe_rating(view.rating));
    if view.needs_subcategory && view.form.subcategory.is_none() {
        println!("  {}", "subcategory required for this category".yellow());
    }
}

fn describe_rating(record: Option<&RatingRecord>) -> String {
    let Some(r) = record else {
        return "not rated".dimmed().to_string();
    };
    if r.too_short {
        return "too short to code".to_string();
    }

    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let mut parts = vec![
        format!("category {}", field(&r.category)),
        format!("valence {}", field(&r.valence)),
    ];
    if let Some(sub) = &r.subcategory {
        parts.push(format!("subcategory {sub}"));
    }
    for (on, name) in [
        (r.flagged, "flagged"),
        (r.promotional, "promotional"),
        (r.engagement, "engagement"),
    ] {
        if on {
            parts.push(name.to_string());
        }
    }
    parts.join(" · ")
}
