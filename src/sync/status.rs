//! Sync status display.
//!
//! Recomputes every checksum of an imported model and reports, per
//! component kind, which components would need a new version row on
//! export.

use colored::Colorize;

use crate::error::Result;
use crate::model::{Handle, Kind, Model};
use crate::sync::hash::has_changed;
use crate::sync::types::{ComponentStatus, StatusCounts, SyncStatus};

/// Status of one component, from its current checksum and the checksum
/// recorded when it was imported. A component without a recorded
/// baseline is compared with its stored checksum.
///
/// The current checksum must be up to date (see `Model::count_object`).
///
/// # Errors
///
/// Returns an error if the handle is not in the model.
pub fn component_status(model: &Model, handle: Handle) -> Result<ComponentStatus> {
    let version = &model.component(handle)?.version;
    if version.is_new() {
        return Ok(ComponentStatus::New);
    }
    let current = version.current.checksum.as_deref().unwrap_or_default();
    let reference = version.baseline.as_deref().or(version.initial.checksum.as_deref());
    if has_changed(current, reference) {
        Ok(ComponentStatus::Updated)
    } else {
        Ok(ComponentStatus::Unchanged)
    }
}

/// Recount the model with checksums and tally component statuses.
///
/// # Errors
///
/// Returns an error if a checksum cannot be computed.
pub fn sync_status(model: &mut Model) -> Result<SyncStatus> {
    model.count_all_objects()?;

    let mut status = SyncStatus {
        model_id: model.id.clone(),
        model_version: model.initial_version.version,
        latest_database_version: model.latest_database_version.version,
        ..SyncStatus::default()
    };
    for kind in Kind::ALL {
        let handles: Vec<Handle> = model.registry().all(kind).values().copied().collect();
        let counts = counts_for(&mut status, kind);
        for handle in handles {
            counts.record(component_status(model, handle)?);
        }
    }
    Ok(status)
}

fn counts_for(status: &mut SyncStatus, kind: Kind) -> &mut StatusCounts {
    match kind {
        Kind::Folder => &mut status.folders,
        Kind::Element => &mut status.elements,
        Kind::Relationship => &mut status.relationships,
        Kind::View => &mut status.views,
        Kind::ViewObject => &mut status.view_objects,
        Kind::ViewConnection => &mut status.view_connections,
    }
}

/// Print sync status to stdout in a human-readable format.
pub fn print_status(status: &SyncStatus) {
    println!("{}", "Sync Status".bold().underline());
    println!();
    println!(
        "  Model:   {} (version {}, latest in store {})",
        status.model_id, status.model_version, status.latest_database_version
    );
    println!();

    let header = format!("  {:<18} {:>6} {:>8} {:>10}", "", "new", "updated", "unchanged");
    println!("{}", header.bold());
    for (label, counts) in [
        ("Folders", &status.folders),
        ("Elements", &status.elements),
        ("Relationships", &status.relationships),
        ("Views", &status.views),
        ("View objects", &status.view_objects),
        ("View connections", &status.view_connections),
    ] {
        if counts.total() == 0 {
            continue;
        }
        println!(
            "  {label:<18} {:>6} {:>8} {:>10}",
            counts.new, counts.updated, counts.unchanged
        );
    }
    println!();

    if status.is_clean() {
        println!("{}", "In sync with the store.".green());
    } else {
        println!(
            "{}",
            format!("{} components would be exported.", status.pending()).yellow()
        );
    }
    if status.model_version < status.latest_database_version {
        println!(
            "{}",
            "A newer version of this model is in the store.".dimmed()
        );
    }
}
