//! Export of the labeled catalog into a training-ready directory tree.
//!
//! The export always reflects the last saved session document, never the
//! in-memory state: the settings file is re-read from disk at the start of
//! every run. The output tree is destroyed and rebuilt from scratch, so
//! repeated runs over an unchanged document produce identical trees.

use crate::config;
use crate::error::Result;
use crate::state::SessionState;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;

/// Outcome of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No settings file has been saved yet; nothing was touched.
    SkippedNoSettings,
    /// The tree was rebuilt; `copied` files were written.
    Completed { copied: usize },
}

/// The partition of the catalog computed for one export run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    /// Catalog files absent from every category list, in catalog order.
    pub not_categorized: Vec<String>,
    /// How many of `not_categorized` are copied (the balancing cap).
    pub not_categorized_take: usize,
    /// Per-category file lists, exclusion category dropped and its members
    /// filtered out of the remaining categories.
    pub categories: Vec<(String, Vec<String>)>,
    /// Progress denominator: twice the smaller class size.
    pub total_to_copy: usize,
}

/// Partition the catalog against a saved categorization.
///
/// `categorizedCount` is the flattened size of all category lists (duplicates
/// counted) minus the size of the exclusion list. The balancing cap
/// `min(categorizedCount, len(notCategorized))` limits the uncategorized
/// side only; category folders always receive their full membership.
pub fn plan_export(
    catalog: &[String],
    categorised: &BTreeMap<String, Vec<String>>,
) -> ExportPlan {
    let flattened: Vec<&String> = categorised.values().flatten().collect();
    let members: HashSet<&str> = flattened.iter().map(|f| f.as_str()).collect();

    let excluded: HashSet<&str> = categorised
        .get(config::EXCLUDE_CATEGORY)
        .map(|files| files.iter().map(|f| f.as_str()).collect())
        .unwrap_or_default();
    let exclude_count = categorised
        .get(config::EXCLUDE_CATEGORY)
        .map_or(0, |files| files.len());

    let categorized_count = flattened.len().saturating_sub(exclude_count);

    let not_categorized: Vec<String> = catalog
        .iter()
        .filter(|file| !members.contains(file.as_str()))
        .cloned()
        .collect();

    let not_categorized_take = categorized_count.min(not_categorized.len());

    // Files on the exclusion list never reach the output, even when they are
    // also labeled with another category.
    let categories: Vec<(String, Vec<String>)> = categorised
        .iter()
        .filter(|(category, _)| category.as_str() != config::EXCLUDE_CATEGORY)
        .map(|(category, files)| {
            let kept: Vec<String> = files
                .iter()
                .filter(|file| !excluded.contains(file.as_str()))
                .cloned()
                .collect();
            (category.clone(), kept)
        })
        .collect();

    ExportPlan {
        not_categorized,
        not_categorized_take,
        categories,
        total_to_copy: 2 * not_categorized_take,
    }
}

/// Run a full export of `catalog` from `images_dir` into `export_dir`.
///
/// Copies run strictly one at a time; `progress` is invoked with the
/// cumulative copied count and the planned total after each copy. Any copy
/// or directory failure aborts the run mid-sequence with no rollback, so a
/// failed export can leave a half-populated tree.
pub async fn run_export(
    images_dir: &Path,
    export_dir: &Path,
    catalog: &[String],
    mut progress: impl FnMut(usize, usize),
) -> Result<ExportOutcome> {
    let settings_path = config::settings_path(images_dir);
    let contents = match tokio::fs::read_to_string(&settings_path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("no settings file at {}, skipping export", settings_path.display());
            return Ok(ExportOutcome::SkippedNoSettings);
        }
        Err(err) => return Err(err.into()),
    };
    let state = SessionState::from_json(&contents)?;

    let plan = plan_export(catalog, &state.categorised);

    // Rebuild the output tree from scratch.
    match tokio::fs::remove_dir_all(export_dir).await {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    tokio::fs::create_dir_all(export_dir).await?;

    let mut copied = 0;

    let not_categorized_dir = export_dir.join(config::NOT_CATEGORIZED_DIR);
    tokio::fs::create_dir(&not_categorized_dir).await?;
    for file in &plan.not_categorized[..plan.not_categorized_take] {
        tokio::fs::copy(images_dir.join(file), not_categorized_dir.join(file)).await?;
        copied += 1;
        progress(copied, plan.total_to_copy);
    }

    for (category, files) in &plan.categories {
        let category_dir = export_dir.join(category);
        tokio::fs::create_dir(&category_dir).await?;
        for file in files {
            tokio::fs::copy(images_dir.join(file), category_dir.join(file)).await?;
            copied += 1;
            progress(copied, plan.total_to_copy);
        }
    }

    log::info!("export finished: {} files copied to {}", copied, export_dir.display());

    Ok(ExportOutcome::Completed { copied })
}
