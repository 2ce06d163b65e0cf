//! Seed the menu from a YAML file.
//!
//! The file holds a list of items under `items:`; each item has the same
//! fields as a row of the `items` table. Rows are matched by slug, so
//! re-running a seed updates nutrition values in place.
//!
//! ```yaml
//! items:
//!   - slug: cheeseburger
//!     name: Cheeseburger
//!     category: classic
//!     energy_kcal: 300
//!     fat_g: 12.0
//!     sat_fat_g: 6.0
//!     carbs_g: 33.0
//!     sugars_g: 7.0
//!     fiber_g: 2.0
//!     protein_g: 15.0
//!     salt_g: 1.5
//!     serving_label: 1 szt. (119 g)
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use mcd_calories_core::MenuItem;
use mcd_calories_web::db::{self, items::upsert_items};

use super::{CommandError, connect};

/// Parsed menu file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub items: Vec<MenuItem>,
}

/// Parse a menu file's contents.
///
/// Slugs are validated while parsing; everything else is left to
/// [`validate_items`].
///
/// # Errors
///
/// Returns the YAML error for malformed input or an invalid slug.
pub fn parse_seed(content: &str) -> Result<SeedFile, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Check items for problems the database would not catch.
///
/// Returns one message per problem; an empty list means the items are fine.
#[must_use]
pub fn validate_items(items: &[MenuItem]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        let at = format!("item {} ({})", index + 1, item.slug);

        if !seen.insert(item.slug.as_str()) {
            errors.push(format!("{at}: duplicate slug"));
        }
        if item.name.trim().is_empty() {
            errors.push(format!("{at}: name is empty"));
        }
        if item.category.trim().is_empty() {
            errors.push(format!("{at}: category is empty"));
        }
        if item.energy_kcal < 0 {
            errors.push(format!("{at}: energy_kcal is negative"));
        }

        let grams = [
            ("fat_g", item.fat_g),
            ("sat_fat_g", item.sat_fat_g),
            ("carbs_g", item.carbs_g),
            ("sugars_g", item.sugars_g),
            ("fiber_g", item.fiber_g),
            ("protein_g", item.protein_g),
            ("salt_g", item.salt_g),
        ];
        for (field, value) in grams {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{at}: {field} must be a non-negative number"));
            }
        }
    }

    errors
}

/// Seed the menu from `path`.
///
/// The whole file is parsed and validated before the database is opened.
/// With `dry_run` nothing is written.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails
/// validation, or the database write fails.
pub async fn run(path: &Path, dry_run: bool) -> Result<(), CommandError> {
    let display = path.display().to_string();
    info!(path = %path.display(), "Loading menu from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Read {
            path: display.clone(),
            source,
        })?;
    let seed = parse_seed(&content).map_err(|source| CommandError::Parse {
        path: display.clone(),
        source,
    })?;

    info!(items = seed.items.len(), "Parsed menu file");

    let errors = validate_items(&seed.items);
    if !errors.is_empty() {
        error!("Menu validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Validation(errors.len()));
    }

    if dry_run {
        info!("Dry run: menu file is valid, nothing written");
        return Ok(());
    }

    let pool = connect().await?;
    let mut conn = db::acquire(&pool).await?;
    db::ensure_schema(&mut conn).await?;

    let written = upsert_items(&mut conn, &seed.items).await?;

    info!("Seeding complete!");
    info!("  Items written: {written}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BUNDLED_MENU: &str = include_str!("../../seed/menu.yaml");

    fn yaml_item(slug: &str, name: &str, kcal: i64, salt: f64) -> String {
        format!(
            "  - slug: {slug}
    name: {name}
    category: classic
    energy_kcal: {kcal}
    fat_g: 12.0
    sat_fat_g: 6.0
    carbs_g: 33.0
    sugars_g: 7.0
    fiber_g: 2.0
    protein_g: 15.0
    salt_g: {salt}
    serving_label: 1 szt.
"
        )
    }

    #[test]
    fn test_bundled_menu_is_valid() {
        let seed = parse_seed(BUNDLED_MENU).unwrap();
        assert!(!seed.items.is_empty());
        assert_eq!(validate_items(&seed.items), Vec::<String>::new());
    }

    #[test]
    fn test_parse_seed_reads_items() {
        let yaml = format!("items:\n{}", yaml_item("cheeseburger", "Cheeseburger", 300, 1.5));
        let seed = parse_seed(&yaml).unwrap();

        let item = seed.items.first().unwrap();
        assert_eq!(item.slug.as_str(), "cheeseburger");
        assert_eq!(item.energy_kcal, 300);
        assert_eq!(item.serving_label, "1 szt.");
    }

    #[test]
    fn test_parse_seed_rejects_empty_slug() {
        let yaml = format!("items:\n{}", yaml_item("''", "Nameless", 100, 0.5));
        assert!(parse_seed(&yaml).is_err());
    }

    #[test]
    fn test_validate_reports_duplicates_and_negatives() {
        let yaml = format!(
            "items:\n{}{}",
            yaml_item("big-mac", "Big Mac", 503, 2.2),
            yaml_item("big-mac", "Big Mac again", -1, -0.5),
        );
        let seed = parse_seed(&yaml).unwrap();

        let errors = validate_items(&seed.items);

        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("duplicate slug")));
        assert!(errors.iter().any(|e| e.contains("energy_kcal is negative")));
        assert!(errors.iter().any(|e| e.contains("salt_g")));
        assert!(errors.iter().all(|e| e.starts_with("item 2 (big-mac)")));
    }

    #[test]
    fn test_validate_reports_blank_name() {
        let yaml = format!("items:\n{}", yaml_item("fries-m", "' '", 337, 0.6));
        let seed = parse_seed(&yaml).unwrap();

        let errors = validate_items(&seed.items);

        assert_eq!(errors, ["item 1 (fries-m): name is empty"]);
    }
}
