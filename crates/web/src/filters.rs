//! Custom Askama template filters.

use std::fmt::Display;

/// Display labels for the known menu categories.
const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("beverages", "🥤 Napoje"),
    ("breakfest", "🍳 Śniadania"),
    ("classic", "🍔 Klasyki"),
    ("desserts", "🍨 Desery"),
    ("fries", "🍟 Frytki"),
    ("limited", "⭐ Specjały"),
    ("salads", "🥗 Sałatki"),
    ("sauces", "🧂 Sosy"),
];

/// Look up the display label for a category, falling back to the raw name.
#[must_use]
pub fn label_for(category: &str) -> &str {
    CATEGORY_LABELS
        .iter()
        .find(|(key, _)| *key == category)
        .map_or(category, |(_, label)| label)
}

/// Returns the display label for a category name.
///
/// Usage in templates: `{{ category|category_label }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn category_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let category = value.to_string();
    Ok(label_for(&category).to_string())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories_have_labels() {
        assert_eq!(label_for("classic"), "🍔 Klasyki");
        assert_eq!(label_for("breakfest"), "🍳 Śniadania");
        assert_eq!(label_for("sauces"), "🧂 Sosy");
    }

    #[test]
    fn test_unknown_category_shows_raw_name() {
        assert_eq!(label_for("seasonal"), "seasonal");
        assert_eq!(label_for(""), "");
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert_eq!(label_for("Classic"), "Classic");
    }
}
