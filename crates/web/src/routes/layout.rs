//! Display data shared by every page layout.

use mcd_calories_core::CartSummary;

/// Format a gram amount with one decimal place.
#[must_use]
pub fn format_grams(value: f64) -> String {
    format!("{value:.1}")
}

/// Cart summary badge shown in the page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub count: u64,
    pub kcal: i64,
    pub protein: String,
}

impl From<CartSummary> for SummaryView {
    fn from(summary: CartSummary) -> Self {
        Self {
            count: summary.count,
            kcal: summary.kcal,
            protein: format_grams(summary.protein),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grams_rounds_to_one_decimal() {
        assert_eq!(format_grams(3.0), "3.0");
        assert_eq!(format_grams(12.34), "12.3");
        assert_eq!(format_grams(0.06), "0.1");
    }

    #[test]
    fn test_empty_summary_view() {
        let view = SummaryView::from(CartSummary::default());
        assert_eq!(view.count, 0);
        assert_eq!(view.kcal, 0);
        assert_eq!(view.protein, "0.0");
    }
}
