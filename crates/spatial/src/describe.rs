//! Natural-language rendering of a single detection

use crate::distance::format_distance;
use crate::geometry::PositionTag;

/// Indefinite article for a label, chosen by its first letter
pub fn article_for(label: &str) -> &'static str {
    match label.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// Describe one detection, e.g. "a person at top left, approximately 3.4m away".
///
/// `confidence` is part of the interface but does not affect the text.
pub fn generate_description(
    label: &str,
    position: PositionTag,
    distance: f64,
    _confidence: f32,
) -> String {
    format!(
        "{} {} at {}, approximately {} away",
        article_for(label),
        label,
        position,
        format_distance(distance)
    )
}
