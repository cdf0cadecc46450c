use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};

/// A generated snack idea plus an illustration for the card.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSnack {
    pub snack: String,
    pub image_url: String,
}

/// Source of snack ideas honoring a set of excluded ingredients.
///
/// This is the seam where a hosted model client would plug in; the service
/// only requires that whatever comes back avoids the given ingredients.
pub trait SnackGenerator: Send + Sync {
    fn generate(&self, exclusions: &[String]) -> Result<GeneratedSnack>;
}

/// Kid snacks the built-in generator can propose, with the ingredients that
/// rule each one out.
const CATALOG: &[(&str, &[&str])] = &[
    ("Apple slices with peanut butter", &["apple", "peanut"]),
    ("Banana and honey toast", &["banana", "honey", "wheat", "bread"]),
    ("Carrot sticks with hummus", &["carrot", "chickpea", "sesame"]),
    ("Cheese cubes and crackers", &["cheese", "dairy", "wheat"]),
    ("Yogurt with berries", &["yogurt", "dairy", "strawberry", "blueberry"]),
    ("Celery boats with cream cheese", &["celery", "cheese", "dairy"]),
    ("Trail mix with raisins", &["peanut", "almond", "nut", "raisin"]),
    ("Rice cakes with avocado", &["rice", "avocado"]),
    ("Frozen grape skewers", &["grape"]),
    ("Cucumber sandwiches", &["cucumber", "bread", "wheat", "butter"]),
    ("Hard-boiled egg halves", &["egg"]),
    ("Orange smiles", &["orange"]),
    ("Popcorn with a pinch of salt", &["corn", "butter"]),
    ("Oatmeal cookies", &["oat", "wheat", "egg", "butter", "sugar"]),
    ("Fruit smoothie pops", &["banana", "strawberry", "yogurt", "dairy"]),
    ("Pretzel sticks with mustard dip", &["wheat", "mustard"]),
];

/// Deterministic, catalog-backed [`SnackGenerator`].
///
/// Filters the catalog down to snacks whose ingredients avoid every
/// exclusion, then rotates through the survivors on the wall clock so
/// repeated requests vary.
pub struct PantrySuggester;

impl PantrySuggester {
    fn candidates(exclusions: &[String]) -> Vec<&'static (&'static str, &'static [&'static str])> {
        CATALOG
            .iter()
            .filter(|(_, ingredients)| {
                !ingredients
                    .iter()
                    .any(|ingredient| exclusions.iter().any(|term| matches(ingredient, term)))
            })
            .collect()
    }
}

impl SnackGenerator for PantrySuggester {
    fn generate(&self, exclusions: &[String]) -> Result<GeneratedSnack> {
        let candidates = Self::candidates(exclusions);
        if candidates.is_empty() {
            bail!("every snack in the catalog conflicts with the exclusions");
        }

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let (name, _) = *candidates[(millis % candidates.len() as u64) as usize];

        Ok(GeneratedSnack {
            snack: name.to_string(),
            image_url: image_url_for(name),
        })
    }
}

/// Case-insensitive ingredient match. "Nut" excludes "peanuts" and an
/// exclusion of "peanuts" rules out snacks listing "peanut".
fn matches(ingredient: &str, exclusion: &str) -> bool {
    let ingredient = ingredient.to_lowercase();
    let exclusion = exclusion.to_lowercase();
    ingredient.contains(&exclusion) || exclusion.contains(&ingredient)
}

/// Placeholder illustration path derived from the snack name.
fn image_url_for(snack: &str) -> String {
    let slug: String = snack
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("/images/snacks/{}.png", slug.trim_matches('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn generates_a_snack_with_no_exclusions() {
        let snack = PantrySuggester.generate(&[]).unwrap();
        assert!(!snack.snack.is_empty());
        assert!(snack.image_url.starts_with("/images/snacks/"));
        assert!(snack.image_url.ends_with(".png"));
    }

    #[test]
    fn honors_exclusions() {
        let exclusions = terms(&["dairy", "peanut"]);
        for _ in 0..32 {
            let snack = PantrySuggester.generate(&exclusions).unwrap();
            let lowered = snack.snack.to_lowercase();
            assert!(!lowered.contains("cheese"), "got {}", snack.snack);
            assert!(!lowered.contains("peanut"), "got {}", snack.snack);
            assert!(!lowered.contains("yogurt"), "got {}", snack.snack);
        }
    }

    #[test]
    fn exclusion_matching_is_case_insensitive_and_partial() {
        assert!(matches("peanut", "Nut"));
        assert!(matches("peanut", "peanuts"));
        assert!(matches("Dairy", "dairy"));
        assert!(!matches("apple", "banana"));
    }

    #[test]
    fn exhausted_catalog_is_an_error() {
        // Every catalog entry lists at least one of these somewhere.
        let everything: Vec<String> = CATALOG
            .iter()
            .flat_map(|(_, ingredients)| ingredients.iter().map(|s| s.to_string()))
            .collect();
        let result = PantrySuggester.generate(&everything);
        assert!(result.is_err());
    }

    #[test]
    fn image_url_slugs_are_clean() {
        assert_eq!(
            image_url_for("Apple slices with peanut butter"),
            "/images/snacks/apple-slices-with-peanut-butter.png"
        );
        assert_eq!(image_url_for("Orange smiles"), "/images/snacks/orange-smiles.png");
    }
}
