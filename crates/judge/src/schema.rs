use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest dish string the UI will render.
pub const MAX_DISH_LEN: usize = 80;
/// At most this many dishes survive cleaning.
pub const MAX_DISHES: usize = 5;

// Vague praise the model sometimes passes off as a dish name.
static BANNED_DISH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)awesome|great|nice|good food").unwrap());

/// The judge's response envelope. The wire shape drifted across model
/// versions (`recommendations` vs `place_analysis`), so both keys are
/// accepted into the same field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default, alias = "place_analysis")]
    pub recommendations: Vec<Annotation>,
}

/// Per-place subjective verdict. Factual echoes (address, rating, ...) are
/// kept only so the reconciler can backfill provider gaps; they are never
/// trusted over the search provider's record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_relevant: bool,
    #[serde(default, alias = "why_love")]
    pub match_reason: Option<String>,
    #[serde(default)]
    pub famous_dishes: Vec<String>,
    #[serde(default, alias = "Tip", alias = "secret_tip")]
    pub tip: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Drop bogus dish strings: vague praise, non-alphabetic junk, and anything
/// over the length cap. At most `MAX_DISHES` entries survive.
pub fn clean_dishes(dishes: &[String]) -> Vec<String> {
    dishes
        .iter()
        .map(|d| d.trim().to_string())
        .filter(|d| {
            !d.is_empty()
                && d.len() <= MAX_DISH_LEN
                && d.chars().any(|c| c.is_ascii_alphabetic())
                && !BANNED_DISH_RE.is_match(d)
        })
        .take(MAX_DISHES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn removes_vague_praise() {
        let dishes = strings(&["Butter Chicken", "food is awesome", "Great ambience", "Filter Coffee"]);
        assert_eq!(clean_dishes(&dishes), strings(&["Butter Chicken", "Filter Coffee"]));
    }

    #[test]
    fn enforces_length_and_alphabetic_rules() {
        let long = "x".repeat(81);
        let dishes = strings(&[&long, "123!!", "", "Momos"]);
        let cleaned = clean_dishes(&dishes);
        assert_eq!(cleaned, strings(&["Momos"]));
        for dish in &cleaned {
            assert!(dish.len() <= MAX_DISH_LEN);
            assert!(dish.chars().any(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn caps_at_five_entries() {
        let dishes = strings(&["a1", "b2", "c3", "d4", "e5", "f6", "g7"]);
        assert_eq!(clean_dishes(&dishes).len(), MAX_DISHES);
    }

    #[test]
    fn accepts_both_envelope_shapes() {
        let v1: AnalysisResponse = serde_json::from_str(
            r#"{"recommendations": [{"name": "A", "match_reason": "cozy"}]}"#,
        )
        .unwrap();
        assert_eq!(v1.recommendations.len(), 1);
        assert!(v1.recommendations[0].is_relevant);

        let v2: AnalysisResponse = serde_json::from_str(
            r#"{"place_analysis": [{"name": "B", "why_love": "lively", "is_relevant": false}]}"#,
        )
        .unwrap();
        assert_eq!(v2.recommendations.len(), 1);
        assert_eq!(v2.recommendations[0].match_reason.as_deref(), Some("lively"));
        assert!(!v2.recommendations[0].is_relevant);
    }

    #[test]
    fn accepts_tip_aliases() {
        let ann: Annotation =
            serde_json::from_str(r#"{"name": "A", "secret_tip": "ask for corner seat"}"#).unwrap();
        assert_eq!(ann.tip.as_deref(), Some("ask for corner seat"));
    }
}
