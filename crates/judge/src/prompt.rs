use serde_json::json;

use enrich::EnrichedPlace;

/// How much scraped text per candidate goes to the model.
pub const PROMPT_TEXT_BUDGET: usize = 4_000;

pub fn build_analysis_prompt(candidates: &[EnrichedPlace], user_mood: &str) -> String {
    let input_data: Vec<_> = candidates
        .iter()
        .map(|c| {
            let text = if c.scraped_content.is_empty() {
                "No reviews available.".to_string()
            } else {
                c.scraped_content.chars().take(PROMPT_TEXT_BUDGET).collect()
            };
            json!({
                "name": c.place.title,
                "rating": c.place.rating,
                "text": text,
            })
        })
        .collect();

    format!(
        r#"ROLE: Friendly foodie guide who vets places.
USER QUERY: "{user_mood}"

FOR EACH PLACE: Judge whether it fits the query, give helpful positives
(why you'll love it) and move negatives into a separate "note".

STRICT RULES:
- POSITIVE ONLY in match_reason: taste, signature dishes, ambience perks,
  service wins. No negatives here.
- NEGATIVES go to note: only if there are explicit complaints (slow service,
  stale food, overpriced, hygiene). Keep concise. Omit otherwise.
- FAMOUS_DISHES must be concrete dish names from the text (e.g. "butter
  chicken", "filter coffee"). Ignore vague praise like "food is awesome" or
  "good ambience". If no real dishes, return an empty list.
- QUERY FIT: set is_relevant false only when the place clearly does not
  match the query.
- Cover EVERY place in the input. Do not rank, do not drop any.

INPUT DATA (scraped snippets):
{input}

OUTPUT JSON ONLY:
{{
  "recommendations": [
    {{
      "name": "Exact Name",
      "is_relevant": true,
      "match_reason": "Positive reasons to love it (no negatives).",
      "famous_dishes": ["Dish 1", "Dish 2"],
      "tip": "Practical tip to enjoy the visit (optional)",
      "note": "Only explicit negatives if present; else omit"
    }}
  ]
}}"#,
        input = serde_json::to_string(&input_data).unwrap_or_default(),
    )
}

pub fn build_fallback_query_prompt(original_query: &str, location: &str) -> String {
    format!(
        r#"CONTEXT: User searched for "{original_query}" in "{location}" but found 0 results.

TASK:
1. Identify the broad category (e.g. "Fruit Ice Cream" -> "Ice Cream Shop").
2. Return a search query for that CATEGORY inside "{location}".

CRITICAL: the output MUST include "{location}" in the string.
RETURN ONLY THE SEARCH STRING. No JSON, no quotes."#
    )
}
