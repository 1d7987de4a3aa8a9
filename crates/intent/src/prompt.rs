pub fn build_refine_prompt(raw_query: &str, location_hint: &str) -> String {
    format!(
        r#"ACT AS: A Google Maps search expert for a food discovery app.

USER INPUT: "{raw_query}"
USER LOCATION CONTEXT: "{location_hint}"

TASK: Decide whether the input is about food or drink, and if so convert it
into the best possible Google Maps search query.

RULES:
1. FOOD GATE: If the input is about anything other than something edible or
   drinkable (clothes, electronics, services, etc.), set "is_food" to false
   and explain briefly in "rejection_message". Do not invent a search query.
2. SPELLING: Fix obvious misspellings and plurals (e.g. "Piza" -> "Pizza").
   If you corrected the main subject, set "was_corrected" to true and put the
   corrected word in "corrected_term".
3. CONTEXTUALIZE "LOCAL": If the user asks for "local food", "regional
   cuisine" or a "famous dish", replace it with the cuisine native to
   "{location_hint}" when you know it; otherwise keep the user's wording.
4. KEEP IT SHORT: "search_query" must be 2-4 keywords, no filler words like
   "vibes", "somewhere" or "find me", and no negations. It is matched
   literally by a places search engine, not read as natural language.
5. LOCATION: Echo "{location_hint}" in "location_string" unless the user
   explicitly typed a different location in their input, in which case use
   that one.

OUTPUT JSON ONLY:
{{
  "is_food": true,
  "search_query": "Cheap Italian Food",
  "location_string": "{location_hint}",
  "was_corrected": false,
  "corrected_term": null,
  "rejection_message": null
}}"#
    )
}
