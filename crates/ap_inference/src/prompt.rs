use ap_core::placeholder::{placeholder_token, strip_tags};
use ap_core::FeedEntry;

/// Characters of original text handed to the model.
pub const SNIPPET_CHARS: usize = 1500;

/// Truncate to at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub fn rewrite_prompt(entry: &FeedEntry) -> String {
    let text = strip_tags(entry.body_html());
    let snippet = truncate_chars(&text, SNIPPET_CHARS);
    format!(
        r#"You are a professional SEO copywriter for Medium.
Your task is to take an original recipe title and content, and write a full Medium-style article (around 600 words) optimized for SEO and engagement.

**Original Data:**
- Original Title: "{title}"
- Original Content Snippet: "{snippet}"
- Link to the full recipe: "{link}"

**Article Requirements:**
1. **Title:** Create a new engaging, SEO-friendly title.
2. **Article Body (HTML Format):** Write a 600-700 word article in clean HTML. It is crucial that you insert two image placeholders exactly as written below:
   - `{first}` after the intro.
   - `{second}` before a relevant section (like a listicle).
3. **Smart Closing:** End with a wrap-up, a CTA to the original link, and a question for readers.

**Output Format:**
Return ONLY a valid JSON object with the keys: "new_title", "new_html_content", "tags", and "alt_texts"."#,
        title = entry.title,
        snippet = snippet,
        link = entry.link,
        first = placeholder_token(1),
        second = placeholder_token(2),
    )
}
