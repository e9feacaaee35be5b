//! Form input validation and normalization.
//!
//! Category codes and valences are closed sets. Input goes through the
//! usual three tiers: exact match → synonym lookup → error with the
//! closest valid value as a suggestion.

/// One entry of the category code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDef {
    pub code: &'static str,
    pub needs_subcategory: bool,
}

/// The category code table. Order is display order.
pub const CATEGORIES: &[CategoryDef] = &[
    CategoryDef { code: "1", needs_subcategory: false },
    CategoryDef { code: "2", needs_subcategory: true },
    CategoryDef { code: "3", needs_subcategory: true },
    CategoryDef { code: "4", needs_subcategory: false },
];

pub const VALID_VALENCES: &[&str] = &["pos", "neg", "neu", "mixed"];

/// Valence synonyms and their canonical value. Ties in suggestions go to
/// the earlier entry.
pub const VALENCE_SYNONYMS: &[(&str, &str)] = &[
    ("positive", "pos"),
    ("+", "pos"),
    ("good", "pos"),
    ("negative", "neg"),
    ("-", "neg"),
    ("bad", "neg"),
    ("neutral", "neu"),
    ("0", "neu"),
    ("both", "mixed"),
    ("mix", "mixed"),
    ("ambivalent", "mixed"),
];

/// Whether a category code requires a subcategory before an item counts
/// as complete. Unknown codes never do.
#[must_use]
pub fn requires_subcategory(category: &str) -> bool {
    CATEGORIES
        .iter()
        .any(|c| c.code == category && c.needs_subcategory)
}

/// Normalize a category code.
///
/// Accepts the bare code or a `c`/`cat` prefixed form (`c2`, `cat2`).
pub fn normalize_category(input: &str) -> Result<String, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();
    let bare = lower
        .strip_prefix("cat")
        .or_else(|| lower.strip_prefix('c'))
        .unwrap_or(&lower);

    if CATEGORIES.iter().any(|c| c.code == bare) {
        return Ok(bare.to_string());
    }

    let codes: Vec<&str> = CATEGORIES.iter().map(|c| c.code).collect();
    Err((
        input.to_string(),
        Some(format!("Use one of: {}", codes.join(", "))),
    ))
}

/// Normalize a valence via exact match or synonym lookup.
pub fn normalize_valence(input: &str) -> Result<String, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();

    if VALID_VALENCES.contains(&lower.as_str()) {
        return Ok(lower);
    }

    if let Some(&(_, canonical)) = VALENCE_SYNONYMS.iter().find(|(s, _)| *s == lower) {
        return Ok(canonical.to_string());
    }

    let suggestion = find_closest_match(&lower, VALID_VALENCES, VALENCE_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(input: &str, valid: &[&str], synonyms: &[(&str, &str)]) -> Option<String> {
    let candidates = valid
        .iter()
        .map(|&v| (v, v))
        .chain(synonyms.iter().copied());

    let mut best: Option<(&str, usize)> = None;
    for (written, shown) in candidates {
        let dist = levenshtein_distance(input, written);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            best = Some((shown, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Use single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}
