//! Category label and slug table.
//!
//! Labels are the human-facing names stored on articles. Slugs are the URL
//! form used by `/category/<slug>`. Older builds of the site used a different
//! label set and slug set; both are still accepted as input and mapped onto
//! the current generation.

pub const HOME_CATEGORY_LABELS: [&str; 2] = ["All", "Discover"];

pub const CATEGORY_LABELS: [&str; 5] = [
    "Climate & Energy Systems",
    "Biodiversity & Oceans",
    "Policy, Governance & Finance",
    "Science & Technology",
    "Health & Society",
];

const LEGACY_LABEL_ALIASES: [(&str, &str); 14] = [
    ("Climate", "Climate & Energy Systems"),
    ("Energy", "Climate & Energy Systems"),
    ("Climate & Energy", "Climate & Energy Systems"),
    ("Biodiversity", "Biodiversity & Oceans"),
    ("Oceans", "Biodiversity & Oceans"),
    ("Ecology & Biodiversity", "Biodiversity & Oceans"),
    ("Policy", "Policy, Governance & Finance"),
    ("Economics", "Policy, Governance & Finance"),
    ("Policy & Economics", "Policy, Governance & Finance"),
    ("Science", "Science & Technology"),
    ("Technology", "Science & Technology"),
    ("Science & Innovation", "Science & Technology"),
    ("Health", "Health & Society"),
    ("Society", "Health & Society"),
];

const LEGACY_SLUG_ALIASES: [(&str, &str); 6] = [
    ("policy-and-economics", "Policy, Governance & Finance"),
    ("policy-and-governance", "Policy, Governance & Finance"),
    ("climate-and-energy", "Climate & Energy Systems"),
    ("ecology-and-biodiversity", "Biodiversity & Oceans"),
    ("science-and-innovation", "Science & Technology"),
    ("health-and-environment", "Health & Society"),
];

/// Lowercase, `&` spelled `and`, punctuation dropped, words joined by `-`.
pub fn slugify(raw: &str) -> String {
    raw.replace('&', " and ")
        .to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn category_to_slug(label: &str) -> String {
    slugify(label)
}

/// Maps a URL slug to its current-generation label, honoring legacy slugs.
pub fn slug_to_category(slug: &str) -> Option<&'static str> {
    let normalized = slug.trim().trim_matches('/').to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    CATEGORY_LABELS
        .iter()
        .copied()
        .find(|label| category_to_slug(label) == normalized)
        .or_else(|| {
            LEGACY_SLUG_ALIASES
                .iter()
                .find(|(alias, _)| *alias == normalized)
                .map(|(_, label)| *label)
        })
}

/// Resolves any accepted spelling (current label, legacy label, slug) to the
/// current-generation label.
pub fn canonical_category(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(label) = CATEGORY_LABELS
        .iter()
        .copied()
        .find(|label| label.eq_ignore_ascii_case(trimmed))
    {
        return Some(label);
    }
    if let Some((_, label)) = LEGACY_LABEL_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
    {
        return Some(label);
    }
    slug_to_category(trimmed).or_else(|| slug_to_category(&slugify(trimmed)))
}

pub fn is_home_category(label: &str) -> bool {
    let trimmed = label.trim();
    HOME_CATEGORY_LABELS
        .iter()
        .any(|home| home.eq_ignore_ascii_case(trimmed))
}

/// Legacy label and slug aliases, for diagnostics.
pub fn legacy_aliases() -> impl Iterator<Item = (&'static str, &'static str)> {
    LEGACY_LABEL_ALIASES
        .iter()
        .chain(LEGACY_SLUG_ALIASES.iter())
        .copied()
}
