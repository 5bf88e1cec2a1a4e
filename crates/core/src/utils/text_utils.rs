/// Builds a URL-safe slug from free text.
///
/// Lower-cases the input, turns whitespace and underscores into `-`, drops
/// anything that is neither alphanumeric nor `-`, and collapses repeated
/// dashes. Non-ASCII letters are kept so that localized names still yield a
/// usable slug.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;

    for c in input.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if (c.is_whitespace() || c == '-' || c == '_') && !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Normalizes a `#RRGGBB` color token.
///
/// Accepts the token with or without the leading `#` and returns it with the
/// `#`. Returns `None` for anything that is not exactly six hex digits.
pub fn normalize_hex_color(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", digits))
    } else {
        None
    }
}

/// Case-insensitive key used for name uniqueness checks.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
