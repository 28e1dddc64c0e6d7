/// Turn free text into a URL slug.
///
/// Lowercases the input, turns every whitespace run into a single `-` and drops
/// anything outside `[a-z0-9-]`. Repeated hyphens collapse and leading or
/// trailing hyphens are trimmed, so the output always satisfies
/// [`is_valid_slug`] unless it is empty.
///
/// Applying it twice gives the same result as applying it once.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());

    for word in lowered.split_whitespace() {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.extend(
            word.chars()
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'),
        );
    }

    // "voice & audio" leaves "voice--audio" behind
    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('-').to_string()
}

/// Character-class check for stored slugs: one or more of `[a-z0-9-]`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// `validator` hook for DTO slug fields.
pub fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("invalid_slug");
        err.message = Some("Slug may only contain lowercase letters, numbers and hyphens".into());
        Err(err)
    }
}

/// `validator` hook for slug fields where an empty value means "derive it
/// from the name".
pub fn validate_slug_or_empty(slug: &str) -> Result<(), validator::ValidationError> {
    if slug.is_empty() {
        return Ok(());
    }
    validate_slug(slug)
}

/// A slug built by [`slugify`] is empty when the name has no ASCII letters or
/// digits; such a name cannot be stored.
pub fn validate_derived_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if slug.is_empty() {
        let mut err = validator::ValidationError::new("empty_slug");
        err.message = Some("Name must contain letters or digits to build a slug".into());
        return Err(err);
    }
    Ok(())
}
