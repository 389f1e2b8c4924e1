//! URL slugs derived from display names.

/// Lower-case `value`, keeping ASCII letters and digits and collapsing every
/// other run of characters into a single hyphen.
///
/// # Examples
/// ```
/// use devcamper::domain::slug::slugify;
///
/// assert_eq!(slugify("Devworks Bootcamp!"), "devworks-bootcamp");
/// ```
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Return `true` when `value` is a valid slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
