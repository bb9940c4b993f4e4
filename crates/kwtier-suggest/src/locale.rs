/// Splits a locale tag such as `pt-PT` or `en_US` into language and region.
///
/// Only the first separator counts; anything after the region is kept with it.
/// A tag without a separator has no region.
#[must_use]
pub fn split_locale(tag: &str) -> (&str, Option<&str>) {
    let tag = tag.trim();
    match tag.split_once(['-', '_']) {
        Some((lang, region)) if !region.is_empty() => (lang, Some(region)),
        Some((lang, _)) => (lang, None),
        None => (tag, None),
    }
}
