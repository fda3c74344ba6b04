use std::borrow::Cow;

/// Entities undone before parsing, in application order.
///
/// `&amp;` comes first so a double-encoded `&amp;lt;` collapses to `<`.
const ENTITY_TABLE: [(&str, &str); 6] = [
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", "\u{a0}"),
];

/// Reverse the fixed entity table on a stored rich-text value.
pub(crate) fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut decoded = raw.to_string();
    for (entity, literal) in ENTITY_TABLE {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, literal);
        }
    }
    Cow::Owned(decoded)
}
