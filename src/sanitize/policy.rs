use std::collections::{HashMap, HashSet};

use ammonia::Builder as AmmoniaBuilder;

/// Tags that survive sanitization; anything else is unwrapped.
pub const ALLOWED_TAGS: [&str; 14] = [
    "p", "h1", "h2", "h3", "h4", "ol", "ul", "li", "strong", "em", "u", "span", "div", "a",
];

/// Attributes kept on every allowed tag.
pub const ALLOWED_ATTRIBUTES: [&str; 3] = ["class", "href", "target"];

pub(crate) fn build_copy_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    builder.tags(HashSet::from(ALLOWED_TAGS));
    builder.generic_attributes(HashSet::from(ALLOWED_ATTRIBUTES));
    builder.tag_attributes(HashMap::new());
    builder.link_rel(None);

    builder
}

#[cfg(test)]
mod tests {
    use super::build_copy_sanitizer;

    #[test]
    fn keeps_allowed_attributes_on_any_tag() {
        let sanitizer = build_copy_sanitizer();
        let html = sanitizer
            .clean("<span class=\"lead\" id=\"x\" style=\"color: red\">Hi</span>")
            .to_string();

        assert_eq!(html, "<span class=\"lead\">Hi</span>");
    }

    #[test]
    fn does_not_inject_link_rel() {
        let sanitizer = build_copy_sanitizer();
        let html = sanitizer
            .clean("<a href=\"/pricing\" target=\"_blank\">Pricing</a>")
            .to_string();

        assert_eq!(html, "<a href=\"/pricing\" target=\"_blank\">Pricing</a>");
    }

    #[test]
    fn drops_script_urls() {
        let sanitizer = build_copy_sanitizer();
        let html = sanitizer
            .clean("<a href=\"javascript:alert(1)\">x</a>")
            .to_string();

        assert_eq!(html, "<a>x</a>");
    }
}
