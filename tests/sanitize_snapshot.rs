use insta::assert_snapshot;
use pagecopy::application::copy::PageCopy;
use pagecopy::cache::PageContent;
use pagecopy::sanitize::sanitize;

#[test]
fn encoded_markup_is_restored_before_filtering() {
    assert_snapshot!(
        sanitize(Some("&lt;strong&gt;Bold&lt;/strong&gt; move")),
        @"<strong>Bold</strong> move"
    );
    assert_snapshot!(sanitize(Some("&quot;quoted&quot;")), @r#""quoted""#);
    assert_snapshot!(sanitize(Some("Fish &amp;amp; chips")), @"Fish &amp; chips");
    assert_snapshot!(sanitize(Some("Price:&nbsp;5")), @"Price:&nbsp;5");
}

#[test]
fn allowed_structure_survives() {
    assert_snapshot!(
        sanitize(Some("<ul><li>One</li><li>Two</li></ul>")),
        @"<ul><li>One</li><li>Two</li></ul>"
    );
    assert_snapshot!(
        sanitize(Some(r#"<div><span class="badge">New</span></div>"#)),
        @r#"<div><span class="badge">New</span></div>"#
    );
}

#[test]
fn hostile_markup_is_neutralized() {
    assert_snapshot!(
        sanitize(Some(r#"<p class="lead" onclick="steal()">Welcome</p>"#)),
        @r#"<p class="lead">Welcome</p>"#
    );
    assert_snapshot!(sanitize(Some("<img src=x onerror=alert(1)>Caption")), @"Caption");
    assert_snapshot!(sanitize(Some("<style>p{}</style><p>Body</p>")), @"<p>Body</p>");
    assert_snapshot!(
        sanitize(Some(r#"<a href="javascript:alert(1)">x</a>"#)),
        @"<a>x</a>"
    );
    assert_snapshot!(
        sanitize(Some(
            r#"<a href="https://example.com" target="_blank" rel="noopener">Docs</a>"#
        )),
        @r#"<a href="https://example.com" target="_blank">Docs</a>"#
    );
}

#[test]
fn page_copy_renders_sanitized_sections() {
    let copy = PageCopy::new(PageContent::from([(
        "body".to_string(),
        "&lt;h2&gt;Tools&lt;/h2&gt;&lt;script&gt;x()&lt;/script&gt;".to_string(),
    )]));

    assert_snapshot!(copy.rich("body", ""), @"<h2>Tools</h2>");
    assert_snapshot!(copy.rich("footer", "<em>Free</em> forever"), @"<em>Free</em> forever");
}
