//! Conversions between the plain and HTML alternatives.

/// Escapes `&`, `<`, `>`, `"` and `'` for inclusion in HTML.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 10);
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Wraps plain text in a `<pre>` block.
#[must_use]
pub fn text_to_html(text: &str) -> String {
    format!("<pre>{}</pre>", escape(text))
}

/// Derives readable text from HTML.
///
/// Every complete tag is replaced by a space, then whitespace runs collapse to
/// a single space and the result is trimmed. A `<` with no closing `>` is
/// kept as text.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let mut stripped = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) if end > 0 => {
                stripped.push_str(&rest[..start]);
                stripped.push(' ');
                rest = &after[end + 1..];
            }
            _ => {
                stripped.push_str(&rest[..=start]);
                rest = after;
            }
        }
    }
    stripped.push_str(rest);

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
