//! Shared rendering helpers for the server-rendered pages.

/// Minimal HTML document shell shared by every page.
pub fn html_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} - Lumen</title>
    <link rel="stylesheet" href="/assets/app.css">
</head>
<body>
    <header>
        <a href="/">Lumen</a>
    </header>
    <main>
{content}
    </main>
</body>
</html>"#
    )
}

/// Escape text interpolated into HTML. Backend-reported values go through
/// this before rendering.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_wraps_content_with_title() {
        let document = html_shell("Services", "<p>body</p>");
        assert!(document.contains("<title>Services - Lumen</title>"));
        assert!(document.contains("<p>body</p>"));
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }
}
