//! Shared HTML page shell

use v_htmlescape::escape;

pub const INDEX_PAGE: &str = "index.html";
pub const DASHBOARD_PAGE: &str = "dashboard.html";

const ICON_SCRIPT: &str = r#"<script src="https://unpkg.com/lucide@latest"></script>"#;

/// Wrap a body fragment in a full document
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - LexLens</title>
    <link rel="stylesheet" href="/static/styles.css">
    {ICON_SCRIPT}
</head>
<body>
{body}
<script>if (typeof lucide !== 'undefined') {{ lucide.createIcons(); }}</script>
</body>
</html>
"#,
        title = escape(title),
        body = body,
    )
}

/// Alert banner shown above the page content
pub fn alert(message: &str) -> String {
    format!(
        r#"<div class="alert" role="alert">{}</div>"#,
        escape(message)
    )
}

/// Dashboard location for a session
pub fn dashboard_location(session_id: &str) -> String {
    format!("/{}?session={}", DASHBOARD_PAGE, session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_escapes_title() {
        let html = page("<Lease>", "<p>body</p>");
        assert!(html.contains("<title>&lt;Lease&gt; - LexLens</title>"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_alert_escapes_message() {
        assert_eq!(
            alert("a < b"),
            r#"<div class="alert" role="alert">a &lt; b</div>"#
        );
    }

    #[test]
    fn test_dashboard_location() {
        assert_eq!(dashboard_location("abc"), "/dashboard.html?session=abc");
    }
}
