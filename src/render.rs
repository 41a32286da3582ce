use pulldown_cmark::{Options, Parser, html};

/// Convert markdown (as produced by the summarizer) to an HTML fragment
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Standalone HTML page for the PDF renderer
pub fn html_document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: Helvetica, Arial, sans-serif; font-size: 12pt; line-height: 1.5; margin: 2em; }}
li {{ margin-bottom: 0.25em; }}
</style>
</head>
<body>
{body}</body>
</html>
"#,
        title = html_escape::encode_text(title),
    )
}
