use std::io;
use std::io::ErrorKind;

use markdown::Options;

/// Renders a post body (GFM markdown) to HTML.
pub fn render_markdown(md_text: &str) -> io::Result<String> {
    match markdown::to_html_with_options(md_text, &Options::gfm()) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.to_string())),
    }
}

/// Plain-text card summary: the first paragraph, truncated on a char
/// boundary.
pub fn summarize(content: &str, max_chars: usize) -> String {
    let mut summary = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !summary.is_empty() {
                break;
            }
            continue;
        }
        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(line);
    }

    if summary.chars().count() > max_chars {
        summary = summary.chars().take(max_chars).collect();
        summary.push('…');
    }

    summary
}
