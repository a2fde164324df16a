// src/utils/debug.rs
use crate::extractors::Span;
use crate::utils::error::AppError;
use regex::Regex;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Saves a document as HTML with the given spans highlighted.
/// Overlapping highlights keep the earliest one.
pub fn save_debug_html(text: &str, filename: &Path, highlights: &[(Span, &str)]) -> Result<(), AppError> {
    let mut file = File::create(filename)?;
    file.write_all(render_debug_html(text, highlights).as_bytes())?;

    tracing::info!("Saved debug HTML to {}", filename.display());
    Ok(())
}

/// Highlights `regions` plus every match of the extra `(pattern, kind)` pairs.
pub fn create_debug_html(
    text: &str,
    filename: &Path,
    regions: &[Span],
    patterns: &[(&str, &str)],
) -> Result<(), AppError> {
    let mut highlights: Vec<(Span, &str)> = regions.iter().map(|s| (*s, "region")).collect();

    for (pattern, kind) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;
        highlights.extend(re.find_iter(text).map(|m| (Span::new(m.start(), m.end()), *kind)));
    }

    save_debug_html(text, filename, &highlights)
}

fn render_debug_html(text: &str, highlights: &[(Span, &str)]) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");

    // CSS for highlight colors
    out.push_str(".highlight-region { background-color: #90EE90; }\n");
    out.push_str(".highlight-anchor { background-color: #FFFF00; }\n");
    out.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    out.push_str("</style>\n</head>\n<body>\n<pre>\n");

    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|(span, _)| span.start);

    let mut last_pos = 0;
    for (span, kind) in sorted {
        if span.start < last_pos {
            tracing::trace!("Skipping overlapping highlight {}..{} ({})", span.start, span.end, kind);
            continue;
        }
        out.push_str(&escape(&text[last_pos..span.start]));

        let css_class = match kind {
            "region" => "highlight-region",
            "anchor" => "highlight-anchor",
            _ => "highlight-custom",
        };
        out.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, span.start, span.end, kind
        ));
        out.push_str(&escape(span.slice(text)));
        out.push_str("</span>");

        last_pos = span.end;
    }

    out.push_str(&escape(&text[last_pos..]));
    out.push_str("\n</pre>\n</body>\n</html>");
    out
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_marks_regions_and_escapes() {
        let text = "let a: Array<T> = [1]; b";
        let html = render_debug_html(text, &[(Span::new(18, 22), "region"), (Span::new(18, 19), "anchor")]);
        assert!(html.contains("let a: Array&lt;T&gt; = "));
        assert!(html.contains("<span class=\"highlight-region\" title=\"Position: 18-22, Type: region\">[1];</span>"));
        assert!(!html.contains("highlight-anchor\" title"));
        assert!(html.contains("</span> b\n</pre>"));
    }

    #[test]
    fn test_create_debug_html_rejects_bad_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.html");
        let result = create_debug_html("x", &path, &[], &[("(", "anchor")]);
        assert!(matches!(result, Err(AppError::Config(_))));

        create_debug_html("const A = [1];", &path, &[Span::new(10, 14)], &[("const", "anchor")]).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("highlight-anchor"));
        assert!(html.contains("highlight-region"));
    }
}
