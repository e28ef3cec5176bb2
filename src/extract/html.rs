//! HTML page scraping backed by the `scraper` crate.

use super::PageContent;
use scraper::{Html, Selector};

/// How many paragraphs make up the fallback body.
const MAX_PARAGRAPHS: usize = 10;

/// Parse fetched HTML into a title and body.
///
/// Title: first of `<title>`, `<h1>`, `<h2>`, with leading non-letter
/// characters stripped. Body: the abstract block when one exists (the
/// arXiv `blockquote.abstract` layout), otherwise the first ten `<p>`
/// elements joined by blank lines.
pub fn parse_page(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    let title = extract_title(&document);

    let abstract_sel = Selector::parse("blockquote.abstract").expect("static selector must parse");
    let abstract_text = document
        .select(&abstract_sel)
        .next()
        .map(|el| collapse(&el.text().collect::<String>()));

    let body = match abstract_text {
        Some(text) if !text.is_empty() => text,
        _ => {
            let p_sel = Selector::parse("p").expect("static selector must parse");
            document
                .select(&p_sel)
                .take(MAX_PARAGRAPHS)
                .map(|el| collapse(&el.text().collect::<String>()))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    };

    PageContent { title, body }
}

fn extract_title(document: &Html) -> String {
    for selector in ["title", "h1", "h2"] {
        let sel = Selector::parse(selector).expect("static selector must parse");
        if let Some(el) = document.select(&sel).next() {
            let text = el.text().collect::<String>();
            let text = strip_leading_non_letters(text.trim());
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Drop leading characters until the first alphabetic one. arXiv titles
/// come prefixed with identifiers like `[2305.14314]`.
fn strip_leading_non_letters(text: &str) -> String {
    text.trim_start_matches(|c: char| !c.is_alphabetic()).to_string()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_title_tag() {
        let html = "<html><head><title>Page Title</title></head>\
                    <body><h1>Heading</h1><p>Text.</p></body></html>";
        let content = parse_page(html);
        assert_eq!(content.title, "Page Title");
    }

    #[test]
    fn test_title_falls_back_to_h1_then_h2() {
        let html = "<html><body><h1>First Heading</h1><p>Text.</p></body></html>";
        assert_eq!(parse_page(html).title, "First Heading");

        let html = "<html><body><h2>Second Heading</h2><p>Text.</p></body></html>";
        assert_eq!(parse_page(html).title, "Second Heading");
    }

    #[test]
    fn test_title_strips_leading_non_letters() {
        let html = "<html><head><title>[2305.14314] QLoRA: Efficient Finetuning</title></head>\
                    <body><p>Text.</p></body></html>";
        assert_eq!(parse_page(html).title, "QLoRA: Efficient Finetuning");
    }

    #[test]
    fn test_abstract_preferred_over_paragraphs() {
        let html = "<html><body>\
                    <blockquote class=\"abstract\">Abstract: the abstract text.</blockquote>\
                    <p>First paragraph.</p><p>Second paragraph.</p>\
                    </body></html>";
        let content = parse_page(html);
        assert_eq!(content.body, "Abstract: the abstract text.");
    }

    #[test]
    fn test_paragraph_fallback_caps_at_ten() {
        let paragraphs: String = (0..15).map(|i| format!("<p>Paragraph {i}.</p>")).collect();
        let html = format!("<html><body>{paragraphs}</body></html>");

        let content = parse_page(&html);
        assert!(content.body.contains("Paragraph 0."));
        assert!(content.body.contains("Paragraph 9."));
        assert!(!content.body.contains("Paragraph 10."));
    }

    #[test]
    fn test_empty_page() {
        let content = parse_page("<html><body></body></html>");
        assert!(content.title.is_empty());
        assert!(content.body.is_empty());
    }

    #[test]
    fn test_whitespace_collapsed() {
        let html = "<html><body><p>Spread   over\n   lines.</p></body></html>";
        assert_eq!(parse_page(html).body, "Spread over lines.");
    }
}
