//! Post-block extraction from blog listing HTML.
//!
//! Pure and synchronous: the `scraper` DOM is not `Send`, so it must never
//! be held across an await point. Callers fetch the body first and hand
//! the finished string in here.

use scraper::{node::Node, ElementRef, Html, Selector};

use super::truncate_chars;

/// Markup whose text is never reference content.
const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Blocks shorter than this are navigation crumbs or widget labels.
const MIN_BLOCK_CHARS: usize = 100;
const MAX_BLOCK_CHARS: usize = 800;
const MAX_BLOCKS: usize = 15;

/// Extracts up to 15 post-like text blocks from one listing page.
///
/// A block is any `div` whose class contains "post" (case-insensitive),
/// cleaned of excluded markup, whitespace-collapsed, kept only when longer
/// than 100 chars and truncated to 800 chars.
pub fn post_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("div") else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    for element in document.select(&selector) {
        if !element
            .value()
            .classes()
            .any(|c| c.to_ascii_lowercase().contains("post"))
        {
            continue;
        }

        let text = clean_text(element);
        if text.chars().count() > MIN_BLOCK_CHARS {
            blocks.push(truncate_chars(&text, MAX_BLOCK_CHARS).to_string());
        }
        if blocks.len() == MAX_BLOCKS {
            break;
        }
    }

    blocks
}

/// Collects descendant text, skipping excluded subtrees, and collapses
/// whitespace runs to single spaces.
fn clean_text(element: ElementRef) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&text.text);
                out.push(' ');
            }
            Node::Element(el) => {
                if EXCLUDED_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_div(body: &str) -> String {
        format!(r#"<div class="post hentry">{body}</div>"#)
    }

    #[test]
    fn extracts_post_divs_and_skips_script_content() {
        let filler = "word ".repeat(30);
        let html = post_div(&format!(
            "<script>var tracking = true;</script><p>{filler}</p>"
        ));
        let blocks = post_blocks(&html);
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].contains("tracking"));
        assert!(blocks[0].contains("word"));
    }

    #[test]
    fn ignores_divs_without_post_class() {
        let filler = "word ".repeat(30);
        let html = format!(r#"<div class="sidebar"><p>{filler}</p></div>"#);
        assert!(post_blocks(&html).is_empty());
    }

    #[test]
    fn post_class_match_is_case_insensitive() {
        let filler = "word ".repeat(30);
        let html = format!(r#"<div class="Post-Body"><p>{filler}</p></div>"#);
        assert_eq!(post_blocks(&html).len(), 1);
    }

    #[test]
    fn short_blocks_are_dropped() {
        let html = post_div("<p>too short</p>");
        assert!(post_blocks(&html).is_empty());
    }

    #[test]
    fn blocks_are_truncated_to_the_cap() {
        let long = "x".repeat(2000);
        let html = post_div(&format!("<p>{long}</p>"));
        let blocks = post_blocks(&html);
        assert_eq!(blocks[0].chars().count(), MAX_BLOCK_CHARS);
    }

    #[test]
    fn at_most_fifteen_blocks_per_page() {
        let filler = "word ".repeat(30);
        let html: String = (0..20).map(|_| post_div(&filler)).collect();
        assert_eq!(post_blocks(&html).len(), MAX_BLOCKS);
    }

    #[test]
    fn nav_and_footer_text_is_excluded() {
        let filler = "word ".repeat(30);
        let html = post_div(&format!(
            "<nav>Home About Contact</nav><p>{filler}</p><footer>Copyright</footer>"
        ));
        let blocks = post_blocks(&html);
        assert!(!blocks[0].contains("Copyright"));
        assert!(!blocks[0].contains("About"));
    }
}
