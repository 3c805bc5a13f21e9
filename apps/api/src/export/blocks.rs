//! Flattens rendered resume HTML into a list of headings, paragraphs and
//! bullets with inline links. Every export format is written from this model.

use scraper::{ElementRef, Html};

/// Never exported.
const SKIPPED: [&str; 6] = ["head", "script", "style", "noscript", "template", "title"];

/// Flow into the surrounding paragraph instead of starting a block.
const INLINE: [&str; 15] = [
    "a", "abbr", "b", "br", "code", "em", "i", "mark", "small", "span", "strong", "sub", "sup",
    "time", "u",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link { text: String, href: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Inline> },
    Paragraph(Vec<Inline>),
    Bullet(Vec<Inline>),
}

impl Block {
    pub fn spans(&self) -> &[Inline] {
        match self {
            Block::Heading { spans, .. } | Block::Paragraph(spans) | Block::Bullet(spans) => spans,
        }
    }

    /// Text with links reduced to their label.
    pub fn plain_text(&self) -> String {
        self.spans()
            .iter()
            .map(|span| match span {
                Inline::Text(text) => text.as_str(),
                Inline::Link { text, .. } => text.as_str(),
            })
            .collect()
    }
}

pub fn html_to_blocks(html: &str) -> Vec<Block> {
    let doc = Html::parse_document(html);
    let mut builder = BlockBuilder::default();
    builder.walk(doc.root_element());
    builder.flush();
    builder.blocks
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    pending: Vec<Inline>,
}

impl BlockBuilder {
    /// Loose inline content between blocks becomes its own paragraph.
    fn flush(&mut self) {
        let spans = tidy(std::mem::take(&mut self.pending));
        if !spans.is_empty() {
            self.blocks.push(Block::Paragraph(spans));
        }
    }

    fn push(&mut self, block: impl FnOnce(Vec<Inline>) -> Block, el: ElementRef) {
        let mut spans = Vec::new();
        collect_inline(el, &mut spans);
        let spans = tidy(spans);
        if !spans.is_empty() {
            self.blocks.push(block(spans));
        }
    }

    fn walk(&mut self, el: ElementRef) {
        for child in el.children() {
            if let Some(text) = child.value().as_text() {
                self.pending.push(Inline::Text(text.to_string()));
                continue;
            }
            let Some(child) = ElementRef::wrap(child) else {
                continue;
            };
            let name = child.value().name();
            if SKIPPED.contains(&name) {
                continue;
            }
            if INLINE.contains(&name) {
                collect_inline(child, &mut self.pending);
                continue;
            }

            self.flush();
            match name {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let level = name[1..].parse::<u8>().unwrap_or(6);
                    self.push(|spans| Block::Heading { level, spans }, child);
                }
                "p" => self.push(Block::Paragraph, child),
                "li" => {
                    self.push(Block::Bullet, child);
                    for nested in child
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|e| matches!(e.value().name(), "ul" | "ol"))
                    {
                        self.walk(nested);
                    }
                }
                _ => {
                    self.walk(child);
                    self.flush();
                }
            }
        }
    }
}

fn collect_inline(el: ElementRef, out: &mut Vec<Inline>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push(Inline::Text(text.to_string()));
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        match child.value().name() {
            name if SKIPPED.contains(&name) => {}
            "ul" | "ol" => {}
            "br" => out.push(Inline::Text(" ".to_string())),
            "a" => {
                let href = child.value().attr("href").unwrap_or_default().trim();
                let text = collapse(&child.text().collect::<String>()).trim().to_string();
                if href.is_empty() {
                    out.push(Inline::Text(text));
                } else {
                    out.push(Inline::Link {
                        text,
                        href: href.to_string(),
                    });
                }
            }
            _ => collect_inline(child, out),
        }
    }
}

/// Merges adjacent text, collapses whitespace runs and trims the ends.
fn tidy(spans: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(spans.len());
    for span in spans {
        if let (Some(Inline::Text(prev)), Inline::Text(next)) = (merged.last_mut(), &span) {
            prev.push_str(next);
            continue;
        }
        merged.push(span);
    }

    let mut out: Vec<Inline> = merged
        .into_iter()
        .map(|span| match span {
            Inline::Text(text) => Inline::Text(collapse(&text)),
            link => link,
        })
        .collect();

    if let Some(Inline::Text(first)) = out.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(Inline::Text(last)) = out.last_mut() {
        *last = last.trim_end().to_string();
    }
    out.retain(|span| match span {
        Inline::Text(text) => !text.is_empty(),
        Inline::Link { text, href } => !text.is_empty() || !href.is_empty(),
    });
    out
}

fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_headings_paragraphs_and_bullets() {
        let blocks = html_to_blocks(
            "<div><h1>Jane</h1><h2>Skills</h2><p>Fast  \n learner</p><ul><li>Rust</li><li>Go</li></ul></div>",
        );
        assert_eq!(
            blocks,
            [
                Block::Heading { level: 1, spans: vec![text("Jane")] },
                Block::Heading { level: 2, spans: vec![text("Skills")] },
                Block::Paragraph(vec![text("Fast learner")]),
                Block::Bullet(vec![text("Rust")]),
                Block::Bullet(vec![text("Go")]),
            ]
        );
    }

    #[test]
    fn test_links_are_kept_inline() {
        let blocks = html_to_blocks(
            r#"<p class="contact-line"><span>NYC</span><span> | <a href="mailto:j@x.com">j@x.com</a></span></p>"#,
        );
        assert_eq!(
            blocks,
            [Block::Paragraph(vec![
                text("NYC | "),
                Inline::Link {
                    text: "j@x.com".to_string(),
                    href: "mailto:j@x.com".to_string()
                },
            ])]
        );
        assert_eq!(blocks[0].plain_text(), "NYC | j@x.com");
    }

    #[test]
    fn test_style_and_script_are_dropped() {
        let blocks = html_to_blocks(
            "<html><head><style>h1 { color: red }</style></head><body><script>alert(1)</script><h1>Jane</h1></body></html>",
        );
        assert_eq!(blocks, [Block::Heading { level: 1, spans: vec![text("Jane")] }]);
    }

    #[test]
    fn test_loose_text_becomes_paragraph() {
        let blocks = html_to_blocks("<div>Loose <b>text</b><h3>Title</h3></div>");
        assert_eq!(
            blocks,
            [
                Block::Paragraph(vec![text("Loose text")]),
                Block::Heading { level: 3, spans: vec![text("Title")] },
            ]
        );
    }

    #[test]
    fn test_nested_list_items_follow_parent() {
        let blocks = html_to_blocks("<ul><li>Parent<ul><li>Child</li></ul></li></ul>");
        assert_eq!(
            blocks,
            [Block::Bullet(vec![text("Parent")]), Block::Bullet(vec![text("Child")])]
        );
    }

    #[test]
    fn test_empty_elements_produce_nothing() {
        assert!(html_to_blocks("<div><p>  </p><ul><li></li></ul></div>").is_empty());
        assert!(html_to_blocks("").is_empty());
    }
}
