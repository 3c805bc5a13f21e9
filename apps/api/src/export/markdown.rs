use crate::export::blocks::{Block, Inline};

/// ATX headings, `-` bullets and inline links, one blank line between blocks
/// except inside a run of bullets.
pub fn to_markdown(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut prev_bullet = false;

    for block in blocks {
        let is_bullet = matches!(block, Block::Bullet(_));
        if !out.is_empty() {
            out.push_str(if is_bullet && prev_bullet { "\n" } else { "\n\n" });
        }
        match block {
            Block::Heading { level, spans } => {
                out.push_str(&"#".repeat(usize::from((*level).clamp(1, 6))));
                out.push(' ');
                out.push_str(&inline(spans));
            }
            Block::Paragraph(spans) => out.push_str(&inline(spans)),
            Block::Bullet(spans) => {
                out.push_str("- ");
                out.push_str(&inline(spans));
            }
        }
        prev_bullet = is_bullet;
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn inline(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Text(text) => escape(text),
            Inline::Link { text, href } if text.is_empty() => format!("<{href}>"),
            Inline::Link { text, href } => format!("[{}]({})", escape(text), href.replace(' ', "%20")),
        })
        .collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '`' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
