//! Markup codec for [`Document`].
//!
//! Rendering emits `p`, `h2`..`h6`, `blockquote`, `ul`/`ol`/`li`, `strong`
//! and `em`. Parsing accepts the same subset plus `b`/`i`/`h1`/`br`;
//! unknown tags are dropped and their text kept. [`unsupported_markup`]
//! finds the first tag that parsing would drop or rewrite.

use super::{normalize_spans, Block, Document, Marks, Span, MAX_HEADING_LEVEL, MIN_HEADING_LEVEL};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("valid tag regex"));

pub(super) fn render(document: &Document) -> String {
    document
        .blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Paragraph(spans) => format!("<p>{}</p>", render_spans(spans)),
        Block::Heading { level, spans } => {
            format!("<h{level}>{}</h{level}>", render_spans(spans))
        }
        Block::Quote(spans) => format!("<blockquote>{}</blockquote>", render_spans(spans)),
        Block::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let body = items
                .iter()
                .map(|item| format!("<li>{}</li>", render_spans(item)))
                .collect::<String>();
            format!("<{tag}>{body}</{tag}>")
        }
    }
}

fn render_spans(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        let text = escape(&span.text);
        match (span.marks.bold, span.marks.italic) {
            (true, true) => {
                out.push_str("<strong><em>");
                out.push_str(&text);
                out.push_str("</em></strong>");
            }
            (true, false) => {
                out.push_str("<strong>");
                out.push_str(&text);
                out.push_str("</strong>");
            }
            (false, true) => {
                out.push_str("<em>");
                out.push_str(&text);
                out.push_str("</em>");
            }
            (false, false) => out.push_str(&text),
        }
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenBlock {
    Paragraph,
    Heading(u8),
    Quote,
}

#[derive(Default)]
struct Parser {
    blocks: Vec<Block>,
    open: Option<(OpenBlock, Vec<Span>)>,
    list: Option<(bool, Vec<Vec<Span>>)>,
    item: Option<Vec<Span>>,
    bold_depth: usize,
    italic_depth: usize,
}

impl Parser {
    fn marks(&self) -> Marks {
        Marks {
            bold: self.bold_depth > 0,
            italic: self.italic_depth > 0,
        }
    }

    fn text(&mut self, raw: &str) {
        let text = unescape(raw);
        if text.is_empty() {
            return;
        }
        let marks = self.marks();

        if let Some(item) = self.item.as_mut() {
            item.push(Span::styled(text, marks));
            return;
        }
        if self.list.is_some() {
            if text.trim().is_empty() {
                return;
            }
            self.item = Some(vec![Span::styled(text, marks)]);
            return;
        }
        match self.open.as_mut() {
            Some((_, spans)) => spans.push(Span::styled(text, marks)),
            None => {
                if text.trim().is_empty() {
                    return;
                }
                self.open = Some((OpenBlock::Paragraph, vec![Span::styled(text, marks)]));
            }
        }
    }

    fn open_block(&mut self, kind: OpenBlock) {
        self.close_list();
        self.close_block();
        self.open = Some((kind, Vec::new()));
    }

    fn close_block(&mut self) {
        let Some((kind, mut spans)) = self.open.take() else {
            return;
        };
        normalize_spans(&mut spans);
        if spans.iter().all(|span| span.text.trim().is_empty()) {
            return;
        }
        self.blocks.push(match kind {
            OpenBlock::Paragraph => Block::Paragraph(spans),
            OpenBlock::Heading(level) => Block::Heading { level, spans },
            OpenBlock::Quote => Block::Quote(spans),
        });
    }

    fn open_list(&mut self, ordered: bool) {
        self.close_list();
        self.close_block();
        self.list = Some((ordered, Vec::new()));
    }

    fn open_item(&mut self) {
        if self.list.is_none() {
            self.open_list(false);
        }
        self.close_item();
        self.item = Some(Vec::new());
    }

    fn close_item(&mut self) {
        let Some(mut spans) = self.item.take() else {
            return;
        };
        normalize_spans(&mut spans);
        if let Some((_, items)) = self.list.as_mut() {
            items.push(spans);
        }
    }

    fn close_list(&mut self) {
        self.close_item();
        if let Some((ordered, items)) = self.list.take() {
            if !items.is_empty() {
                self.blocks.push(Block::List { ordered, items });
            }
        }
    }

    fn tag(&mut self, closing: bool, name: &str) {
        match (closing, name) {
            (false, "p") => self.open_block(OpenBlock::Paragraph),
            (false, "blockquote") => self.open_block(OpenBlock::Quote),
            (false, heading) if heading_level(heading).is_some() => {
                let level = heading_level(heading).unwrap_or(MIN_HEADING_LEVEL);
                self.open_block(OpenBlock::Heading(level));
            }
            (true, "p") | (true, "blockquote") => self.close_block(),
            (true, heading) if heading_level(heading).is_some() => self.close_block(),
            (false, "ul") => self.open_list(false),
            (false, "ol") => self.open_list(true),
            (true, "ul") | (true, "ol") => self.close_list(),
            (false, "li") => self.open_item(),
            (true, "li") => self.close_item(),
            (false, "strong") | (false, "b") => self.bold_depth += 1,
            (true, "strong") | (true, "b") => self.bold_depth = self.bold_depth.saturating_sub(1),
            (false, "em") | (false, "i") => self.italic_depth += 1,
            (true, "em") | (true, "i") => {
                self.italic_depth = self.italic_depth.saturating_sub(1);
            }
            (false, "br") => self.text(" "),
            _ => {}
        }
    }

    fn finish(mut self) -> Document {
        self.close_list();
        self.close_block();
        Document::new(self.blocks)
    }
}

/// `h1` is folded into the smallest allowed level.
fn heading_level(name: &str) -> Option<u8> {
    let digit = name.strip_prefix('h')?;
    let level = digit.parse::<u8>().ok()?;
    match level {
        1 => Some(MIN_HEADING_LEVEL),
        MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL => Some(level),
        _ => None,
    }
}

/// Returns the first tag that does not survive a parse/render cycle.
///
/// `b` and `i` survive as `strong` and `em`. Attributes, `h1`, `br` and
/// every tag outside the rendered subset do not.
pub fn unsupported_markup(markup: &str) -> Option<String> {
    TAG_RE.captures_iter(markup).find_map(|caps| {
        let whole = caps.get(0)?.as_str();
        let name = caps.get(2)?.as_str().to_ascii_lowercase();
        let bare = whole.len() == name.len() + 2 + caps.get(1).map_or(0, |m| m.len());
        let kept = match name.as_str() {
            "p" | "blockquote" | "ul" | "ol" | "li" | "strong" | "b" | "em" | "i" => true,
            heading => heading_level(heading).is_some() && heading != "h1",
        };
        (!(bare && kept)).then(|| whole.to_string())
    })
}

/// Parses markup into a [`Document`]. Never fails.
///
/// Bare text outside any block becomes a paragraph; whitespace between blocks
/// is dropped; empty blocks are skipped.
pub fn parse_markup(markup: &str) -> Document {
    let mut parser = Parser::default();
    let mut cursor = 0;

    for caps in TAG_RE.captures_iter(markup) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        parser.text(&markup[cursor..whole.start()]);
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = caps
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        parser.tag(closing, &name);
        cursor = whole.end();
    }
    parser.text(&markup[cursor..]);

    parser.finish()
}
