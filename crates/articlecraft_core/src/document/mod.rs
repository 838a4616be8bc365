//! Structured rich-text document model.
//!
//! # Responsibility
//! - Represent article bodies as a tree of typed blocks and styled spans.
//! - Apply formatting commands (bold/italic/heading/list toggles) to the tree.
//! - Convert to and from markup only at the draft boundary (`markup`).
//!
//! # Invariants
//! - Heading levels are always within `2..=6`.
//! - After any command, span lists contain no empty spans and no two adjacent
//!   spans share the same marks.
//! - Character offsets count Unicode scalar values, not bytes.

mod markup;

pub use markup::{parse_markup, unsupported_markup};

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Range;

pub const MIN_HEADING_LEVEL: u8 = 2;
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Inline formatting flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
}

/// Inline mark that commands can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
}

impl Marks {
    fn has(self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
        }
    }

    fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
        }
    }
}

/// A run of text sharing one set of marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub marks: Marks,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn styled(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Top-level document block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Span>),
    Heading { level: u8, spans: Vec<Span> },
    Quote(Vec<Span>),
    List { ordered: bool, items: Vec<Vec<Span>> },
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(vec![Span::plain(text)])
    }

    fn text_spans_mut(&mut self, item: Option<usize>, block: usize) -> Result<&mut Vec<Span>, CommandError> {
        match (self, item) {
            (Self::Paragraph(spans), None)
            | (Self::Quote(spans), None)
            | (Self::Heading { spans, .. }, None) => Ok(spans),
            (Self::List { items, .. }, Some(index)) => {
                let len = items.len();
                items
                    .get_mut(index)
                    .ok_or(CommandError::ItemOutOfRange { block, index, len })
            }
            _ => Err(CommandError::TargetMismatch(block)),
        }
    }

    /// Plain text of the block, list items joined by spaces.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph(spans) | Self::Quote(spans) | Self::Heading { spans, .. } => {
                spans_text(spans)
            }
            Self::List { items, .. } => items
                .iter()
                .map(|item| spans_text(item))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Addresses the inline content of a block, or of one item of a list block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextTarget {
    pub block: usize,
    pub item: Option<usize>,
}

impl TextTarget {
    pub fn block(block: usize) -> Self {
        Self { block, item: None }
    }

    pub fn list_item(block: usize, item: usize) -> Self {
        Self {
            block,
            item: Some(item),
        }
    }
}

/// Formatting command applied to a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    ToggleBold { target: TextTarget, range: Range<usize> },
    ToggleItalic { target: TextTarget, range: Range<usize> },
    /// Turns a paragraph, quote or heading into a heading of `level`.
    SetHeading { block: usize, level: u8 },
    /// Turns a heading or quote back into a paragraph.
    SetParagraph { block: usize },
    /// Paragraph -> single-item list; list of the same kind -> paragraphs;
    /// list of the other kind -> switches kind.
    ToggleList { block: usize, ordered: bool },
    InsertBlock { index: usize, block: Block },
    RemoveBlock { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    BlockOutOfRange { index: usize, len: usize },
    ItemOutOfRange { block: usize, index: usize, len: usize },
    InvalidRange { start: usize, end: usize, len: usize },
    InvalidHeadingLevel(u8),
    /// The addressed block cannot take this command.
    TargetMismatch(usize),
    /// Content holds a tag the model would drop or rewrite, e.g. a link.
    UnsupportedMarkup(String),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlockOutOfRange { index, len } => {
                write!(f, "block index {index} out of range (len {len})")
            }
            Self::ItemOutOfRange { block, index, len } => {
                write!(f, "list item {index} out of range in block {block} (len {len})")
            }
            Self::InvalidRange { start, end, len } => {
                write!(f, "invalid range {start}..{end} for text of length {len}")
            }
            Self::InvalidHeadingLevel(level) => write!(
                f,
                "heading level {level} outside {MIN_HEADING_LEVEL}..={MAX_HEADING_LEVEL}"
            ),
            Self::TargetMismatch(block) => {
                write!(f, "command does not apply to block {block}")
            }
            Self::UnsupportedMarkup(tag) => write!(
                f,
                "content contains markup that structured editing cannot preserve: {tag}"
            ),
        }
    }
}

impl Error for CommandError {}

/// Ordered list of blocks forming an article body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Parses markup tolerantly; see [`parse_markup`].
    pub fn from_markup(markup: &str) -> Self {
        parse_markup(markup)
    }

    /// Parses markup only when nothing in it would be lost on re-render.
    pub fn from_markup_lossless(markup: &str) -> Result<Self, CommandError> {
        match unsupported_markup(markup) {
            Some(tag) => Err(CommandError::UnsupportedMarkup(tag)),
            None => Ok(parse_markup(markup)),
        }
    }

    /// Serializes to the markup stored in `Draft::content`.
    pub fn to_markup(&self) -> String {
        markup::render(self)
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Applies one command. The document is unchanged when an error is returned.
    pub fn apply(&mut self, command: &EditCommand) -> Result<(), CommandError> {
        match command {
            EditCommand::ToggleBold { target, range } => {
                self.toggle_mark(*target, range.clone(), Mark::Bold)
            }
            EditCommand::ToggleItalic { target, range } => {
                self.toggle_mark(*target, range.clone(), Mark::Italic)
            }
            EditCommand::SetHeading { block, level } => self.set_heading(*block, *level),
            EditCommand::SetParagraph { block } => self.set_paragraph(*block),
            EditCommand::ToggleList { block, ordered } => self.toggle_list(*block, *ordered),
            EditCommand::InsertBlock { index, block } => {
                if *index > self.blocks.len() {
                    return Err(CommandError::BlockOutOfRange {
                        index: *index,
                        len: self.blocks.len(),
                    });
                }
                self.blocks.insert(*index, block.clone());
                Ok(())
            }
            EditCommand::RemoveBlock { index } => {
                self.check_block(*index)?;
                self.blocks.remove(*index);
                Ok(())
            }
        }
    }

    fn check_block(&self, index: usize) -> Result<(), CommandError> {
        if index >= self.blocks.len() {
            return Err(CommandError::BlockOutOfRange {
                index,
                len: self.blocks.len(),
            });
        }
        Ok(())
    }

    fn toggle_mark(
        &mut self,
        target: TextTarget,
        range: Range<usize>,
        mark: Mark,
    ) -> Result<(), CommandError> {
        self.check_block(target.block)?;
        let spans = self.blocks[target.block].text_spans_mut(target.item, target.block)?;

        let len = spans.iter().map(Span::char_len).sum::<usize>();
        if range.start >= range.end || range.end > len {
            return Err(CommandError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }

        split_spans_at(spans, range.start);
        split_spans_at(spans, range.end);

        let mut inside = Vec::new();
        let mut pos = 0;
        for (index, span) in spans.iter().enumerate() {
            let span_len = span.char_len();
            if pos >= range.start && pos + span_len <= range.end {
                inside.push(index);
            }
            pos += span_len;
        }

        let fully_marked = inside.iter().all(|&index| spans[index].marks.has(mark));
        for index in inside {
            spans[index].marks.set(mark, !fully_marked);
        }
        normalize_spans(spans);
        Ok(())
    }

    fn set_heading(&mut self, block: usize, level: u8) -> Result<(), CommandError> {
        if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(&level) {
            return Err(CommandError::InvalidHeadingLevel(level));
        }
        self.check_block(block)?;
        let slot = &mut self.blocks[block];
        let spans = match slot {
            Block::Paragraph(spans) | Block::Quote(spans) | Block::Heading { spans, .. } => {
                std::mem::take(spans)
            }
            Block::List { .. } => return Err(CommandError::TargetMismatch(block)),
        };
        *slot = Block::Heading { level, spans };
        Ok(())
    }

    fn set_paragraph(&mut self, block: usize) -> Result<(), CommandError> {
        self.check_block(block)?;
        let slot = &mut self.blocks[block];
        let spans = match slot {
            Block::Paragraph(_) => return Ok(()),
            Block::Quote(spans) | Block::Heading { spans, .. } => std::mem::take(spans),
            Block::List { .. } => return Err(CommandError::TargetMismatch(block)),
        };
        *slot = Block::Paragraph(spans);
        Ok(())
    }

    fn toggle_list(&mut self, block: usize, ordered: bool) -> Result<(), CommandError> {
        self.check_block(block)?;
        match &mut self.blocks[block] {
            Block::Paragraph(spans) => {
                let item = std::mem::take(spans);
                self.blocks[block] = Block::List {
                    ordered,
                    items: vec![item],
                };
            }
            Block::List {
                ordered: current,
                items,
            } => {
                if *current != ordered {
                    *current = ordered;
                    return Ok(());
                }
                let paragraphs = std::mem::take(items)
                    .into_iter()
                    .map(Block::Paragraph)
                    .collect::<Vec<_>>();
                self.blocks.splice(block..=block, paragraphs);
            }
            Block::Heading { .. } | Block::Quote(_) => {
                return Err(CommandError::TargetMismatch(block));
            }
        }
        Ok(())
    }
}

fn spans_text(spans: &[Span]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

/// Splits the span containing char `offset` so a span boundary lies there.
fn split_spans_at(spans: &mut Vec<Span>, offset: usize) {
    let mut pos = 0;
    for index in 0..spans.len() {
        let span_len = spans[index].char_len();
        if offset > pos && offset < pos + span_len {
            let local = offset - pos;
            let byte_index = spans[index]
                .text
                .char_indices()
                .nth(local)
                .map_or(spans[index].text.len(), |(byte, _)| byte);
            let tail = spans[index].text.split_off(byte_index);
            let marks = spans[index].marks;
            spans.insert(index + 1, Span::styled(tail, marks));
            return;
        }
        pos += span_len;
    }
}

/// Drops empty spans and merges neighbours with equal marks.
pub(crate) fn normalize_spans(spans: &mut Vec<Span>) {
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        if span.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.marks == span.marks => last.text.push_str(&span.text),
            _ => merged.push(span),
        }
    }
    *spans = merged;
}
