//! Atomic content blocks accepted by the remote page service, and the
//! per-request limits that bound how they are submitted.

use serde::Deserialize;

use crate::error::PreconditionError;

/// Default number of blocks a single create/append call may carry.
pub const DEFAULT_MAX_BLOCKS_PER_CALL: usize = 100;
/// Default maximum length, in characters, of one block's text.
pub const DEFAULT_MAX_BLOCK_TEXT: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    One,
    Two,
    Three,
}

/// One renderable unit of page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Heading { level: HeadingLevel, text: String },
    Paragraph { text: String },
    BulletedItem { text: String },
    Code { language: String, text: String },
}

impl ContentBlock {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        ContentBlock::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph { text: text.into() }
    }

    pub fn bulleted_item(text: impl Into<String>) -> Self {
        ContentBlock::BulletedItem { text: text.into() }
    }

    pub fn code(language: impl Into<String>, text: impl Into<String>) -> Self {
        ContentBlock::Code {
            language: language.into(),
            text: text.into(),
        }
    }

    /// The block's text payload.
    pub fn text(&self) -> &str {
        match self {
            ContentBlock::Heading { text, .. }
            | ContentBlock::Paragraph { text }
            | ContentBlock::BulletedItem { text }
            | ContentBlock::Code { text, .. } => text,
        }
    }

    /// Returns the block with its text cut to at most `max_chars` characters.
    pub fn truncated(self, max_chars: usize) -> Self {
        match self {
            ContentBlock::Heading { level, text } => ContentBlock::Heading {
                level,
                text: truncate_text(text, max_chars),
            },
            ContentBlock::Paragraph { text } => ContentBlock::Paragraph {
                text: truncate_text(text, max_chars),
            },
            ContentBlock::BulletedItem { text } => ContentBlock::BulletedItem {
                text: truncate_text(text, max_chars),
            },
            ContentBlock::Code { language, text } => ContentBlock::Code {
                language,
                text: truncate_text(text, max_chars),
            },
        }
    }
}

/// Cuts `text` to its first `max_chars` characters (Unicode scalar values).
pub fn truncate_text(mut text: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_idx);
    }
    text
}

/// Size limits of the remote service. Both values are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    max_blocks_per_call: usize,
    max_block_text: usize,
}

impl PageLimits {
    pub fn new(max_blocks_per_call: usize, max_block_text: usize) -> Result<Self, PreconditionError> {
        if max_blocks_per_call == 0 {
            return Err(PreconditionError::Invalid(
                "max_blocks_per_call must be greater than zero".into(),
            ));
        }
        if max_block_text == 0 {
            return Err(PreconditionError::Invalid(
                "max_block_text must be greater than zero".into(),
            ));
        }
        Ok(Self {
            max_blocks_per_call,
            max_block_text,
        })
    }

    pub fn max_blocks_per_call(&self) -> usize {
        self.max_blocks_per_call
    }

    pub fn max_block_text(&self) -> usize {
        self.max_block_text
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            max_blocks_per_call: DEFAULT_MAX_BLOCKS_PER_CALL,
            max_block_text: DEFAULT_MAX_BLOCK_TEXT,
        }
    }
}

/// Unvalidated limits as they appear in a settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub max_blocks_per_call: usize,
    pub max_block_text: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_blocks_per_call: DEFAULT_MAX_BLOCKS_PER_CALL,
            max_block_text: DEFAULT_MAX_BLOCK_TEXT,
        }
    }
}

impl TryFrom<LimitsSection> for PageLimits {
    type Error = PreconditionError;

    fn try_from(section: LimitsSection) -> Result<Self, Self::Error> {
        PageLimits::new(section.max_blocks_per_call, section.max_block_text)
    }
}
