//! Content rendering: turns a page's [`ContentPayload`] into blocks.
//!
//! Rendering is pure. Sections appear in a fixed order (summary,
//! arguments, returns, security, example, fields, description), each as a
//! heading followed by its body. Absent fields render nothing.

use serde::Deserialize;

use crate::block::{ContentBlock, HeadingLevel, DEFAULT_MAX_BLOCK_TEXT};
use crate::tree::{Argument, ContentPayload, Field};

pub const REQUIRED_MARKER: &str = "○";
pub const OPTIONAL_MARKER: &str = "×";

const TABLE_LANGUAGE: &str = "markdown";
const DEFAULT_EXAMPLE_LANGUAGE: &str = "graphql";

/// Language of headings, table columns and generated section titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl Locale {
    pub fn labels(self) -> &'static Labels {
        match self {
            Locale::Ja => &JAPANESE,
            Locale::En => &ENGLISH,
        }
    }
}

/// Fixed strings used when rendering and when prompting for a tree.
#[derive(Debug)]
pub struct Labels {
    pub summary: &'static str,
    pub arguments: &'static str,
    pub returns: &'static str,
    pub security: &'static str,
    pub example: &'static str,
    pub fields: &'static str,
    pub description: &'static str,
    pub argument_columns: [&'static str; 4],
    pub field_columns: [&'static str; 3],
    pub document_title: &'static str,
    pub query_section: &'static str,
    pub mutation_section: &'static str,
    pub type_section: &'static str,
    pub language_name: &'static str,
}

pub static JAPANESE: Labels = Labels {
    summary: "概要",
    arguments: "引数",
    returns: "戻り値",
    security: "セキュリティ",
    example: "使用例",
    fields: "フィールド",
    description: "説明",
    argument_columns: ["引数名", "型", "必須", "説明"],
    field_columns: ["フィールド名", "型", "説明"],
    document_title: "API仕様書",
    query_section: "📊 Query仕様",
    mutation_section: "✏️ Mutation仕様",
    type_section: "🧱 型定義",
    language_name: "Japanese",
};

pub static ENGLISH: Labels = Labels {
    summary: "Summary",
    arguments: "Arguments",
    returns: "Returns",
    security: "Security",
    example: "Example",
    fields: "Fields",
    description: "Description",
    argument_columns: ["Name", "Type", "Required", "Description"],
    field_columns: ["Name", "Type", "Description"],
    document_title: "API Specification",
    query_section: "📊 Queries",
    mutation_section: "✏️ Mutations",
    type_section: "🧱 Types",
    language_name: "English",
};

/// Renders payloads with a fixed label set and block text limit.
#[derive(Debug, Clone)]
pub struct Renderer {
    labels: &'static Labels,
    max_block_text: usize,
    example_language: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Locale::default(), DEFAULT_MAX_BLOCK_TEXT, DEFAULT_EXAMPLE_LANGUAGE)
    }
}

impl Renderer {
    pub fn new(locale: Locale, max_block_text: usize, example_language: impl Into<String>) -> Self {
        Self {
            labels: locale.labels(),
            max_block_text,
            example_language: example_language.into(),
        }
    }

    pub fn render(&self, payload: &ContentPayload) -> Vec<ContentBlock> {
        let labels = self.labels;
        let mut blocks = Vec::new();

        if let Some(summary) = &payload.summary {
            blocks.push(ContentBlock::heading(HeadingLevel::Two, labels.summary));
            blocks.push(ContentBlock::paragraph(summary.as_str()));
        }

        if let Some(arguments) = payload.arguments.as_ref().filter(|a| !a.is_empty()) {
            blocks.push(ContentBlock::heading(HeadingLevel::Three, labels.arguments));
            blocks.push(ContentBlock::code(
                TABLE_LANGUAGE,
                argument_table(labels, arguments),
            ));
        }

        if let Some(returns) = &payload.returns {
            blocks.push(ContentBlock::heading(HeadingLevel::Three, labels.returns));
            blocks.push(ContentBlock::paragraph(returns.as_str()));
        }

        if let Some(notes) = payload.security.as_ref().filter(|s| !s.is_empty()) {
            blocks.push(ContentBlock::heading(HeadingLevel::Three, labels.security));
            blocks.extend(notes.iter().map(|note| ContentBlock::bulleted_item(note.as_str())));
        }

        if let Some(example) = &payload.example {
            blocks.push(ContentBlock::heading(HeadingLevel::Three, labels.example));
            blocks.push(ContentBlock::code(
                self.example_language.as_str(),
                example.as_str(),
            ));
        }

        if let Some(fields) = payload.fields.as_ref().filter(|f| !f.is_empty()) {
            blocks.push(ContentBlock::heading(HeadingLevel::Three, labels.fields));
            blocks.push(ContentBlock::code(TABLE_LANGUAGE, field_table(labels, fields)));
        }

        if let Some(description) = &payload.description {
            blocks.push(ContentBlock::heading(HeadingLevel::Three, labels.description));
            blocks.push(ContentBlock::paragraph(description.as_str()));
        }

        blocks
            .into_iter()
            .map(|block| block.truncated(self.max_block_text))
            .collect()
    }
}

/// Renders with the default Japanese labels and service limits.
pub fn render(payload: &ContentPayload) -> Vec<ContentBlock> {
    Renderer::default().render(payload)
}

fn argument_table(labels: &Labels, arguments: &[Argument]) -> String {
    let mut table = table_head(&labels.argument_columns);
    for arg in arguments {
        let marker = if arg.required {
            REQUIRED_MARKER
        } else {
            OPTIONAL_MARKER
        };
        table_row(
            &mut table,
            &[
                arg.name.as_str(),
                arg.type_name.as_str(),
                marker,
                arg.description.as_str(),
            ],
        );
    }
    table
}

fn field_table(labels: &Labels, fields: &[Field]) -> String {
    let mut table = table_head(&labels.field_columns);
    for field in fields {
        table_row(
            &mut table,
            &[
                field.name.as_str(),
                field.type_name.as_str(),
                field.description.as_str(),
            ],
        );
    }
    table
}

fn table_head(columns: &[&str]) -> String {
    let mut head = String::new();
    table_row(&mut head, columns);
    head.push('|');
    for column in columns {
        head.push_str(&"-".repeat(column.chars().count().max(3) + 2));
        head.push('|');
    }
    head.push('\n');
    head
}

fn table_row(table: &mut String, cells: &[&str]) {
    table.push('|');
    for cell in cells {
        table.push(' ');
        table.push_str(&escape_cell(cell));
        table.push_str(" |");
    }
    table.push('\n');
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}
