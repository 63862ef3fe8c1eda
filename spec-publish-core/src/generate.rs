//! Prompting a generative model for a specification tree, and turning its
//! reply back into a [`SpecNode`].

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::contract::SourceDocuments;
use crate::error::SourceError;
use crate::render::Labels;
use crate::tree::SpecNode;

/// Builds the generation prompt for `documents`, asking for prose in the
/// language of `labels`.
pub fn build_prompt(documents: &SourceDocuments, labels: &Labels) -> String {
    let sources = documents
        .iter()
        .map(|(path, text)| {
            let fence_lang = Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            format!("## File: {path}\n```{fence_lang}\n{text}\n```")
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let example = serde_json::json!({
        "title": labels.document_title,
        "children": [
            {
                "title": labels.query_section,
                "type": "page",
                "children": [{
                    "title": "todos",
                    "type": "page",
                    "content": {
                        "summary": "...",
                        "arguments": [
                            {"name": "completed", "type": "Boolean", "required": false, "description": "..."}
                        ],
                        "returns": "[Todo!]!",
                        "security": ["@guard: ..."],
                        "example": "query GetTodos {\n  todos(completed: false) {\n    id\n  }\n}"
                    }
                }]
            },
            {
                "title": labels.mutation_section,
                "type": "page",
                "children": [{
                    "title": "createTodo",
                    "type": "page",
                    "content": {"summary": "...", "arguments": [], "returns": "Todo!", "example": "..."}
                }]
            },
            {
                "title": labels.type_section,
                "type": "page",
                "children": [{
                    "title": "Todo",
                    "type": "page",
                    "content": {
                        "description": "...",
                        "fields": [{"name": "id", "type": "ID!", "description": "..."}]
                    }
                }]
            }
        ]
    });
    let example = serde_json::to_string_pretty(&example).unwrap_or_default();

    format!(
        "Analyse the schema files below and produce an API specification as a \
hierarchical JSON document.\n\n\
# Schema files\n{sources}\n\n\
# Output format\n\
Output a single JSON object with exactly this shape:\n\n{example}\n\n\
# Rules\n\
1. Put every query under \"{queries}\".\n\
2. Put every mutation under \"{mutations}\".\n\
3. Put every type definition under \"{types}\".\n\
4. Give each query, mutation and type its own page.\n\
5. Fill `content` with the implementation details: summary, arguments, \
returns, security notes and a usage example for operations; description \
and fields for types. Omit keys that do not apply.\n\
6. Write all prose in {language}.\n\
7. Output JSON only, with no explanation before or after it.\n",
        queries = labels.query_section,
        mutations = labels.mutation_section,
        types = labels.type_section,
        language = labels.language_name,
    )
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```$").expect("valid fence regex")
    })
}

/// Parses generated text into a validated tree, tolerating a surrounding
/// Markdown code fence.
pub fn parse_generated_tree(text: &str) -> Result<SpecNode, SourceError> {
    let trimmed = text.trim();
    let body = match fence_pattern().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => {
            debug!("Stripped code fence from generated text");
            inner.as_str()
        }
        None => trimmed,
    };

    let tree: SpecNode = serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(500).collect();
        warn!(error = %e, preview = %preview, "Generated text is not valid tree JSON");
        SourceError::Parse(e)
    })?;
    tree.validate().map_err(SourceError::Shape)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ENGLISH, JAPANESE};
    use crate::tree::NodeKind;

    fn docs() -> SourceDocuments {
        let mut docs = SourceDocuments::new();
        docs.insert("todo.graphql".into(), "type Todo { id: ID! }".into());
        docs
    }

    #[test]
    fn prompt_embeds_sources_and_section_titles() {
        let prompt = build_prompt(&docs(), &JAPANESE);
        assert!(prompt.contains("## File: todo.graphql\n```graphql\ntype Todo { id: ID! }\n```"));
        assert!(prompt.contains("📊 Query仕様"));
        assert!(prompt.contains("Write all prose in Japanese"));

        let prompt = build_prompt(&docs(), &ENGLISH);
        assert!(prompt.contains("🧱 Types"));
    }

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n{\"title\": \"API\", \"children\": [{\"title\": \"Q\"}]}\n```";
        let tree = parse_generated_tree(reply).unwrap();
        assert_eq!(tree.title, "API");
        assert_eq!(tree.children[0].title, "Q");
    }

    #[test]
    fn parses_bare_reply() {
        let tree = parse_generated_tree("  {\"title\": \"API\"}\n").unwrap();
        assert!(tree.children.is_empty());
    }

    #[test]
    fn unknown_node_type_and_null_children_are_accepted() {
        let reply = r#"{"title":"API","children":[{"title":"Q","type":"section","children":null}]}"#;
        let tree = parse_generated_tree(reply).unwrap();
        assert_eq!(tree.children[0].kind, NodeKind::Other);
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn non_json_reply_is_a_parse_error() {
        let err = parse_generated_tree("Here is your spec!").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn empty_title_is_a_shape_error() {
        let err = parse_generated_tree("{\"title\": \"\"}").unwrap_err();
        assert!(matches!(err, SourceError::Shape(_)));
    }
}
