use std::fs;
use tempfile::tempdir;

use spec_publish_core::block::{ContentBlock, PageLimits};
use spec_publish_core::config::{GenerateConfig, PublishConfig};
use spec_publish_core::contract::{
    MockPageClient, MockTreeGenerator, PageId, RemotePageHandle, SourceDocuments,
};
use spec_publish_core::error::{PreconditionError, PublishError, SourceError};
use spec_publish_core::pipeline::{generate, publish};
use spec_publish_core::render::Locale;
use spec_publish_core::tree::{load_tree, ContentPayload, SpecNode};

fn generated_tree() -> SpecNode {
    SpecNode::new("API仕様書").with_children(vec![SpecNode::new("📊 Query仕様")
        .with_children(vec![SpecNode::new("todos").with_content(ContentPayload {
            summary: Some("Todo一覧を取得する".into()),
            returns: Some("[Todo!]!".into()),
            ..Default::default()
        })])])
}

#[tokio::test]
async fn generate_writes_tree_file_from_source_documents() {
    let tmp = tempdir().unwrap();
    let source_dir = tmp.path().join("graphql");
    fs::create_dir_all(&source_dir).unwrap();
    fs::write(source_dir.join("schema.graphql"), "type Query { todos: [Todo!]! }").unwrap();
    let tree_path = tmp.path().join("specs/api_spec_structured.json");

    let mut generator = MockTreeGenerator::new();
    generator
        .expect_generate()
        .withf(|docs: &SourceDocuments| docs.contains_key("schema.graphql"))
        .times(1)
        .returning(|_| Ok(generated_tree()));

    let config = GenerateConfig {
        source_dir,
        extension: "graphql".into(),
        tree_path: tree_path.clone(),
    };
    let report = generate(&config, &generator).await.expect("generate succeeds");

    assert_eq!(report.documents, 1);
    assert_eq!(report.tree_path, tree_path);
    let written = fs::read_to_string(&tree_path).unwrap();
    assert!(written.contains("\"title\": \"API仕様書\""), "non-ASCII is kept:\n{written}");
    assert_eq!(load_tree(&tree_path).unwrap(), generated_tree());
}

#[tokio::test]
async fn failed_generation_writes_nothing() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("schema.graphql"), "type Query").unwrap();
    let tree_path = tmp.path().join("out/tree.json");

    let mut generator = MockTreeGenerator::new();
    generator
        .expect_generate()
        .returning(|_| Err(SourceError::Shape("the root node has an empty title".into())));

    let config = GenerateConfig {
        source_dir: tmp.path().to_path_buf(),
        extension: "graphql".into(),
        tree_path: tree_path.clone(),
    };
    let err = generate(&config, &generator).await.unwrap_err();

    assert!(matches!(err, SourceError::Shape(_)));
    assert!(!tree_path.exists());
}

#[tokio::test]
async fn generate_without_documents_never_calls_generator() {
    let tmp = tempdir().unwrap();
    let mut generator = MockTreeGenerator::new();
    generator.expect_generate().never();

    let config = GenerateConfig {
        source_dir: tmp.path().to_path_buf(),
        extension: "graphql".into(),
        tree_path: tmp.path().join("tree.json"),
    };
    let err = generate(&config, &generator).await.unwrap_err();
    assert!(matches!(err, SourceError::NoDocuments { .. }));
}

fn publish_config(tree_path: std::path::PathBuf) -> PublishConfig {
    PublishConfig {
        tree_path,
        parent_page: PageId::new("parent-page"),
        limits: PageLimits::default(),
        locale: Locale::Ja,
        example_language: "graphql".into(),
    }
}

#[tokio::test]
async fn publish_without_tree_file_is_a_precondition_error() {
    let tmp = tempdir().unwrap();
    let mut client = MockPageClient::new();
    client.expect_create_page().never();

    let err = publish(&publish_config(tmp.path().join("missing.json")), &client)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PublishError::Precondition(PreconditionError::MissingTree(_))
    ));
}

#[tokio::test]
async fn publish_with_malformed_tree_makes_no_remote_calls() {
    let tmp = tempdir().unwrap();
    let tree_path = tmp.path().join("tree.json");
    fs::write(&tree_path, "{\"children\": []}").unwrap();
    let mut client = MockPageClient::new();
    client.expect_create_page().never();

    let err = publish(&publish_config(tree_path), &client).await.unwrap_err();

    assert!(matches!(
        err,
        PublishError::Precondition(PreconditionError::MalformedTree { .. })
    ));
}

#[tokio::test]
async fn publish_materializes_saved_tree_under_parent_page() {
    let tmp = tempdir().unwrap();
    let tree_path = tmp.path().join("tree.json");
    fs::write(&tree_path, serde_json::to_string(&generated_tree()).unwrap()).unwrap();

    let mut client = MockPageClient::new();
    let mut seq = mockall::Sequence::new();
    client
        .expect_create_page()
        .withf(|parent: &PageId, title: &str, blocks: &[ContentBlock]| {
            parent.as_str() == "parent-page" && title == "API仕様書" && blocks.is_empty()
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Ok(RemotePageHandle {
                id: PageId::new("root"),
                address: "https://www.notion.so/root".into(),
            })
        });
    client
        .expect_create_page()
        .withf(|parent: &PageId, title: &str, _: &[ContentBlock]| {
            parent.as_str() == "root" && title == "📊 Query仕様"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Ok(RemotePageHandle {
                id: PageId::new("queries"),
                address: "https://www.notion.so/queries".into(),
            })
        });
    client
        .expect_create_page()
        .withf(|parent: &PageId, title: &str, blocks: &[ContentBlock]| {
            parent.as_str() == "queries" && title == "todos" && blocks.len() == 4
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Ok(RemotePageHandle {
                id: PageId::new("todos"),
                address: "https://www.notion.so/todos".into(),
            })
        });
    client.expect_append_blocks().never();

    let report = publish(&publish_config(tree_path), &client)
        .await
        .expect("publish succeeds");

    assert_eq!(report.root.address, "https://www.notion.so/root");
    assert_eq!(report.pages_created, 3);
    assert!(report.is_complete());
}
