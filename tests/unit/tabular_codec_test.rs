//! Unit tests for the CSV and JSON bookmark codecs.
//!
//! Both codecs decode into the same format-independent shape, so the cases
//! here focus on header handling, the three accepted JSON document shapes,
//! and the encoders' row and tree output.

use rstest::rstest;

use bookmarkd::codecs::{csv, json};
use bookmarkd::types::errors::CodecError;
use bookmarkd::types::topic::{NodeBookmark, TopicNode};

fn node(name: &str, bookmarks: Vec<NodeBookmark>, children: Vec<TopicNode>) -> TopicNode {
    TopicNode {
        id: format!("id-{}", name),
        name: name.to_string(),
        bookmarks,
        children,
    }
}

fn link(title: &str, url: &str) -> NodeBookmark {
    NodeBookmark {
        id: format!("b-{}", title),
        title: title.to_string(),
        url: url.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV decoding
// ---------------------------------------------------------------------------

/// Columns are matched by header name, case-insensitively and in any order.
#[rstest]
#[case("title,url,topic_path\nRust,https://www.rust-lang.org,Dev\n")]
#[case("url,title,topic_path\nhttps://www.rust-lang.org,Rust,Dev\n")]
#[case("TITLE,URL,TOPIC_PATH\nRust,https://www.rust-lang.org,Dev\n")]
#[case("Url , Title , Topic_Path\nhttps://www.rust-lang.org,Rust,Dev\n")]
fn test_csv_decode_header_variants(#[case] input: &str) {
    let decoded = csv::decode(input).unwrap();
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(decoded.entries[0].title, "Rust");
    assert_eq!(decoded.entries[0].url, "https://www.rust-lang.org");
    assert_eq!(decoded.entries[0].path, vec!["Dev"]);
}

/// Nested paths split on `/`; extra columns and a missing topic_path column
/// are both tolerated.
#[test]
fn test_csv_decode_paths_and_optional_columns() {
    let input = "url,topic_path,extra\n\
                 https://tokio.rs,Dev/Rust/Async,ignored\n\
                 https://top.example,,x\n";
    let decoded = csv::decode(input).unwrap();
    assert_eq!(decoded.entries[0].path, vec!["Dev", "Rust", "Async"]);
    assert_eq!(decoded.entries[1].path, Vec::<String>::new());
    // Without a title column the url stands in
    assert_eq!(decoded.entries[0].title, "https://tokio.rs");
    assert_eq!(decoded.folders, vec![vec![
        "Dev".to_string(),
        "Rust".to_string(),
        "Async".to_string()
    ]]);
}

/// A file without a url header is not a bookmark CSV.
#[rstest]
#[case("title,notes\nRust,good\n")]
#[case("just a line of text\nanother\n")]
fn test_csv_decode_requires_url_header(#[case] input: &str) {
    assert!(matches!(
        csv::decode(input),
        Err(CodecError::UnrecognizedFormat(_))
    ));
}

/// Rows with an empty url are skipped, not fatal; the row's path still
/// registers as a folder.
#[test]
fn test_csv_decode_skips_empty_url_rows() {
    let input = "title,url,topic_path\n\
                 No Link,,Dev\n\
                 Rust,https://www.rust-lang.org,\n";
    let decoded = csv::decode(input).unwrap();
    assert_eq!(decoded.skipped, 1);
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(decoded.folders, vec![vec!["Dev".to_string()]]);
}

/// Fields are trimmed; an empty title falls back to the url.
#[test]
fn test_csv_decode_trims_fields() {
    let input = "title,url,topic_path\n  Rust  ,  https://www.rust-lang.org  , Dev / Rust \n";
    let decoded = csv::decode(input).unwrap();
    assert_eq!(decoded.entries[0].title, "Rust");
    assert_eq!(decoded.entries[0].url, "https://www.rust-lang.org");
    assert_eq!(decoded.entries[0].path, vec!["Dev", "Rust"]);
}

// ---------------------------------------------------------------------------
// CSV encoding
// ---------------------------------------------------------------------------

/// The encoder writes one row per bookmark, depth-first, with the
/// `/`-joined path below the root.
#[test]
fn test_csv_encode_rows() {
    let tree = node(
        "root",
        vec![link("Top", "https://top.example")],
        vec![node(
            "Dev",
            vec![link("Rust", "https://www.rust-lang.org")],
            vec![node("Async", vec![link("Tokio", "https://tokio.rs")], vec![])],
        )],
    );
    let out = csv::encode(&tree).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "title,url,topic_path");
    assert_eq!(lines[1], "Top,https://top.example,");
    assert_eq!(lines[2], "Rust,https://www.rust-lang.org,Dev");
    assert_eq!(lines[3], "Tokio,https://tokio.rs,Dev/Async");
    assert_eq!(lines.len(), 4);
}

/// Encoded output decodes back to the same entries.
#[test]
fn test_csv_round_trip() {
    let tree = node(
        "root",
        vec![],
        vec![node(
            "Quotes",
            vec![link("a, \"b\"", "https://q.example")],
            vec![],
        )],
    );
    let decoded = csv::decode(&csv::encode(&tree).unwrap()).unwrap();
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(decoded.entries[0].title, "a, \"b\"");
    assert_eq!(decoded.entries[0].path, vec!["Quotes"]);
}

// ---------------------------------------------------------------------------
// JSON decoding: the three accepted shapes
// ---------------------------------------------------------------------------

/// A single root object maps onto our root: its own bookmarks land at the
/// top level and children become paths.
#[test]
fn test_json_decode_tree_shape() {
    let input = r#"{
        "name": "Bookmarks",
        "bookmarks": [{"title": "Top", "url": "https://top.example"}],
        "children": [{
            "name": "Dev",
            "bookmarks": [{"title": "Rust", "url": "https://www.rust-lang.org"}],
            "children": []
        }]
    }"#;
    let decoded = json::decode(input).unwrap();
    assert_eq!(decoded.entries.len(), 2);
    assert_eq!(decoded.entries[0].path, Vec::<String>::new());
    assert_eq!(decoded.entries[1].path, vec!["Dev"]);
    assert_eq!(decoded.folders, vec![vec!["Dev".to_string()]]);
}

/// An array of nodes makes each element a child of the root.
#[test]
fn test_json_decode_nodes_shape() {
    let input = r#"[
        {"name": "Dev", "bookmarks": [{"title": "Rust", "url": "https://www.rust-lang.org"}]},
        {"name": "News"}
    ]"#;
    let decoded = json::decode(input).unwrap();
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(decoded.entries[0].path, vec!["Dev"]);
    // Folders include the empty "News" node
    assert!(decoded.folders.contains(&vec!["News".to_string()]));
}

/// A flat array of rows works like the CSV format.
#[test]
fn test_json_decode_rows_shape() {
    let input = r#"[
        {"title": "Tokio", "url": "https://tokio.rs", "topic_path": "Dev/Async"},
        {"url": "https://top.example"},
        {"title": "No Url", "topic_path": "Dev"}
    ]"#;
    let decoded = json::decode(input).unwrap();
    assert_eq!(decoded.entries.len(), 2);
    assert_eq!(decoded.entries[0].path, vec!["Dev", "Async"]);
    assert_eq!(decoded.entries[1].title, "https://top.example");
    assert_eq!(decoded.skipped, 1);
}

/// Non-JSON input is unrecognized; valid JSON of the wrong shape is
/// malformed.
#[test]
fn test_json_decode_error_kinds() {
    assert!(matches!(
        json::decode("<html>not json</html>"),
        Err(CodecError::UnrecognizedFormat(_))
    ));
    assert!(matches!(
        json::decode("42"),
        Err(CodecError::Malformed(_))
    ));
    assert!(matches!(
        json::decode(r#"{"unexpected": true}"#),
        Err(CodecError::Malformed(_))
    ));
}

/// Bookmarks with an empty url count as skipped in the tree shape too.
#[test]
fn test_json_decode_skips_empty_urls() {
    let input = r#"{
        "name": "Bookmarks",
        "bookmarks": [{"title": "No Url", "url": "  "}],
        "children": []
    }"#;
    let decoded = json::decode(input).unwrap();
    assert!(decoded.entries.is_empty());
    assert_eq!(decoded.skipped, 1);
}

// ---------------------------------------------------------------------------
// JSON encoding
// ---------------------------------------------------------------------------

/// The encoder emits a nested object that the decoder reads back as the
/// tree shape.
#[test]
fn test_json_round_trip() {
    let tree = node(
        "My Collections",
        vec![link("Top", "https://top.example")],
        vec![node(
            "Dev",
            vec![link("Rust", "https://www.rust-lang.org")],
            vec![],
        )],
    );
    let out = json::encode(&tree).unwrap();
    // Pretty-printed, and internal ids never leak into exports
    assert!(out.contains('\n'));
    assert!(!out.contains("id-"));

    let decoded = json::decode(&out).unwrap();
    assert_eq!(decoded.entries.len(), 2);
    assert_eq!(decoded.entries[0].path, Vec::<String>::new());
    assert_eq!(decoded.entries[0].url, "https://top.example");
    assert_eq!(decoded.entries[1].path, vec!["Dev"]);
}
