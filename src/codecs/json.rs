//! JSON bookmark codec.
//!
//! Encoding produces a single nested object mirroring the root topic.
//! Decoding accepts three shapes: that root object, an array of topic
//! nodes (each becomes a child of the root), or a flat array of
//! `{title, url, topic_path}` rows.

use serde::{Deserialize, Serialize};

use crate::types::errors::CodecError;
use crate::types::topic::TopicNode;

use super::{Decoded, Entry};

#[derive(Debug, Serialize, Deserialize)]
struct JsonNode {
    name: String,
    #[serde(default)]
    bookmarks: Vec<JsonBookmark>,
    #[serde(default)]
    children: Vec<JsonNode>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonBookmark {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct FlatRow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    topic_path: String,
}

/// The accepted upload shapes, tried in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Tree(JsonNode),
    Nodes(Vec<JsonNode>),
    Rows(Vec<FlatRow>),
}

/// Decodes a JSON bookmark file.
///
/// Records with an empty url count as skipped.
///
/// # Errors
/// Returns [`CodecError::UnrecognizedFormat`] for input that is not JSON at
/// all, or [`CodecError::Malformed`] for JSON of an unexpected shape.
pub fn decode(input: &str) -> Result<Decoded, CodecError> {
    let value: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| CodecError::UnrecognizedFormat(e.to_string()))?;
    let document: Document = serde_json::from_value(value)
        .map_err(|e| CodecError::Malformed(e.to_string()))?;

    let mut decoded = Decoded::default();
    match document {
        Document::Tree(root) => {
            // The uploaded root maps onto our root topic, so only its
            // contents are walked
            collect_bookmarks(&root.bookmarks, &[], &mut decoded);
            for child in &root.children {
                walk(child, &[], &mut decoded);
            }
        }
        Document::Nodes(nodes) => {
            for node in &nodes {
                walk(node, &[], &mut decoded);
            }
        }
        Document::Rows(rows) => {
            for row in rows {
                let path: Vec<String> = row
                    .topic_path
                    .split('/')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
                if !path.is_empty() {
                    decoded.folders.push(path.clone());
                }
                let url = row.url.trim().to_string();
                if url.is_empty() {
                    decoded.skipped += 1;
                    continue;
                }
                let title = row.title.trim();
                let title = if title.is_empty() { url.clone() } else { title.to_string() };
                decoded.entries.push(Entry { path, title, url });
            }
        }
    }
    Ok(decoded)
}

fn walk(node: &JsonNode, base: &[String], decoded: &mut Decoded) {
    let mut path = base.to_vec();
    path.push(node.name.clone());
    decoded.folders.push(path.clone());
    collect_bookmarks(&node.bookmarks, &path, decoded);
    for child in &node.children {
        walk(child, &path, decoded);
    }
}

fn collect_bookmarks(bookmarks: &[JsonBookmark], path: &[String], decoded: &mut Decoded) {
    for bookmark in bookmarks {
        let url = bookmark.url.trim().to_string();
        if url.is_empty() {
            decoded.skipped += 1;
            continue;
        }
        let title = bookmark.title.trim();
        let title = if title.is_empty() { url.clone() } else { title.to_string() };
        decoded.entries.push(Entry {
            path: path.to_vec(),
            title,
            url,
        });
    }
}

/// Encodes the topic tree as a pretty-printed nested JSON object.
pub fn encode(root: &TopicNode) -> Result<String, CodecError> {
    let tree = to_json_node(root);
    serde_json::to_string_pretty(&tree).map_err(|e| CodecError::Malformed(e.to_string()))
}

fn to_json_node(node: &TopicNode) -> JsonNode {
    JsonNode {
        name: node.name.clone(),
        bookmarks: node
            .bookmarks
            .iter()
            .map(|b| JsonBookmark {
                title: b.title.clone(),
                url: b.url.clone(),
            })
            .collect(),
        children: node.children.iter().map(to_json_node).collect(),
    }
}
