//! CSV bookmark codec.
//!
//! Flat row format: `title,url,topic_path` where `topic_path` is the
//! `/`-joined folder path below the root. Columns are matched by header
//! name, so files with a different column order decode the same. A flat
//! format cannot express an empty folder, so only folders that hold at
//! least one bookmark survive a round trip.

use crate::types::errors::CodecError;
use crate::types::topic::TopicNode;

use super::{Decoded, Entry};

/// Decodes a CSV bookmark file.
///
/// Rows with an empty url count as skipped.
///
/// # Errors
/// Returns [`CodecError::UnrecognizedFormat`] if there is no `url` header,
/// or [`CodecError::Malformed`] if a row cannot be read.
pub fn decode(input: &str) -> Result<Decoded, CodecError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CodecError::UnrecognizedFormat(e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let url_col = column("url").ok_or_else(|| {
        CodecError::UnrecognizedFormat("missing 'url' column header".to_string())
    })?;
    let title_col = column("title");
    let path_col = column("topic_path");

    let mut decoded = Decoded::default();
    for record in reader.records() {
        let record = record.map_err(|e| CodecError::Malformed(e.to_string()))?;
        let field = |col: Option<usize>| {
            col.and_then(|i| record.get(i)).unwrap_or("").trim().to_string()
        };

        let url = field(Some(url_col));
        let path = split_path(&field(path_col));
        if !path.is_empty() {
            decoded.folders.push(path.clone());
        }
        if url.is_empty() {
            decoded.skipped += 1;
            continue;
        }
        let title = field(title_col);
        let title = if title.is_empty() { url.clone() } else { title };
        decoded.entries.push(Entry { path, title, url });
    }
    Ok(decoded)
}

/// Encodes the topic tree as CSV, one row per bookmark, depth-first.
pub fn encode(root: &TopicNode) -> Result<String, CodecError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["title", "url", "topic_path"])
        .map_err(|e| CodecError::Malformed(e.to_string()))?;
    write_rows(root, &[], &mut writer)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| CodecError::Malformed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CodecError::Malformed(e.to_string()))
}

fn write_rows(
    node: &TopicNode,
    path: &[String],
    writer: &mut csv::Writer<Vec<u8>>,
) -> Result<(), CodecError> {
    let joined = path.join("/");
    for bookmark in &node.bookmarks {
        writer
            .write_record([bookmark.title.as_str(), bookmark.url.as_str(), &joined])
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
    }
    for child in &node.children {
        let mut child_path = path.to_vec();
        child_path.push(child.name.clone());
        write_rows(child, &child_path, writer)?;
    }
    Ok(())
}

fn split_path(joined: &str) -> Vec<String> {
    joined
        .split('/')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
