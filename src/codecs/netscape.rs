//! Netscape bookmark HTML codec.
//!
//! The format browsers export: nested `<DL>` lists where `<DT><H3>` names a
//! folder and `<DT><A HREF=...>` carries a link. Real exports are sloppy
//! (unclosed `<DT>`, stray `<p>`, mixed case), so the decoder is a tolerant
//! single-pass tag scanner rather than a strict parser. The outermost list
//! maps onto the root topic.

use crate::types::errors::CodecError;
use crate::types::topic::TopicNode;

use super::{Decoded, Entry};

/// Decodes Netscape bookmark HTML.
///
/// An anchor without a non-empty `href` counts as skipped; anchor text falls
/// back to the href. Input with no list or anchor structure at all is
/// rejected as unrecognized.
///
/// # Errors
/// Returns [`CodecError::UnrecognizedFormat`] if the input contains neither
/// a `<dl>` list nor an anchor.
pub fn decode(input: &str) -> Result<Decoded, CodecError> {
    let mut decoded = Decoded::default();
    // Stack of open <dl> levels; named levels contribute to the path
    let mut stack: Vec<Option<String>> = Vec::new();
    let mut pending_folder: Option<String> = None;
    let mut saw_structure = false;

    let bytes = input.as_bytes();
    let mut pos = 0;
    while let Some(offset) = input[pos..].find('<') {
        let tag_start = pos + offset;
        let rest = &input[tag_start..];

        if starts_with_tag(rest, "<dl") {
            saw_structure = true;
            stack.push(pending_folder.take());
            if stack.last().map(Option::is_some).unwrap_or(false) {
                decoded.folders.push(current_path(&stack));
            }
            pos = skip_tag(input, tag_start);
        } else if starts_with_tag(rest, "</dl") {
            if stack.pop().is_none() {
                // Stray close tag, ignore
            }
            pos = skip_tag(input, tag_start);
        } else if starts_with_tag(rest, "<h3") {
            saw_structure = true;
            let content_start = skip_tag(input, tag_start);
            let (text, after) = text_until_close(input, content_start, "</h3");
            pending_folder = Some(unescape(text.trim()));
            pos = after;
        } else if starts_with_tag(rest, "<a") {
            saw_structure = true;
            let tag_end = skip_tag(input, tag_start);
            let attrs = &input[tag_start..tag_end];
            let href = attr_value(attrs, "href").map(|v| unescape(v.trim()));
            let (text, after) = text_until_close(input, tag_end, "</a");
            match href {
                Some(href) if !href.is_empty() => {
                    let title = unescape(text.trim());
                    let title = if title.is_empty() { href.clone() } else { title };
                    decoded.entries.push(Entry {
                        path: current_path(&stack),
                        title,
                        url: href,
                    });
                }
                _ => decoded.skipped += 1,
            }
            pos = after;
        } else {
            pos = skip_tag(input, tag_start);
        }

        if pos >= bytes.len() {
            break;
        }
    }

    if !saw_structure {
        return Err(CodecError::UnrecognizedFormat(
            "no <dl> list or anchor found".to_string(),
        ));
    }
    Ok(decoded)
}

/// Encodes the topic tree as Netscape bookmark HTML.
///
/// The root topic itself is the outermost list, so its bookmarks and
/// children appear at the top level and a re-import lands them back where
/// they were.
pub fn encode(root: &TopicNode) -> String {
    let mut out = String::from(
        "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
         <META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
         <TITLE>Bookmarks</TITLE>\n\
         <H1>Bookmarks</H1>\n\
         <DL><p>\n",
    );
    render_contents(root, &mut out);
    out.push_str("</DL><p>\n");
    out
}

fn render_contents(node: &TopicNode, out: &mut String) {
    for bookmark in &node.bookmarks {
        out.push_str(&format!(
            "<DT><A HREF=\"{}\">{}</A>\n",
            escape(&bookmark.url),
            escape(&bookmark.title)
        ));
    }
    for child in &node.children {
        out.push_str(&format!("<DT><H3>{}</H3>\n<DL><p>\n", escape(&child.name)));
        render_contents(child, out);
        out.push_str("</DL><p>\n");
    }
}

/// Case-insensitive check that `rest` begins with `tag` followed by a
/// non-name character, so `<a` does not match `<abbr`.
fn starts_with_tag(rest: &str, tag: &str) -> bool {
    if rest.len() < tag.len() {
        return false;
    }
    if !rest[..tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    match rest.as_bytes().get(tag.len()) {
        None => true,
        Some(b) => !b.is_ascii_alphanumeric(),
    }
}

/// Returns the index just past the `>` closing the tag that starts at `start`.
fn skip_tag(input: &str, start: usize) -> usize {
    match input[start..].find('>') {
        Some(idx) => start + idx + 1,
        None => input.len(),
    }
}

/// Byte-wise ASCII case-insensitive substring search. The needle is always
/// ASCII, so byte offsets stay valid in the UTF-8 haystack.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Collects text from `start` until the given close tag (or the next open
/// tag, for unclosed elements). Returns the text and the resume position.
fn text_until_close<'i>(input: &'i str, start: usize, close: &str) -> (&'i str, usize) {
    let rest = &input[start..];
    let mut end = rest.len();
    let mut resume_after_close = false;
    if let Some(idx) = find_ci(rest, close) {
        end = idx;
        resume_after_close = true;
    }
    // An unclosed element ends at the next tag
    if let Some(idx) = rest[..end].find('<') {
        end = idx;
        resume_after_close = false;
    }
    let text = &rest[..end];
    let resume = if resume_after_close {
        skip_tag(input, start + end)
    } else {
        start + end
    };
    (text, resume)
}

/// Extracts a quoted or bare attribute value from a tag's text.
fn attr_value<'i>(tag: &'i str, name: &str) -> Option<&'i str> {
    let mut search = 0;
    while let Some(idx) = find_ci(&tag[search..], name) {
        let at = search + idx;
        // Must be preceded by whitespace and followed by optional spaces and '='
        let preceded_ok = tag[..at]
            .chars()
            .next_back()
            .map(|c| c.is_whitespace())
            .unwrap_or(false);
        let after = &tag[at + name.len()..];
        let trimmed = after.trim_start();
        if preceded_ok && trimmed.starts_with('=') {
            let value = trimmed[1..].trim_start();
            let mut chars = value.chars();
            return match chars.next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &value[1..];
                    match body.find(quote) {
                        Some(end) => Some(&body[..end]),
                        None => Some(body),
                    }
                }
                Some(_) => {
                    let end = value
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(value.len());
                    Some(&value[..end])
                }
                None => None,
            };
        }
        search = at + name.len();
    }
    None
}

fn current_path(stack: &[Option<String>]) -> Vec<String> {
    stack.iter().filter_map(|s| s.clone()).collect()
}

/// Escapes the five characters that matter inside attribute values and text.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Reverses [`escape`]. Only the five basic entities are handled.
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
