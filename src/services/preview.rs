//! Server-side preview renderer.
//!
//! Many sites refuse to load inside an iframe, so the preview pane asks us
//! for a rendition instead: YouTube links become an embedded player, GitHub
//! repositories get their README, and everything else is fetched and
//! reduced to its text. Every failure path renders a styled fallback page;
//! nothing here returns an error.

use std::time::Duration;

use crate::codecs::netscape::escape as escape_html;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// Largest slice of extracted page text relayed to the preview pane.
const MAX_TEXT_CHARS: usize = 4000;

/// Pages with less extracted text than this render the fallback instead.
const MIN_TEXT_CHARS: usize = 150;

/// Stateless preview renderer holding one outbound HTTP client.
#[derive(Clone)]
pub struct PreviewService {
    client: reqwest::Client,
}

impl PreviewService {
    /// Creates a renderer with a 10 second timeout and a browser User-Agent.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Renders a preview page for the URL. Always returns HTML.
    pub async fn render(&self, url: &str) -> String {
        let host = host_of(url);
        if host.is_empty() {
            return fallback_page(url, "The address could not be parsed.");
        }

        if host.contains("youtube.com") || host.contains("youtu.be") {
            if let Some(page) = youtube_embed(url, &host) {
                return page;
            }
        }

        if host == "github.com" || host == "www.github.com" {
            if let Some(page) = self.github_readme(url).await {
                return page;
            }
        }

        self.generic_preview(url).await
    }

    /// Fetches the repository README from the raw host, trying the default
    /// branch aliases in order.
    async fn github_readme(&self, url: &str) -> Option<String> {
        let segments = path_segments(url);
        if segments.len() < 2 {
            return None;
        }
        let (owner, repo) = (segments[0], segments[1]);

        for branch in ["HEAD", "main", "master"] {
            let raw = format!(
                "https://raw.githubusercontent.com/{}/{}/{}/README.md",
                owner, repo, branch
            );
            let response = match self.client.get(&raw).send().await {
                Ok(r) => r,
                Err(_) => continue,
            };
            if !response.status().is_success() {
                continue;
            }
            let text = match response.text().await {
                Ok(t) => t,
                Err(_) => continue,
            };
            if text.trim().is_empty() {
                continue;
            }
            let title = format!("{}/{} README", owner, repo);
            return Some(format!(
                "<html><head><meta charset='utf-8'><title>{title}</title>\
                 <style>body{{background:#0b0c10;color:#e9eaee;\
                 font:14px/1.5 -apple-system,BlinkMacSystemFont,Segoe UI,Roboto,Inter,Ubuntu;\
                 padding:20px}} a{{color:#4f8cff}} \
                 pre{{white-space:pre-wrap;word-break:break-word}}</style></head>\
                 <body><h2>{title}</h2><pre>{body}</pre></body></html>",
                title = escape_html(&title),
                body = escape_html(&truncate_chars(&text, MAX_TEXT_CHARS)),
            ));
        }
        None
    }

    /// Fetches the page, strips active content, and relays title plus a
    /// bounded portion of the text.
    async fn generic_preview(&self, url: &str) -> String {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(_) => {
                return fallback_page(url, "The site could not be reached. Check that the URL is correct.")
            }
        };
        let status = response.status();
        if status.as_u16() >= 400 {
            return fallback_page(
                url,
                &format!("The site could not be loaded (HTTP status {}).", status.as_u16()),
            );
        }
        let html = match response.text().await {
            Ok(t) => t,
            Err(_) => return fallback_page(url, "The site's response could not be read."),
        };

        let mut cleaned = html;
        for tag in ["script", "noscript", "style", "iframe"] {
            cleaned = strip_blocks(&cleaned, tag);
        }

        let title = extract_title(&cleaned).unwrap_or_else(|| url.to_string());
        let text = collapse_whitespace(&strip_tags(&cleaned));

        if text.chars().count() < MIN_TEXT_CHARS {
            return fallback_page(
                url,
                "This page cannot be previewed; it is too short or requires JavaScript.",
            );
        }

        format!(
            "<html><head><meta charset='utf-8'><title>{title}</title>\
             <style>body{{background:#0b0c10;color:#e9eaee;\
             font:14px/1.6 -apple-system,BlinkMacSystemFont,Segoe UI,Roboto,Inter,Ubuntu;\
             padding:20px}} a{{color:#4f8cff}} \
             pre{{white-space:pre-wrap;word-break:break-word}}</style></head>\
             <body><h2>{title}</h2><pre>{body}</pre>\
             <p style='margin-top:2rem;'><a style='background:#4f8cff;color:#fff;\
             padding:8px 12px;border-radius:8px;text-decoration:none' target='_blank' \
             href='{href}'>Open in a new window</a></p></body></html>",
            title = escape_html(&title),
            body = escape_html(&truncate_chars(&text, MAX_TEXT_CHARS)),
            href = escape_html(url),
        )
    }
}

impl Default for PreviewService {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the embedded-player page for YouTube watch/short links.
fn youtube_embed(url: &str, host: &str) -> Option<String> {
    let mut video_id = query_param(url, "v");
    if video_id.is_none() && host.contains("youtu.be") {
        video_id = path_segments(url).first().map(|s| s.to_string());
    }
    let video_id: String = video_id?
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if video_id.is_empty() {
        return None;
    }
    Some(format!(
        "<html><body style=\"margin:0;background:#0b0c10\">\
         <iframe src=\"https://www.youtube.com/embed/{video_id}\" \
         style=\"border:0;width:100%;height:100vh\" \
         allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; \
         picture-in-picture; web-share\" allowfullscreen \
         sandbox=\"allow-scripts allow-same-origin allow-forms allow-popups\">\
         </iframe></body></html>"
    ))
}

/// The fallback page shown when a preview cannot be produced.
fn fallback_page(url: &str, message: &str) -> String {
    format!(
        "<html><head><meta charset='utf-8'><title>Preview unavailable</title>\
         <style>body{{background:#0b0c10;color:#e9eaee;\
         font:16px/1.6 -apple-system,BlinkMacSystemFont,Segoe UI,Roboto,Inter,Ubuntu;\
         text-align:center;display:flex;align-items:center;justify-content:center;\
         height:100vh;margin:0;padding:20px}} \
         .container{{max-width:500px}} p{{color:#9aa0aa}} \
         .btn{{display:inline-block;padding:12px 20px;background:#4f8cff;color:#fff;\
         border-radius:8px;text-decoration:none;margin-top:20px}}</style></head>\
         <body><div class=\"container\"><h2>Preview unavailable</h2><p>{message}</p>\
         <a class='btn' target='_blank' href='{href}'>Open in a new window</a>\
         </div></body></html>",
        message = escape_html(message),
        href = escape_html(url),
    )
}

/// Extracts the host portion of a URL, lowercased.
fn host_of(url: &str) -> String {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => return String::new(),
    };
    let end = rest
        .find(|c| c == '/' || c == '?' || c == '#')
        .unwrap_or(rest.len());
    let authority = &rest[..end];
    let host = match authority.rfind('@') {
        Some(idx) => &authority[idx + 1..],
        None => authority,
    };
    let host = match host.find(':') {
        Some(idx) => &host[..idx],
        None => host,
    };
    host.to_lowercase()
}

/// Path segments after the host, before query/fragment.
fn path_segments(url: &str) -> Vec<&str> {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => return Vec::new(),
    };
    let path_start = match rest.find('/') {
        Some(idx) => idx + 1,
        None => return Vec::new(),
    };
    let path = &rest[path_start..];
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

/// First value of a query parameter, percent-decoding left alone.
fn query_param(url: &str, name: &str) -> Option<String> {
    let query_start = url.find('?')? + 1;
    let query = &url[query_start..];
    let end = query.find('#').unwrap_or(query.len());
    for pair in query[..end].split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() == Some(name) {
            return Some(parts.next().unwrap_or("").to_string());
        }
    }
    None
}

/// Removes `<tag ...>...</tag>` blocks, case-insensitively.
fn strip_blocks(html: &str, tag: &str) -> String {
    let open = format!("<{}", tag);
    let close = format!("</{}", tag);
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(idx) = find_ci(&html[pos..], &open) {
        let start = pos + idx;
        // Reject prefix matches such as <style> vs <styleguide>
        let after = html[start + open.len()..].chars().next();
        if matches!(after, Some(c) if c.is_ascii_alphanumeric()) {
            out.push_str(&html[pos..start + open.len()]);
            pos = start + open.len();
            continue;
        }
        out.push_str(&html[pos..start]);
        match find_ci(&html[start..], &close) {
            Some(close_idx) => {
                let close_at = start + close_idx;
                pos = match html[close_at..].find('>') {
                    Some(gt) => close_at + gt + 1,
                    None => html.len(),
                };
            }
            None => {
                pos = html.len();
            }
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// Replaces every tag with a space.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn extract_title(html: &str) -> Option<String> {
    let start = find_ci(html, "<title")?;
    let content_start = html[start..].find('>')? + start + 1;
    let end = find_ci(&html[content_start..], "</title")? + content_start;
    let title = collapse_whitespace(&html[content_start..end]);
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Byte-wise ASCII case-insensitive substring search.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}
