//! bookmarkd, a self-hosted personal bookmark manager.
//!
//! Bookmarks live in a tree of topics rooted at a single "My Collections"
//! topic, stored in SQLite. The crate exposes the storage managers, the
//! bookmark-file codecs (Netscape HTML, CSV, JSON), the import/probe
//! services, and the axum HTTP surface used by the `bookmarkd` binary.

pub mod codecs;
pub mod database;
pub mod http;
pub mod managers;
pub mod services;
pub mod types;
