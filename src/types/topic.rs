use serde::{Deserialize, Serialize};

/// A folder in the bookmark tree.
///
/// Exactly one topic has `parent_id == None`: the root. Every other topic
/// hangs off the root through a finite, acyclic parent chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub created_at: i64,
}

/// One node of the full tree snapshot returned by `TopicManager::tree`.
///
/// Children are ordered case-insensitively by name, bookmarks by title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicNode {
    pub id: String,
    pub name: String,
    pub bookmarks: Vec<NodeBookmark>,
    pub children: Vec<TopicNode>,
}

/// The bookmark projection carried inside a [`TopicNode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeBookmark {
    pub id: String,
    pub title: String,
    pub url: String,
}
