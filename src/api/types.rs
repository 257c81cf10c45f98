//! Wire types for the blog API
//!
//! Posts are kept as opaque JSON. Only the id and the pinned flag are
//! interpreted; everything else is written back out verbatim.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a post
///
/// The API reports ids as JSON numbers, but they are only ever compared for
/// equality, sent back as a cursor, and used as file names, so they are held
/// as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an id from either a JSON number or a JSON string
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single post as returned by the API
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Post {
    id: PostId,
    is_pinned: bool,
    payload: Value,
}

impl Post {
    /// Wraps a raw JSON post, extracting the fields the harvester relies on
    pub fn from_json(payload: Value) -> Result<Self, String> {
        let object = payload
            .as_object()
            .ok_or_else(|| "post is not a JSON object".to_string())?;

        let id = object
            .get("id_string")
            .and_then(PostId::from_json)
            .or_else(|| object.get("id").and_then(PostId::from_json))
            .ok_or_else(|| "post has no usable id".to_string())?;

        let is_pinned = object
            .get("is_pinned")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            id,
            is_pinned,
            payload,
        })
    }

    pub fn id(&self) -> &PostId {
        &self.id
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    /// The complete post exactly as the API sent it
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

impl TryFrom<Value> for Post {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

impl Serialize for Post {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

/// One page of the posts listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    /// Posts on this page, newest first
    #[serde(default)]
    pub posts: Vec<Post>,

    /// Total posts on the blog as reported at fetch time
    #[serde(default)]
    pub total_posts: u64,
}

/// Blog metadata as returned by the info endpoint
#[derive(Debug, Clone)]
pub struct BlogInfo {
    /// Short name, e.g. `staff`
    pub name: String,

    /// Canonical identifier, stable across renames
    pub uuid: String,

    /// Total number of posts
    pub total_posts: u64,

    /// The full `response` object, kept for the `blog_info` sidecar
    pub raw: Value,
}

impl BlogInfo {
    /// Extracts blog metadata from an info `response` object
    pub fn from_json(raw: Value) -> Result<Self, String> {
        let blog = raw
            .get("blog")
            .and_then(Value::as_object)
            .ok_or_else(|| "response has no blog object".to_string())?;

        let name = blog
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| "blog has no name".to_string())?
            .to_string();

        let uuid = blog
            .get("uuid")
            .and_then(Value::as_str)
            .ok_or_else(|| "blog has no uuid".to_string())?
            .to_string();

        let total_posts = blog
            .get("total_posts")
            .or_else(|| blog.get("posts"))
            .and_then(Value::as_u64)
            .unwrap_or(0);

        Ok(Self {
            name,
            uuid,
            total_posts,
            raw,
        })
    }
}

/// Parameters of a single posts request
///
/// This is also what a run reports as its final request, so a caller can
/// resume by feeding `before_id` back in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageParams {
    /// Cursor: only posts older than this id are returned
    pub before_id: Option<PostId>,

    /// Requested page length
    pub limit: u32,

    /// Include reblog information in each post
    pub reblog_info: bool,

    /// Pass-through transport parameters
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl PageParams {
    /// Flattens the parameters into query pairs, omitting an absent cursor
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(3 + self.extra.len());
        if let Some(before_id) = &self.before_id {
            query.push(("before_id".to_string(), before_id.to_string()));
        }
        query.push(("limit".to_string(), self.limit.to_string()));
        query.push(("reblog_info".to_string(), self.reblog_info.to_string()));
        for (key, value) in &self.extra {
            query.push((key.clone(), value.clone()));
        }
        query
    }
}
