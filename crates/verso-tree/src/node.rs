//! Rich-text document tree in the editor's JSON form.
//!
//! A document is a tree of [`Node`]s. Containers carry a `type`, optional
//! `attrs`, and optional ordered `content`; text leaves carry `text` and a
//! list of style `marks`:
//!
//! ```json
//! {"type": "doc", "content": [
//!   {"type": "paragraph", "content": [
//!     {"type": "text", "text": "Hello", "marks": [{"type": "bold"}]}
//!   ]}
//! ]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TreeError, TreeResult};

/// Container attributes. A missing `attrs` key and `{}` are the same.
pub type Attrs = Map<String, Value>;

/// A style annotation on a node, such as `bold` or `link`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Value>,
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs: None,
        }
    }

    pub(crate) fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.mark_type.clone()));
        if let Some(attrs) = &self.attrs {
            obj.insert("attrs".into(), attrs.clone());
        }
        Value::Object(obj)
    }
}

/// A container node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub node_type: String,
    pub attrs: Attrs,
    pub marks: Vec<Mark>,
    /// `None` if the node has no `content` key at all.
    pub children: Option<Vec<Node>>,
}

/// A text leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    pub text: String,
    pub marks: Vec<Mark>,
}

/// A node of a document tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    /// A container with children.
    pub fn element(node_type: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Element(Element {
            node_type: node_type.into(),
            attrs: Attrs::new(),
            marks: Vec::new(),
            children: Some(children),
        })
    }

    /// A container with no `content` key, such as a horizontal rule.
    pub fn leaf(node_type: impl Into<String>) -> Self {
        Self::Element(Element {
            node_type: node_type.into(),
            attrs: Attrs::new(),
            marks: Vec::new(),
            children: None,
        })
    }

    pub fn doc(children: Vec<Node>) -> Self {
        Self::element("doc", children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::element("paragraph", children)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(Text {
            text: text.into(),
            marks: Vec::new(),
        })
    }

    /// Set one attribute. No-op on text leaves.
    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        if let Self::Element(e) = &mut self {
            e.attrs.insert(key.into(), value);
        }
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        match &mut self {
            Self::Element(e) => e.marks = marks,
            Self::Text(t) => t.marks = marks,
        }
        self
    }

    /// The node's `type` string; `"text"` for text leaves.
    pub fn node_type(&self) -> &str {
        match self {
            Self::Element(e) => &e.node_type,
            Self::Text(_) => "text",
        }
    }

    pub fn marks(&self) -> &[Mark] {
        match self {
            Self::Element(e) => &e.marks,
            Self::Text(t) => &t.marks,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Self::Element(e) => e.children.as_deref(),
            Self::Text(_) => None,
        }
    }

    /// The identity used to align siblings: same `type`, and then same
    /// `text` for leaves or same `attrs` for containers.
    ///
    /// Weaker than `==`: children and marks are ignored.
    pub fn same_structure(&self, other: &Node) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.text == b.text,
            (Self::Element(a), Self::Element(b)) => a.node_type == b.node_type && a.attrs == b.attrs,
            _ => false,
        }
    }

    /// Parse a node strictly from JSON.
    pub fn from_json_str(s: &str) -> TreeResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> TreeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Parse stored content into a document tree, never failing.
///
/// Content that is not a JSON node (legacy plain text, for instance) is
/// wrapped as `doc > paragraph > text` so that it can still be compared.
pub fn parse_document(content: &str) -> Node {
    match Node::from_json_str(content) {
        Ok(node) => node,
        Err(_) if content.is_empty() => Node::doc(vec![Node::paragraph(Vec::new())]),
        Err(_) => Node::doc(vec![Node::paragraph(vec![Node::text(content)])]),
    }
}

/// The node as it appears on the wire.
#[derive(Serialize, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attrs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marks: Option<Vec<Mark>>,
}

impl TryFrom<RawNode> for Node {
    type Error = TreeError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let marks = raw.marks.unwrap_or_default();
        if raw.node_type == "text" {
            return Ok(Self::Text(Text {
                text: raw.text.unwrap_or_default(),
                marks,
            }));
        }
        let attrs = match raw.attrs {
            None | Some(Value::Null) => Attrs::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(TreeError::InvalidNode(format!(
                    "attrs of `{}` must be an object, got {other}",
                    raw.node_type
                )))
            }
        };
        Ok(Self::Element(Element {
            node_type: raw.node_type,
            attrs,
            marks,
            children: raw.content,
        }))
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Element(e) => RawNode {
                node_type: e.node_type,
                attrs: (!e.attrs.is_empty()).then_some(Value::Object(e.attrs)),
                content: e.children,
                text: None,
                marks: (!e.marks.is_empty()).then_some(e.marks),
            },
            Node::Text(t) => RawNode {
                node_type: "text".into(),
                attrs: None,
                content: None,
                text: Some(t.text),
                marks: (!t.marks.is_empty()).then_some(t.marks),
            },
        }
    }
}
