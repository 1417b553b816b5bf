//! Structural diff of two document trees.
//!
//! The result is a single merged tree in which every node carries a
//! [`Change`]. Sibling sequences are aligned in four passes:
//!
//! 1. LCS over exact subtree equality anchors untouched siblings.
//! 2. Unanchored siblings with an exact twin on the other side are moves.
//!    They are emitted once, at their new position.
//! 3. Inside each gap between anchors, LCS over [`Node::same_structure`]
//!    pairs edited siblings, which are diffed recursively.
//! 4. Inside what is still unmatched, text leaves with identical marks are
//!    paired in order and diffed character by character.
//!
//! Everything left over is emitted whole as removed (old side) or added
//! (new side).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use similar::{ChangeTag, TextDiff};

use crate::align::{gaps, lcs, pair_in_order};
use crate::node::{Attrs, Mark, Node, Text};

/// How a node of the merged tree relates to the two inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Unchanged,
    Added,
    Removed,
    Moved,
}

impl Change {
    /// The annotation mark appended in the editor rendering.
    pub fn mark_type(self) -> Option<&'static str> {
        match self {
            Self::Unchanged => None,
            Self::Added => Some("add"),
            Self::Removed => Some("remove"),
            Self::Moved => Some("move"),
        }
    }
}

/// A node of the merged diff tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffNode {
    Element {
        node_type: String,
        attrs: Attrs,
        marks: Vec<Mark>,
        children: Option<Vec<DiffNode>>,
        change: Change,
    },
    Text {
        text: String,
        marks: Vec<Mark>,
        change: Change,
    },
}

impl DiffNode {
    /// Copy `node` with `change` applied to it and every descendant.
    pub fn tagged(node: &Node, change: Change) -> Self {
        match node {
            Node::Element(e) => Self::Element {
                node_type: e.node_type.clone(),
                attrs: e.attrs.clone(),
                marks: e.marks.clone(),
                children: e
                    .children
                    .as_ref()
                    .map(|c| c.iter().map(|n| Self::tagged(n, change)).collect()),
                change,
            },
            Node::Text(t) => Self::Text {
                text: t.text.clone(),
                marks: t.marks.clone(),
                change,
            },
        }
    }

    pub fn change(&self) -> Change {
        match self {
            Self::Element { change, .. } | Self::Text { change, .. } => *change,
        }
    }

    pub fn node_type(&self) -> &str {
        match self {
            Self::Element { node_type, .. } => node_type,
            Self::Text { .. } => "text",
        }
    }

    /// The node's own marks, without the annotation mark.
    pub fn marks(&self) -> &[Mark] {
        match self {
            Self::Element { marks, .. } | Self::Text { marks, .. } => marks,
        }
    }

    pub fn children(&self) -> Option<&[DiffNode]> {
        match self {
            Self::Element { children, .. } => children.as_deref(),
            Self::Text { .. } => None,
        }
    }

    /// Visit every leaf: text nodes and childless containers.
    pub fn for_each_leaf(&self, f: &mut impl FnMut(&DiffNode)) {
        match self.children() {
            Some(children) if !children.is_empty() => {
                for child in children {
                    child.for_each_leaf(f);
                }
            }
            _ => f(self),
        }
    }

    /// `true` if this node or any descendant is annotated.
    pub fn has_changes(&self) -> bool {
        self.change() != Change::Unchanged
            || self
                .children()
                .is_some_and(|c| c.iter().any(DiffNode::has_changes))
    }

    /// Render in the editor's JSON form, appending an annotation mark to
    /// every changed node.
    pub fn to_tiptap_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.node_type().to_string()));
        let marks = match self {
            Self::Element {
                attrs,
                marks,
                children,
                ..
            } => {
                if !attrs.is_empty() {
                    obj.insert("attrs".into(), Value::Object(attrs.clone()));
                }
                if let Some(children) = children {
                    obj.insert(
                        "content".into(),
                        Value::Array(children.iter().map(DiffNode::to_tiptap_json).collect()),
                    );
                }
                marks
            }
            Self::Text { text, marks, .. } => {
                obj.insert("text".into(), Value::String(text.clone()));
                marks
            }
        };

        let mut rendered: Vec<Value> = marks.iter().map(Mark::to_json).collect();
        if let Some(mark) = self.change().mark_type() {
            rendered.push(Mark::new(mark).to_json());
        }
        if !rendered.is_empty() {
            obj.insert("marks".into(), Value::Array(rendered));
        }
        Value::Object(obj)
    }
}

/// Leaf counts by change kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub moved: usize,
    pub unchanged: usize,
}

/// The merged tree produced by comparing two documents.
///
/// Usually one root. Two roots appear when the root types differ: the old
/// root removed, then the new root added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentDiff {
    pub roots: Vec<DiffNode>,
}

impl DocumentDiff {
    pub fn has_changes(&self) -> bool {
        self.roots.iter().any(DiffNode::has_changes)
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for root in &self.roots {
            root.for_each_leaf(&mut |leaf| match leaf.change() {
                Change::Added => stats.added += 1,
                Change::Removed => stats.removed += 1,
                Change::Moved => stats.moved += 1,
                Change::Unchanged => stats.unchanged += 1,
            });
        }
        stats
    }

    /// Render as a single editor document.
    ///
    /// A lone root is rendered as is; several roots are wrapped in a `doc`.
    pub fn to_tiptap_json(&self) -> Value {
        match self.roots.as_slice() {
            [root] => root.to_tiptap_json(),
            roots => serde_json::json!({
                "type": "doc",
                "content": roots.iter().map(DiffNode::to_tiptap_json).collect::<Vec<_>>(),
            }),
        }
    }
}

/// Compare two stored contents.
///
/// Contents that are not document JSON are compared as plain text, see
/// [`crate::parse_document`].
pub fn diff_documents(old: &str, new: &str) -> DocumentDiff {
    diff_trees(&crate::parse_document(old), &crate::parse_document(new))
}

pub fn diff_trees(old: &Node, new: &Node) -> DocumentDiff {
    DocumentDiff {
        roots: diff_nodes(Some(old), Some(new)),
    }
}

/// Diff two optional nodes into a sequence of merged nodes.
///
/// A node present on one side only is emitted whole, tagged added or removed.
pub fn diff_nodes(old: Option<&Node>, new: Option<&Node>) -> Vec<DiffNode> {
    match (old, new) {
        (None, None) => Vec::new(),
        (None, Some(new)) => vec![DiffNode::tagged(new, Change::Added)],
        (Some(old), None) => vec![DiffNode::tagged(old, Change::Removed)],
        (Some(old), Some(new)) => diff_pair(old, new),
    }
}

fn replace(old: &Node, new: &Node) -> Vec<DiffNode> {
    vec![
        DiffNode::tagged(old, Change::Removed),
        DiffNode::tagged(new, Change::Added),
    ]
}

fn diff_pair(old: &Node, new: &Node) -> Vec<DiffNode> {
    if old == new {
        return vec![DiffNode::tagged(new, Change::Unchanged)];
    }
    match (old, new) {
        // Equal text with different marks: a style change shown as a replace.
        (Node::Text(o), Node::Text(n)) if o.text == n.text => replace(old, new),
        (Node::Text(o), Node::Text(n)) => diff_text(o, n),
        // Childless and structurally equal: the right-hand node, unannotated.
        (Node::Element(o), Node::Element(n))
            if o.node_type == n.node_type
                && o.attrs == n.attrs
                && o.children.is_none()
                && n.children.is_none() =>
        {
            vec![DiffNode::tagged(new, Change::Unchanged)]
        }
        (Node::Element(o), Node::Element(n)) if o.node_type == n.node_type && o.attrs == n.attrs => {
            let children = align_children(
                o.children.as_deref().unwrap_or_default(),
                n.children.as_deref().unwrap_or_default(),
            );
            vec![DiffNode::Element {
                node_type: n.node_type.clone(),
                attrs: n.attrs.clone(),
                marks: n.marks.clone(),
                children: Some(children),
                change: Change::Unchanged,
            }]
        }
        _ => replace(old, new),
    }
}

/// Character-level diff of two text leaves, as alternating runs.
fn diff_text(old: &Text, new: &Text) -> Vec<DiffNode> {
    let diff = TextDiff::from_chars(old.text.as_str(), new.text.as_str());
    let mut runs: Vec<(ChangeTag, String)> = Vec::new();
    for change in diff.iter_all_changes() {
        match runs.last_mut() {
            Some((tag, run)) if *tag == change.tag() => run.push_str(change.value()),
            _ => runs.push((change.tag(), change.value().to_string())),
        }
    }

    runs.into_iter()
        .map(|(tag, text)| {
            let (marks, change) = match tag {
                ChangeTag::Equal => (&old.marks, Change::Unchanged),
                ChangeTag::Delete => (&old.marks, Change::Removed),
                ChangeTag::Insert => (&new.marks, Change::Added),
            };
            DiffNode::Text {
                text,
                marks: marks.clone(),
                change,
            }
        })
        .collect()
}

fn align_children(old: &[Node], new: &[Node]) -> Vec<DiffNode> {
    let all_old: Vec<usize> = (0..old.len()).collect();
    let all_new: Vec<usize> = (0..new.len()).collect();

    let anchors = lcs(&all_old, &all_new, |i, j| old[i] == new[j]);

    let mut anchored_old = vec![false; old.len()];
    for &(i, _) in &anchors {
        anchored_old[i] = true;
    }

    // Moves: exact twins left unanchored on both sides, matched in order.
    let mut moved_from = vec![false; old.len()];
    let mut moved_to = vec![false; new.len()];
    let mut anchored_new = vec![false; new.len()];
    for &(_, j) in &anchors {
        anchored_new[j] = true;
    }
    for j in (0..new.len()).filter(|&j| !anchored_new[j]) {
        let twin = (0..old.len()).find(|&i| !anchored_old[i] && !moved_from[i] && old[i] == new[j]);
        if let Some(i) = twin {
            moved_from[i] = true;
            moved_to[j] = true;
        }
    }

    let mut out = Vec::with_capacity(new.len());
    for (k, gap) in gaps(&anchors, &all_old, &all_new).into_iter().enumerate() {
        let old_rest: Vec<usize> = gap.old.into_iter().filter(|&i| !moved_from[i]).collect();
        emit_gap(old, new, &old_rest, &gap.new, &moved_to, &mut out);
        if let Some(&(_, j)) = anchors.get(k) {
            out.push(DiffNode::tagged(&new[j], Change::Unchanged));
        }
    }
    out
}

/// Emit one gap between anchors. `new_run` still contains moved nodes, which
/// are emitted in place but never paired.
fn emit_gap(
    old: &[Node],
    new: &[Node],
    old_run: &[usize],
    new_run: &[usize],
    moved_to: &[bool],
    out: &mut Vec<DiffNode>,
) {
    let candidates: Vec<usize> = new_run.iter().copied().filter(|&j| !moved_to[j]).collect();

    let structural = lcs(old_run, &candidates, |i, j| old[i].same_structure(&new[j]));
    let mut pairs = Vec::with_capacity(structural.len());
    for (k, sub) in gaps(&structural, old_run, &candidates).into_iter().enumerate() {
        pairs.extend(pair_in_order(&sub.old, &sub.new, |i, j| match (&old[i], &new[j]) {
            (Node::Text(a), Node::Text(b)) => a.marks == b.marks,
            _ => false,
        }));
        if let Some(&pair) = structural.get(k) {
            pairs.push(pair);
        }
    }

    let unpaired_new = |j: usize| {
        if moved_to[j] {
            DiffNode::tagged(&new[j], Change::Moved)
        } else {
            DiffNode::tagged(&new[j], Change::Added)
        }
    };

    let (mut oi, mut nj) = (0, 0);
    for (i, j) in pairs {
        while let Some(&x) = old_run.get(oi) {
            oi += 1;
            if x == i {
                break;
            }
            out.push(DiffNode::tagged(&old[x], Change::Removed));
        }
        while let Some(&y) = new_run.get(nj) {
            nj += 1;
            if y == j {
                break;
            }
            out.push(unpaired_new(y));
        }
        out.extend(diff_pair(&old[i], &new[j]));
    }
    for &x in old_run.get(oi..).unwrap_or_default() {
        out.push(DiffNode::tagged(&old[x], Change::Removed));
    }
    for &y in new_run.get(nj..).unwrap_or_default() {
        out.push(unpaired_new(y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(text: &str) -> Node {
        Node::paragraph(vec![Node::text(text)])
    }

    fn doc(children: Vec<Node>) -> Node {
        Node::doc(children)
    }

    fn leaves(diff: &DocumentDiff) -> Vec<(String, Change)> {
        let mut out = Vec::new();
        for root in &diff.roots {
            root.for_each_leaf(&mut |leaf| {
                if let DiffNode::Text { text, change, .. } = leaf {
                    out.push((text.clone(), *change));
                }
            });
        }
        out
    }

    #[test]
    fn identical_documents_have_no_annotations() {
        let d = doc(vec![p("one"), p("two"), Node::leaf("horizontalRule")]);
        let diff = diff_trees(&d, &d);
        assert!(!diff.has_changes());
        assert_eq!(diff.stats().unchanged, 3);
        assert_eq!(diff.to_tiptap_json(), serde_json::to_value(&d).unwrap());
    }

    #[test]
    fn swapped_paragraphs_are_a_move_not_an_edit() {
        let a = doc(vec![p("first"), p("second")]);
        let b = doc(vec![p("second"), p("first")]);
        let stats = diff_trees(&a, &b).stats();
        assert_eq!(stats.added, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.unchanged, 1);
    }

    #[test]
    fn moved_node_is_emitted_once_at_new_position() {
        let a = doc(vec![p("a"), p("b"), p("c")]);
        let b = doc(vec![p("b"), p("c"), p("a")]);
        let diff = diff_trees(&a, &b);
        let children = diff.roots[0].children().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[2].change(), Change::Moved);
        assert_eq!(leaves(&diff)[2], ("a".into(), Change::Moved));
    }

    #[test]
    fn inserted_paragraph_is_added_in_place() {
        let a = doc(vec![p("one"), p("three")]);
        let b = doc(vec![p("one"), p("two"), p("three")]);
        let diff = diff_trees(&a, &b);
        assert_eq!(
            leaves(&diff),
            vec![
                ("one".into(), Change::Unchanged),
                ("two".into(), Change::Added),
                ("three".into(), Change::Unchanged),
            ]
        );
        // The whole subtree carries the tag, not just its leaves.
        assert_eq!(diff.roots[0].children().unwrap()[1].change(), Change::Added);
    }

    #[test]
    fn deleted_paragraph_is_removed() {
        let a = doc(vec![p("one"), p("two")]);
        let b = doc(vec![p("one")]);
        let stats = diff_trees(&a, &b).stats();
        assert_eq!(stats, DiffStats { added: 0, removed: 1, moved: 0, unchanged: 1 });
    }

    #[test]
    fn edited_text_is_diffed_by_character() {
        let a = doc(vec![p("Hello world")]);
        let b = doc(vec![p("Hello, world")]);
        let diff = diff_trees(&a, &b);
        assert_eq!(
            leaves(&diff),
            vec![
                ("Hello".into(), Change::Unchanged),
                (",".into(), Change::Added),
                (" world".into(), Change::Unchanged),
            ]
        );
    }

    #[test]
    fn replaced_characters_keep_both_sides() {
        let a = Node::text("cat");
        let b = Node::text("cut");
        let runs = leaves(&diff_trees(&a, &b));
        let side = |keep: Change| -> String {
            runs.iter()
                .filter(|(_, c)| *c == Change::Unchanged || *c == keep)
                .map(|(t, _)| t.as_str())
                .collect()
        };
        assert_eq!(side(Change::Removed), "cat");
        assert_eq!(side(Change::Added), "cut");
        assert_eq!(runs[0], ("c".into(), Change::Unchanged));
        assert_eq!(runs.last(), Some(&("t".into(), Change::Unchanged)));
    }

    #[test]
    fn style_only_change_is_a_replace() {
        let a = doc(vec![Node::paragraph(vec![Node::text("bold?")])]);
        let b = doc(vec![Node::paragraph(vec![
            Node::text("bold?").with_marks(vec![Mark::new("bold")]),
        ])]);
        let diff = diff_trees(&a, &b);
        assert_eq!(
            leaves(&diff),
            vec![("bold?".into(), Change::Removed), ("bold?".into(), Change::Added)]
        );
    }

    #[test]
    fn differently_marked_runs_are_not_char_diffed() {
        let bold = vec![Mark::new("bold")];
        let a = doc(vec![Node::paragraph(vec![Node::text("plain")])]);
        let b = doc(vec![Node::paragraph(vec![Node::text("plane").with_marks(bold)])]);
        let stats = diff_trees(&a, &b).stats();
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.unchanged, 0);
    }

    #[test]
    fn type_change_emits_both_subtrees() {
        let a = doc(vec![p("x")]);
        let b = doc(vec![Node::element("heading", vec![Node::text("x")])]);
        let diff = diff_trees(&a, &b);
        let children = diff.roots[0].children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!((children[0].node_type(), children[0].change()), ("paragraph", Change::Removed));
        assert_eq!((children[1].node_type(), children[1].change()), ("heading", Change::Added));
    }

    #[test]
    fn attr_change_without_children_is_a_replace() {
        let a = Node::leaf("image").with_attr("src", json!("a.png"));
        let b = Node::leaf("image").with_attr("src", json!("b.png"));
        let diff = diff_trees(&a, &b);
        assert_eq!(diff.roots.len(), 2);
        assert_eq!(diff.roots[0].change(), Change::Removed);
        assert_eq!(diff.roots[1].change(), Change::Added);
    }

    #[test]
    fn childless_nodes_with_equal_structure_keep_the_new_side() {
        let a = Node::leaf("hardBreak");
        let b = Node::leaf("hardBreak").with_marks(vec![Mark::new("bold")]);
        let diff = diff_trees(&a, &b);
        assert_eq!(diff.roots.len(), 1);
        assert_eq!(diff.roots[0].change(), Change::Unchanged);
        assert_eq!(diff.roots[0].node_type(), "hardBreak");
        assert!(!diff.has_changes());
        assert_eq!(diff.to_tiptap_json(), serde_json::to_value(&b).unwrap());
    }

    #[test]
    fn bold_text_keeps_its_marks_on_every_run() {
        let bold = vec![Mark::new("bold")];
        let a = doc(vec![Node::paragraph(vec![Node::text("Hello world").with_marks(bold.clone())])]);
        let b = doc(vec![Node::paragraph(vec![Node::text("Hello, world").with_marks(bold.clone())])]);
        let diff = diff_trees(&a, &b);
        assert_eq!(
            leaves(&diff),
            vec![
                ("Hello".into(), Change::Unchanged),
                (",".into(), Change::Added),
                (" world".into(), Change::Unchanged),
            ]
        );
        diff.roots[0].for_each_leaf(&mut |leaf| assert_eq!(leaf.marks(), bold.as_slice()));
    }

    #[test]
    fn text_roots_carry_each_sides_marks() {
        let italic = vec![Mark::new("italic")];
        let link = vec![Mark::new("link")];
        let a = Node::text("cat").with_marks(italic.clone());
        let b = Node::text("cut").with_marks(link.clone());
        let diff = diff_trees(&a, &b);

        let mut saw = (false, false);
        for root in &diff.roots {
            match root.change() {
                Change::Removed | Change::Unchanged => {
                    assert_eq!(root.marks(), italic.as_slice());
                    saw.0 |= root.change() == Change::Removed;
                }
                Change::Added => {
                    assert_eq!(root.marks(), link.as_slice());
                    saw.1 = true;
                }
                Change::Moved => panic!("text runs are never moves"),
            }
        }
        assert!(saw.0 && saw.1);
    }

    #[test]
    fn missing_children_compare_as_empty() {
        let a = Node::leaf("paragraph");
        let b = p("now with text");
        let diff = diff_trees(&a, &b);
        assert_eq!(diff.roots.len(), 1);
        assert_eq!(diff.roots[0].change(), Change::Unchanged);
        assert_eq!(leaves(&diff), vec![("now with text".into(), Change::Added)]);
    }

    #[test]
    fn absent_sides() {
        assert!(diff_nodes(None, None).is_empty());
        let added = diff_nodes(None, Some(&p("x")));
        assert_eq!(added[0].children().unwrap()[0].change(), Change::Added);
        let removed = diff_nodes(Some(&p("x")), None);
        assert_eq!(removed[0].change(), Change::Removed);
    }

    #[test]
    fn plain_text_contents_are_compared() {
        let diff = diff_documents("draft one", "draft two");
        assert!(diff.has_changes());
        assert_eq!(leaves(&diff)[0], ("draft ".into(), Change::Unchanged));
    }

    #[test]
    fn tiptap_rendering_appends_annotation_marks() {
        let italic = vec![Mark::new("italic")];
        let a = doc(vec![p("keep")]);
        let b = doc(vec![p("keep"), Node::paragraph(vec![Node::text("new").with_marks(italic)])]);
        let json = diff_trees(&a, &b).to_tiptap_json();
        assert_eq!(
            json,
            json!({"type": "doc", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "keep"}]},
                {"type": "paragraph", "marks": [{"type": "add"}], "content": [
                    {"type": "text", "text": "new", "marks": [{"type": "italic"}, {"type": "add"}]}
                ]}
            ]})
        );
    }

    #[test]
    fn root_type_change_is_wrapped_in_a_doc() {
        let diff = diff_trees(&p("a"), &Node::element("heading", vec![Node::text("a")]));
        let json = diff.to_tiptap_json();
        assert_eq!(json["type"], "doc");
        assert_eq!(json["content"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn nested_edit_keeps_siblings_aligned() {
        let list = |items: &[&str]| {
            Node::element(
                "bulletList",
                items
                    .iter()
                    .map(|t| Node::element("listItem", vec![p(t)]))
                    .collect(),
            )
        };
        let a = doc(vec![p("intro"), list(&["apples", "pears"])]);
        let b = doc(vec![p("intro"), list(&["apples", "peaches", "pears"])]);
        let diff = diff_trees(&a, &b);
        assert_eq!(
            leaves(&diff),
            vec![
                ("intro".into(), Change::Unchanged),
                ("apples".into(), Change::Unchanged),
                ("peaches".into(), Change::Added),
                ("pears".into(), Change::Unchanged),
            ]
        );
    }
}
