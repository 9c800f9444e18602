use serde::Serialize;

use crate::document::address::FieldAddress;

/// Output of a template: a tree of plain elements, text, and editable slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Element {
        tag: &'static str,
        class: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        attrs: Vec<(&'static str, String)>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    /// A displayed value bound to exactly one field address. `content` is the
    /// committed rendering; `draft` is set while that address is in Editing.
    Editable {
        address: FieldAddress,
        multiline: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        draft: Option<String>,
        content: Box<Node>,
    },
}

impl Node {
    pub fn el(tag: &'static str, class: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element {
            tag,
            class: class.into(),
            attrs: Vec::new(),
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    /// Adds an attribute to an element; no-op on other nodes.
    pub fn with_attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.push((name, value.into()));
        }
        self
    }

    /// Depth-first visit of every node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        match self {
            Node::Element { children, .. } => {
                for child in children {
                    child.walk(visit);
                }
            }
            Node::Editable { content, .. } => content.walk(visit),
            Node::Text { .. } => {}
        }
    }

    /// Concatenated text content, drafts shown in place of committed values.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { text } => out.push_str(text),
            Node::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Node::Editable {
                draft: Some(draft), ..
            } => out.push_str(draft),
            Node::Editable { content, .. } => content.collect_text(out),
        }
    }

    /// Every address rendered as editable, in document order.
    pub fn editable_addresses(&self) -> Vec<&FieldAddress> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if let Node::Editable { address, .. } = node {
                found.push(address);
            }
        });
        found
    }
}
