//! Page tree handed to the renderer.
//!
//! Containers optionally carry a `key` naming the section they represent, so
//! callers and tests can ask which sections a document contains without
//! depending on rendered output.

use serde::Serialize;

use crate::documents::model::DocumentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Small,
    #[default]
    Body,
    Heading,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub size: TextSize,
    pub bold: bool,
    pub italic: bool,
    pub align: Align,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxStyle {
    pub border: bool,
    /// Background shade, 0 (black) to 255 (white).
    pub shade: Option<u8>,
    pub padding_pt: u16,
    pub gap_pt: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Layout {
    /// Children stacked top to bottom.
    Stack,
    /// Children placed row-major into columns of the given relative widths.
    Grid { columns: Vec<u16> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Container {
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        layout: Layout,
        style: BoxStyle,
        children: Vec<Node>,
    },
    Text {
        content: String,
        style: TextStyle,
    },
    Image {
        source: String,
        width_pt: u16,
    },
    /// Reserved empty area, e.g. an unsigned signature slot.
    Blank {
        height_pt: u16,
    },
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            style: TextStyle::default(),
        }
    }

    pub fn styled(content: impl Into<String>, style: TextStyle) -> Self {
        Self::Text {
            content: content.into(),
            style,
        }
    }

    pub fn bold(content: impl Into<String>) -> Self {
        Self::styled(
            content,
            TextStyle {
                bold: true,
                ..TextStyle::default()
            },
        )
    }

    pub fn small(content: impl Into<String>) -> Self {
        Self::styled(
            content,
            TextStyle {
                size: TextSize::Small,
                ..TextStyle::default()
            },
        )
    }

    pub fn heading(content: impl Into<String>) -> Self {
        Self::styled(
            content,
            TextStyle {
                size: TextSize::Heading,
                bold: true,
                ..TextStyle::default()
            },
        )
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::styled(
            content,
            TextStyle {
                align: Align::Justify,
                ..TextStyle::default()
            },
        )
    }

    pub fn image(source: impl Into<String>, width_pt: u16) -> Self {
        Self::Image {
            source: source.into(),
            width_pt,
        }
    }

    pub fn blank(height_pt: u16) -> Self {
        Self::Blank { height_pt }
    }

    pub fn stack(children: Vec<Node>) -> Self {
        Self::Container {
            key: None,
            layout: Layout::Stack,
            style: BoxStyle {
                gap_pt: 4,
                ..BoxStyle::default()
            },
            children,
        }
    }

    pub fn grid(columns: Vec<u16>, children: Vec<Node>) -> Self {
        Self::Container {
            key: None,
            layout: Layout::Grid { columns },
            style: BoxStyle {
                gap_pt: 6,
                ..BoxStyle::default()
            },
            children,
        }
    }

    /// Name the section this container represents.
    pub fn keyed(mut self, name: impl Into<String>) -> Self {
        if let Self::Container { key, .. } = &mut self {
            *key = Some(name.into());
        }
        self
    }

    pub fn framed(mut self, shade: Option<u8>) -> Self {
        if let Self::Container { style, .. } = &mut self {
            style.border = true;
            style.shade = shade;
            style.padding_pt = 6;
        }
        self
    }

    pub fn aligned(mut self, align: Align) -> Self {
        if let Self::Text { style, .. } = &mut self {
            style.align = align;
        }
        self
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Container { key, .. } => key.as_deref(),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Self::Container { children, .. } => children,
            _ => &[],
        }
    }

    /// Depth-first visit of this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub number: u16,
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTree {
    pub kind: DocumentKind,
    pub title: String,
    pub pages: Vec<Page>,
}

impl DocumentTree {
    pub fn new(kind: DocumentKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            pages: Vec::new(),
        }
    }

    pub fn push_page(&mut self, content: Vec<Node>) {
        let number = self.pages.len() as u16 + 1;
        self.pages.push(Page { number, content });
    }

    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes = Vec::new();
        for page in &self.pages {
            for node in &page.content {
                node.walk(&mut |n| nodes.push(n));
            }
        }
        nodes
    }

    /// Keys of every keyed container, in document order.
    pub fn section_keys(&self) -> Vec<&str> {
        self.nodes().into_iter().filter_map(Node::key).collect()
    }

    pub fn has_section(&self, key: &str) -> bool {
        self.nodes().into_iter().any(|node| node.key() == Some(key))
    }

    pub fn find_section(&self, key: &str) -> Option<&Node> {
        self.nodes().into_iter().find(|node| node.key() == Some(key))
    }

    /// Remote image sources referenced anywhere in the tree, deduplicated.
    pub fn image_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for node in self.nodes() {
            if let Node::Image { source, .. } = node {
                if !sources.contains(&source.as_str()) {
                    sources.push(source);
                }
            }
        }
        sources
    }

    /// All text content of a node, for assertions and previews.
    pub fn text_of(node: &Node) -> String {
        let mut parts = Vec::new();
        node.walk(&mut |n| {
            if let Node::Text { content, .. } = n {
                parts.push(content.as_str());
            }
        });
        parts.join(" ")
    }
}
