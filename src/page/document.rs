//! Markdown parsed into a small element/text tree.

use pulldown_cmark::{Event as MdEvent, HeadingLevel, Options, Parser, Tag as MdTag};

pub type NodeId = usize;

/// Box generated by an element, as far as row location cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Body,
    Heading(u8),
    Paragraph,
    BlockQuote,
    List,
    ListItem,
    CodeBlock,
    Emphasis,
    Strong,
    Strikethrough,
    Code,
    Link,
    Image,
    Rule,
    Frame,
    /// Anything the reader does not style specially.
    Span,
}

impl Tag {
    pub fn display(self) -> Display {
        match self {
            Tag::Body
            | Tag::Heading(_)
            | Tag::Paragraph
            | Tag::BlockQuote
            | Tag::List
            | Tag::ListItem
            | Tag::CodeBlock
            | Tag::Rule
            | Tag::Frame => Display::Block,
            Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Code
            | Tag::Link
            | Tag::Image
            | Tag::Span => Display::Inline,
        }
    }

    /// HTML tag name the element would render as.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Body => "body",
            Tag::Heading(1) => "h1",
            Tag::Heading(2) => "h2",
            Tag::Heading(3) => "h3",
            Tag::Heading(4) => "h4",
            Tag::Heading(5) => "h5",
            Tag::Heading(_) => "h6",
            Tag::Paragraph => "p",
            Tag::BlockQuote => "blockquote",
            Tag::List => "ul",
            Tag::ListItem => "li",
            Tag::CodeBlock => "pre",
            Tag::Emphasis => "em",
            Tag::Strong => "strong",
            Tag::Strikethrough => "del",
            Tag::Code => "code",
            Tag::Link => "a",
            Tag::Image => "img",
            Tag::Rule => "hr",
            Tag::Frame => "iframe",
            Tag::Span => "span",
        }
    }

    /// Elements laid out as opaque boxes rather than flowed text.
    pub fn is_replaced(self) -> bool {
        matches!(self, Tag::Image | Tag::Rule | Tag::Frame)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Tag),
    Text(String),
    /// Forced line break inside an inline run.
    LineBreak,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(Tag::Body),
                parent: None,
                children: Vec::new(),
            }],
        }
    }
}

impl Document {
    pub const ROOT: NodeId = 0;

    pub fn parse(markdown: &str) -> Self {
        let mut doc = Self::default();
        let mut open: Vec<NodeId> = vec![Self::ROOT];

        for event in Parser::new_ext(markdown, Options::all()) {
            let parent = open.last().copied().unwrap_or(Self::ROOT);
            match event {
                MdEvent::Start(tag) => {
                    let id = doc.push(parent, NodeData::Element(map_tag(&tag)));
                    open.push(id);
                }
                MdEvent::End(_) => {
                    if open.len() > 1 {
                        open.pop();
                    }
                }
                MdEvent::Text(text) => {
                    doc.push_text(parent, &text);
                }
                MdEvent::Code(text) => {
                    let code = doc.push(parent, NodeData::Element(Tag::Code));
                    doc.push_text(code, &text);
                }
                MdEvent::SoftBreak => {
                    doc.push_text(parent, " ");
                }
                MdEvent::HardBreak => {
                    doc.push(parent, NodeData::LineBreak);
                }
                MdEvent::Rule => {
                    doc.push(parent, NodeData::Element(Tag::Rule));
                }
                MdEvent::TaskListMarker(done) => {
                    doc.push_text(parent, if done { "[x] " } else { "[ ] " });
                }
                MdEvent::Html(html) | MdEvent::InlineHtml(html) => {
                    doc.push_text(parent, &html);
                }
                _ => {}
            }
        }
        doc
    }

    /// Appends an embedded frame as the last child of the body.
    pub fn append_frame(&mut self) -> NodeId {
        self.push(Self::ROOT, NodeData::Element(Tag::Frame))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn tag(&self, id: NodeId) -> Option<Tag> {
        match self.nodes.get(id)?.data {
            NodeData::Element(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Concatenated text of every descendant of `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    /// Nearest element ancestor of `id` (itself included) with the given tag.
    pub fn closest(&self, id: NodeId, wanted: impl Fn(Tag) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.tag(node).is_some_and(&wanted) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if let NodeData::Text(text) = &node.data {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Adjacent text runs are merged so a soft break does not split a node.
    fn push_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self.children(parent).last().copied()
            && let Some(NodeData::Text(existing)) = self.nodes.get_mut(last).map(|n| &mut n.data)
        {
            existing.push_str(text);
            return;
        }
        self.push(parent, NodeData::Text(text.to_string()));
    }
}

fn map_tag(tag: &MdTag<'_>) -> Tag {
    match tag {
        MdTag::Paragraph => Tag::Paragraph,
        MdTag::Heading { level, .. } => Tag::Heading(heading_level(*level)),
        MdTag::BlockQuote(_) => Tag::BlockQuote,
        MdTag::CodeBlock(_) => Tag::CodeBlock,
        MdTag::List(_) => Tag::List,
        MdTag::Item => Tag::ListItem,
        MdTag::Emphasis => Tag::Emphasis,
        MdTag::Strong => Tag::Strong,
        MdTag::Strikethrough => Tag::Strikethrough,
        MdTag::Link { .. } => Tag::Link,
        MdTag::Image { .. } => Tag::Image,
        _ => Tag::Span,
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_block_and_inline_structure() {
        let doc = Document::parse("# Title\n\nSome *emphasis* here.\n");
        let body = doc.children(Document::ROOT);
        assert_eq!(body.len(), 2);
        assert_eq!(doc.tag(body[0]), Some(Tag::Heading(1)));
        assert_eq!(doc.tag(body[1]), Some(Tag::Paragraph));

        let para = doc.children(body[1]);
        assert_eq!(para.len(), 3);
        assert_eq!(doc.tag(para[1]), Some(Tag::Emphasis));
        assert_eq!(doc.text_content(body[1]), "Some emphasis here.");
    }

    #[test]
    fn soft_breaks_join_into_one_text_node() {
        let doc = Document::parse("one\ntwo\n");
        let para = doc.children(Document::ROOT)[0];
        assert_eq!(doc.children(para).len(), 1);
        assert_eq!(doc.text_content(para), "one two");
    }

    #[test]
    fn images_keep_alt_text_and_frames_append_to_body() {
        let mut doc = Document::parse("![a cat](cat.png)\n");
        let para = doc.children(Document::ROOT)[0];
        let image = doc.children(para)[0];
        assert_eq!(doc.tag(image), Some(Tag::Image));
        assert_eq!(doc.text_content(image), "a cat");
        assert!(Tag::Image.is_replaced());

        let frame = doc.append_frame();
        assert_eq!(doc.parent(frame), Some(Document::ROOT));
        assert_eq!(doc.children(Document::ROOT).last(), Some(&frame));
    }

    #[test]
    fn closest_walks_to_ancestors() {
        let doc = Document::parse("> a **b**\n");
        let quote = doc.children(Document::ROOT)[0];
        let para = doc.children(quote)[0];
        let strong = doc.children(para)[1];
        let text = doc.children(strong)[0];
        assert_eq!(doc.closest(text, |t| t == Tag::BlockQuote), Some(quote));
        assert_eq!(doc.closest(text, |t| t == Tag::List), None);
        assert_eq!(Tag::Heading(2).name(), "h2");
        assert_eq!(Tag::Strong.display(), Display::Inline);
    }
}
