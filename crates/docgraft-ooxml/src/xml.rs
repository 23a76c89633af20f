//! Owned XML element tree for OOXML parts
//!
//! The transplant engine needs to edit a part and write it back without
//! losing anything it does not understand, so parts are parsed into a
//! lossless tree of [`XmlElement`]s rather than into a semantic model.
//! Element and attribute names are kept fully qualified (`w:p`, `w:val`);
//! lookups go by local name so that unusual prefixes still match.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// A node inside an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// A child element
    Element(XmlElement),
    /// Character data (unescaped)
    Text(String),
    /// A CDATA section
    CData(String),
    /// A comment
    Comment(String),
}

/// An XML element with its attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified name, e.g. `w:p`
    pub name: String,
    /// Attributes in document order, keys qualified
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

/// A parsed XML part
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// The document element
    pub root: XmlElement,
    /// Whether the source carried an XML declaration
    declaration: bool,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: add a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: add a text node
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// The namespace prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// The name without its prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Check the local name
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Qualify a local name with this element's prefix
    pub fn qualified(&self, local: &str) -> String {
        qualify(self.prefix(), local)
    }

    /// Get an attribute by local name (namespace declarations excluded)
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| !is_namespace_decl(key) && local_part(key) == local)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any attribute with the same local name
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let local = local_part(&name).to_string();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| !is_namespace_decl(key) && local_part(key) == local)
        {
            Some(slot) => *slot = (name, value),
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute by local name
    pub fn remove_attr(&mut self, local: &str) {
        self.attributes
            .retain(|(key, _)| is_namespace_decl(key) || local_part(key) != local);
    }

    /// Iterate child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate child elements mutably
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate child elements with a given local name
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.is(local))
    }

    /// First child element with a given local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(local))
    }

    /// First child element with a given local name, mutably
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(local))
    }

    /// Count child elements with a given local name
    pub fn count_children(&self, local: &str) -> usize {
        self.children_named(local).count()
    }

    /// Append a child element
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Remove every child element with a given local name, returning how many went
    pub fn remove_children(&mut self, local: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, XmlNode::Element(e) if e.is(local)));
        before - self.children.len()
    }

    /// Get the child `local`, creating it at its schema position when absent
    ///
    /// `order` lists the local names of the parent's content model in schema
    /// order. A new child goes before the first existing sibling that the
    /// schema places after it; names missing from `order` are appended.
    pub fn ensure_child(&mut self, local: &str, order: &[&str]) -> &mut XmlElement {
        let index = match self.element_index(local) {
            Some(index) => index,
            None => {
                let child = XmlElement::new(self.qualified(local));
                self.insert_ordered(child, order)
            }
        };
        match &mut self.children[index] {
            XmlNode::Element(e) => e,
            _ => unreachable!("element_index only returns element positions"),
        }
    }

    /// Get the child `local`, creating it as the first child when absent
    ///
    /// Property containers (`w:pPr` in `w:p`, `w:rPr` in `w:r`) must lead
    /// their parent's content.
    pub fn ensure_leading_child(&mut self, local: &str) -> &mut XmlElement {
        let index = match self.element_index(local) {
            Some(index) => index,
            None => {
                let child = XmlElement::new(self.qualified(local));
                self.children.insert(0, XmlNode::Element(child));
                0
            }
        };
        match &mut self.children[index] {
            XmlNode::Element(e) => e,
            _ => unreachable!("element_index only returns element positions"),
        }
    }

    /// Insert a child at its schema position and return its index in `children`
    pub fn insert_ordered(&mut self, child: XmlElement, order: &[&str]) -> usize {
        let index = schema_index(&self.children, child.local_name(), order);
        self.children.insert(index, XmlNode::Element(child));
        index
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    fn element_index(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, XmlNode::Element(e) if e.is(local)))
    }
}

impl XmlDocument {
    /// Wrap a root element, writing a declaration on output
    pub fn new(root: XmlElement) -> Self {
        Self {
            root,
            declaration: true,
        }
    }

    /// Parse a part from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        // Whitespace inside w:t is content
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut declaration = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Decl(_)) => declaration = true,
                Ok(Event::Start(ref e)) => stack.push(element_from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| {
                        OoxmlError::InvalidStructure("unbalanced end tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape()?;
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        parent.children.push(XmlNode::CData(text));
                    }
                }
                Ok(Event::Comment(ref e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        parent.children.push(XmlNode::Comment(text));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(OoxmlError::InvalidStructure(format!(
                "unclosed element <{}>",
                stack[stack.len() - 1].name
            )));
        }

        let root = root
            .ok_or_else(|| OoxmlError::InvalidStructure("XML part has no root".to_string()))?;
        Ok(Self { root, declaration })
    }

    /// Serialize to an XML string
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if self.declaration {
            out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        }
        write_element(&self.root, &mut out);
        out
    }

    /// Serialize to UTF-8 bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml().into_bytes()
    }
}

/// Qualify a local name with an optional prefix
pub fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

fn is_namespace_decl(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

fn schema_index(children: &[XmlNode], local: &str, order: &[&str]) -> usize {
    let Some(rank) = order.iter().position(|name| *name == local) else {
        return children.len();
    };
    children
        .iter()
        .position(|node| match node {
            XmlNode::Element(e) => order
                .iter()
                .position(|name| *name == e.local_name())
                .is_some_and(|other| other > rank),
            _ => false,
        })
        .unwrap_or(children.len())
}

fn element_from_start(e: &BytesStart) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut element = XmlElement::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(OoxmlError::InvalidStructure(
            "XML part has more than one root element".to_string(),
        ));
    }
    *root = Some(element);
    Ok(())
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for node in &element.children {
        match node {
            XmlNode::Element(e) => collect_text(e, out),
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            XmlNode::Comment(_) => {}
        }
    }
}

fn write_element(element: &XmlElement, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for node in &element.children {
        match node {
            XmlNode::Element(e) => write_element(e, out),
            XmlNode::Text(t) => out.push_str(&escape_xml(t)),
            XmlNode::CData(t) => {
                out.push_str("<![CDATA[");
                out.push_str(t);
                out.push_str("]]>");
            }
            XmlNode::Comment(t) => {
                out.push_str("<!--");
                out.push_str(t);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

/// Escape special XML characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_xml(text)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}
