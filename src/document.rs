//! Output element tree
//!
//! Elements live in an arena owned by [`Document`] and are addressed by
//! [`ElementId`]. Each element has at most one parent; the element index and
//! the finalizers hold ids, never ownership.

use crate::{DecompileError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// WiX v4 source namespace
pub const WIX_NAMESPACE: &str = "http://wixtoolset.org/schemas/v4/wxs";

/// Handle to an element in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    text: Option<String>,
}

/// Arena-backed element tree with a fixed `Wix` root
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    root: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            elements: Vec::new(),
            root: ElementId(0),
        };
        let root = doc.create("Wix");
        doc.set_attribute(root, "xmlns", WIX_NAMESPACE);
        doc.root = root;
        doc
    }

    /// The `Wix` element
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Create a detached element
    pub fn create(&mut self, name: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            text: None,
        });
        id
    }

    /// Create an element and attach it under `parent`
    pub fn create_child(&mut self, parent: ElementId, name: &str) -> ElementId {
        let id = self.create(name);
        self.add_child(parent, id);
        id
    }

    pub fn name(&self, id: ElementId) -> &str {
        &self.elements[id.0].name
    }

    /// Set an attribute; the first write fixes its position, later writes
    /// replace the value
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let attributes = &mut self.elements[id.0].attributes;
        match attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => attributes.push((name.to_string(), value)),
        }
    }

    /// Set an attribute only when a value is present
    pub fn set_optional(&mut self, id: ElementId, name: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.set_attribute(id, name, value);
        }
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        self.elements[id.0].attributes.retain(|(k, _)| k != name);
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements[id.0]
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self, id: ElementId) -> &[(String, String)] {
        &self.elements[id.0].attributes
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.elements[id.0].text = Some(text.into());
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.elements[id.0].text.as_deref()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.0].parent
    }

    /// True once the element has been attached somewhere
    pub fn is_placed(&self, id: ElementId) -> bool {
        self.elements[id.0].parent.is_some() || id == self.root
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id.0].children
    }

    /// First direct child with the given tag
    pub fn find_child(&self, id: ElementId, name: &str) -> Option<ElementId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.name(*c) == name)
    }

    /// Attach `child` under `parent`.
    ///
    /// Returns false and leaves the tree untouched when the child already has
    /// a parent or when attaching would make an element its own ancestor.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if self.is_placed(child) || self.is_ancestor_or_self(child, parent) {
            log::debug!(
                "refusing to attach <{}> under <{}>",
                self.name(child),
                self.name(parent)
            );
            return false;
        }
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
        true
    }

    /// Outermost ancestor of `id`; the root for anything that will be written
    pub fn topmost(&self, mut id: ElementId) -> ElementId {
        while let Some(parent) = self.parent(id) {
            id = parent;
        }
        id
    }

    fn is_ancestor_or_self(&self, candidate: ElementId, mut id: ElementId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.parent(id) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    /// Elements reachable from the root, depth first
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Serialize the tree rooted at `Wix`
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_err)?;
        self.write_element(&mut writer, self.root)?;
        let mut xml =
            String::from_utf8(writer.into_inner()).map_err(xml_err)?;
        xml.push('\n');
        Ok(xml)
    }

    fn write_element(&self, writer: &mut Writer<Vec<u8>>, id: ElementId) -> Result<()> {
        let element = &self.elements[id.0];
        let mut start = BytesStart::new(element.name.as_str());
        for (k, v) in &element.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }

        if element.children.is_empty() && element.text.is_none() {
            writer.write_event(Event::Empty(start)).map_err(xml_err)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(xml_err)?;
        if let Some(ref text) = element.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_err)?;
        }
        for child in &element.children {
            self.write_element(writer, *child)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))
            .map_err(xml_err)?;
        Ok(())
    }
}

fn xml_err<E: std::fmt::Display>(e: E) -> DecompileError {
    DecompileError::Xml(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_order_is_first_write() {
        let mut doc = Document::new();
        let e = doc.create("File");
        doc.set_attribute(e, "Id", "a");
        doc.set_attribute(e, "Name", "b");
        doc.set_attribute(e, "Id", "c");

        let attrs: Vec<_> = doc.attributes(e).iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(attrs, vec![("Id", "c"), ("Name", "b")]);
    }

    #[test]
    fn test_single_parent() {
        let mut doc = Document::new();
        let a = doc.create_child(doc.root(), "A");
        let b = doc.create_child(doc.root(), "B");
        let c = doc.create_child(a, "C");

        assert!(!doc.add_child(b, c));
        assert_eq!(doc.parent(c), Some(a));
        assert_eq!(doc.children(b).len(), 0);
    }

    #[test]
    fn test_refuses_cycle() {
        let mut doc = Document::new();
        let a = doc.create("A");
        let b = doc.create_child(a, "B");
        assert!(!doc.add_child(b, a));
    }

    #[test]
    fn test_topmost() {
        let mut doc = Document::new();
        let attached = doc.create_child(doc.root(), "A");
        let inner = doc.create_child(attached, "B");
        let loose = doc.create("C");
        let loose_child = doc.create_child(loose, "D");

        assert_eq!(doc.topmost(inner), doc.root());
        assert_eq!(doc.topmost(loose_child), loose);
        assert_eq!(doc.topmost(doc.root()), doc.root());
    }

    #[test]
    fn test_to_xml() {
        let mut doc = Document::new();
        let pkg = doc.create_child(doc.root(), "Package");
        doc.set_attribute(pkg, "Name", "Demo & Co");
        let cond = doc.create_child(pkg, "Condition");
        doc.set_text(cond, "VersionNT > 500");

        let xml = doc.to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<Wix xmlns=\"http://wixtoolset.org/schemas/v4/wxs\">"));
        assert!(xml.contains("<Package Name=\"Demo &amp; Co\">"));
        assert!(xml.contains("<Condition>VersionNT &gt; 500</Condition>"));
    }

    #[test]
    fn test_unattached_elements_are_not_written() {
        let mut doc = Document::new();
        let orphan = doc.create("Orphan");
        doc.set_attribute(orphan, "Id", "x");
        let xml = doc.to_xml().unwrap();
        assert!(!xml.contains("Orphan"));
    }
}
