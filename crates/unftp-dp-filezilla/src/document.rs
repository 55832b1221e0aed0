//! A minimal owned XML tree and the few path queries the FileZilla schema needs.

use quick_xml::{Reader, events::BytesStart, events::Event};
use thiserror::Error;

/// Failure to turn the file contents into a tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The XML itself is malformed
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// An attribute could not be read
    #[error("invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    /// A name was not valid UTF-8
    #[error("invalid UTF-8 in name: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// The document ended while elements were still open
    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),
}

/// An XML element with its attributes, child elements and concatenated text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Element, ParseError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            ..Default::default()
        })
    }

    /// The value of attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Text directly inside this element, with entities resolved.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Direct children called `name`, in document order.
    pub fn children(&self, name: &str) -> impl Iterator<Item = &Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// The first direct child called `name` whose attribute `attr` equals `value` exactly.
    pub fn child_with_attr(&self, name: &str, attr: &str, value: &str) -> Option<&Element> {
        self.children(name).find(|c| c.attr(attr) == Some(value))
    }

    /// The FileZilla `<Option Name="...">` child called `name`.
    pub fn option(&self, name: &str) -> Option<&Element> {
        self.child_with_attr("Option", "Name", name)
    }

    /// Every element called `name` anywhere below this one, in document order.
    pub fn descendants(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }
}

/// Parses `xml` into a synthetic root element whose children are the top level elements.
pub fn parse(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Element::from_start(&e)?),
            Event::Empty(e) => {
                let element = Element::from_start(&e)?;
                push_child(&mut stack, element);
            }
            Event::End(_) => {
                // quick-xml has already checked that the end tag matches
                if let Some(element) = stack.pop() {
                    push_child(&mut stack, element);
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                let data = std::str::from_utf8(&e)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(data);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.pop().map(|e| e.name).unwrap_or_default();
        return Err(ParseError::Unclosed(open));
    }
    Ok(stack.pop().unwrap_or_default())
}

fn push_child(stack: &mut [Element], element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>
<FileZillaServer>
    <Users>
        <User Name="a&amp;b">
            <Option Name="Pass">ABC</Option>
            <Option Name="Salt"> s&lt;t </Option>
            <Permissions>
                <Permission Dir="C:\ftp">
                    <Option Name="IsHome">1</Option>
                </Permission>
            </Permissions>
        </User>
        <Group Name="g"><User Name="nested"/></Group>
    </Users>
</FileZillaServer>"#;

    #[test]
    fn attributes_and_text_are_unescaped() {
        let doc = parse(XML).unwrap();
        let users = doc.descendants("User");
        assert_eq!(users[0].attr("Name"), Some("a&b"));
        assert_eq!(users[0].option("Salt").map(Element::text), Some(" s<t "));
        assert_eq!(users[0].option("Pass").map(Element::text), Some("ABC"));
        assert_eq!(users[0].option("Enabled"), None);
    }

    #[test]
    fn descendants_are_in_document_order() {
        let doc = parse(XML).unwrap();
        let names: Vec<_> = doc.descendants("User").into_iter().filter_map(|u| u.attr("Name")).collect();
        assert_eq!(names, vec!["a&b", "nested"]);
    }

    #[test]
    fn nested_children_are_reachable() {
        let doc = parse(XML).unwrap();
        let user = doc.descendants("User")[0];
        let dirs: Vec<_> = user
            .children("Permissions")
            .flat_map(|p| p.children("Permission"))
            .filter_map(|p| p.attr("Dir"))
            .collect();
        assert_eq!(dirs, vec![r"C:\ftp"]);
    }

    #[test]
    fn mismatched_tags_fail() {
        assert!(parse("<Users><User></Users>").is_err());
    }

    #[test]
    fn unclosed_tags_fail() {
        assert!(parse("<Users><User Name=\"x\">").is_err());
    }

    #[test]
    fn empty_input_is_an_empty_document() {
        assert!(parse("").unwrap().descendants("User").is_empty());
    }
}
