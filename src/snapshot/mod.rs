/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;

use crate::Attributes;
use crate::Cursor;
use crate::NodeKind;
use crate::entities::escape_fmt;

/// Child of a materialized [Element].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String, String),
}

/// Owned copy of an element subtree taken from a [Cursor].
///
/// Since cursors only move forward, reading an element into memory is the
/// way to look at its content more than once.
///
/// # Examples
///
/// ```
/// use ikswalk::{Cursor, Element, Reader};
///
/// let mut reader = Reader::from_xml("<doc><p lang='en'>Hello <b>world</b></p></doc>");
/// reader.advance();
/// reader.advance();
/// let p = Element::read(&mut reader).unwrap();
/// assert_eq!(p.attribute("lang"), Some("en"));
/// assert_eq!(p.text(), "Hello world");
/// assert_eq!(p.to_string(), "<p lang=\"en\">Hello <b>world</b></p>");
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_cursor<C: Cursor + ?Sized>(cursor: &C) -> Self {
        Element {
            name: cursor.name().to_string(),
            attributes: cursor
                .attributes()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            children: Vec::new(),
        }
    }

    /// Reads the element under the cursor with everything inside it.
    ///
    /// The cursor is left on the end node of the element, or on the element
    /// itself when it was written as an empty element tag. Returns None if
    /// the cursor is not on an element, or if the document ends before the
    /// element is closed.
    pub fn read<C: Cursor + ?Sized>(cursor: &mut C) -> Option<Element> {
        if cursor.node_kind() != NodeKind::Element {
            return None;
        }
        let root = Element::from_cursor(cursor);
        if cursor.is_empty_element() {
            return Some(root);
        }
        let mut stack = vec![root];
        while cursor.advance() {
            let child = match cursor.node_kind() {
                NodeKind::Element => {
                    let element = Element::from_cursor(cursor);
                    if !cursor.is_empty_element() {
                        stack.push(element);
                        continue;
                    }
                    Node::Element(element)
                }
                NodeKind::EndElement => {
                    let element = stack.pop()?;
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.children.push(Node::Element(element));
                            continue;
                        }
                        None => return Some(element),
                    }
                }
                NodeKind::Text | NodeKind::Whitespace | NodeKind::SignificantWhitespace => {
                    Node::Text(cursor.value().to_string())
                }
                NodeKind::CData => Node::CData(cursor.value().to_string()),
                NodeKind::Comment => Node::Comment(cursor.value().to_string()),
                NodeKind::ProcessingInstruction => Node::ProcessingInstruction(
                    cursor.name().to_string(),
                    cursor.value().to_string(),
                ),
                _ => continue,
            };
            if let Some(parent) = stack.last_mut() {
                parent.children.push(child);
            }
        }
        None
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes().find(|(attr, _)| *attr == name).map(|(_, value)| value)
    }

    pub fn attributes(&self) -> Attributes<'_> {
        Attributes::new(&self.attributes)
    }

    /// Iterates over the direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of all descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        for child in &self.children {
            match child {
                Node::Element(element) => element.collect_text(text),
                Node::Text(s) | Node::CData(s) => text.push_str(s),
                _ => (),
            }
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<")?;
        f.write_str(&self.name)?;
        for (name, value) in &self.attributes {
            f.write_str(" ")?;
            f.write_str(name)?;
            f.write_str("=\"")?;
            escape_fmt(value, f)?;
            f.write_str("\"")?;
        }
        if self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for child in &self.children {
            Display::fmt(child, f)?;
        }
        f.write_str("</")?;
        f.write_str(&self.name)?;
        f.write_str(">")
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Element(element) => Display::fmt(element, f),
            Node::Text(text) => escape_fmt(text, f),
            Node::CData(text) => write!(f, "<![CDATA[{text}]]>"),
            Node::Comment(text) => write!(f, "<!--{text}-->"),
            Node::ProcessingInstruction(target, data) if data.is_empty() => {
                write!(f, "<?{target}?>")
            }
            Node::ProcessingInstruction(target, data) => write!(f, "<?{target} {data}?>"),
        }
    }
}

#[cfg(test)]
mod tests;
