/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::NodeKind;

/// A forward-only position in a stream of XML nodes.
///
/// Only the current node is visible and the position can only move ahead.
/// The depth of the outermost element is zero, nodes inside an element are
/// one level deeper than the element, and the end tag node of an element is
/// at the same depth as its start. Empty element tags produce a single
/// element node without an end node. When the cursor is not on a node (before
/// the first advance, after the end, or after a failure) the kind is
/// [NodeKind::None] and the depth is zero.
///
/// Advancing returns false both at the end of the document and on a parse
/// failure, implementations can expose the difference separately, as
/// [Reader::last_error()](crate::Reader::last_error) does.
pub trait Cursor {
    /// Moves to the next node in document order, entering child nodes.
    fn advance(&mut self) -> bool;

    /// Moves to the next node which is not a descendant of the current node.
    ///
    /// With a name filter, skipping continues over every node until an element
    /// with that name is found, or a node shallower than the starting node is
    /// reached, so the scan never leaves the scope of the starting node's
    /// parent silently.
    fn advance_skipping_subtree(&mut self, name: Option<&str>) -> bool;

    fn depth(&self) -> usize;

    fn node_kind(&self) -> NodeKind;

    /// Name of the current node: tag name for elements and end tags, target
    /// for processing instructions, `#text`, `#comment` and so on for others.
    fn name(&self) -> &str;

    /// Text content of text, comment, and processing instruction nodes.
    fn value(&self) -> &str;

    fn attributes(&self) -> Attributes<'_>;

    /// True for elements written as an empty element tag such as `<a/>`.
    fn is_empty_element(&self) -> bool;

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value)
    }
}

/// Iterator over the attributes of the current element.
pub struct Attributes<'a> {
    inner: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Attributes<'a> {
    pub fn new(attributes: &'a [(String, String)]) -> Self {
        Attributes {
            inner: attributes.iter(),
        }
    }
}

impl<'a> Iterator for Attributes<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
