/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use log::trace;

use crate::Attributes;
use crate::Cursor;
use crate::Element;
use crate::NodeKind;

struct IterState {
    target: usize,
    count: usize,
    // Cursor already sits on a node which must be evaluated before moving.
    pending_replay: bool,
    exhausted: bool,
    started: bool,
    filter: Option<String>,
    snapshot: Option<Element>,
}

impl IterState {
    fn new(target: usize, filter: Option<String>) -> Self {
        IterState {
            target,
            count: 0,
            pending_replay: false,
            exhausted: false,
            started: false,
            filter,
            snapshot: None,
        }
    }
}

/// Iterator over the elements at one depth of a forward-only [Cursor].
///
/// A `DepthIter` visits the elements at its target depth in document order
/// and steps over their subtrees without reading them node by node. Calling
/// [descend()](DepthIter::descend) on the current element gives an iterator
/// over its direct child elements which shares the same cursor. When the
/// child iterator runs out, it has already read the node which follows the
/// element's content; that node is handed back, so the next
/// [advance()](DepthIter::advance) of the parent looks at it instead of
/// reading past it.
///
/// The borrow checker makes sure only the innermost live iterator moves the
/// cursor. A child iterator should be advanced until it returns false before
/// the parent is used again. If it is dropped early, the parent still moves
/// on to its next element, but every node the child skipped is lost.
///
/// Parse failures look like the end of the document here, check the
/// underlying reader (for example with
/// [Reader::last_error()](crate::Reader::last_error)) to tell them apart.
///
/// # Examples
///
/// ```
/// use ikswalk::{DepthIter, Reader};
///
/// let mut reader = Reader::from_xml("<r><a/><b><c/></b><d/></r>");
/// let mut root = DepthIter::new(&mut reader);
/// assert!(root.advance());
/// let mut names = Vec::new();
/// let mut children = root.descend();
/// while children.advance() {
///     names.push(children.name().unwrap_or_default().to_string());
///     let mut grandchildren = children.descend();
///     while grandchildren.advance() {
///         names.push(format!("  {}", grandchildren.name().unwrap_or_default()));
///     }
/// }
/// assert_eq!(names, vec!["a", "b", "  c", "d"]);
/// ```
pub struct DepthIter<'c, C: Cursor> {
    cursor: &'c mut C,
    state: IterState,
    outer: Option<&'c mut bool>,
}

impl<'c, C: Cursor> DepthIter<'c, C> {
    /// Iterates over the children of the cursor's current node, or over the
    /// root element when the cursor has not been advanced yet.
    pub fn new(cursor: &'c mut C) -> Self {
        let target = match cursor.node_kind() {
            NodeKind::None => 0,
            _ => cursor.depth() + 1,
        };
        DepthIter::at_depth(cursor, target)
    }

    /// Iterates over the elements at an explicit depth.
    pub fn at_depth(cursor: &'c mut C, depth: usize) -> Self {
        DepthIter {
            cursor,
            state: IterState::new(depth, None),
            outer: None,
        }
    }

    /// Only stops at elements with the given name.
    ///
    /// Elements with other names are skipped without entering them.
    pub fn with_filter(mut self, name: &str) -> Self {
        self.state.filter = Some(name.to_string());
        self
    }

    /// Moves to the first element at the target depth.
    ///
    /// Only the first call does anything, later calls return false.
    /// Calling this is optional, the first [advance()](DepthIter::advance)
    /// starts the iterator if needed.
    pub fn start(&mut self) -> bool {
        if self.state.started || self.state.exhausted {
            return false;
        }
        self.state.started = true;
        if self.state.pending_replay {
            self.state.pending_replay = false;
        } else {
            while self.cursor.advance() {
                if self.cursor.node_kind() == NodeKind::Element {
                    break;
                }
            }
        }
        self.settle()
    }

    /// Rewinds to the first element, which is only possible before the
    /// iterator has started since the cursor cannot move backwards.
    ///
    /// Same as [start()](DepthIter::start).
    pub fn reset(&mut self) -> bool {
        self.start()
    }

    /// Moves to the next element at the target depth.
    pub fn advance(&mut self) -> bool {
        if self.state.exhausted {
            return false;
        }
        if !self.state.started {
            return self.start();
        }
        self.state.snapshot = None;
        if self.state.pending_replay {
            self.state.pending_replay = false;
            return self.settle();
        }
        self.scan()
    }

    /// True while the cursor is on the current element at the target depth.
    ///
    /// Becomes false when the cursor leaves the element: after
    /// [snapshot()](DepthIter::snapshot) reads its content, or after a child
    /// iterator runs out and hands over the node following it.
    pub fn is_valid(&self) -> bool {
        if self.state.exhausted || self.state.pending_replay {
            return false;
        }
        self.cursor.node_kind() == NodeKind::Element
            && self.cursor.depth() == self.state.target
            && self.matches()
    }

    /// Zero based position of the current element among the visited ones.
    pub fn current_index(&self) -> Option<usize> {
        if self.state.exhausted || self.state.count == 0 {
            return None;
        }
        Some(self.state.count - 1)
    }

    pub fn target_depth(&self) -> usize {
        self.state.target
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.exhausted
    }

    /// Iterator over the child elements of the current element.
    ///
    /// The parent cannot be used until the returned iterator is dropped.
    /// Descending from an iterator which has not started yet, or which is
    /// exhausted, gives an exhausted child.
    pub fn descend(&mut self) -> DepthIter<'_, C> {
        self.child(None)
    }

    /// Same as [descend()](DepthIter::descend) with a name filter.
    pub fn descend_named(&mut self, name: &str) -> DepthIter<'_, C> {
        self.child(Some(name.to_string()))
    }

    fn child(&mut self, filter: Option<String>) -> DepthIter<'_, C> {
        let mut state = IterState::new(self.state.target + 1, filter);
        if self.state.started && !self.state.exhausted {
            state.pending_replay = std::mem::take(&mut self.state.pending_replay);
        } else {
            state.exhausted = true;
        }
        trace!(
            "depth {}: descending, replay {}",
            state.target, state.pending_replay
        );
        DepthIter {
            cursor: &mut *self.cursor,
            state,
            outer: Some(&mut self.state.pending_replay),
        }
    }

    /// Shared access to the underlying cursor.
    pub fn cursor(&self) -> &C {
        &*self.cursor
    }

    pub fn depth(&self) -> usize {
        self.cursor.depth()
    }

    pub fn name(&self) -> Option<&str> {
        if let Some(element) = &self.state.snapshot {
            return Some(element.name.as_str());
        }
        if !self.is_valid() {
            return None;
        }
        Some(self.cursor.name())
    }

    pub fn attributes(&self) -> Attributes<'_> {
        if let Some(element) = &self.state.snapshot {
            return element.attributes();
        }
        if !self.is_valid() {
            return Attributes::new(&[]);
        }
        self.cursor.attributes()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value)
    }

    /// Reads the current element with its content into memory.
    ///
    /// This consumes the subtree from the cursor, so descending afterwards
    /// finds no children. The copy is kept until the next advance, repeated
    /// calls return the same element. Returns None once a child iterator has
    /// walked the content, since the cursor is no longer on the element.
    pub fn snapshot(&mut self) -> Option<&Element> {
        if self.state.snapshot.is_none() {
            if !self.is_valid() {
                return None;
            }
            self.state.snapshot = Element::read(&mut *self.cursor);
        }
        self.state.snapshot.as_ref()
    }

    /// Trimmed text content of the current element.
    pub fn text(&mut self) -> Option<String> {
        self.snapshot()
            .map(|element| element.text().trim().to_string())
    }

    /// The current element serialized as XML.
    pub fn outer_xml(&mut self) -> Option<String> {
        self.snapshot().map(|element| element.to_string())
    }

    fn matches(&self) -> bool {
        match &self.state.filter {
            None => true,
            Some(name) => self.cursor.name() == name.as_str(),
        }
    }

    // Decides what to do with the node under the cursor without moving.
    fn settle(&mut self) -> bool {
        if self.cursor.node_kind() == NodeKind::Element {
            let depth = self.cursor.depth();
            if depth == self.state.target && self.matches() {
                return self.found();
            }
            if depth >= self.state.target {
                return self.scan();
            }
        }
        self.finish()
    }

    fn scan(&mut self) -> bool {
        let mut in_scope = true;
        loop {
            let filter = if in_scope {
                self.state.filter.as_deref()
            } else {
                None
            };
            if !self.cursor.advance_skipping_subtree(filter) {
                return self.finish();
            }
            let depth = self.cursor.depth();
            let is_element = self.cursor.node_kind() == NodeKind::Element;
            if depth < self.state.target {
                if is_element {
                    return self.finish();
                }
                // Left the parent element, the filter no longer applies.
                in_scope = false;
                continue;
            }
            if is_element && depth == self.state.target && self.matches() {
                return self.found();
            }
        }
    }

    fn found(&mut self) -> bool {
        self.state.count += 1;
        trace!(
            "depth {}: element {} at index {}",
            self.state.target,
            self.cursor.name(),
            self.state.count - 1
        );
        true
    }

    fn finish(&mut self) -> bool {
        self.state.exhausted = true;
        let hand_off = self.cursor.depth() < self.state.target;
        if hand_off {
            if let Some(outer) = self.outer.as_mut() {
                **outer = true;
            }
        }
        trace!(
            "depth {}: exhausted after {} elements, hand off {}",
            self.state.target, self.state.count, hand_off
        );
        false
    }
}

#[cfg(test)]
mod tests;

mod nocompile;
