/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;
mod kind;

use std::collections::VecDeque;
use std::fs::File;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;

use log::debug;
use log::trace;

use crate::Attributes;
use crate::Cursor;
use crate::Location;
use crate::SaxElement;
use crate::SaxError;
use crate::SaxHandler;
use crate::SaxParser;

use error::description;
pub use error::ReaderError;
pub use kind::NodeKind;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

// Longest string Reader::open() considers as a file name.
const MAX_PATH_SOURCE: usize = 4096;

/// Settings for a [Reader].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReaderOptions {
    /// Size of the blocks read from the source. Zero is treated as one.
    pub buffer_size: usize,
}

impl ReaderOptions {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

enum Event {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
        empty: bool,
    },
    End(String),
    Text(String),
    CDataSection(String),
    Comment(String),
    ProcessingInstruction(String, String),
    DocumentType(String),
}

// Collects parser output into complete nodes.
struct EventQueue {
    events: VecDeque<Event>,
    tag: Option<(String, Vec<(String, String)>)>,
}

impl SaxHandler for EventQueue {
    fn handle_element(&mut self, element: &SaxElement) -> Result<(), SaxError> {
        match element {
            SaxElement::StartTag(name) => {
                self.tag = Some((name.to_string(), Vec::new()));
            }
            SaxElement::Attribute(name, value) => {
                if let Some((_, attributes)) = self.tag.as_mut() {
                    if attributes.iter().any(|(attr, _)| attr.as_str() == *name) {
                        return Err(SaxError::BadXml(description::DUPLICATE_ATTRIBUTE));
                    }
                    attributes.push((name.to_string(), value.to_string()));
                }
            }
            SaxElement::StartTagContent | SaxElement::StartTagEmpty => {
                if let Some((name, attributes)) = self.tag.take() {
                    self.events.push_back(Event::Start {
                        name,
                        attributes,
                        empty: matches!(element, SaxElement::StartTagEmpty),
                    });
                }
            }
            SaxElement::EndTag(name) => self.events.push_back(Event::End(name.to_string())),
            SaxElement::CData(text) => match self.events.back_mut() {
                Some(Event::Text(buffer)) => buffer.push_str(text),
                _ => self.events.push_back(Event::Text(text.to_string())),
            },
            SaxElement::CDataSection(text) => {
                self.events.push_back(Event::CDataSection(text.to_string()))
            }
            SaxElement::Comment(text) => self.events.push_back(Event::Comment(text.to_string())),
            SaxElement::ProcessingInstruction(target, data) => {
                // The XML declaration is not a node
                if !target.eq_ignore_ascii_case("xml") {
                    self.events.push_back(Event::ProcessingInstruction(
                        target.to_string(),
                        data.to_string(),
                    ));
                }
            }
            SaxElement::DocumentType(text) => {
                self.events.push_back(Event::DocumentType(text.to_string()))
            }
        }
        Ok(())
    }
}

struct Node {
    kind: NodeKind,
    name: String,
    value: String,
    depth: usize,
    empty: bool,
    attributes: Vec<(String, String)>,
}

impl Node {
    fn none() -> Self {
        Node {
            kind: NodeKind::None,
            name: String::new(),
            value: String::new(),
            depth: 0,
            empty: false,
            attributes: Vec::new(),
        }
    }

    fn leaf(kind: NodeKind, name: String, value: String, depth: usize) -> Self {
        Node {
            kind,
            name,
            value,
            depth,
            empty: false,
            attributes: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Status {
    Reading,
    Finished,
    Failed,
}

fn is_whitespace(text: &str) -> bool {
    text.bytes().all(|c| matches!(c, b' ' | b'\t' | b'\r' | b'\n'))
}

/// Forward-only XML node reader.
///
/// The reader pulls blocks from any [Read] source, runs them through a
/// [SaxParser], and presents the document one node at a time through the
/// [Cursor] trait. Only the current node and the names of the open elements
/// are kept in memory.
///
/// Adjacent character data and references are merged into one text node.
/// Text consisting only of whitespace is reported as
/// [NodeKind::SignificantWhitespace]. Whitespace outside of the root element
/// and the `<?xml ...?>` declaration are not reported.
///
/// # Examples
///
/// ```
/// use ikswalk::{Cursor, NodeKind, Reader};
///
/// let mut reader = Reader::from_xml("<doc><a x='1'/>text</doc>");
/// let mut seen = Vec::new();
/// while reader.advance() {
///     seen.push((reader.node_kind(), reader.name().to_string(), reader.depth()));
/// }
/// assert!(reader.last_error().is_none());
/// assert_eq!(seen, vec![
///     (NodeKind::Element, "doc".to_string(), 0),
///     (NodeKind::Element, "a".to_string(), 1),
///     (NodeKind::Text, "#text".to_string(), 1),
///     (NodeKind::EndElement, "doc".to_string(), 0),
/// ]);
/// ```
pub struct Reader<R> {
    source: R,
    parser: SaxParser,
    queue: EventQueue,
    chunk: Vec<u8>,
    drained: bool,
    status: Status,
    node: Node,
    open: Vec<String>,
    last_error: Option<ReaderError>,
}

impl<R: Read> Reader<R> {
    pub fn new(source: R) -> Self {
        Reader::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: R, options: ReaderOptions) -> Self {
        Reader {
            source,
            parser: SaxParser::new(),
            queue: EventQueue {
                events: VecDeque::new(),
                tag: None,
            },
            chunk: vec![0u8; options.buffer_size.max(1)],
            drained: false,
            status: Status::Reading,
            node: Node::none(),
            open: Vec::new(),
            last_error: None,
        }
    }

    /// The error which stopped the reader, if any.
    ///
    /// A reader which returned false from an advance without an error has
    /// reached the end of a well formed document.
    pub fn last_error(&self) -> Option<&ReaderError> {
        self.last_error.as_ref()
    }

    /// Position of the parser in the byte stream.
    ///
    /// The parser reads ahead by up to one block, so this is the location of
    /// the last parsed byte rather than of the current node.
    pub fn location(&self) -> Location {
        self.parser.location()
    }

    pub fn has_attributes(&self) -> bool {
        !self.node.attributes.is_empty()
    }

    /// Slash separated names of the elements enclosing the current node.
    ///
    /// The current element or end tag is included, so the path of `c` in
    /// `<a><b><c/></b></a>` is `/a/b/c`. Returns `/` when the reader is not
    /// inside the root element.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for name in &self.open {
            path.push('/');
            path.push_str(name);
        }
        let current_closed = match self.node.kind {
            NodeKind::Element => self.node.empty,
            NodeKind::EndElement => true,
            _ => false,
        };
        if current_closed {
            path.push('/');
            path.push_str(&self.node.name);
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn fill(&mut self) -> Result<bool, ReaderError> {
        if self.drained {
            return Ok(false);
        }
        let len = loop {
            match self.source.read(&mut self.chunk) {
                Ok(len) => break len,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ReaderError::Io(err)),
            }
        };
        if len == 0 {
            self.drained = true;
            self.parser
                .parse_finish()
                .map_err(|err| ReaderError::from_sax(err, self.parser.location()))?;
            return Ok(false);
        }
        trace!("parsing a block of {len} bytes");
        self.parser
            .parse_bytes(&mut self.queue, &self.chunk[..len])
            .map_err(|err| ReaderError::from_sax(err, self.parser.location()))?;
        Ok(true)
    }

    fn next_event(&mut self) -> Result<Option<Event>, ReaderError> {
        loop {
            // Text is complete only when something follows it.
            let ready = match self.queue.events.front() {
                None => false,
                Some(Event::Text(_)) => self.queue.events.len() > 1 || self.drained,
                Some(_) => true,
            };
            if ready || !self.fill()? {
                return Ok(self.queue.events.pop_front());
            }
        }
    }

    fn load(&mut self, event: Event) -> Result<(), ReaderError> {
        let depth = self.open.len();
        self.node = match event {
            Event::Start {
                name,
                attributes,
                empty,
            } => {
                if !empty {
                    self.open.push(name.clone());
                }
                Node {
                    kind: NodeKind::Element,
                    name,
                    value: String::new(),
                    depth,
                    empty,
                    attributes,
                }
            }
            Event::End(name) => {
                if self.open.pop().as_deref() != Some(name.as_str()) {
                    return Err(ReaderError::BadXml {
                        description: description::TAG_MISMATCH,
                        location: self.parser.location(),
                    });
                }
                Node::leaf(NodeKind::EndElement, name, String::new(), depth - 1)
            }
            Event::Text(text) => {
                let kind = if is_whitespace(&text) {
                    NodeKind::SignificantWhitespace
                } else {
                    NodeKind::Text
                };
                Node::leaf(kind, "#text".to_string(), text, depth)
            }
            Event::CDataSection(text) => {
                Node::leaf(NodeKind::CData, "#cdata-section".to_string(), text, depth)
            }
            Event::Comment(text) => Node::leaf(NodeKind::Comment, "#comment".to_string(), text, depth),
            Event::ProcessingInstruction(target, data) => {
                Node::leaf(NodeKind::ProcessingInstruction, target, data, depth)
            }
            Event::DocumentType(text) => {
                let name = text
                    .split(|c: char| c.is_ascii_whitespace() || c == '[')
                    .next()
                    .unwrap_or("")
                    .to_string();
                Node::leaf(NodeKind::DocumentType, name, text, depth)
            }
        };
        Ok(())
    }

    fn fail(&mut self, err: ReaderError) -> bool {
        debug!("xml reader stopped: {err}");
        self.last_error = Some(err);
        self.status = Status::Failed;
        self.node = Node::none();
        self.open.clear();
        false
    }
}

impl Reader<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        Ok(Reader::new(File::open(path)?))
    }
}

impl<'a> Reader<&'a [u8]> {
    pub fn from_xml(xml: &'a str) -> Self {
        Reader::new(xml.as_bytes())
    }
}

impl Reader<Box<dyn Read>> {
    /// Opens a file name or reads the string itself as XML.
    ///
    /// A short string without control or non-ASCII characters which names an
    /// existing file is opened as a file, anything else is parsed as the
    /// document text.
    pub fn open(source: &str, options: ReaderOptions) -> Result<Self, ReaderError> {
        let looks_like_path = source.len() < MAX_PATH_SOURCE
            && source.bytes().all(|c| (0x20..0x80).contains(&c))
            && Path::new(source).is_file();
        let input: Box<dyn Read> = if looks_like_path {
            debug!("reading xml from file {source}");
            Box::new(File::open(source)?)
        } else {
            Box::new(std::io::Cursor::new(source.as_bytes().to_vec()))
        };
        Ok(Reader::with_options(input, options))
    }
}

impl<R: Read> Cursor for Reader<R> {
    fn advance(&mut self) -> bool {
        if self.status != Status::Reading {
            return false;
        }
        let loaded = match self.next_event() {
            Ok(Some(event)) => self.load(event),
            Ok(None) => {
                self.status = Status::Finished;
                self.node = Node::none();
                return false;
            }
            Err(err) => Err(err),
        };
        match loaded {
            Ok(()) => true,
            Err(err) => self.fail(err),
        }
    }

    fn advance_skipping_subtree(&mut self, name: Option<&str>) -> bool {
        let start_depth = self.node.depth;
        loop {
            if self.node.kind == NodeKind::Element && !self.node.empty {
                let depth = self.node.depth;
                loop {
                    if !self.advance() {
                        return false;
                    }
                    if self.node.kind == NodeKind::EndElement && self.node.depth == depth {
                        break;
                    }
                }
            }
            if !self.advance() {
                return false;
            }
            match name {
                None => return true,
                Some(name) => {
                    let found = self.node.kind == NodeKind::Element && self.node.name == name;
                    if found || self.node.depth < start_depth {
                        return true;
                    }
                }
            }
        }
    }

    fn depth(&self) -> usize {
        self.node.depth
    }

    fn node_kind(&self) -> NodeKind {
        self.node.kind
    }

    fn name(&self) -> &str {
        &self.node.name
    }

    fn value(&self) -> &str {
        &self.node.value
    }

    fn attributes(&self) -> Attributes<'_> {
        Attributes::new(&self.node.attributes)
    }

    fn is_empty_element(&self) -> bool {
        self.node.kind == NodeKind::Element && self.node.empty
    }
}
