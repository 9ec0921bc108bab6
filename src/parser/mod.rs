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
mod location;

pub(crate) use error::description;
pub use error::SaxError;
pub use location::Location;

/// An XML construct reported by the parser.
#[derive(Debug, Eq, PartialEq)]
pub enum SaxElement<'a> {
    /// A start tag or an empty element tag.
    ///
    /// The argument is the full name of the tag. It is sent as soon as the
    /// name is parsed, attributes follow as separate elements.
    StartTag(&'a str),

    /// An attribute of the last StartTag.
    ///
    /// All references in the value are already replaced.
    Attribute(&'a str, &'a str),

    /// The last StartTag is closed with `>` and has content.
    StartTagContent,

    /// The last StartTag is closed with `/>` and has no content.
    StartTagEmpty,

    /// An end tag with its full name.
    EndTag(&'a str),

    /// Character data with references replaced.
    ///
    /// A single block of text can be reported in several pieces, for example
    /// when the input is given in multiple [parse_bytes()](SaxParser::parse_bytes)
    /// calls. The [Reader](crate::Reader) merges them.
    CData(&'a str),

    /// Contents of a `<![CDATA[ ... ]]>` section.
    CDataSection(&'a str),

    /// Contents of a `<!-- ... -->` comment.
    Comment(&'a str),

    /// A processing instruction with its target and data.
    ProcessingInstruction(&'a str, &'a str),

    /// Contents of a `<!DOCTYPE ...>` declaration after the keyword.
    DocumentType(&'a str),
}

pub trait SaxHandler {
    fn handle_element(&mut self, element: &SaxElement) -> Result<(), SaxError>;
}

/// SAX (Simple API for XML) based push parser.
///
/// Bytes are fed with [parse_bytes()](SaxParser::parse_bytes) in blocks of
/// any size, the block boundaries can even split a multi byte character.
/// Each recognized construct is passed to the handler immediately.
///
/// # Examples
///
/// ```
/// use ikswalk::{SaxElement, SaxError, SaxHandler, SaxParser};
///
/// struct TagCounter {
///     tags: usize,
/// }
///
/// impl SaxHandler for TagCounter {
///     fn handle_element(&mut self, element: &SaxElement) -> Result<(), SaxError> {
///         if let SaxElement::StartTag(_) = element {
///             self.tags += 1;
///         }
///         Ok(())
///     }
/// }
///
/// let mut counter = TagCounter { tags: 0 };
/// let mut parser = SaxParser::new();
/// parser.parse_bytes(&mut counter, b"<doc><a/>")?;
/// parser.parse_bytes(&mut counter, b"<b>text</b></doc>")?;
/// parser.parse_finish()?;
/// assert_eq!(counter.tags, 3);
/// # Ok::<(), SaxError>(())
/// ```
pub struct SaxParser {
    state: State,
    uni_len: u32,
    uni_left: u32,
    uni_char: u32,
    depth: usize,
    is_end_tag: bool,
    quote: u8,
    seen_root: bool,
    failed: bool,
    value_pos: usize,
    keyword_pos: usize,
    buffer: Vec<u8>,
    ref_buffer: Vec<u8>,
    ref_in_value: bool,
    char_ref_value: u32,
    location: Location,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Prolog,
    Epilog,
    TagStart,
    TagName,
    EndTagWhitespace,
    EmptyTagEnd,
    AttributeWhitespace,
    AttributeName,
    AttributeEq,
    AttributeValueStart,
    AttributeValue,
    CData,
    Reference,
    Entity,
    CharReference,
    DecimalReference,
    HexReference,
    Markup,
    CommentStart,
    CommentBody,
    CommentDash,
    CommentEnd,
    SectionKeyword,
    SectionBody,
    SectionBracket,
    SectionBrackets,
    DoctypeKeyword,
    DoctypeSpace,
    DoctypeBody,
    DoctypeSubset,
    PI,
    PIEnd,
}

const INITIAL_BUFFER_CAPACITY: usize = 128;

const REF_BUFFER_SIZE: usize = 8;

const CDATA_KEYWORD: &[u8] = b"[CDATA[";

const DOCTYPE_KEYWORD: &[u8] = b"DOCTYPE";

const XML_WHITESPACE: [char; 4] = [' ', '\t', '\r', '\n'];

macro_rules! whitespace {
    () => {
        b' ' | b'\t' | b'\r' | b'\n'
    };
}

macro_rules! xml_error {
    ($a:ident) => {
        return Err(SaxError::BadXml(description::$a))
    };
}

fn is_valid_xml_char(c: u32) -> bool {
    matches!(c, 0x09 | 0x0a | 0x0d | 0x20..=0xd7ff | 0xe000..=0xfffd | 0x10000..=0x10ffff)
}

fn as_text(bytes: &[u8]) -> Result<&str, SaxError> {
    std::str::from_utf8(bytes).map_err(|_| SaxError::BadXml(description::UTF8_INCOMPLETE))
}

fn predefined_entity(name: &[u8]) -> Option<u8> {
    match name {
        b"amp" => Some(b'&'),
        b"lt" => Some(b'<'),
        b"gt" => Some(b'>'),
        b"quot" => Some(b'"'),
        b"apos" => Some(b'\''),
        _ => None,
    }
}

impl SaxParser {
    /// Creates a new parser.
    ///
    /// The instance can be reused for multiple documents with the
    /// [reset()](SaxParser::reset) method.
    pub fn new() -> SaxParser {
        SaxParser {
            state: State::Prolog,
            uni_len: 0,
            uni_left: 0,
            uni_char: 0,
            depth: 0,
            is_end_tag: false,
            quote: b'"',
            seen_root: false,
            failed: false,
            value_pos: 0,
            keyword_pos: 0,
            buffer: Vec::with_capacity(INITIAL_BUFFER_CAPACITY),
            ref_buffer: Vec::with_capacity(REF_BUFFER_SIZE),
            ref_in_value: false,
            char_ref_value: 0,
            location: Location::new(),
        }
    }

    /// Resets the parser into a clean state.
    pub fn reset(&mut self) {
        self.state = State::Prolog;
        self.uni_len = 0;
        self.uni_left = 0;
        self.uni_char = 0;
        self.depth = 0;
        self.is_end_tag = false;
        self.quote = b'"';
        self.seen_root = false;
        self.failed = false;
        self.value_pos = 0;
        self.keyword_pos = 0;
        self.buffer.clear();
        self.ref_buffer.clear();
        self.ref_in_value = false;
        self.char_ref_value = 0;
        self.location = Location::new();
    }

    /// Position of the last parsed byte.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Checks that the document is complete.
    ///
    /// A complete document has a root tag and no unfinished constructs.
    pub fn parse_finish(&mut self) -> Result<(), SaxError> {
        if self.failed {
            xml_error!(PARSER_REUSE_WITHOUT_RESET);
        }
        if !self.seen_root {
            xml_error!(DOC_NO_CONTENT);
        }
        if self.depth > 0 {
            xml_error!(DOC_OPEN_TAGS);
        }
        if self.state != State::Epilog {
            xml_error!(DOC_OPEN_MARKUP);
        }
        Ok(())
    }

    /// Parses the given bytes and checks that the document is complete.
    pub fn parse_bytes_finish(
        &mut self,
        handler: &mut impl SaxHandler,
        bytes: &[u8],
    ) -> Result<(), SaxError> {
        self.parse_bytes(handler, bytes)?;
        self.parse_finish()
    }

    /// Parses a block of bytes.
    ///
    /// After an error the parser stays in the failed state until
    /// [reset()](SaxParser::reset) is called.
    pub fn parse_bytes(
        &mut self,
        handler: &mut impl SaxHandler,
        bytes: &[u8],
    ) -> Result<(), SaxError> {
        if self.failed {
            xml_error!(PARSER_REUSE_WITHOUT_RESET);
        }
        let result = self.parse_block(handler, bytes);
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn extend_buffer(&mut self, bytes: &[u8]) -> Result<(), SaxError> {
        if self.buffer.try_reserve(bytes.len()).is_err() {
            return Err(SaxError::NoMemory);
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn push_buffer(&mut self, c: u8) -> Result<(), SaxError> {
        self.extend_buffer(&[c])
    }

    fn push_char(&mut self, value: u32) -> Result<(), SaxError> {
        if !is_valid_xml_char(value) {
            xml_error!(CHAR_INVALID);
        }
        let c = match char::from_u32(value) {
            Some(c) => c,
            None => xml_error!(CHAR_INVALID),
        };
        let mut encoded = [0u8; 4];
        self.extend_buffer(c.encode_utf8(&mut encoded).as_bytes())
    }

    fn check_byte(&mut self, c: u8) -> Result<(), SaxError> {
        if self.uni_left > 0 {
            if c & 0xc0 != 0x80 {
                xml_error!(UTF8_INVALID_CONT_BYTE);
            }
            self.uni_char = (self.uni_char << 6) | (c as u32 & 0x3f);
            self.uni_left -= 1;
            if self.uni_left == 0 {
                // Sequences longer than the codepoint needs are security hazards.
                let smallest = match self.uni_len {
                    2 => 0x80,
                    3 => 0x800,
                    _ => 0x10000,
                };
                if self.uni_char < smallest {
                    xml_error!(UTF8_OVERLONG_SEQUENCE);
                }
                if !is_valid_xml_char(self.uni_char) {
                    xml_error!(CHAR_INVALID);
                }
            }
        } else if c & 0x80 != 0 {
            let (len, bits) = match c {
                0xc0..=0xdf => (2, c & 0x1f),
                0xe0..=0xef => (3, c & 0x0f),
                0xf0..=0xf7 => (4, c & 0x07),
                _ => xml_error!(UTF8_INVALID_PREFIX_BYTE),
            };
            self.uni_len = len;
            self.uni_left = len - 1;
            self.uni_char = bits as u32;
        } else if c < 0x20 && !matches!(c, b'\t' | b'\n' | b'\r') {
            xml_error!(CHAR_INVALID);
        }
        Ok(())
    }

    fn flush_cdata(&mut self, handler: &mut impl SaxHandler, chunk: &[u8]) -> Result<(), SaxError> {
        if self.buffer.is_empty() {
            if !chunk.is_empty() {
                handler.handle_element(&SaxElement::CData(as_text(chunk)?))?;
            }
        } else {
            self.extend_buffer(chunk)?;
            handler.handle_element(&SaxElement::CData(as_text(&self.buffer)?))?;
            self.buffer.clear();
        }
        Ok(())
    }

    fn emit_tag_name(&mut self, handler: &mut impl SaxHandler, c: u8) -> Result<(), SaxError> {
        if self.buffer.is_empty() {
            xml_error!(TAG_EMPTY_NAME);
        }
        let name = as_text(&self.buffer)?;
        if self.is_end_tag {
            if c == b'/' {
                xml_error!(TAG_DOUBLE_END);
            }
            handler.handle_element(&SaxElement::EndTag(name))?;
        } else {
            handler.handle_element(&SaxElement::StartTag(name))?;
        }
        self.buffer.clear();
        Ok(())
    }

    fn emit_pi(&mut self, handler: &mut impl SaxHandler) -> Result<(), SaxError> {
        let content = as_text(&self.buffer)?;
        let (target, data) = match content.find(XML_WHITESPACE) {
            Some(split) => (
                &content[..split],
                content[split..].trim_start_matches(XML_WHITESPACE),
            ),
            None => (content, ""),
        };
        if target.is_empty() {
            xml_error!(PI_MISSING_TARGET);
        }
        handler.handle_element(&SaxElement::ProcessingInstruction(target, data))?;
        self.buffer.clear();
        Ok(())
    }

    // State to continue with after a comment or a processing instruction.
    fn after_markup(&self) -> State {
        if self.depth > 0 {
            State::CData
        } else if self.seen_root {
            State::Epilog
        } else {
            State::Prolog
        }
    }

    // Closes the innermost open tag.
    fn close_tag(&mut self) -> Result<State, SaxError> {
        if self.depth == 0 {
            xml_error!(TAG_CLOSE_WITHOUT_OPEN);
        }
        self.depth -= 1;
        if self.depth == 0 {
            Ok(State::Epilog)
        } else {
            Ok(State::CData)
        }
    }

    fn parse_block(&mut self, handler: &mut impl SaxHandler, bytes: &[u8]) -> Result<(), SaxError> {
        let mut pos: usize = 0;
        let mut back: usize = 0;

        while pos < bytes.len() {
            let c = bytes[pos];
            self.check_byte(c)?;

            match self.state {
                State::Prolog | State::Epilog => match c {
                    b'<' => self.state = State::TagStart,
                    whitespace!() => (),
                    _ => xml_error!(DOC_CDATA_WITHOUT_PARENT),
                },

                State::TagStart => match c {
                    b'!' => self.state = State::Markup,
                    b'?' => self.state = State::PI,
                    b'/' => {
                        if self.depth == 0 {
                            xml_error!(TAG_CLOSE_WITHOUT_OPEN);
                        }
                        back = pos + 1;
                        self.is_end_tag = true;
                        self.state = State::TagName;
                    }
                    whitespace!() => xml_error!(TAG_WHITESPACE_START),
                    b'>' => xml_error!(TAG_EMPTY_NAME),
                    _ => {
                        if self.depth == 0 && self.seen_root {
                            xml_error!(TAG_OUTSIDE_ROOT);
                        }
                        self.depth += 1;
                        self.seen_root = true;
                        back = pos;
                        self.is_end_tag = false;
                        self.state = State::TagName;
                    }
                },

                State::TagName => match c {
                    b'/' | b'>' | whitespace!() => {
                        self.extend_buffer(&bytes[back..pos])?;
                        self.emit_tag_name(handler, c)?;
                        match c {
                            b'/' => self.state = State::EmptyTagEnd,
                            b'>' => {
                                if self.is_end_tag {
                                    self.state = self.close_tag()?;
                                } else {
                                    handler.handle_element(&SaxElement::StartTagContent)?;
                                    self.state = State::CData;
                                }
                                back = pos + 1;
                            }
                            _ => {
                                if self.is_end_tag {
                                    self.state = State::EndTagWhitespace;
                                } else {
                                    self.state = State::AttributeWhitespace;
                                }
                            }
                        }
                    }
                    _ => (),
                },

                State::EndTagWhitespace => match c {
                    b'>' => {
                        self.state = self.close_tag()?;
                        back = pos + 1;
                    }
                    whitespace!() => (),
                    _ => xml_error!(TAG_END_TAG_ATTRIBUTES),
                },

                State::EmptyTagEnd => match c {
                    b'>' => {
                        handler.handle_element(&SaxElement::StartTagEmpty)?;
                        self.state = self.close_tag()?;
                        back = pos + 1;
                    }
                    _ => xml_error!(TAG_EMPTY_TAG_MISSING_END),
                },

                State::AttributeWhitespace => match c {
                    whitespace!() => (),
                    b'/' => self.state = State::EmptyTagEnd,
                    b'>' => {
                        handler.handle_element(&SaxElement::StartTagContent)?;
                        back = pos + 1;
                        self.state = State::CData;
                    }
                    b'=' | b'<' => xml_error!(TAG_ATTRIBUTE_BAD_NAME),
                    _ => {
                        back = pos;
                        self.state = State::AttributeName;
                    }
                },

                State::AttributeName => match c {
                    b'=' | whitespace!() => {
                        self.extend_buffer(&bytes[back..pos])?;
                        if c == b'=' {
                            self.state = State::AttributeValueStart;
                        } else {
                            self.state = State::AttributeEq;
                        }
                    }
                    b'/' | b'>' | b'<' => xml_error!(TAG_ATTRIBUTE_BAD_NAME),
                    _ => (),
                },

                State::AttributeEq => match c {
                    b'=' => self.state = State::AttributeValueStart,
                    whitespace!() => (),
                    _ => xml_error!(TAG_ATTRIBUTE_WITHOUT_EQUAL),
                },

                State::AttributeValueStart => match c {
                    b'"' | b'\'' => {
                        self.quote = c;
                        self.value_pos = self.buffer.len();
                        back = pos + 1;
                        self.state = State::AttributeValue;
                    }
                    whitespace!() => (),
                    _ => xml_error!(TAG_ATTRIBUTE_WITHOUT_QUOTE),
                },

                State::AttributeValue => match c {
                    b'&' => {
                        self.extend_buffer(&bytes[back..pos])?;
                        self.ref_buffer.clear();
                        self.ref_in_value = true;
                        self.state = State::Reference;
                    }
                    b'<' => xml_error!(TAG_ATTRIBUTE_BAD_VALUE),
                    _ if c == self.quote => {
                        self.extend_buffer(&bytes[back..pos])?;
                        let name = as_text(&self.buffer[..self.value_pos])?;
                        let value = as_text(&self.buffer[self.value_pos..])?;
                        handler.handle_element(&SaxElement::Attribute(name, value))?;
                        self.buffer.clear();
                        self.state = State::AttributeWhitespace;
                    }
                    _ => (),
                },

                State::CData => match c {
                    b'<' => {
                        self.flush_cdata(handler, &bytes[back..pos])?;
                        self.state = State::TagStart;
                    }
                    b'&' => {
                        self.extend_buffer(&bytes[back..pos])?;
                        self.ref_buffer.clear();
                        self.ref_in_value = false;
                        self.state = State::Reference;
                    }
                    _ => (),
                },

                State::Reference => match c {
                    b'#' => self.state = State::CharReference,
                    b';' => xml_error!(REFERENCE_CUSTOM_ENTITY),
                    _ => {
                        self.ref_buffer.push(c);
                        self.state = State::Entity;
                    }
                },

                State::Entity => match c {
                    b';' => {
                        let Some(ent) = predefined_entity(&self.ref_buffer) else {
                            xml_error!(REFERENCE_CUSTOM_ENTITY);
                        };
                        self.push_buffer(ent)?;
                        back = pos + 1;
                        self.state = self.after_reference();
                    }
                    _ => {
                        if self.ref_buffer.len() >= REF_BUFFER_SIZE {
                            xml_error!(REFERENCE_CUSTOM_ENTITY);
                        }
                        self.ref_buffer.push(c);
                    }
                },

                State::CharReference => match c {
                    b'x' => {
                        self.char_ref_value = 0;
                        self.state = State::HexReference;
                    }
                    b'0'..=b'9' => {
                        self.char_ref_value = (c - b'0') as u32;
                        self.state = State::DecimalReference;
                    }
                    _ => xml_error!(REFERENCE_INVALID_DECIMAL),
                },

                State::DecimalReference | State::HexReference => {
                    let radix = if self.state == State::HexReference { 16 } else { 10 };
                    if c == b';' {
                        self.push_char(self.char_ref_value)?;
                        back = pos + 1;
                        self.state = self.after_reference();
                    } else {
                        let Some(digit) = (c as char).to_digit(radix) else {
                            if radix == 16 {
                                xml_error!(REFERENCE_INVALID_HEX);
                            }
                            xml_error!(REFERENCE_INVALID_DECIMAL);
                        };
                        self.char_ref_value = self.char_ref_value * radix + digit;
                        if self.char_ref_value > 0x10ffff {
                            xml_error!(CHAR_INVALID);
                        }
                    }
                }

                State::Markup => match c {
                    b'-' => self.state = State::CommentStart,
                    b'[' => {
                        if self.depth == 0 {
                            xml_error!(MARKUP_CDATA_SECTION_OUTSIDE_ROOT);
                        }
                        self.keyword_pos = 1;
                        self.state = State::SectionKeyword;
                    }
                    b'D' => {
                        if self.seen_root {
                            xml_error!(MARKUP_DOCTYPE_AFTER_ROOT);
                        }
                        self.keyword_pos = 1;
                        self.state = State::DoctypeKeyword;
                    }
                    _ => xml_error!(MARKUP_UNRECOGNIZED),
                },

                State::CommentStart => {
                    if c != b'-' {
                        xml_error!(COMMENT_MISSING_DASH);
                    }
                    self.state = State::CommentBody;
                }

                State::CommentBody => match c {
                    b'-' => self.state = State::CommentDash,
                    _ => self.push_buffer(c)?,
                },

                State::CommentDash => match c {
                    b'-' => self.state = State::CommentEnd,
                    _ => {
                        self.extend_buffer(&[b'-', c])?;
                        self.state = State::CommentBody;
                    }
                },

                State::CommentEnd => {
                    if c != b'>' {
                        xml_error!(COMMENT_MISSING_END);
                    }
                    handler.handle_element(&SaxElement::Comment(as_text(&self.buffer)?))?;
                    self.buffer.clear();
                    back = pos + 1;
                    self.state = self.after_markup();
                }

                State::SectionKeyword => {
                    if c != CDATA_KEYWORD[self.keyword_pos] {
                        xml_error!(MARKUP_CDATA_SECTION_BAD_START);
                    }
                    self.keyword_pos += 1;
                    if self.keyword_pos == CDATA_KEYWORD.len() {
                        self.state = State::SectionBody;
                    }
                }

                State::SectionBody => match c {
                    b']' => self.state = State::SectionBracket,
                    _ => self.push_buffer(c)?,
                },

                State::SectionBracket => match c {
                    b']' => self.state = State::SectionBrackets,
                    _ => {
                        self.extend_buffer(&[b']', c])?;
                        self.state = State::SectionBody;
                    }
                },

                State::SectionBrackets => match c {
                    b'>' => {
                        let text = as_text(&self.buffer)?;
                        handler.handle_element(&SaxElement::CDataSection(text))?;
                        self.buffer.clear();
                        back = pos + 1;
                        self.state = State::CData;
                    }
                    b']' => self.push_buffer(b']')?,
                    _ => {
                        self.extend_buffer(&[b']', b']', c])?;
                        self.state = State::SectionBody;
                    }
                },

                State::DoctypeKeyword => {
                    if c != DOCTYPE_KEYWORD[self.keyword_pos] {
                        xml_error!(MARKUP_DOCTYPE_BAD_START);
                    }
                    self.keyword_pos += 1;
                    if self.keyword_pos == DOCTYPE_KEYWORD.len() {
                        self.state = State::DoctypeSpace;
                    }
                }

                State::DoctypeSpace => match c {
                    whitespace!() => self.state = State::DoctypeBody,
                    _ => xml_error!(MARKUP_DOCTYPE_BAD_START),
                },

                State::DoctypeBody => match c {
                    b'>' => {
                        let text = as_text(&self.buffer)?.trim_matches(XML_WHITESPACE);
                        handler.handle_element(&SaxElement::DocumentType(text))?;
                        self.buffer.clear();
                        self.state = State::Prolog;
                    }
                    b'[' => {
                        self.push_buffer(c)?;
                        self.state = State::DoctypeSubset;
                    }
                    _ => self.push_buffer(c)?,
                },

                State::DoctypeSubset => {
                    self.push_buffer(c)?;
                    if c == b']' {
                        self.state = State::DoctypeBody;
                    }
                }

                State::PI => match c {
                    b'?' => self.state = State::PIEnd,
                    _ => self.push_buffer(c)?,
                },

                State::PIEnd => match c {
                    b'>' => {
                        self.emit_pi(handler)?;
                        back = pos + 1;
                        self.state = self.after_markup();
                    }
                    b'?' => self.push_buffer(b'?')?,
                    _ => {
                        self.extend_buffer(&[b'?', c])?;
                        self.state = State::PI;
                    }
                },
            }

            pos += 1;
            self.location.advance(c);
        }

        // Keep unfinished names, values and text for the next block.
        match self.state {
            State::TagName | State::AttributeName | State::AttributeValue | State::CData => {
                if back < pos {
                    self.extend_buffer(&bytes[back..pos])?;
                }
            }
            _ => (),
        }

        Ok(())
    }

    fn after_reference(&self) -> State {
        if self.ref_in_value {
            State::AttributeValue
        } else {
            State::CData
        }
    }
}

impl Default for SaxParser {
    fn default() -> Self {
        Self::new()
    }
}
