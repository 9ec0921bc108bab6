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

/// Type of the node under a cursor.
///
/// The variants and their numeric codes follow the classic pull reader
/// node types, so the codes can be exchanged with tools which speak them.
/// The [Reader](crate::Reader) produces `None`, `Element`, `EndElement`,
/// `Text`, `SignificantWhitespace`, `CData`, `Comment`,
/// `ProcessingInstruction`, and `DocumentType` nodes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    /// Not positioned on a node: before the first read or after the end.
    None,
    Element,
    Attribute,
    Text,
    CData,
    EntityReference,
    Entity,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
    Notation,
    Whitespace,
    SignificantWhitespace,
    EndElement,
    EndEntity,
    XmlDeclaration,
}

impl NodeKind {
    pub fn code(self) -> u8 {
        match self {
            NodeKind::None => 0,
            NodeKind::Element => 1,
            NodeKind::Attribute => 2,
            NodeKind::Text => 3,
            NodeKind::CData => 4,
            NodeKind::EntityReference => 5,
            NodeKind::Entity => 6,
            NodeKind::ProcessingInstruction => 7,
            NodeKind::Comment => 8,
            NodeKind::Document => 9,
            NodeKind::DocumentType => 10,
            NodeKind::DocumentFragment => 11,
            NodeKind::Notation => 12,
            NodeKind::Whitespace => 13,
            NodeKind::SignificantWhitespace => 14,
            NodeKind::EndElement => 15,
            NodeKind::EndEntity => 16,
            NodeKind::XmlDeclaration => 17,
        }
    }

    /// Returns the kind with the given numeric code, if there is one.
    pub fn from_code(code: u8) -> Option<NodeKind> {
        let kind = match code {
            0 => NodeKind::None,
            1 => NodeKind::Element,
            2 => NodeKind::Attribute,
            3 => NodeKind::Text,
            4 => NodeKind::CData,
            5 => NodeKind::EntityReference,
            6 => NodeKind::Entity,
            7 => NodeKind::ProcessingInstruction,
            8 => NodeKind::Comment,
            9 => NodeKind::Document,
            10 => NodeKind::DocumentType,
            11 => NodeKind::DocumentFragment,
            12 => NodeKind::Notation,
            13 => NodeKind::Whitespace,
            14 => NodeKind::SignificantWhitespace,
            15 => NodeKind::EndElement,
            16 => NodeKind::EndEntity,
            17 => NodeKind::XmlDeclaration,
            _ => return None,
        };
        Some(kind)
    }

    /// Upper case label such as `ELEMENT` or `END_ELEMENT`.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::None => "NONE",
            NodeKind::Element => "ELEMENT",
            NodeKind::Attribute => "ATTRIBUTE",
            NodeKind::Text => "TEXT",
            NodeKind::CData => "CDATA",
            NodeKind::EntityReference => "ENTITY_REF",
            NodeKind::Entity => "ENTITY",
            NodeKind::ProcessingInstruction => "PI",
            NodeKind::Comment => "COMMENT",
            NodeKind::Document => "DOC",
            NodeKind::DocumentType => "DOC_TYPE",
            NodeKind::DocumentFragment => "DOC_FRAGMENT",
            NodeKind::Notation => "NOTATION",
            NodeKind::Whitespace => "WHITESPACE",
            NodeKind::SignificantWhitespace => "SIGNIFICANT_WHITESPACE",
            NodeKind::EndElement => "END_ELEMENT",
            NodeKind::EndEntity => "END_ENTITY",
            NodeKind::XmlDeclaration => "XML_DECLARATION",
        }
    }

    /// Label of a numeric node type code, `UNKNOWN` for unassigned codes.
    pub fn label_for_code(code: u8) -> &'static str {
        match NodeKind::from_code(code) {
            Some(kind) => kind.label(),
            None => "UNKNOWN",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
