/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::error::Error;
use std::fmt::Display;

use crate::Location;
use crate::SaxError;

/// Reason why a [Reader](super::Reader) stopped early.
#[derive(Debug)]
pub enum ReaderError {
    /// Reading from the byte source failed.
    Io(std::io::Error),

    /// Buffers for the parser could not be allocated.
    NoMemory,

    /// The document is not well formed.
    BadXml {
        description: &'static str,
        location: Location,
    },
}

impl ReaderError {
    pub(crate) fn from_sax(err: SaxError, location: Location) -> Self {
        match err {
            SaxError::NoMemory => ReaderError::NoMemory,
            SaxError::BadXml(msg) => ReaderError::BadXml {
                description: msg,
                location,
            },
            SaxError::HandlerAbort => ReaderError::BadXml {
                description: description::UNEXPECTED_HANDLER_ABORT,
                location,
            },
        }
    }
}

impl Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderError::Io(err) => write!(f, "read error: {err}"),
            ReaderError::NoMemory => write!(f, "not enough memory"),
            ReaderError::BadXml {
                description,
                location,
            } => write!(f, "invalid XML syntax at {location}: {description}"),
        }
    }
}

impl Error for ReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReaderError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReaderError {
    fn from(err: std::io::Error) -> Self {
        ReaderError::Io(err)
    }
}

pub(crate) mod description {
    pub(crate) const UNEXPECTED_HANDLER_ABORT: &str = "unexpected handler abort";
    pub(crate) const TAG_MISMATCH: &str = "start and end tags have different names";
    pub(crate) const DUPLICATE_ATTRIBUTE: &str = "attribute name already used in this tag";
}
