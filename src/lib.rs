/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod cursor;
mod entities;
mod parser;
mod reader;
mod snapshot;
mod walker;

pub use cursor::Attributes;
pub use cursor::Cursor;

pub use parser::Location;
pub use parser::SaxElement;
pub use parser::SaxError;
pub use parser::SaxHandler;
pub use parser::SaxParser;

pub use reader::NodeKind;
pub use reader::Reader;
pub use reader::ReaderError;
pub use reader::ReaderOptions;

pub use snapshot::Element;
pub use snapshot::Node;

pub use walker::DepthIter;
