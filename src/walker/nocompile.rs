/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

/// # Must not compile tests
///
/// Parent cannot advance while a child iterator is alive:
/// ```compile_fail
/// use ikswalk::{DepthIter, Reader};
/// let mut reader = Reader::from_xml("<a><b/></a>");
/// let mut root = DepthIter::new(&mut reader);
/// root.advance();
/// let mut children = root.descend();
/// root.advance();
/// children.advance();
/// ```
///
/// Two children of the same parent cannot be used together:
/// ```compile_fail
/// use ikswalk::{DepthIter, Reader};
/// let mut reader = Reader::from_xml("<a><b/></a>");
/// let mut root = DepthIter::new(&mut reader);
/// root.advance();
/// let mut first = root.descend();
/// let mut second = root.descend();
/// first.advance();
/// second.advance();
/// ```
///
/// Child iterator cannot outlive its parent:
/// ```compile_fail
/// use ikswalk::{DepthIter, Reader};
/// let mut reader = Reader::from_xml("<a><b/></a>");
/// let mut children;
/// {
///     let mut root = DepthIter::new(&mut reader);
///     root.advance();
///     children = root.descend();
/// }
/// children.advance();
/// ```
///
/// Cursor cannot be moved behind the iterator's back:
/// ```compile_fail
/// use ikswalk::{Cursor, DepthIter, Reader};
/// let mut reader = Reader::from_xml("<a><b/></a>");
/// let mut root = DepthIter::new(&mut reader);
/// reader.advance();
/// root.advance();
/// ```
///
/// Snapshot cannot be held across an advance:
/// ```compile_fail
/// use ikswalk::{DepthIter, Reader};
/// let mut reader = Reader::from_xml("<a><b/></a>");
/// let mut root = DepthIter::new(&mut reader);
/// root.advance();
/// let element = root.snapshot();
/// root.advance();
/// println!("{:?}", element);
/// ```
///
#[cfg(doctest)]
struct MustNotCompileTests;
