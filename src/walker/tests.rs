/*
** This file is a part of Ikswalk (forward-only XML walker from Iksemel)
** Copyright (C) 2025 Gurer Ozen
**
** Ikswalk is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::*;

use crate::Reader;
use crate::ReaderOptions;

// Renders the element tree visited through nested iterators.
fn outline<C: Cursor>(iter: &mut DepthIter<'_, C>, indent: usize, out: &mut Vec<String>) {
    while iter.advance() {
        out.push(format!(
            "{}{}:{}",
            " ".repeat(indent),
            iter.current_index().unwrap_or(usize::MAX),
            iter.name().unwrap_or("?")
        ));
        let mut children = iter.descend();
        outline(&mut children, indent + 1, out);
    }
}

// Same outline, reading the content helpers after the children are walked.
fn outline_then_text<C: Cursor>(
    iter: &mut DepthIter<'_, C>,
    indent: usize,
    out: &mut Vec<String>,
) {
    while iter.advance() {
        let line = format!(
            "{}{}:{}",
            " ".repeat(indent),
            iter.current_index().unwrap_or(usize::MAX),
            iter.name().unwrap_or("?")
        );
        let mut children_out = Vec::new();
        {
            let mut children = iter.descend();
            outline_then_text(&mut children, indent + 1, &mut children_out);
        }
        // The cursor has left the element, its content is gone
        assert!(!iter.is_valid());
        assert_eq!(iter.name(), None);
        assert_eq!(iter.text(), None);
        assert_eq!(iter.outer_xml(), None);
        out.push(line);
        out.extend(children_out);
    }
}

struct Tester<'a> {
    expected: &'a [&'a str],
}

impl<'a> Tester<'a> {
    fn new(expected: &'a [&'a str]) -> Tester<'a> {
        Tester { expected }
    }

    fn check(&self, xml: &str) {
        for size in [1, 3, 64 * 1024] {
            let options = ReaderOptions::default().with_buffer_size(size);
            let mut reader = Reader::with_options(xml.as_bytes(), options);
            let mut out = Vec::new();
            let mut root = DepthIter::new(&mut reader);
            outline(&mut root, 0, &mut out);
            assert!(!root.is_valid());
            assert_eq!(out, self.expected);
            assert!(reader.last_error().is_none());

            let options = ReaderOptions::default().with_buffer_size(size);
            let mut reader = Reader::with_options(xml.as_bytes(), options);
            let mut out = Vec::new();
            let mut root = DepthIter::new(&mut reader);
            outline_then_text(&mut root, 0, &mut out);
            assert_eq!(out, self.expected);
            assert!(reader.last_error().is_none());
        }
    }
}

#[test]
fn outlines() {
    Tester::new(&["0:r", " 0:a", " 1:b", "  0:c", " 2:d"]).check("<r><a/><b><c/></b><d/></r>");
    Tester::new(&["0:r"]).check("<r/>");
    Tester::new(&["0:r", " 0:x", "  0:p", "   0:a", " 1:y"])
        .check("<r><x><p><a/></p></x><y/></r>");
    Tester::new(&["0:r", " 0:a", "  0:b", "   0:c", "    0:d", " 1:e"])
        .check("<r>\n <a>t<b><c><d/></c>u</b>v</a>\n<!--x--> <e>w</e></r>");
    Tester::new(&["0:doc", " 0:a", " 1:b", " 2:c"]).check(concat!(
        "<?xml version='1.0'?><!DOCTYPE doc><!--pre-->",
        "<doc><?pi x?><a>1</a>text<b><![CDATA[2]]></b><c></c></doc><!--post-->",
    ));
}

#[test]
fn sibling_sequence() {
    let mut reader = Reader::from_xml("<r><a/><b><c/></b><d/></r>");
    let mut root = DepthIter::new(&mut reader);
    assert_eq!(root.target_depth(), 0);
    assert_eq!(root.current_index(), None);
    assert!(root.advance());
    assert_eq!(root.name(), Some("r"));
    assert_eq!(root.current_index(), Some(0));

    let mut children = root.descend();
    assert_eq!(children.target_depth(), 1);
    assert!(children.advance());
    assert_eq!(children.name(), Some("a"));
    assert_eq!(children.current_index(), Some(0));
    assert!(children.advance());
    assert_eq!(children.name(), Some("b"));
    assert_eq!(children.current_index(), Some(1));
    {
        let mut grandchildren = children.descend();
        assert!(grandchildren.advance());
        assert_eq!(grandchildren.name(), Some("c"));
        assert_eq!(grandchildren.current_index(), Some(0));
        assert!(!grandchildren.advance());
        assert!(!grandchildren.is_valid());
        assert_eq!(grandchildren.current_index(), None);
    }
    // The node read by the exhausted child is handed over, not skipped
    assert_eq!(children.cursor().name(), "d");
    assert!(!children.is_valid());
    assert!(children.advance());
    assert_eq!(children.name(), Some("d"));
    assert_eq!(children.current_index(), Some(2));
    assert!(!children.advance());
    assert!(!root.advance());
    assert!(root.is_exhausted());
}

#[test]
fn empty_root() {
    let mut reader = Reader::from_xml("<r/>");
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut children = root.descend();
    assert!(!children.advance());
    assert!(!children.is_valid());
    assert_eq!(children.current_index(), None);
    assert!(!root.advance());
}

#[test]
fn filter() {
    let xml = "<list><a><item>x</item></a><item>1</item><b><item>y</item></b><item>2</item></list>";
    let mut reader = Reader::from_xml(xml);
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut items = root.descend_named("item");
    let mut texts = Vec::new();
    while items.advance() {
        assert_eq!(items.name(), Some("item"));
        texts.push((items.current_index(), items.text()));
    }
    assert_eq!(
        texts,
        vec![
            (Some(0), Some("1".to_string())),
            (Some(1), Some("2".to_string())),
        ]
    );
    assert!(!root.advance());
}

#[test]
fn filter_keeps_outer_elements() {
    // A filtered child must not eat the parent's next element
    let xml = "<r><p><q/><item/><q/></p><s><item/></s></r>";
    let mut reader = Reader::from_xml(xml);
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut children = root.descend();
    assert!(children.advance());
    assert_eq!(children.name(), Some("p"));
    {
        let mut items = children.descend_named("item");
        assert!(items.advance());
        assert_eq!(items.name(), Some("item"));
        assert!(!items.advance());
    }
    assert!(children.advance());
    assert_eq!(children.name(), Some("s"));
    assert!(!children.advance());
}

#[test]
fn root_filter() {
    let mut reader = Reader::from_xml("<r><a/><item/><b><item/></b><item/></r>");
    assert!(reader.advance());
    let mut items = DepthIter::new(&mut reader).with_filter("item");
    assert_eq!(items.target_depth(), 1);
    assert!(items.advance());
    assert!(items.advance());
    assert_eq!(items.current_index(), Some(1));
    assert!(!items.advance());
}

#[test]
fn filter_without_matches() {
    let mut reader = Reader::from_xml("<r><a/><b/></r>");
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut items = root.descend_named("item");
    assert!(!items.advance());
    assert!(!root.advance());
}

#[test]
fn start_once() {
    let mut reader = Reader::from_xml("<r><a/><b/></r>");
    assert!(reader.advance());
    let mut iter = DepthIter::new(&mut reader);
    assert!(iter.start());
    assert_eq!(iter.name(), Some("a"));
    assert!(!iter.start());
    assert!(!iter.reset());
    assert_eq!(iter.name(), Some("a"));
    assert_eq!(iter.current_index(), Some(0));
    assert!(iter.advance());
    assert_eq!(iter.name(), Some("b"));
}

#[test]
fn validity() {
    let mut reader = Reader::from_xml("<r><a/></r>");
    let mut root = DepthIter::new(&mut reader);
    assert!(!root.is_valid());
    assert_eq!(root.name(), None);
    assert!(root.advance());
    for _ in 0..3 {
        assert!(root.is_valid());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.cursor().name(), "r");
    }
    assert!(!root.advance());
    for _ in 0..3 {
        assert!(!root.is_valid());
        assert!(!root.advance());
        assert!(!root.start());
    }
    assert_eq!(root.cursor().node_kind(), NodeKind::None);
    assert_eq!(root.name(), None);
    assert_eq!(root.attributes().count(), 0);
}

#[test]
fn descend_before_start() {
    let mut reader = Reader::from_xml("<r><a/></r>");
    let mut root = DepthIter::new(&mut reader);
    {
        let mut children = root.descend();
        assert!(children.is_exhausted());
        assert!(!children.advance());
        assert!(!children.start());
    }
    assert_eq!(root.cursor().node_kind(), NodeKind::None);
    assert!(root.advance());
    assert_eq!(root.name(), Some("r"));
    let mut children = root.descend();
    assert!(children.advance());
    assert_eq!(children.name(), Some("a"));
}

#[test]
fn exhausted_parent() {
    let mut reader = Reader::from_xml("<r/>");
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    assert!(!root.advance());
    let mut children = root.descend();
    assert!(children.is_exhausted());
    assert!(!children.advance());
    assert!(!children.start());
}

#[test]
fn descend_without_advancing() {
    let mut reader = Reader::from_xml("<r><a><x/><y/></a><b/></r>");
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut children = root.descend();
    assert!(children.advance());
    assert_eq!(children.name(), Some("a"));
    {
        let unused = children.descend();
        assert!(!unused.is_valid());
    }
    assert!(children.advance());
    assert_eq!(children.name(), Some("b"));
}

#[test]
fn abandoned_child() {
    let mut reader = Reader::from_xml("<r><a><x/><y/><z/></a><b/></r>");
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut children = root.descend();
    assert!(children.advance());
    {
        let mut grandchildren = children.descend();
        assert!(grandchildren.advance());
        assert_eq!(grandchildren.name(), Some("x"));
    }
    assert!(children.advance());
    assert_eq!(children.name(), Some("b"));
    assert_eq!(children.current_index(), Some(1));
    assert!(!children.advance());
}

#[test]
fn attributes() {
    let mut reader = Reader::from_xml("<r><a id='1' k='v'/><b id='2'/></r>");
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    assert_eq!(root.attributes().count(), 0);
    let mut children = root.descend();
    let mut ids = Vec::new();
    while children.advance() {
        ids.push(children.attribute("id").map(str::to_string));
    }
    assert_eq!(ids, vec![Some("1".to_string()), Some("2".to_string())]);
}

#[test]
fn snapshots() {
    let xml = "<r><a x='1'>\n  hi <b>there</b>\n</a><c>&lt;3</c><d/></r>";
    let mut reader = Reader::from_xml(xml);
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut children = root.descend();

    assert!(children.advance());
    assert_eq!(children.text(), Some("hi there".to_string()));
    assert_eq!(
        children.outer_xml(),
        Some("<a x=\"1\">\n  hi <b>there</b>\n</a>".to_string())
    );
    assert_eq!(children.snapshot().map(|e| e.elements().count()), Some(1));
    // Cursor is on the end tag, the cached copy still answers
    assert!(!children.is_valid());
    assert_eq!(children.cursor().depth(), 1);
    assert_eq!(children.name(), Some("a"));
    assert_eq!(children.attribute("x"), Some("1"));
    assert_eq!(children.cursor().node_kind(), NodeKind::EndElement);
    {
        let mut grandchildren = children.descend();
        assert!(!grandchildren.advance());
    }

    assert!(children.advance());
    assert_eq!(children.name(), Some("c"));
    assert_eq!(children.current_index(), Some(1));
    assert_eq!(children.text(), Some("<3".to_string()));

    assert!(children.advance());
    assert_eq!(children.outer_xml(), Some("<d/>".to_string()));
    // Empty element tags leave the cursor in place
    assert!(children.is_valid());
    assert!(!children.advance());
    assert_eq!(children.snapshot(), None);
    assert_eq!(children.text(), None);
}

#[test]
fn parse_failure_ends_iteration() {
    let mut reader = Reader::from_xml("<r><a/><b></c></r>");
    {
        let mut root = DepthIter::new(&mut reader);
        assert!(root.advance());
        let mut children = root.descend();
        assert!(children.advance());
        assert!(children.advance());
        assert_eq!(children.name(), Some("b"));
        assert!(!children.advance());
        assert!(!children.advance());
    }
    assert!(reader.last_error().is_some());
}

#[test]
fn explicit_depth() {
    let mut reader = Reader::from_xml("<r><a><x/><w/></a><b><y/></b></r>");
    assert!(reader.advance());
    assert!(reader.advance());
    let mut iter = DepthIter::at_depth(&mut reader, 2);
    let mut names = Vec::new();
    while iter.advance() {
        names.push(iter.name().unwrap_or_default().to_string());
    }
    // Iteration stays inside the enclosing element
    assert_eq!(names, vec!["x", "w"]);
    assert_eq!(iter.cursor().name(), "b");
}

#[test]
fn text_after_children() {
    let xml = "<r><a><x/></a><b>hi</b><c/></r>";
    let mut reader = Reader::from_xml(xml);
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut children = root.descend();
    let mut seen = Vec::new();
    while children.advance() {
        let name = children.name().unwrap_or_default().to_string();
        let mut count = 0;
        {
            let mut grandchildren = children.descend();
            while grandchildren.advance() {
                count += 1;
            }
        }
        // The handed over sibling must not be read as this element
        assert_eq!(children.snapshot(), None);
        seen.push((children.current_index(), name, count, children.text()));
    }
    assert_eq!(
        seen,
        vec![
            (Some(0), "a".to_string(), 1, None),
            (Some(1), "b".to_string(), 0, None),
            (Some(2), "c".to_string(), 0, None),
        ]
    );
    assert!(!root.advance());
}

#[test]
fn text_before_children() {
    let xml = "<r><a><x/></a><b>hi</b><c/></r>";
    let mut reader = Reader::from_xml(xml);
    let mut root = DepthIter::new(&mut reader);
    assert!(root.advance());
    let mut children = root.descend();
    let mut seen = Vec::new();
    while children.advance() {
        let text = children.text();
        let mut count = 0;
        {
            let mut grandchildren = children.descend();
            while grandchildren.advance() {
                count += 1;
            }
        }
        // Cached copy survives the hand over
        assert_eq!(children.text(), text);
        seen.push((children.name().map(str::to_string), count, text));
    }
    assert_eq!(
        seen,
        vec![
            (Some("a".to_string()), 0, Some(String::new())),
            (Some("b".to_string()), 0, Some("hi".to_string())),
            (Some("c".to_string()), 0, Some(String::new())),
        ]
    );
    assert!(!root.advance());
}
