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

fn read_second(xml: &str) -> (Option<Element>, Reader<&[u8]>) {
    let mut reader = Reader::from_xml(xml);
    assert!(reader.advance());
    assert!(reader.advance());
    let element = Element::read(&mut reader);
    (element, reader)
}

#[test]
fn subtree() {
    let (element, mut reader) =
        read_second("<r><a x='1' y='&lt;'>t<b/><!--c--><?p d?><![CDATA[<&>]]><e>u</e></a><z/></r>");
    let element = element.unwrap();
    assert_eq!(element.name, "a");
    assert_eq!(element.attribute("x"), Some("1"));
    assert_eq!(element.attribute("y"), Some("<"));
    assert_eq!(element.attribute("q"), None);
    assert_eq!(element.attributes().count(), 2);
    assert_eq!(
        element.children,
        vec![
            Node::Text("t".to_string()),
            Node::Element(Element {
                name: "b".to_string(),
                ..Default::default()
            }),
            Node::Comment("c".to_string()),
            Node::ProcessingInstruction("p".to_string(), "d".to_string()),
            Node::CData("<&>".to_string()),
            Node::Element(Element {
                name: "e".to_string(),
                attributes: Vec::new(),
                children: vec![Node::Text("u".to_string())],
            }),
        ]
    );
    let names: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["b", "e"]);
    assert_eq!(element.text(), "t<&>u");
    assert_eq!(
        element.to_string(),
        "<a x=\"1\" y=\"&lt;\">t<b/><!--c--><?p d?><![CDATA[<&>]]><e>u</e></a>"
    );

    // Cursor stays on the end node of the element
    assert_eq!(reader.node_kind(), NodeKind::EndElement);
    assert_eq!(reader.name(), "a");
    assert!(reader.advance());
    assert_eq!(reader.name(), "z");
}

#[test]
fn empty_element() {
    let (element, mut reader) = read_second("<r><a k=\"v&quot;\"/><z/></r>");
    let element = element.unwrap();
    assert!(element.children.is_empty());
    assert_eq!(element.text(), "");
    assert_eq!(element.to_string(), "<a k=\"v&quot;\"/>");
    assert_eq!(reader.node_kind(), NodeKind::Element);
    assert_eq!(reader.name(), "a");
    assert!(reader.advance());
    assert_eq!(reader.name(), "z");
}

#[test]
fn escaped_text() {
    let (element, _) = read_second("<r><a>1 &lt; 2 &amp;&amp; 3 &gt; 2</a></r>");
    let element = element.unwrap();
    assert_eq!(element.text(), "1 < 2 && 3 > 2");
    assert_eq!(element.to_string(), "<a>1 &lt; 2 &amp;&amp; 3 &gt; 2</a>");
}

#[test]
fn not_on_element() {
    let mut reader = Reader::from_xml("<r>text</r>");
    assert!(Element::read(&mut reader).is_none());
    assert!(reader.advance());
    assert!(reader.advance());
    assert_eq!(reader.node_kind(), NodeKind::Text);
    assert!(Element::read(&mut reader).is_none());
    assert_eq!(reader.node_kind(), NodeKind::Text);
}

#[test]
fn unterminated() {
    let mut reader = Reader::from_xml("<r><a><b>text</b>");
    assert!(reader.advance());
    assert!(reader.advance());
    assert!(Element::read(&mut reader).is_none());
    assert!(reader.last_error().is_some());
}
