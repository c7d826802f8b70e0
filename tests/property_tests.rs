//! Property-based round-trip tests.
//!
//! Generates well-formed documents with irregular formatting (mixed quote
//! characters, odd spacing inside tags, entity references, CDATA, comments)
//! and checks that parsing and serializing returns the input unchanged, and
//! that edits only regenerate what they touch.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use xmltrip::{parse_str, Config, Document, NodeId, NodeKind};

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.-]{0,6}(:[a-z]{1,4})?"
}

fn spaces() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", " ", "  ", "\n", "\n    ", "\t", "\r\n  "]).prop_map(String::from)
}

fn separator() -> impl Strategy<Value = String> {
    prop::sample::select(vec![" ", "  ", "\n  ", "\t", "\r\n\t"]).prop_map(String::from)
}

fn char_data() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-zA-Z0-9 ,.;!?\n\t]{1,8}",
            Just("&amp;".to_string()),
            Just("&lt;".to_string()),
            Just("&gt;".to_string()),
            Just("&quot;".to_string()),
            Just("&#169;".to_string()),
            Just("\u{e9}\u{4e2d}".to_string()),
        ],
        1..5,
    )
    .prop_map(|parts| parts.concat())
}

fn attribute() -> impl Strategy<Value = (String, String)> {
    (
        separator(),
        name(),
        spaces(),
        spaces(),
        "[a-zA-Z0-9 ]{0,6}",
        prop::bool::ANY,
    )
        .prop_map(|(sep, name, before_eq, after_eq, value, single)| {
            let quote = if single { '\'' } else { '"' };
            let eq_ws = |ws: &str| if ws.contains('\r') { " ".to_string() } else { ws.to_string() };
            (
                name.clone(),
                format!(
                    "{sep}{name}{}={}{quote}{value}{quote}",
                    eq_ws(&before_eq),
                    eq_ws(&after_eq)
                ),
            )
        })
}

/// An open tag body: unique attributes plus trailing whitespace.
fn attributes() -> impl Strategy<Value = String> {
    (prop::collection::vec(attribute(), 0..4), spaces()).prop_map(|(attrs, trailing)| {
        let mut seen = Vec::new();
        let mut out = String::new();
        for (name, text) in attrs {
            if !seen.contains(&name) {
                out.push_str(&text);
                seen.push(name);
            }
        }
        out.push_str(&trailing);
        out
    })
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        char_data(),
        "[a-z <&>\"']{0,10}".prop_map(|s| format!("<![CDATA[{s}]]>")),
        "[a-z ]{0,10}".prop_map(|s| format!("<!--{s}-->")),
        ("[a-z]{1,5}", "[a-z =\"]{0,8}").prop_map(|(t, d)| format!("<?p{t} {d}?>")),
        (name(), attributes()).prop_map(|(n, a)| format!("<{n}{a}/>")),
        (name(), attributes(), spaces()).prop_map(|(n, a, inner)| {
            let inner = if inner.trim().is_empty() { inner } else { String::new() };
            format!("<{n}{a}>{inner}</{n}>")
        }),
    ]
}

fn element() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        (
            name(),
            attributes(),
            prop::collection::vec(inner, 0..6),
            spaces(),
        )
            .prop_map(|(n, a, children, close_ws)| {
                let close_ws = if close_ws.contains('\n') { " " } else { "" };
                format!("<{n}{a}>{}</{n}{close_ws}>", children.concat())
            })
    })
}

fn document() -> impl Strategy<Value = String> {
    (
        prop::option::of(Just("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")),
        prop::option::of(Just("<!DOCTYPE root [ <!ENTITY e \"x\"> ]>\n")),
        prop::option::of(Just("<!-- head -->\n")),
        name(),
        attributes(),
        prop::collection::vec(element(), 0..5),
        prop::sample::select(vec!["", "\n", "\n\n", "\r\n"]),
    )
        .prop_map(|(decl, doctype, comment, n, a, children, tail)| {
            format!(
                "{}{}{}<{n}{a}>{}</{n}>{tail}",
                decl.unwrap_or(""),
                doctype.unwrap_or(""),
                comment.unwrap_or(""),
                children.concat()
            )
        })
}

fn elements(doc: &Document) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .filter(|&id| matches!(doc.kind(id), NodeKind::Element(_)))
        .collect()
}

/// Kinds, names, attributes, and text of a tree, ignoring formatting.
fn structure(doc: &Document) -> Vec<String> {
    doc.descendants(doc.root())
        .map(|id| match doc.kind(id) {
            NodeKind::Element(el) => {
                let attrs: Vec<_> = el
                    .attributes
                    .values()
                    .map(|a| format!("{}={}", a.name, a.value))
                    .collect();
                format!("{}{:?}@{}", el.name, attrs, doc.depth(id))
            }
            NodeKind::Text(t) => format!("text:{}:{}", t.cdata, t.content),
            NodeKind::Comment(c) => format!("comment:{}", c.content),
            NodeKind::ProcessingInstruction(pi) => format!("pi:{}:{}", pi.target, pi.data),
            NodeKind::Document => String::new(),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn noop_roundtrip_is_byte_identical(input in document()) {
        let doc = parse_str(&input).unwrap();
        prop_assert_eq!(doc.to_xml(), input);
    }

    #[test]
    fn reparse_is_structurally_stable(input in document()) {
        let doc = parse_str(&input).unwrap();
        let again = parse_str(&doc.to_xml()).unwrap();
        prop_assert_eq!(structure(&again), structure(&doc));
    }

    #[test]
    fn editing_one_element_keeps_the_rest(input in document(), pick in any::<prop::sample::Index>()) {
        let mut doc = parse_str(&input).unwrap();
        let all = elements(&doc);
        let target = all[pick.index(all.len())];
        doc.set_attribute(target, "edited", "a<b&'c\"").unwrap();

        for id in elements(&doc) {
            let on_path = doc.ancestors(target).any(|a| a == id);
            prop_assert_eq!(doc.is_modified(id), on_path);
        }

        let output = doc.to_xml();
        let again = parse_str(&output).unwrap();
        prop_assert_eq!(structure(&again), structure(&doc));

        // a clean subtree outside the edited path is replayed from its literal
        for id in elements(&doc) {
            if doc.is_modified(id) {
                continue;
            }
            let literal = xmltrip::serial::serialize_node(&doc, id, &Config::default());
            prop_assert!(input.contains(&literal));
            prop_assert!(output.contains(&literal));
        }
    }

    #[test]
    fn pretty_output_reparses(input in document()) {
        let doc = parse_str(&input).unwrap();
        let pretty = doc.to_xml_with(&Config::pretty());
        let again = parse_str(&pretty).unwrap();
        let names = |d: &Document| -> Vec<String> {
            elements(d).into_iter().filter_map(|id| d.node_name(id).map(str::to_string)).collect()
        };
        prop_assert_eq!(names(&again), names(&doc));
    }
}
