//! Round-trip behavior on realistic documents.
//!
//! Covers no-op byte identity, selective regeneration after edits, and the
//! formatting that inserted content picks up from its surroundings.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use xmltrip::format::child_whitespace;
use xmltrip::{parse_str, Config, Document, NodeId, NodeKind};

const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- build file -->
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <modelVersion>4.0.0</modelVersion>
    <dependencies>
        <dependency>
            <groupId>junit</groupId>
            <version>4.13</version>
        </dependency>
    </dependencies>
</project>
"#;

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"
     width="24"
     height="24">
  <path d='M0 0h24v24H0z' fill='none'/>
  <circle cx="12" cy="12" r="4"  />
</svg>"#;

const ATOM: &str = "<?xml version='1.0' encoding='utf-8'?>\r\n\
<feed xmlns='http://www.w3.org/2005/Atom'>\r\n\
\t<title type='html'>AT&amp;T &lt;news&gt;</title>\r\n\
\t<entry>\r\n\
\t\t<content type='html'><![CDATA[<p>a & b</p>]]></content>\r\n\
\t</entry>\r\n\
</feed>\r\n";

fn parse(xml: &str) -> Document {
    Document::parse_str(xml).unwrap()
}

/// Finds the first element with the given name in document order.
fn find(doc: &Document, name: &str) -> NodeId {
    doc.descendants(doc.root())
        .find(|&id| doc.node_name(id) == Some(name))
        .unwrap()
}

/// A structural fingerprint of a subtree: kinds, names, attribute sets, and
/// text content, ignoring formatting.
fn shape(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    shape_into(doc, id, &mut out);
    out
}

fn shape_into(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Document => out.push_str("#doc"),
        NodeKind::Element(el) => {
            let mut attrs: Vec<String> = el
                .attributes
                .values()
                .map(|a| format!("{}={}", a.name, a.value))
                .collect();
            attrs.sort();
            out.push_str(&format!("<{} {:?}>", el.name, attrs));
        }
        NodeKind::Text(t) => out.push_str(&format!("text({:?}, cdata={})", t.content, t.cdata)),
        NodeKind::Comment(c) => out.push_str(&format!("comment({:?})", c.content)),
        NodeKind::ProcessingInstruction(pi) => {
            out.push_str(&format!("pi({:?}, {:?})", pi.target, pi.data));
        }
    }
    out.push('[');
    for child in doc.children(id) {
        shape_into(doc, child, out);
        out.push(',');
    }
    out.push(']');
}

// ---------------------------------------------------------------------------
// No-op round trips
// ---------------------------------------------------------------------------

#[test]
fn noop_roundtrip_real_documents() {
    for input in [POM, SVG, ATOM] {
        assert_eq!(parse(input).to_xml(), input);
    }
}

#[test]
fn noop_roundtrip_unusual_spacing_and_quoting() {
    for input in [
        "<a  attr='v'   />",
        "<a\n\tx = \"1\"\n\ty='2'\n></a >",
        "<r>&lt;&#65;&amp;&custom;</r>",
        "<r>\n  <!--c-->\n  <?pi   some  data ?>\n</r>\n\n",
        "<?xml version=\"1.0\"?>\n<!DOCTYPE note [\n  <!ENTITY x \"y\">\n  <!-- ] > -->\n]>\n<note/>\n",
        "<!-- lead --><!DOCTYPE r><r/><!-- tail -->",
        "<r xml:space='preserve'>  <a>   </a>  </r>",
        "<r><![CDATA[]]><![CDATA[ x ]]></r>",
    ] {
        assert_eq!(parse(input).to_xml(), input);
    }
}

#[test]
fn noop_roundtrip_bytes() {
    let mut latin1 = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<r>gar\xE7on</r>".to_vec();
    latin1.push(b'\n');

    let mut utf16 = vec![0xFF, 0xFE];
    utf16.extend("<r a='\u{e9}'/>".encode_utf16().flat_map(u16::to_le_bytes));

    let bom_utf8 = b"\xEF\xBB\xBF<r/>".to_vec();

    for input in [latin1, utf16, bom_utf8] {
        let doc = xmltrip::parse_bytes(&input).unwrap();
        let mut out = Vec::new();
        doc.write_bytes(&mut out, None).unwrap();
        assert_eq!(out, input);
    }
}

// ---------------------------------------------------------------------------
// Selective regeneration
// ---------------------------------------------------------------------------

#[test]
fn attribute_edit_on_sibling_leaves_neighbor_untouched() {
    let mut doc = parse("<r><a/> <b/></r>");
    let b = find(&doc, "b");
    doc.set_attribute(b, "x", "1").unwrap();
    assert_eq!(doc.to_xml(), "<r><a/> <b x=\"1\"/></r>");
}

#[test]
fn pom_version_bump() {
    let mut doc = parse(POM);
    let version = find(&doc, "version");
    doc.set_text_content(version, "4.13.2").unwrap();
    assert_eq!(doc.to_xml(), POM.replace("4.13<", "4.13.2<"));
}

#[test]
fn pom_add_dependency_with_inferred_indentation() {
    let mut doc = parse(POM);
    let deps = find(&doc, "dependencies");
    let existing = find(&doc, "dependency");

    let ws = child_whitespace(&doc, deps, &Config::default());
    assert_eq!(ws, "\n        ");

    let dep = doc.create_element("dependency").unwrap();
    doc.set_self_closing(dep, true).unwrap();
    doc.set_preceding_whitespace(dep, &ws);
    doc.insert_after(existing, dep).unwrap();

    let expected = POM.replace(
        "        </dependency>\n    </dependencies>",
        "        </dependency>\n        <dependency/>\n    </dependencies>",
    );
    assert_eq!(doc.to_xml(), expected);
}

#[test]
fn pom_remove_comment_and_declaration() {
    let mut doc = parse(POM);
    let comment = doc
        .children(doc.root())
        .find(|&c| matches!(doc.kind(c), NodeKind::Comment(_)))
        .unwrap();
    doc.remove_node(comment);
    doc.set_xml_declaration(None);

    let out = doc.to_xml();
    assert!(out.starts_with("\n\n<project xmlns="));
    assert!(out.ends_with("</project>\n"));
}

#[test]
fn untouched_subtree_is_replayed_verbatim() {
    let input = "<a><b><c><d>leaf</d></c></b><e  k = 'v' ><f   /></e ></a>";
    let mut doc = parse(input);
    let d = find(&doc, "d");
    let leaf = doc.first_child(d).unwrap();
    doc.set_text_content(leaf, "new").unwrap();

    for name in ["a", "b", "c", "d"] {
        assert!(doc.is_modified(find(&doc, name)), "{name} should be modified");
    }
    assert!(doc.is_modified(leaf));
    assert!(doc.is_modified(doc.root()));
    assert!(!doc.is_modified(find(&doc, "e")));
    assert!(!doc.is_modified(find(&doc, "f")));

    assert_eq!(
        doc.to_xml(),
        "<a><b><c><d>new</d></c></b><e  k = 'v' ><f   /></e ></a>"
    );
}

#[test]
fn clear_modified_restores_fast_path_for_untouched_literals() {
    let mut doc = parse("<r><a x = '1'/></r>");
    let a = find(&doc, "a");
    doc.mark_modified(a);
    assert_eq!(doc.to_xml(), "<r><a x='1'/></r>");

    doc.clear_modified(doc.root());
    assert!(!doc.is_modified(a));
    assert_eq!(doc.to_xml(), "<r><a x = '1'/></r>");
}

// ---------------------------------------------------------------------------
// Quotes, attributes, CDATA
// ---------------------------------------------------------------------------

#[test]
fn attribute_quotes_survive_unrelated_edit() {
    let mut doc = parse("<r><e a='x' b=\"y\"/><f/></r>");
    let f = find(&doc, "f");
    doc.set_attribute(f, "c", "1").unwrap();
    assert_eq!(doc.to_xml(), "<r><e a='x' b=\"y\"/><f c=\"1\"/></r>");

    let e = find(&doc, "e");
    doc.set_attribute(e, "c", "z").unwrap();
    assert_eq!(doc.to_xml(), "<r><e a='x' b=\"y\" c=\"z\"/><f c=\"1\"/></r>");
}

#[test]
fn new_attribute_follows_single_quote_majority() {
    let mut doc = parse("<e a='1' b='2'/>");
    let e = doc.root_element().unwrap();
    doc.set_attribute(e, "c", "it's").unwrap();
    assert_eq!(doc.to_xml(), "<e a='1' b='2' c='it&apos;s'/>");
}

#[test]
fn svg_new_attribute_aligns_with_multiline_block() {
    let mut doc = parse(SVG);
    let svg = doc.root_element().unwrap();
    doc.set_attribute(svg, "viewBox", "0 0 24 24").unwrap();
    let expected = SVG.replace(
        "     height=\"24\">",
        "     height=\"24\"\n     viewBox=\"0 0 24 24\">",
    );
    assert_eq!(doc.to_xml(), expected);
}

#[test]
fn svg_attribute_update_keeps_quotes_and_order() {
    let mut doc = parse(SVG);
    let path = find(&doc, "path");
    doc.set_attribute(path, "d", "M1 1").unwrap();
    assert!(doc.to_xml().contains("<path d='M1 1' fill='none'/>"));
    assert!(doc.to_xml().contains("<circle cx=\"12\" cy=\"12\" r=\"4\"  />"));
}

#[test]
fn cdata_content_is_never_escaped() {
    let mut doc = parse(ATOM);
    let content = find(&doc, "content");
    let cdata = doc.first_child(content).unwrap();
    assert_eq!(doc.text_content(cdata), "<p>a & b</p>");

    doc.set_text_content(cdata, "<b>\"q\" & 'a'</b>").unwrap();
    assert!(doc
        .to_xml()
        .contains("<content type='html'><![CDATA[<b>\"q\" & 'a'</b>]]></content>"));
}

#[test]
fn atom_entities_decode_and_replay() {
    let mut doc = parse(ATOM);
    let title = find(&doc, "title");
    assert_eq!(doc.text_content(title), "AT&T <news>");

    let entry = find(&doc, "entry");
    doc.set_attribute(entry, "id", "1").unwrap();
    let out = doc.to_xml();
    assert!(out.contains("<title type='html'>AT&amp;T &lt;news&gt;</title>"));
    assert!(out.contains("\t<entry id=\"1\">\r\n"));
}

// ---------------------------------------------------------------------------
// Idempotent structural parse
// ---------------------------------------------------------------------------

#[test]
fn reparse_of_output_is_structurally_equal() {
    for input in [POM, SVG, ATOM] {
        let doc = parse(input);
        let again = parse_str(&doc.to_xml()).unwrap();
        assert_eq!(shape(&again, again.root()), shape(&doc, doc.root()));
    }
}

#[test]
fn reparse_of_edited_output_is_structurally_equal() {
    let mut doc = parse(POM);
    let project = doc.root_element().unwrap();
    doc.set_attribute(project, "note", "a < b & \"c\"").unwrap();
    let model = find(&doc, "modelVersion");
    doc.rename_element(model, "model").unwrap();
    let comment = doc.create_comment(" added ");
    doc.append_child(project, comment).unwrap();

    let again = parse_str(&doc.to_xml()).unwrap();
    assert_eq!(shape(&again, again.root()), shape(&doc, doc.root()));
}

// ---------------------------------------------------------------------------
// Programmatic construction and output modes
// ---------------------------------------------------------------------------

#[test]
fn built_document_with_detached_root() {
    let mut doc = Document::new();
    doc.ensure_xml_declaration();
    let root = doc.create_element("config").unwrap();
    doc.set_root_element(root).unwrap();
    let item = doc.create_element("item").unwrap();
    doc.append_child(root, item).unwrap();
    let text = doc.create_text("a & b");
    doc.append_child(item, text).unwrap();

    assert_eq!(
        doc.to_xml(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><config><item>a &amp; b</item></config>"
    );
}

#[test]
fn pretty_output_of_pom() {
    let doc = parse("<?xml version=\"1.0\"?><project><!--c--><a>1</a><b><c/></b></project>");
    assert_eq!(
        doc.to_xml_with(&Config::pretty().indent_unit("  ")),
        "<?xml version=\"1.0\"?>\n<project>\n  <!--c-->\n  <a>1</a>\n  <b>\n    <c/>\n  </b>\n</project>"
    );
}

#[test]
fn minimal_output_drops_comments_and_declaration() {
    let doc = parse(POM);
    let out = doc.to_xml_with(&Config::minimal());
    assert!(!out.contains("<?xml"));
    assert!(!out.contains("<!--"));
    assert!(out.contains("<version>4.13</version>"));
}
