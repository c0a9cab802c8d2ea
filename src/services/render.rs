use crate::model::catalog::Catalog;
use crate::model::message::{Message, MessageStatus};
use crate::parsers::xml::{escape_attr, escape_text};

/// Renders a catalog back to TS XML in the layout the Qt tooling
/// produces: 4-space indent per level, trailing newline, attributes in
/// the order observed in shipped catalogs.
pub fn render(catalog: &Catalog) -> String {
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");

    out.push_str("<TS");
    if !catalog.version.is_empty() {
        out.push_str(&format!(" version=\"{}\"", escape_attr(&catalog.version)));
    }
    if !catalog.language.is_empty() {
        out.push_str(&format!(" language=\"{}\"", escape_attr(&catalog.language)));
    }
    if !catalog.source_language.is_empty() {
        out.push_str(&format!(
            " sourcelanguage=\"{}\"",
            escape_attr(&catalog.source_language)
        ));
    }
    out.push_str(">\n");

    for ctx in &catalog.contexts {
        out.push_str("<context>\n");
        out.push_str(&format!("    <name>{}</name>\n", escape_text(&ctx.name)));
        for msg in &ctx.messages {
            render_message(&mut out, msg);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}

fn render_message(out: &mut String, msg: &Message) {
    if msg.numerus {
        out.push_str("    <message numerus=\"yes\">\n");
    } else {
        out.push_str("    <message>\n");
    }

    for loc in &msg.locations {
        out.push_str(&format!(
            "        <location filename=\"{}\" line=\"{}\"/>\n",
            escape_attr(&loc.filename),
            loc.line
        ));
    }

    out.push_str(&format!(
        "        <source>{}</source>\n",
        escape_text(&msg.source)
    ));

    if let Some(comment) = &msg.comment {
        out.push_str(&format!(
            "        <comment>{}</comment>\n",
            escape_text(comment)
        ));
    }

    let type_attr = match msg.status {
        MessageStatus::Finished => "",
        MessageStatus::Unfinished => " type=\"unfinished\"",
        MessageStatus::Vanished => " type=\"vanished\"",
        MessageStatus::Obsolete => " type=\"obsolete\"",
    };

    if msg.numerus {
        out.push_str(&format!("        <translation{type_attr}>\n"));
        for form in &msg.numerus_forms {
            out.push_str(&format!(
                "            <numerusform>{}</numerusform>\n",
                escape_text(form)
            ));
        }
        out.push_str("        </translation>\n");
    } else {
        out.push_str(&format!(
            "        <translation{type_attr}>{}</translation>\n",
            escape_text(&msg.translation)
        ));
    }

    out.push_str("    </message>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::Context;
    use crate::model::message::Location;
    use crate::parsers::ts;

    fn sample() -> Catalog {
        Catalog {
            version: "2.1".into(),
            language: "de_DE".into(),
            source_language: "en_US".into(),
            contexts: vec![Context {
                name: "V4L2Viewer".into(),
                messages: vec![
                    Message {
                        source: "Video4Linux".into(),
                        translation: "Video4Linux".into(),
                        status: MessageStatus::Finished,
                        locations: vec![Location {
                            filename: "Source/Source/V4L2Viewer.cpp".into(),
                            line: 1010,
                        }],
                        ..Message::default()
                    },
                    Message {
                        source: "Failed to save <brightness>!".into(),
                        translation: "Helligkeit & Co".into(),
                        status: MessageStatus::Vanished,
                        ..Message::default()
                    },
                ],
            }],
        }
    }

    #[test]
    fn renders_canonical_layout() {
        let text = render(&sample());
        let expected = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de_DE" sourcelanguage="en_US">
<context>
    <name>V4L2Viewer</name>
    <message>
        <location filename="Source/Source/V4L2Viewer.cpp" line="1010"/>
        <source>Video4Linux</source>
        <translation>Video4Linux</translation>
    </message>
    <message>
        <source>Failed to save &lt;brightness&gt;!</source>
        <translation type="vanished">Helligkeit &amp; Co</translation>
    </message>
</context>
</TS>
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn rendered_catalog_parses_back_identically() {
        let catalog = sample();
        let reparsed = ts::parse(&render(&catalog)).unwrap();
        assert_eq!(reparsed, catalog);
    }

    #[test]
    fn renders_numerus_forms() {
        let catalog = Catalog {
            contexts: vec![Context {
                name: "C".into(),
                messages: vec![Message {
                    source: "%n frame(s)".into(),
                    numerus: true,
                    numerus_forms: vec!["%n Bild".into(), "%n Bilder".into()],
                    status: MessageStatus::Finished,
                    ..Message::default()
                }],
            }],
            ..Catalog::default()
        };

        let text = render(&catalog);
        assert!(text.contains("<message numerus=\"yes\">"));
        assert!(text.contains("            <numerusform>%n Bild</numerusform>\n"));
        let reparsed = ts::parse(&text).unwrap();
        assert_eq!(reparsed.contexts[0].messages[0].numerus_forms.len(), 2);
    }
}
