use crate::model::catalog::{Catalog, Context};
use crate::model::message::{Location, Message, MessageStatus};

use super::xml::{XmlError, XmlEvent, XmlReader};

/// Reads a TS document into a catalog. Malformed input is an error,
/// never a best-effort catalog; duplicate sources within a context are
/// preserved as-is (QA reports them, the parser does not judge).
pub fn parse(text: &str) -> Result<Catalog, XmlError> {
    let mut reader = XmlReader::new(text);

    let (root_attrs, root_empty) = loop {
        match reader.next_event()? {
            None => return Err(XmlError::new(reader.line(), "missing <TS> root element")),
            Some(XmlEvent::Text(t)) if t.trim().is_empty() => continue,
            Some(XmlEvent::Open {
                name,
                attrs,
                self_closing,
            }) if name == "TS" => break (attrs, self_closing),
            Some(_) => {
                return Err(XmlError::new(reader.line(), "expected <TS> root element"));
            }
        }
    };

    let mut catalog = Catalog {
        version: attr(&root_attrs, "version").unwrap_or_default().to_string(),
        language: attr(&root_attrs, "language").unwrap_or_default().to_string(),
        source_language: attr(&root_attrs, "sourcelanguage")
            .unwrap_or_default()
            .to_string(),
        contexts: Vec::new(),
    };

    if !root_empty {
        loop {
            match reader.next_event()? {
                None => return Err(XmlError::new(reader.line(), "unclosed <TS> element")),
                Some(XmlEvent::Text(t)) if t.trim().is_empty() => continue,
                Some(XmlEvent::Close(name)) if name == "TS" => break,
                Some(XmlEvent::Open {
                    name, self_closing, ..
                }) if name == "context" => {
                    if self_closing {
                        catalog.contexts.push(Context::default());
                    } else {
                        catalog.contexts.push(parse_context(&mut reader)?);
                    }
                }
                Some(ev) => return Err(unexpected(&reader, &ev, "<TS>")),
            }
        }
    }

    // nothing but whitespace may follow the root
    while let Some(ev) = reader.next_event()? {
        match ev {
            XmlEvent::Text(t) if t.trim().is_empty() => {}
            _ => return Err(XmlError::new(reader.line(), "content after </TS>")),
        }
    }

    Ok(catalog)
}

fn parse_context(reader: &mut XmlReader) -> Result<Context, XmlError> {
    let mut ctx = Context::default();

    loop {
        match reader.next_event()? {
            None => return Err(XmlError::new(reader.line(), "unclosed <context> element")),
            Some(XmlEvent::Text(t)) if t.trim().is_empty() => continue,
            Some(XmlEvent::Close(name)) if name == "context" => return Ok(ctx),
            Some(XmlEvent::Open {
                name, self_closing, ..
            }) if name == "name" => {
                if !self_closing {
                    ctx.name = text_content(reader, "name")?;
                }
            }
            Some(XmlEvent::Open {
                name,
                attrs,
                self_closing,
            }) if name == "message" => {
                let numerus = attr(&attrs, "numerus") == Some("yes");
                if self_closing {
                    ctx.messages.push(Message {
                        numerus,
                        ..Message::default()
                    });
                } else {
                    ctx.messages.push(parse_message(reader, numerus)?);
                }
            }
            Some(ev) => return Err(unexpected(reader, &ev, "<context>")),
        }
    }
}

fn parse_message(reader: &mut XmlReader, numerus: bool) -> Result<Message, XmlError> {
    let mut msg = Message {
        numerus,
        ..Message::default()
    };

    loop {
        match reader.next_event()? {
            None => return Err(XmlError::new(reader.line(), "unclosed <message> element")),
            Some(XmlEvent::Text(t)) if t.trim().is_empty() => continue,
            Some(XmlEvent::Close(name)) if name == "message" => return Ok(msg),
            Some(XmlEvent::Open {
                name,
                attrs,
                self_closing,
            }) => match name.as_str() {
                "location" => {
                    let line = match attr(&attrs, "line") {
                        Some(raw) => raw.parse().map_err(|_| {
                            XmlError::new(reader.line(), format!("invalid location line `{raw}`"))
                        })?,
                        None => 0,
                    };
                    msg.locations.push(Location {
                        filename: attr(&attrs, "filename").unwrap_or_default().to_string(),
                        line,
                    });
                    if !self_closing {
                        text_content(reader, "location")?;
                    }
                }
                "source" => {
                    if !self_closing {
                        msg.source = text_content(reader, "source")?;
                    }
                }
                "comment" => {
                    if !self_closing {
                        msg.comment = Some(text_content(reader, "comment")?);
                    } else {
                        msg.comment = Some(String::new());
                    }
                }
                "translation" => {
                    msg.status = parse_status(attr(&attrs, "type"), reader.line())?;
                    if !self_closing {
                        if numerus {
                            msg.numerus_forms = parse_numerus_forms(reader)?;
                        } else {
                            msg.translation = text_content(reader, "translation")?;
                        }
                    }
                }
                // known but unmodeled extraction metadata
                "extracomment" | "translatorcomment" | "oldsource" | "oldcomment" => {
                    if !self_closing {
                        text_content(reader, &name)?;
                    }
                }
                _ => {
                    return Err(XmlError::new(
                        reader.line(),
                        format!("unexpected element <{name}> inside <message>"),
                    ));
                }
            },
            Some(ev) => return Err(unexpected(reader, &ev, "<message>")),
        }
    }
}

fn parse_numerus_forms(reader: &mut XmlReader) -> Result<Vec<String>, XmlError> {
    let mut forms = Vec::new();

    loop {
        match reader.next_event()? {
            None => return Err(XmlError::new(reader.line(), "unclosed <translation> element")),
            Some(XmlEvent::Text(t)) if t.trim().is_empty() => continue,
            Some(XmlEvent::Close(name)) if name == "translation" => return Ok(forms),
            Some(XmlEvent::Open {
                name, self_closing, ..
            }) if name == "numerusform" => {
                if self_closing {
                    forms.push(String::new());
                } else {
                    forms.push(text_content(reader, "numerusform")?);
                }
            }
            Some(ev) => return Err(unexpected(reader, &ev, "numerus <translation>")),
        }
    }
}

fn parse_status(raw: Option<&str>, line: usize) -> Result<MessageStatus, XmlError> {
    match raw {
        None => Ok(MessageStatus::Finished),
        Some("unfinished") => Ok(MessageStatus::Unfinished),
        Some("vanished") => Ok(MessageStatus::Vanished),
        Some("obsolete") => Ok(MessageStatus::Obsolete),
        Some(other) => Err(XmlError::new(
            line,
            format!("unknown translation type `{other}`"),
        )),
    }
}

/// Accumulates the text of an element up to its closing tag; nested
/// elements are not allowed here.
fn text_content(reader: &mut XmlReader, tag: &str) -> Result<String, XmlError> {
    let mut out = String::new();

    loop {
        match reader.next_event()? {
            None => return Err(XmlError::new(reader.line(), format!("unclosed <{tag}> element"))),
            Some(XmlEvent::Text(t)) => out.push_str(&t),
            Some(XmlEvent::Close(name)) if name == tag => return Ok(out),
            Some(XmlEvent::Close(name)) => {
                return Err(XmlError::new(
                    reader.line(),
                    format!("mismatched closing tag `</{name}>` inside <{tag}>"),
                ));
            }
            Some(XmlEvent::Open { name, .. }) => {
                return Err(XmlError::new(
                    reader.line(),
                    format!("unexpected element <{name}> inside <{tag}>"),
                ));
            }
        }
    }
}

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn unexpected(reader: &XmlReader, ev: &XmlEvent, scope: &str) -> XmlError {
    let what = match ev {
        XmlEvent::Open { name, .. } => format!("element <{name}>"),
        XmlEvent::Close(name) => format!("closing tag `</{name}>`"),
        XmlEvent::Text(_) => "text content".to_string(),
    };
    XmlError::new(reader.line(), format!("unexpected {what} inside {scope}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de_DE" sourcelanguage="en_US">
<context>
    <name>ActiveExposureWidget</name>
    <message>
        <source>Exposure Active</source>
        <translation>Belichtung aktiv</translation>
    </message>
    <message>
        <source>Invert</source>
        <translation type="unfinished"></translation>
    </message>
</context>
<context>
    <name>V4L2Viewer</name>
    <message>
        <location filename="Source/Source/V4L2Viewer.cpp" line="1010"/>
        <location filename="Source/Source/V4L2Viewer.cpp" line="1031"/>
        <source>Video4Linux</source>
        <translation>Video4Linux</translation>
    </message>
    <message>
        <source>Failed to save sharpness!</source>
        <translation type="vanished">Schärfe konnte nicht gespeichert werden!</translation>
    </message>
</context>
</TS>
"#;

    #[test]
    fn parses_metadata_contexts_and_statuses() {
        let catalog = parse(SAMPLE).unwrap();

        assert_eq!(catalog.version, "2.1");
        assert_eq!(catalog.language, "de_DE");
        assert_eq!(catalog.source_language, "en_US");
        assert_eq!(catalog.contexts.len(), 2);

        let widget = &catalog.contexts[0];
        assert_eq!(widget.name, "ActiveExposureWidget");
        assert_eq!(widget.messages[0].translation, "Belichtung aktiv");
        assert_eq!(widget.messages[0].status, MessageStatus::Finished);
        assert_eq!(widget.messages[1].status, MessageStatus::Unfinished);
        assert!(widget.messages[1].translation.is_empty());

        let viewer = &catalog.contexts[1];
        assert_eq!(viewer.messages[0].locations.len(), 2);
        assert_eq!(viewer.messages[0].locations[1].line, 1031);
        assert_eq!(viewer.messages[1].status, MessageStatus::Vanished);
        assert_eq!(
            viewer.messages[1].translation,
            "Schärfe konnte nicht gespeichert werden!"
        );
    }

    #[test]
    fn decodes_entities_and_keeps_significant_whitespace() {
        let doc = r#"<TS version="2.1"><context><name>C</name><message>
            <source>
 Control is READONLY</source>
            <translation>&lt;b&gt;NUR LESEN&lt;/b&gt; &amp; mehr</translation>
        </message></context></TS>"#;

        let catalog = parse(doc).unwrap();
        let msg = &catalog.contexts[0].messages[0];
        assert_eq!(msg.source, "\n Control is READONLY");
        assert_eq!(msg.translation, "<b>NUR LESEN</b> & mehr");
    }

    #[test]
    fn parses_numerus_forms() {
        let doc = r#"<TS version="2.1"><context><name>C</name>
        <message numerus="yes">
            <source>%n frame(s)</source>
            <translation>
                <numerusform>%n Bild</numerusform>
                <numerusform>%n Bilder</numerusform>
            </translation>
        </message></context></TS>"#;

        let catalog = parse(doc).unwrap();
        let msg = &catalog.contexts[0].messages[0];
        assert!(msg.numerus);
        assert_eq!(msg.numerus_forms, vec!["%n Bild", "%n Bilder"]);
    }

    #[test]
    fn message_without_translation_is_unfinished() {
        let doc = r#"<TS><context><name>C</name><message><source>x</source></message></context></TS>"#;
        let catalog = parse(doc).unwrap();
        assert_eq!(
            catalog.contexts[0].messages[0].status,
            MessageStatus::Unfinished
        );
    }

    #[test]
    fn rejects_unknown_translation_type() {
        let doc = r#"<TS><context><name>C</name><message>
            <source>x</source>
            <translation type="fuzzy">y</translation>
        </message></context></TS>"#;
        let err = parse(doc).unwrap_err();
        assert!(err.message.contains("fuzzy"));
    }

    #[test]
    fn rejects_content_after_root() {
        let err = parse("<TS></TS><TS></TS>").unwrap_err();
        assert!(err.message.contains("after"));
    }

    #[test]
    fn rejects_stray_elements() {
        let err = parse("<TS><message/></TS>").unwrap_err();
        assert!(err.message.contains("message"));
    }

    #[test]
    fn comment_is_part_of_the_entry() {
        let doc = r#"<TS><context><name>C</name><message>
            <source>Start</source>
            <comment>toolbar button</comment>
            <translation>Start</translation>
        </message></context></TS>"#;
        let catalog = parse(doc).unwrap();
        assert_eq!(
            catalog.contexts[0].messages[0].comment.as_deref(),
            Some("toolbar button")
        );
    }
}
