use thiserror::Error;

/// Pull tokenizer for the markup subset the TS format uses. The XML
/// declaration, doctype and comments are consumed silently; everything
/// else surfaces as an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed xml at line {line}: {message}")]
pub struct XmlError {
    pub line: usize,
    pub message: String,
}

impl XmlError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        XmlError {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

pub struct XmlReader<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> XmlReader<'a> {
    pub fn new(src: &'a str) -> Self {
        XmlReader { src, pos: 0, line: 1 }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if !self.rest().starts_with(prefix) {
            return false;
        }
        for _ in prefix.chars() {
            self.bump();
        }
        true
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_until(&mut self, marker: &str, what: &str) -> Result<(), XmlError> {
        let start_line = self.line;
        while !self.rest().is_empty() {
            if self.eat(marker) {
                return Ok(());
            }
            self.bump();
        }
        Err(XmlError::new(start_line, format!("unterminated {what}")))
    }

    fn take_until(&mut self, marker: &str, what: &str) -> Result<&'a str, XmlError> {
        let start_line = self.line;
        let start = self.pos;
        while !self.rest().is_empty() {
            if self.rest().starts_with(marker) {
                let taken = &self.src[start..self.pos];
                self.eat(marker);
                return Ok(taken);
            }
            self.bump();
        }
        Err(XmlError::new(start_line, format!("unterminated {what}")))
    }

    pub fn next_event(&mut self) -> Result<Option<XmlEvent>, XmlError> {
        loop {
            if self.rest().is_empty() {
                return Ok(None);
            }

            if self.eat("<!--") {
                self.skip_until("-->", "comment")?;
                continue;
            }

            if self.eat("<![CDATA[") {
                let raw = self.take_until("]]>", "cdata section")?;
                return Ok(Some(XmlEvent::Text(raw.to_string())));
            }

            if self.eat("<?") {
                self.skip_until("?>", "processing instruction")?;
                continue;
            }

            if self.eat("<!") {
                self.skip_until(">", "doctype declaration")?;
                continue;
            }

            if self.eat("</") {
                let raw = self.take_until(">", "closing tag")?;
                let name = raw.trim();
                if !is_name(name) {
                    return Err(XmlError::new(self.line, format!("invalid closing tag `</{raw}>`")));
                }
                return Ok(Some(XmlEvent::Close(name.to_string())));
            }

            if self.eat("<") {
                return self.read_open_tag().map(Some);
            }

            // text run up to the next markup
            let start = self.pos;
            let start_line = self.line;
            while matches!(self.peek(), Some(c) if c != '<') {
                self.bump();
            }
            let raw = &self.src[start..self.pos];
            return Ok(Some(XmlEvent::Text(decode_entities(raw, start_line)?)));
        }
    }

    fn read_open_tag(&mut self) -> Result<XmlEvent, XmlError> {
        let name = self.read_name()?;
        let mut attrs = Vec::new();

        loop {
            self.skip_ws();

            if self.eat("/>") {
                return Ok(XmlEvent::Open {
                    name,
                    attrs,
                    self_closing: true,
                });
            }
            if self.eat(">") {
                return Ok(XmlEvent::Open {
                    name,
                    attrs,
                    self_closing: false,
                });
            }

            let key = self.read_name()?;
            self.skip_ws();
            if !self.eat("=") {
                return Err(XmlError::new(self.line, format!("attribute `{key}` is missing a value")));
            }
            self.skip_ws();

            let quote = match self.bump() {
                Some(q @ ('"' | '\'')) => q,
                _ => {
                    return Err(XmlError::new(
                        self.line,
                        format!("attribute `{key}` value must be quoted"),
                    ))
                }
            };

            let start = self.pos;
            let start_line = self.line;
            while matches!(self.peek(), Some(c) if c != quote) {
                self.bump();
            }
            let raw = &self.src[start..self.pos];
            if self.bump().is_none() {
                return Err(XmlError::new(
                    start_line,
                    format!("unterminated value for attribute `{key}`"),
                ));
            }

            attrs.push((key, decode_entities(raw, start_line)?));
        }
    }

    fn read_name(&mut self) -> Result<String, XmlError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.bump();
        }
        if self.pos == start {
            return Err(XmlError::new(self.line, "expected a name"));
        }
        Ok(self.src[start..self.pos].to_string())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_name_char)
}

pub fn decode_entities(raw: &str, line: usize) -> Result<String, XmlError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + 1..];

        let end = rest
            .find(';')
            .filter(|&e| e <= 8)
            .ok_or_else(|| XmlError::new(line, "unterminated entity reference"))?;
        let name = &rest[..end];
        rest = &rest[end + 1..];

        match name {
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "amp" => out.push('&'),
            "apos" => out.push('\''),
            "quot" => out.push('"'),
            _ if name.starts_with("#x") || name.starts_with("#X") => {
                out.push(char_ref(&name[2..], 16, line)?);
            }
            _ if name.starts_with('#') => {
                out.push(char_ref(&name[1..], 10, line)?);
            }
            _ => {
                return Err(XmlError::new(line, format!("unknown entity `&{name};`")));
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn char_ref(digits: &str, radix: u32, line: usize) -> Result<char, XmlError> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| XmlError::new(line, format!("invalid character reference `&#{digits};`")))
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(src: &str) -> Vec<XmlEvent> {
        let mut reader = XmlReader::new(src);
        let mut out = Vec::new();
        while let Some(ev) = reader.next_event().unwrap() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn open_close_and_text() {
        let evs = events("<name>V4L2ViewerClass</name>");
        assert_eq!(
            evs,
            vec![
                XmlEvent::Open {
                    name: "name".into(),
                    attrs: vec![],
                    self_closing: false
                },
                XmlEvent::Text("V4L2ViewerClass".into()),
                XmlEvent::Close("name".into()),
            ]
        );
    }

    #[test]
    fn attributes_and_self_closing() {
        let evs = events(r#"<location filename="Source/V4L2Viewer.cpp" line="1010"/>"#);
        assert_eq!(
            evs,
            vec![XmlEvent::Open {
                name: "location".into(),
                attrs: vec![
                    ("filename".into(), "Source/V4L2Viewer.cpp".into()),
                    ("line".into(), "1010".into()),
                ],
                self_closing: true
            }]
        );
    }

    #[test]
    fn declaration_doctype_and_comments_are_skipped() {
        let evs = events("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<!-- x -->\n<TS></TS>");
        let significant: Vec<XmlEvent> = evs
            .into_iter()
            .filter(|ev| !matches!(ev, XmlEvent::Text(t) if t.trim().is_empty()))
            .collect();
        assert_eq!(
            significant,
            vec![
                XmlEvent::Open {
                    name: "TS".into(),
                    attrs: vec![],
                    self_closing: false
                },
                XmlEvent::Close("TS".into()),
            ]
        );
    }

    #[test]
    fn named_and_numeric_entities() {
        let decoded = decode_entities("a &lt;br&gt; b &amp; c &#10; d &#x3C;", 1).unwrap();
        assert_eq!(decoded, "a <br> b & c \n d <");
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let err = decode_entities("&nbsp;", 7).unwrap_err();
        assert_eq!(err.line, 7);
        assert!(err.message.contains("nbsp"));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let mut reader = XmlReader::new("<a>\n<b>\n<c attr></c>");
        let err = loop {
            match reader.next_event() {
                Ok(_) => continue,
                Err(e) => break e,
            }
        };
        assert_eq!(err.line, 3);
        assert!(err.message.contains("attr"));
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        let mut reader = XmlReader::new("<message");
        // name parses, then EOF while looking for `>`
        assert!(reader.next_event().is_err());
    }

    #[test]
    fn escape_round_trip() {
        let raw = "Größe < 5 & \"Text\"";
        assert_eq!(decode_entities(&escape_text(raw), 1).unwrap(), raw);
    }
}
