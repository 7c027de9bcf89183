//! Conversion of review bodies from CML markup to plain text.
//!
//! Review text arrives as CML, an XML dialect:
//! `<co-content><text>First line</text><text/><text>Second</text></co-content>`.
//! Each `<text>` element becomes one line; an empty `<text/>` becomes a blank
//! line. List items are prefixed with `- `.

use quick_xml::Reader;
use quick_xml::events::Event;

const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// Convert a CML document to plain text.
///
/// Input that is not well-formed XML falls back to stripping anything that
/// looks like a tag. Zero-width spaces are removed and trailing whitespace
/// is trimmed.
#[must_use]
pub fn cml_to_text(cml: &str) -> String {
    let text = match parse_cml(cml) {
        Some(lines) => lines,
        None => strip_tags(cml),
    };
    text.replace(ZERO_WIDTH_SPACE, "").trim_end().to_string()
}

fn parse_cml(cml: &str) -> Option<String> {
    let mut reader = Reader::from_str(cml);
    reader.config_mut().trim_text(false);

    let mut lines: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut depth = 0usize;
    let mut loose = String::new();
    let mut bullet = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"text" => {
                    depth += 1;
                    if depth == 1 {
                        let prefix = if std::mem::take(&mut bullet) { "- " } else { "" };
                        current = Some(prefix.to_string());
                    }
                }
                b"li" => bullet = true,
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"text" && depth > 0 {
                    depth -= 1;
                    if depth == 0
                        && let Some(line) = current.take()
                    {
                        lines.push(line);
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"text" && depth == 0 {
                    lines.push(String::new());
                }
            }
            Ok(Event::Text(t)) => {
                let value = t.unescape().ok()?;
                match current.as_mut() {
                    Some(line) => line.push_str(&value),
                    None => loose.push_str(&value),
                }
            }
            Ok(Event::CData(t)) => {
                let value = String::from_utf8_lossy(&t).into_owned();
                match current.as_mut() {
                    Some(line) => line.push_str(&value),
                    None => loose.push_str(&value),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    if lines.is_empty() {
        return Some(loose.trim().to_string());
    }
    Some(lines.join("\n"))
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
