//! Streaming fill of the WordprocessingML body.
//!
//! The document part is copied event by event. Only paragraphs that are
//! direct children of `w:body` are considered; paragraphs nested in tables,
//! content controls or text boxes pass through untouched. Each top-level
//! paragraph is buffered so its visible text can be computed before it is
//! written back:
//!
//! - a paragraph containing a label gets one extra run with the label value;
//! - the first paragraph whose trimmed text equals a block's anchor is
//!   followed by a new paragraph holding the block.
//!
//! All other markup is written back as read.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{RenderError, Result};

/// Paragraph text that receives the documentation date.
pub const DATE_LABEL: &str = "Data da documentação:";

/// Paragraph text that receives the report name.
pub const REPORT_NAME_LABEL: &str = "Nome do Relatório:";

/// What to write into a template body.
#[derive(Debug, Clone, Default)]
pub struct BodyFill<'a> {
    /// Value appended after [`REPORT_NAME_LABEL`].
    pub report_name: &'a str,
    /// Value appended after [`DATE_LABEL`], already formatted.
    pub generated_on: &'a str,
    /// `(anchor, block)` pairs, in insertion priority order.
    pub blocks: Vec<(&'a str, &'a str)>,
}

impl BodyFill<'_> {
    fn label_value(&self, text: &str) -> Option<&str> {
        if text.contains(DATE_LABEL) {
            Some(self.generated_on)
        } else if text.contains(REPORT_NAME_LABEL) {
            Some(self.report_name)
        } else {
            None
        }
    }
}

/// Rewrites `xml`, returning the new document and, per block, whether its
/// anchor was found.
pub fn fill_body(xml: &[u8], fill: &BodyFill<'_>) -> Result<(Vec<u8>, Vec<bool>)> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 4096));
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut inserted = vec![false; fill.blocks.len()];

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(start) if is_top_level_paragraph(&open, &start) => {
                let paragraph = Paragraph::read(&mut reader, start)?;
                paragraph.write(&mut writer, fill, &mut inserted)?;
            }
            Event::Start(ref start) => {
                open.push(start.local_name().as_ref().to_vec());
                writer.write_event(event)?;
            }
            Event::End(_) => {
                open.pop();
                writer.write_event(event)?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    Ok((writer.into_inner(), inserted))
}

/// Visible text of every top-level body paragraph, in document order.
///
/// Uses the same text rules as [`fill_body`]: `w:t` content, `w:tab` as a
/// tab, `w:br`/`w:cr` as a newline.
pub fn body_paragraphs(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut texts = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) if is_top_level_paragraph(&open, &start) => {
                texts.push(Paragraph::read(&mut reader, start)?.text);
            }
            Event::Empty(start) if is_top_level_paragraph(&open, &start) => {
                texts.push(String::new());
            }
            Event::Start(start) => open.push(start.local_name().as_ref().to_vec()),
            Event::End(_) => {
                open.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(texts)
}

fn is_top_level_paragraph(open: &[Vec<u8>], start: &BytesStart<'_>) -> bool {
    start.local_name().as_ref() == b"p" && open.last().is_some_and(|parent| parent == b"body")
}

// ---------------------------------------------------------------------------
// Paragraph buffering
// ---------------------------------------------------------------------------

/// Element names qualified with the paragraph's namespace prefix.
struct Names {
    prefix: String,
}

impl Names {
    fn of(start: &BytesStart<'_>) -> Self {
        let prefix = start
            .name()
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
            .unwrap_or_default();
        Self { prefix }
    }

    fn qualified(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{local}", self.prefix)
        }
    }
}

struct Paragraph<'a> {
    names: Names,
    /// Every event of the paragraph, from its start tag up to (excluding)
    /// its end tag.
    events: Vec<Event<'a>>,
    end: Event<'a>,
    text: String,
}

impl<'a> Paragraph<'a> {
    fn read(reader: &mut Reader<&'a [u8]>, start: BytesStart<'a>) -> Result<Self> {
        let names = Names::of(&start);
        let mut events = vec![Event::Start(start)];
        let mut path: Vec<Vec<u8>> = Vec::new();
        let mut text = String::new();

        loop {
            let event = reader.read_event()?;
            if let Event::End(_) = event {
                if path.pop().is_none() {
                    return Ok(Self {
                        names,
                        events,
                        end: event,
                        text,
                    });
                }
                events.push(event);
                continue;
            }
            match &event {
                Event::Start(e) => {
                    if let Some(ch) = run_char(&path, e) {
                        text.push(ch);
                    }
                    path.push(e.local_name().as_ref().to_vec());
                }
                Event::Empty(e) => {
                    if let Some(ch) = run_char(&path, e) {
                        text.push(ch);
                    }
                }
                Event::Text(e) if path.last().is_some_and(|name| name == b"t") => {
                    text.push_str(&e.unescape().map_err(quick_xml::Error::from)?);
                }
                Event::Eof => {
                    return Err(RenderError::MalformedDocument(
                        "document ends inside a paragraph".to_string(),
                    ));
                }
                _ => {}
            }
            events.push(event);
        }
    }

    fn write<W: Write>(
        self,
        writer: &mut Writer<W>,
        fill: &BodyFill<'_>,
        inserted: &mut [bool],
    ) -> Result<()> {
        for event in self.events {
            writer.write_event(event)?;
        }
        if let Some(value) = fill.label_value(&self.text) {
            write_run(writer, &self.names, &format!(" {value}"))?;
        }
        writer.write_event(self.end)?;

        let anchor = self.text.trim();
        let target = fill
            .blocks
            .iter()
            .enumerate()
            .find(|(index, (label, _))| !inserted[*index] && *label == anchor);
        if let Some((index, (_, block))) = target {
            write_block_paragraph(writer, &self.names, block)?;
            inserted[index] = true;
        }
        Ok(())
    }
}

/// Character contributed by a tab or break element directly inside a run.
fn run_char(path: &[Vec<u8>], element: &BytesStart<'_>) -> Option<char> {
    if !path.last().is_some_and(|parent| parent == b"r") {
        return None;
    }
    match element.local_name().as_ref() {
        b"tab" => Some('\t'),
        b"br" | b"cr" => Some('\n'),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Output markup
// ---------------------------------------------------------------------------

fn write_block_paragraph<W: Write>(
    writer: &mut Writer<W>,
    names: &Names,
    block: &str,
) -> Result<()> {
    let p = names.qualified("p");
    if block.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(p)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(p.as_str())))?;
    write_run(writer, names, block)?;
    writer.write_event(Event::End(BytesEnd::new(p)))?;
    Ok(())
}

/// Writes one run holding `text`; newlines become breaks, tabs become tabs.
fn write_run<W: Write>(writer: &mut Writer<W>, names: &Names, text: &str) -> Result<()> {
    let r = names.qualified("r");
    writer.write_event(Event::Start(BytesStart::new(r.as_str())))?;

    let mut segment = String::new();
    for ch in text.chars() {
        let element = match ch {
            '\n' | '\r' => "br",
            '\t' => "tab",
            _ => {
                segment.push(ch);
                continue;
            }
        };
        write_text(writer, names, &segment)?;
        segment.clear();
        writer.write_event(Event::Empty(BytesStart::new(names.qualified(element))))?;
    }
    write_text(writer, names, &segment)?;

    writer.write_event(Event::End(BytesEnd::new(r)))?;
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, names: &Names, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let t = names.qualified("t");
    let mut start = BytesStart::new(t.as_str());
    start.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(t)))?;
    Ok(())
}
