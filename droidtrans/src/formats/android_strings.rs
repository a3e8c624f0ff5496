//! Support for Android `strings.xml` resource files.
//!
//! Handles `<string>`, `<string-array>` and `<plurals>` elements inside `<resources>`.
//! Element bodies are kept as raw markup, so formatting tags and escapes survive a
//! read/write cycle untouched. Other top-level elements (`<color>`, `<dimen>`, ...) are skipped.

use std::{
    borrow::Cow,
    io::{BufRead, Read, Write},
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use quick_xml::{
    Reader, Writer,
    escape::partial_escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use tracing::debug;

use crate::{
    error::Error,
    options::WriteOptions,
    provenance,
    types::{Content, Quantity, ResourceKind, ResourceRecord, ResourceSet},
};

pub const RESOURCES_ELEMENT: &str = "resources";
pub const STRING_ELEMENT: &str = "string";
pub const STRING_ARRAY_ELEMENT: &str = "string-array";
pub const PLURALS_ELEMENT: &str = "plurals";
pub const ITEM_ELEMENT: &str = "item";

pub const NAME_ATTRIBUTE: &str = "name";
pub const TRANSLATABLE_ATTRIBUTE: &str = "translatable";
pub const FORMATTED_ATTRIBUTE: &str = "formatted";
pub const QUANTITY_ATTRIBUTE: &str = "quantity";

const FALSE_VALUE: &str = "false";

impl ResourceKind {
    pub fn element_name(self) -> &'static str {
        match self {
            ResourceKind::Scalar => STRING_ELEMENT,
            ResourceKind::List => STRING_ARRAY_ELEMENT,
            ResourceKind::QuantityMap => PLURALS_ELEMENT,
        }
    }

    pub fn from_element_name(name: &[u8]) -> Option<Self> {
        match name {
            b"string" => Some(ResourceKind::Scalar),
            b"string-array" => Some(ResourceKind::List),
            b"plurals" => Some(ResourceKind::QuantityMap),
            _ => None,
        }
    }
}

impl ResourceRecord {
    /// Single-line, base64 encoded form of this record (name, kind, flags, content).
    ///
    /// The source snapshot, origin file and comments are not part of it.
    pub fn serialize_self(&self) -> Result<String, Error> {
        let mut xml_writer = Writer::new(Vec::new());
        write_record(&mut xml_writer, self)?;
        Ok(STANDARD.encode(xml_writer.into_inner()))
    }

    /// Inverse of [`ResourceRecord::serialize_self`].
    pub fn deserialize_self(encoded: &str) -> Result<Self, Error> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::ProvenanceDecode(e.to_string()))?;
        let xml = String::from_utf8(bytes).map_err(|e| Error::ProvenanceDecode(e.to_string()))?;

        let mut xml_reader = Reader::from_str(&xml);
        xml_reader.config_mut().trim_text(true);
        loop {
            let (start, is_empty) = match xml_reader.read_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::Eof => {
                    return Err(Error::ProvenanceDecode(
                        "no resource element found".to_string(),
                    ));
                }
                _ => continue,
            };
            let kind = ResourceKind::from_element_name(start.local_name().as_ref()).ok_or_else(
                || {
                    Error::ProvenanceDecode(format!(
                        "unexpected element <{}>",
                        String::from_utf8_lossy(start.name().as_ref())
                    ))
                },
            )?;
            return read_record(&mut xml_reader, &start, kind, is_empty);
        }
    }
}

impl ResourceSet {
    /// Parses one resource file into this collection.
    ///
    /// Comments directly in front of a resource are kept as `leading_comments` for a source
    /// language; for a translation the last of them may carry the source snapshot.
    /// Returns the number of records added. A name that already exists aborts with
    /// [`Error::DuplicateName`].
    pub fn parse_file<R: BufRead>(&mut self, file_name: &str, mut reader: R) -> Result<usize, Error> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        self.parse_str(file_name, &xml)
    }

    /// Same as [`ResourceSet::parse_file`] for an in-memory document.
    pub fn parse_str(&mut self, file_name: &str, xml: &str) -> Result<usize, Error> {
        let mut xml_reader = Reader::from_str(xml);
        xml_reader.config_mut().trim_text(true);

        // Anything before <resources> is irrelevant
        loop {
            match xml_reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == RESOURCES_ELEMENT.as_bytes() => break,
                Event::Empty(e) if e.local_name().as_ref() == RESOURCES_ELEMENT.as_bytes() => {
                    return Ok(0);
                }
                Event::Eof => return Ok(0),
                _ => {}
            }
        }

        let mut count = 0;
        let mut comments: Vec<String> = Vec::new();
        loop {
            let (start, is_empty) = match xml_reader.read_event()? {
                Event::Comment(e) => {
                    comments.push(String::from_utf8_lossy(&e).into_owned());
                    continue;
                }
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(_) => break,
                Event::Eof => {
                    return Err(Error::malformed(format!(
                        "{}: document ended inside <{}>",
                        file_name, RESOURCES_ELEMENT
                    )));
                }
                _ => {
                    comments.clear();
                    continue;
                }
            };

            let Some(kind) = ResourceKind::from_element_name(start.local_name().as_ref()) else {
                comments.clear();
                if !is_empty {
                    xml_reader.read_to_end(start.name())?;
                }
                continue;
            };

            let mut record = read_record(&mut xml_reader, &start, kind, is_empty)?;
            record.origin_file = file_name.to_string();
            if self.is_source_language() {
                record.leading_comments = std::mem::take(&mut comments)
                    .into_iter()
                    .filter(|c| !provenance::is_annotation(c))
                    .collect();
            } else {
                if let Some(last) = comments.last() {
                    record.set_source_snapshot(provenance::snapshot_from_annotation(last));
                }
                comments.clear();
            }
            self.insert(record)?;
            count += 1;
        }

        debug!(file = file_name, records = count, "parsed resource file");
        Ok(count)
    }

    /// Files that [`ResourceSet::write_file`] would produce content for, in order of first appearance.
    pub fn output_file_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in self.iter().filter(|r| r.requires_translation()) {
            if !names.contains(&record.origin_file.as_str()) {
                names.push(&record.origin_file);
            }
        }
        names
    }

    /// Writes every record of `file_name` that needs translation as a complete resource file.
    ///
    /// A record's comments and, when final, its source snapshot annotation precede it.
    /// Returns the number of records written.
    pub fn write_file<W: Write>(
        &self,
        file_name: &str,
        writer: W,
        options: &WriteOptions,
    ) -> Result<usize, Error> {
        let mut xml_writer = Writer::new_with_indent(writer, b' ', options.indent);

        if options.xml_declaration {
            xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        }
        xml_writer.write_event(Event::Start(BytesStart::new(RESOURCES_ELEMENT)))?;

        let mut count = 0;
        for record in self
            .iter()
            .filter(|r| r.origin_file == file_name && r.requires_translation())
        {
            for comment in &record.leading_comments {
                xml_writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
            }
            if let Some(snapshot) = record.source_snapshot() {
                let annotation = provenance::annotation_for(snapshot)?;
                xml_writer.write_event(Event::Comment(BytesText::from_escaped(annotation)))?;
            }
            write_record(&mut xml_writer, record)?;
            count += 1;
        }

        xml_writer.write_event(Event::End(BytesEnd::new(RESOURCES_ELEMENT)))?;
        xml_writer.get_mut().write_all(b"\n")?;
        Ok(count)
    }
}

/// Reads one resource element; the reader is positioned right after `start`.
fn read_record(
    xml_reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    kind: ResourceKind,
    is_empty: bool,
) -> Result<ResourceRecord, Error> {
    let mut name = None;
    let mut is_translatable = true;
    let mut has_format_specifiers = true;

    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::malformed(e.to_string()))?;
        match attr.key.as_ref() {
            b"name" => name = Some(attr.unescape_value()?.into_owned()),
            b"translatable" => is_translatable = attr.unescape_value()? != FALSE_VALUE,
            b"formatted" => has_format_specifiers = attr.unescape_value()? != FALSE_VALUE,
            _ => {}
        }
    }
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::malformed(format!("{} tag missing 'name'", kind.element_name())))?;

    let content = if is_empty {
        Content::empty(kind)
    } else {
        read_content(xml_reader, start, kind, &name)?
    };

    Ok(ResourceRecord::new(name, content)?
        .with_translatable(is_translatable)
        .with_format_specifiers(has_format_specifiers))
}

fn read_content(
    xml_reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    kind: ResourceKind,
    name: &str,
) -> Result<Content, Error> {
    if kind == ResourceKind::Scalar {
        return Ok(Content::Scalar(Some(read_inner(xml_reader, start)?)));
    }

    let mut content = Content::empty(kind);
    loop {
        let (item, is_empty) = match xml_reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => break,
            Event::Eof => {
                return Err(Error::malformed(format!(
                    "{} '{}': unexpected end of document",
                    kind.element_name(),
                    name
                )));
            }
            // text and comments between items carry no meaning
            _ => continue,
        };
        if item.local_name().as_ref() != ITEM_ELEMENT.as_bytes() {
            return Err(Error::malformed(format!(
                "{} '{}': <{}> expected, found <{}>",
                kind.element_name(),
                name,
                ITEM_ELEMENT,
                String::from_utf8_lossy(item.name().as_ref())
            )));
        }

        let value = if is_empty {
            None
        } else {
            Some(read_inner(xml_reader, &item)?)
        };
        match &mut content {
            Content::List(values) => values.push(value),
            Content::QuantityMap(values) => {
                let quantity = item_quantity(&item, name)?;
                if values.contains_key(&quantity) {
                    return Err(Error::malformed(format!(
                        "plurals '{}': quantity '{}' appears more than once",
                        name, quantity
                    )));
                }
                values.insert(quantity, value);
            }
            Content::Scalar(_) => unreachable!("scalar content is read above"),
        }
    }
    Ok(content)
}

fn item_quantity(item: &BytesStart, name: &str) -> Result<Quantity, Error> {
    let attr = item
        .try_get_attribute(QUANTITY_ATTRIBUTE)
        .map_err(|e| Error::malformed(e.to_string()))?
        .ok_or_else(|| Error::malformed(format!("plurals '{}': item missing 'quantity'", name)))?;
    attr.unescape_value()?
        .parse()
        .map_err(|e: String| Error::malformed(format!("plurals '{}': {}", name, e)))
}

/// Raw markup between `start` and its end tag.
fn read_inner(xml_reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<String, Error> {
    let end = start.to_end().into_owned();
    Ok(xml_reader.read_text(end.name())?.into_owned())
}

/// `text` as element content: kept when it is already well-formed markup, escaped otherwise.
///
/// Values arriving as plain text (a sheet cell, say) go through this before they are stored,
/// since [`ResourceSet::write_file`] writes values verbatim.
pub fn markup_from_text(text: &str) -> Cow<'_, str> {
    if is_element_content(text) {
        Cow::Borrowed(text)
    } else {
        partial_escape(text)
    }
}

fn is_element_content(value: &str) -> bool {
    let wrapped = format!("<{0}>{1}</{0}>", ITEM_ELEMENT, value);
    let mut xml_reader = Reader::from_str(&wrapped);
    let mut depth = 0usize;
    let mut closed = false;
    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(_)) if !closed => depth += 1,
            Ok(Event::End(_)) if depth > 0 => {
                depth -= 1;
                closed = depth == 0;
            }
            // a bare `&` reads leniently but does not unescape
            Ok(Event::Text(text)) if !closed => {
                if text.unescape().is_err() {
                    return false;
                }
            }
            Ok(Event::Empty(_) | Event::CData(_) | Event::Comment(_)) if !closed => {}
            Ok(Event::Eof) => return closed,
            _ => return false,
        }
    }
}

fn write_record<W: Write>(
    xml_writer: &mut Writer<W>,
    record: &ResourceRecord,
) -> Result<(), Error> {
    let element = record.kind().element_name();
    let mut start = BytesStart::new(element);
    start.push_attribute((NAME_ATTRIBUTE, record.name()));
    if !record.is_translatable {
        start.push_attribute((TRANSLATABLE_ATTRIBUTE, FALSE_VALUE));
    }
    if !record.has_format_specifiers {
        start.push_attribute((FORMATTED_ATTRIBUTE, FALSE_VALUE));
    }

    match record.content() {
        Content::Scalar(value) => write_value(xml_writer, start, value.as_deref()),
        Content::List(values) if values.is_empty() => {
            xml_writer.write_event(Event::Empty(start))?;
            Ok(())
        }
        Content::QuantityMap(values) if values.is_empty() => {
            xml_writer.write_event(Event::Empty(start))?;
            Ok(())
        }
        Content::List(values) => {
            xml_writer.write_event(Event::Start(start))?;
            for value in values {
                write_value(xml_writer, BytesStart::new(ITEM_ELEMENT), value.as_deref())?;
            }
            xml_writer.write_event(Event::End(BytesEnd::new(element)))?;
            Ok(())
        }
        Content::QuantityMap(values) => {
            xml_writer.write_event(Event::Start(start))?;
            for (quantity, value) in values {
                let mut item = BytesStart::new(ITEM_ELEMENT);
                item.push_attribute((QUANTITY_ATTRIBUTE, quantity.as_str()));
                write_value(xml_writer, item, value.as_deref())?;
            }
            xml_writer.write_event(Event::End(BytesEnd::new(element)))?;
            Ok(())
        }
    }
}

/// `None` becomes an empty element; a present value is written verbatim, even when empty.
fn write_value<W: Write>(
    xml_writer: &mut Writer<W>,
    start: BytesStart,
    value: Option<&str>,
) -> Result<(), Error> {
    match value {
        None => xml_writer.write_event(Event::Empty(start))?,
        Some(value) => {
            let end = start.to_end().into_owned();
            xml_writer.write_event(Event::Start(start))?;
            xml_writer.write_event(Event::Text(BytesText::from_escaped(value)))?;
            xml_writer.write_event(Event::End(end))?;
        }
    }
    Ok(())
}
