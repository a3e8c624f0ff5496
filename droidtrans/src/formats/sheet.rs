//! Spreadsheet round-trip through CSV.
//!
//! A sheet has five columns: resource name, index (blank for a `<string>`, the position for a
//! `<string-array>` item, the quantity for a `<plurals>` item), the source text, the
//! translation, and a "final" flag the translator fills in.
//!
//! Exporting lists everything that still needs a translator; importing turns the edited sheet
//! into a target [`ResourceSet`] whose final rows carry a source snapshot built from the
//! source column.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
    str::FromStr,
};

use crate::{
    error::Error,
    formats::android_strings::markup_from_text,
    types::{Content, Quantity, ResourceKind, ResourceRecord, ResourceSet},
};

pub const NAME_HEADER: &str = "Name";
pub const INDEX_HEADER: &str = "Index";
pub const FINAL_HEADER: &str = "Final (Y/N)?";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// One row of a sheet. Empty cells read as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub name: String,
    pub index: String,
    pub source: Option<String>,
    pub target: Option<String>,
    pub is_final: bool,
}

/// A translation sheet for one language pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub source_language: String,
    pub target_language: String,
    pub rows: Vec<SheetRow>,
}

/// What the index cell says about a row.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Scalar,
    Position(usize),
    Quantity(Quantity),
}

impl Slot {
    fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            return Slot::Scalar;
        }
        match cell.parse::<usize>() {
            Ok(position) => Slot::Position(position),
            Err(_) => Slot::Quantity(
                cell.parse()
                    .unwrap_or_else(|_| Quantity::Custom(cell.to_string())),
            ),
        }
    }

    fn kind(&self) -> ResourceKind {
        match self {
            Slot::Scalar => ResourceKind::Scalar,
            Slot::Position(_) => ResourceKind::List,
            Slot::Quantity(_) => ResourceKind::QuantityMap,
        }
    }
}

impl Sheet {
    /// Reads a sheet from CSV text. The header names both languages.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = rdr.records();

        let header = records
            .next()
            .ok_or_else(|| Error::invalid_sheet("missing header row"))??;
        let name_header = cell(&header, 0).trim_start_matches(BYTE_ORDER_MARK);
        if name_header != NAME_HEADER
            || cell(&header, 1) != INDEX_HEADER
            || cell(&header, 4) != FINAL_HEADER
        {
            return Err(Error::invalid_sheet(format!(
                "expected columns `{}, {}, <source>, <target>, {}`",
                NAME_HEADER, INDEX_HEADER, FINAL_HEADER
            )));
        }
        let source_language = cell(&header, 2).trim().to_string();
        let target_language = cell(&header, 3).trim().to_string();
        if source_language.is_empty() || target_language.is_empty() {
            return Err(Error::invalid_sheet("language columns must be named"));
        }

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            let name = cell(&record, 0).trim();
            // the first row without a name ends the sheet
            if name.is_empty() {
                break;
            }
            rows.push(SheetRow {
                name: name.to_string(),
                index: cell(&record, 1).trim().to_string(),
                source: optional_cell(&record, 2),
                target: optional_cell(&record, 3),
                is_final: cell(&record, 4)
                    .trim_start()
                    .starts_with(|c: char| c.eq_ignore_ascii_case(&'y')),
            });
        }

        Ok(Sheet {
            source_language,
            target_language,
            rows,
        })
    }

    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Writes the sheet as CSV, header first.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record([
            NAME_HEADER,
            INDEX_HEADER,
            self.source_language.as_str(),
            self.target_language.as_str(),
            FINAL_HEADER,
        ])?;
        for row in &self.rows {
            wtr.write_record([
                row.name.as_str(),
                row.index.as_str(),
                row.source.as_deref().unwrap_or_default(),
                row.target.as_deref().unwrap_or_default(),
                if row.is_final { "Y" } else { "" },
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }

    /// Rows for every source resource that still needs a translator.
    ///
    /// Untranslatable and empty sources are left out, and so are resources whose translation
    /// is final for the current source text. The translation column is prefilled with the
    /// existing translation when its kind matches, realigned to moved list items.
    pub fn export(source: &ResourceSet, target: &ResourceSet) -> Self {
        let mut rows = Vec::new();
        for source_record in source
            .iter()
            .filter(|r| r.is_translatable && r.requires_translation())
        {
            let target_record = target.get(source_record.name());
            if target_record.is_some_and(|t| t.is_final_for(source_record)) {
                continue;
            }
            // Align the old translation with the current source shape before prefilling.
            let prefill = target_record
                .filter(|t| t.kind() == source_record.kind())
                .map(|t| {
                    source_record.content().rebase(
                        t.source_snapshot().map(ResourceRecord::content),
                        Some(t.content()),
                    )
                });

            let name = source_record.name();
            match source_record.content() {
                Content::Scalar(value) => {
                    let translated = match prefill {
                        Some(Content::Scalar(t)) => t,
                        _ => None,
                    };
                    rows.push(export_row(name, String::new(), value.clone(), translated));
                }
                Content::List(values) => {
                    let mut translated = match prefill {
                        Some(Content::List(t)) => t,
                        _ => Vec::new(),
                    };
                    translated.resize(values.len(), None);
                    for (i, (value, t)) in values.iter().zip(translated).enumerate() {
                        rows.push(export_row(name, i.to_string(), value.clone(), t));
                    }
                }
                Content::QuantityMap(values) => {
                    let mut translated = match prefill {
                        Some(Content::QuantityMap(t)) => t,
                        _ => Default::default(),
                    };
                    for (quantity, value) in values {
                        let t = translated.remove(quantity).flatten();
                        rows.push(export_row(name, quantity.to_string(), value.clone(), t));
                    }
                }
            }
        }

        Sheet {
            source_language: source.language().to_string(),
            target_language: target.language().to_string(),
            rows,
        }
    }

    /// Builds the edited translations as a target-language collection.
    ///
    /// A resource becomes final only if every one of its rows is marked final; its snapshot
    /// is assembled from the source column. `source_language` and `target_language` must
    /// match the sheet's header.
    pub fn to_resource_set(
        &self,
        source_language: &str,
        target_language: &str,
    ) -> Result<ResourceSet, Error> {
        if self.source_language != source_language || self.target_language != target_language {
            return Err(Error::invalid_sheet(format!(
                "sheet translates {} to {}, expected {} to {}",
                self.source_language, self.target_language, source_language, target_language
            )));
        }

        struct Pending<'a> {
            name: &'a str,
            target: Content,
            source: Option<Content>,
        }

        let mut pending: Vec<Pending> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for row in &self.rows {
            let slot = Slot::parse(&row.index);
            let i = match index.get(row.name.as_str()) {
                Some(&i) => {
                    let existing = pending[i].target.kind();
                    if existing == ResourceKind::Scalar && slot == Slot::Scalar {
                        return Err(Error::invalid_sheet(format!(
                            "a resource named {} appears more than once",
                            row.name
                        )));
                    }
                    if existing != slot.kind() {
                        return Err(Error::invalid_sheet(format!(
                            "rows of {} mix {} and {} items",
                            row.name,
                            existing,
                            slot.kind()
                        )));
                    }
                    i
                }
                None => {
                    let kind = slot.kind();
                    index.insert(&row.name, pending.len());
                    pending.push(Pending {
                        name: &row.name,
                        target: Content::empty(kind),
                        source: Some(Content::empty(kind)),
                    });
                    pending.len() - 1
                }
            };

            let entry = &mut pending[i];
            place(&mut entry.target, &slot, markup_cell(row.target.as_deref()))
                .map_err(|e| Error::invalid_sheet(format!("{}: {}", row.name, e)))?;
            if row.is_final {
                if let Some(source) = entry.source.as_mut() {
                    place(source, &slot, markup_cell(row.source.as_deref()))
                        .map_err(|e| Error::invalid_sheet(format!("{}: {}", row.name, e)))?;
                }
            } else {
                entry.source = None;
            }
        }

        let mut set = ResourceSet::new(target_language, false)?;
        for entry in pending {
            let mut record = ResourceRecord::new(entry.name, entry.target)?;
            if let Some(source) = entry.source {
                record.set_source_snapshot(Some(ResourceRecord::new(entry.name, source)?));
            }
            set.insert(record)?;
        }
        Ok(set)
    }
}

impl FromStr for Sheet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

fn export_row(
    name: &str,
    index: String,
    source: Option<String>,
    target: Option<String>,
) -> SheetRow {
    SheetRow {
        name: name.to_string(),
        index,
        source,
        target,
        is_final: false,
    }
}

/// Puts one row's value into content of the slot's kind.
fn place(content: &mut Content, slot: &Slot, value: Option<String>) -> Result<(), String> {
    match (content, slot) {
        (Content::Scalar(current), Slot::Scalar) => {
            *current = value;
            Ok(())
        }
        (Content::List(values), Slot::Position(position)) => {
            if *position != values.len() {
                return Err(format!(
                    "items are not in increasing order of index (expected {}, found {})",
                    values.len(),
                    position
                ));
            }
            values.push(value);
            Ok(())
        }
        (Content::QuantityMap(values), Slot::Quantity(quantity)) => {
            if values.contains_key(quantity) {
                return Err(format!("item {} has been duplicated", quantity));
            }
            values.insert(quantity.clone(), value);
            Ok(())
        }
        (content, slot) => Err(format!(
            "{} row in a {} resource",
            slot.kind(),
            content.kind()
        )),
    }
}

/// Cells hold text as the translator typed it; stored values are element markup.
fn markup_cell(value: Option<&str>) -> Option<String> {
    value.map(|v| markup_from_text(v).into_owned())
}

fn cell(record: &csv::StringRecord, i: usize) -> &str {
    record.get(i).unwrap_or_default()
}

fn optional_cell(record: &csv::StringRecord, i: usize) -> Option<String> {
    Some(cell(record, i)).filter(|v| !v.is_empty()).map(str::to_string)
}
