//! Core types for droidtrans.
//! The XML codec decodes into these; the reconciliation engine and the sheet round-trip operate on them.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Values that merely point at another resource never need translating.
pub const REFERENCE_PREFIX: &str = "@string/";

/// File used for records that were not read from (or assigned to) any file.
pub const DEFAULT_FILE_NAME: &str = "strings.xml";

/// The shape of a resource: `<string>`, `<string-array>` or `<plurals>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Scalar,
    List,
    QuantityMap,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Scalar => write!(f, "string"),
            ResourceKind::List => write!(f, "string-array"),
            ResourceKind::QuantityMap => write!(f, "plurals"),
        }
    }
}

/// Quantity key of a `<plurals>` item.
///
/// The CLDR categories sort first, in CLDR order; anything else is kept verbatim.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Clone, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
    Custom(String),
}

impl Quantity {
    pub fn as_str(&self) -> &str {
        match self {
            Quantity::Zero => "zero",
            Quantity::One => "one",
            Quantity::Two => "two",
            Quantity::Few => "few",
            Quantity::Many => "many",
            Quantity::Other => "other",
            Quantity::Custom(key) => key,
        }
    }
}

impl FromStr for Quantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("Empty quantity key".to_string()),
            "zero" => Ok(Quantity::Zero),
            "one" => Ok(Quantity::One),
            "two" => Ok(Quantity::Two),
            "few" => Ok(Quantity::Few),
            "many" => Ok(Quantity::Many),
            "other" => Ok(Quantity::Other),
            custom => Ok(Quantity::Custom(custom.to_string())),
        }
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a single value needs a translator's attention.
pub fn value_needs_translation(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(v) => !v.starts_with(REFERENCE_PREFIX),
    }
}

/// The payload of a resource.
///
/// Every value holds the raw inner markup of its element. `None` stands for an empty
/// element (`<item/>`), which is kept distinct from an explicitly empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Content {
    Scalar(Option<String>),
    List(Vec<Option<String>>),
    QuantityMap(BTreeMap<Quantity, Option<String>>),
}

impl Content {
    /// Empty content of the given kind.
    pub fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Scalar => Content::Scalar(None),
            ResourceKind::List => Content::List(Vec::new()),
            ResourceKind::QuantityMap => Content::QuantityMap(BTreeMap::new()),
        }
    }

    pub fn scalar(value: impl Into<String>) -> Self {
        Content::Scalar(Some(value.into()))
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Content::List(values.into_iter().map(|v| Some(v.into())).collect())
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Content::Scalar(_) => ResourceKind::Scalar,
            Content::List(_) => ResourceKind::List,
            Content::QuantityMap(_) => ResourceKind::QuantityMap,
        }
    }

    /// True iff at least one value is non-blank and not a `@string/` reference.
    pub fn requires_translation(&self) -> bool {
        match self {
            Content::Scalar(value) => value_needs_translation(value.as_deref()),
            Content::List(values) => values.iter().any(|v| value_needs_translation(v.as_deref())),
            Content::QuantityMap(values) => values
                .values()
                .any(|v| value_needs_translation(v.as_deref())),
        }
    }

    /// Equality where an empty value and a missing one count as the same.
    pub fn same_text(&self, other: &Content) -> bool {
        fn text(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or_default()
        }
        match (self, other) {
            (Content::Scalar(a), Content::Scalar(b)) => text(a) == text(b),
            (Content::List(a), Content::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| text(a) == text(b))
            }
            (Content::QuantityMap(a), Content::QuantityMap(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, a), (kb, b))| ka == kb && text(a) == text(b))
            }
            _ => false,
        }
    }

    /// Realign an old translation to `self`, the new source content.
    ///
    /// `old_source` is the source content the old translation was made against, if known.
    /// List items are matched by value (the last occurrence wins on duplicates); without an
    /// old list source the old translation is only padded or truncated to the new length.
    /// Quantity maps keep the old value for every key still present in the source.
    pub fn rebase(&self, old_source: Option<&Content>, old_target: Option<&Content>) -> Content {
        match self {
            Content::Scalar(_) => match old_target {
                Some(Content::Scalar(value)) => Content::Scalar(value.clone()),
                _ => Content::Scalar(None),
            },
            Content::List(new_source) => {
                let old_target: &[Option<String>] = match old_target {
                    Some(Content::List(values)) => values,
                    _ => &[],
                };
                let rebased = match old_source {
                    Some(Content::List(old_source)) => {
                        let mut by_source: HashMap<Option<&str>, Option<&str>> = HashMap::new();
                        for (i, value) in old_source.iter().enumerate() {
                            let translated = old_target.get(i).and_then(|t| t.as_deref());
                            by_source.insert(value.as_deref(), translated);
                        }
                        new_source
                            .iter()
                            .map(|value| {
                                by_source
                                    .get(&value.as_deref())
                                    .copied()
                                    .flatten()
                                    .map(str::to_string)
                            })
                            .collect()
                    }
                    _ => {
                        let mut values = old_target.to_vec();
                        values.resize(new_source.len(), None);
                        values
                    }
                };
                Content::List(rebased)
            }
            Content::QuantityMap(new_source) => {
                let old_target = match old_target {
                    Some(Content::QuantityMap(values)) => Some(values),
                    _ => None,
                };
                Content::QuantityMap(
                    new_source
                        .keys()
                        .map(|key| {
                            let value = old_target.and_then(|t| t.get(key)).cloned().flatten();
                            (key.clone(), value)
                        })
                        .collect(),
                )
            }
        }
    }
}

/// One named resource plus its translation metadata.
///
/// A record is *final* when it carries a source snapshot: the source record that was in
/// effect when a human last approved this translation. The flag is never stored separately.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    name: String,
    content: Content,
    source_snapshot: Option<Box<ResourceRecord>>,

    /// `translatable` attribute; defaults to true.
    pub is_translatable: bool,

    /// `formatted` attribute; defaults to true.
    pub has_format_specifiers: bool,

    /// File this record was read from, or should be written to.
    pub origin_file: String,

    /// Comments immediately preceding the element. Only kept for source-language records.
    pub leading_comments: Vec<String>,
}

impl ResourceRecord {
    /// Creates a record with default flags, no snapshot and the default origin file.
    pub fn new(name: impl Into<String>, content: Content) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::malformed("resource name must not be empty"));
        }
        Ok(Self {
            name,
            content,
            source_snapshot: None,
            is_translatable: true,
            has_format_specifiers: true,
            origin_file: DEFAULT_FILE_NAME.to_string(),
            leading_comments: Vec::new(),
        })
    }

    pub fn with_translatable(mut self, is_translatable: bool) -> Self {
        self.is_translatable = is_translatable;
        self
    }

    pub fn with_format_specifiers(mut self, has_format_specifiers: bool) -> Self {
        self.has_format_specifiers = has_format_specifiers;
        self
    }

    pub fn with_origin_file(mut self, origin_file: impl Into<String>) -> Self {
        self.origin_file = origin_file.into();
        self
    }

    pub fn with_source_snapshot(mut self, snapshot: ResourceRecord) -> Self {
        self.set_source_snapshot(Some(snapshot));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.content.kind()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Replaces the content if it differs. Any change revokes final status.
    ///
    /// Returns whether the content was replaced.
    pub fn set_content(&mut self, content: Content) -> bool {
        if self.content == content {
            return false;
        }
        self.content = content;
        self.source_snapshot = None;
        true
    }

    pub fn source_snapshot(&self) -> Option<&ResourceRecord> {
        self.source_snapshot.as_deref()
    }

    /// Sets the snapshot. A snapshot never nests one of its own.
    pub fn set_source_snapshot(&mut self, snapshot: Option<ResourceRecord>) {
        self.source_snapshot = snapshot.map(|mut s| {
            s.source_snapshot = None;
            Box::new(s)
        });
    }

    pub fn clear_source_snapshot(&mut self) {
        self.source_snapshot = None;
    }

    pub fn is_final(&self) -> bool {
        self.source_snapshot.is_some()
    }

    /// Final and approved against exactly this source record.
    pub fn is_final_for(&self, source: &ResourceRecord) -> bool {
        self.source_snapshot() == Some(source)
    }

    /// Like [`is_final_for`](Self::is_final_for), but an empty value and a missing one match.
    ///
    /// Snapshots rebuilt from a sheet cannot tell the two apart.
    pub fn is_final_for_text(&self, source: &ResourceRecord) -> bool {
        self.source_snapshot().is_some_and(|snapshot| {
            snapshot.name == source.name && snapshot.content.same_text(&source.content)
        })
    }

    pub fn requires_translation(&self) -> bool {
        self.content.requires_translation()
    }
}

impl PartialEq for ResourceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.name == other.name && self.content == other.content
    }
}

impl Eq for ResourceRecord {}

impl Hash for ResourceRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.name.hash(state);
        self.content.hash(state);
    }
}

impl Display for ResourceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {{ name: {}, final: {} }}",
            self.kind(),
            self.name,
            self.is_final()
        )
    }
}

/// All resources of one language, in definition order, unique by name.
#[derive(Debug, Clone)]
pub struct ResourceSet {
    language: String,
    is_source_language: bool,
    records: Vec<ResourceRecord>,
    index: HashMap<String, usize>,
}

impl ResourceSet {
    pub fn new(language: impl Into<String>, is_source_language: bool) -> Result<Self, Error> {
        let language = language.into();
        if language.trim().is_empty() {
            return Err(Error::InvalidLanguage(
                "language code must not be empty".to_string(),
            ));
        }
        Ok(Self {
            language,
            is_source_language,
            records: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// An empty collection for the same language and role.
    pub fn empty_like(other: &ResourceSet) -> Self {
        Self {
            language: other.language.clone(),
            is_source_language: other.is_source_language,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_source_language(&self) -> bool {
        self.is_source_language
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ResourceRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Mutable access; the name of a record cannot change through it.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ResourceRecord> {
        let i = *self.index.get(name)?;
        Some(&mut self.records[i])
    }

    /// Records in definition order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceRecord> {
        self.records.iter()
    }

    /// Adds a record, failing when the name is already taken.
    pub fn insert(&mut self, record: ResourceRecord) -> Result<(), Error> {
        if self.index.contains_key(record.name()) {
            return Err(Error::DuplicateName(record.name().to_string()));
        }
        self.index.insert(record.name().to_string(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Adds a record, replacing one with the same name in place.
    pub fn upsert(&mut self, record: ResourceRecord) {
        match self.index.get(record.name()) {
            Some(&i) => self.records[i] = record,
            None => {
                self.index.insert(record.name().to_string(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Moves every record of `other` into this collection.
    ///
    /// Fails on the first name both collections share; records before it have been moved.
    pub fn absorb(&mut self, other: ResourceSet) -> Result<usize, Error> {
        let count = other.records.len();
        for record in other.records {
            self.insert(record)?;
        }
        Ok(count)
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = &'a ResourceRecord;
    type IntoIter = std::slice::Iter<'a, ResourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
