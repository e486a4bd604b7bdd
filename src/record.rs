//! # Records
//!
//! One row of label data: a mapping from normalised field name to value.
//!
//! Keys are lower-cased and trimmed, values are trimmed. Lookups go through
//! [`FieldLookup`], which is total: an absent field reads as `""`.

use std::collections::BTreeMap;

use crate::error::{LabelError, Result};

/// Canonical name of the identifier field.
pub const IDENTIFIER_FIELD: &str = "pallet_id";

/// Accepted alternative spelling of the identifier field.
pub const IDENTIFIER_ALIAS: &str = "pallet";

/// A total field lookup: every name resolves, absent ones to the empty string.
pub trait FieldLookup {
    fn field(&self, name: &str) -> &str;
}

impl FieldLookup for BTreeMap<String, String> {
    fn field(&self, name: &str) -> &str {
        self.get(name).map(String::as_str).unwrap_or("")
    }
}

impl FieldLookup for std::collections::HashMap<String, String> {
    fn field(&self, name: &str) -> &str {
        self.get(name).map(String::as_str).unwrap_or("")
    }
}

/// A normalised data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Build a record from raw pairs, normalising keys and values.
    ///
    /// No identifier check is made; the renderer tolerates records without one.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.as_ref().trim().to_string()))
            .collect();
        Self { fields }
    }

    /// Build a record from an input row, requiring a non-empty identifier.
    ///
    /// The identifier is taken from `pallet_id`, or from `pallet` when the
    /// former is missing or empty, and is always stored under `pallet_id`.
    pub fn from_row<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut record = Self::new(pairs);
        let id = [IDENTIFIER_FIELD, IDENTIFIER_ALIAS]
            .iter()
            .map(|name| record.field(name))
            .find(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                LabelError::Record(format!("missing {} column", IDENTIFIER_FIELD))
            })?;
        record.fields.insert(IDENTIFIER_FIELD.to_string(), id);
        Ok(record)
    }

    /// The record's identifier, if it has a non-empty one.
    pub fn identifier(&self) -> Option<&str> {
        self.fields
            .get(IDENTIFIER_FIELD)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Base file name for this record's outputs.
    pub fn output_stem(&self) -> String {
        sanitize_filename(self.identifier().unwrap_or("label"))
    }
}

impl FieldLookup for Record {
    fn field(&self, name: &str) -> &str {
        self.fields.field(name)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Make an identifier safe to use as a file name.
///
/// Runs of characters outside `[A-Za-z0-9._-]` collapse to one `_`, and
/// leading/trailing underscores are stripped. An empty result becomes `label`.
pub fn sanitize_filename(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_run = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "label".to_string()
    } else {
        trimmed.to_string()
    }
}
