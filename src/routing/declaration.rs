//! Declaration file parsing.
//!
//! # Responsibilities
//! - Read the fixed, shallow per-project schema: flat `key: value` pairs,
//!   one level of nested maps (`dev:`) and the `apps:` list of flat maps
//! - Never fail: lines that do not fit the schema are skipped
//!
//! # Design Decisions
//! - Parsing is a fold over lines with an explicit [`Context`] value, so a
//!   newly opened map, list or list item closes the previous one
//! - Only two indentation classes exist: top level (indent 0) and nested
//!   (indent >= 2)
//! - Values are strings; one leading and one trailing `"` are stripped, with
//!   no escape processing

use std::collections::BTreeMap;

/// Key that opens a list context instead of a map context.
pub const LIST_KEY: &str = "apps";

/// A value inside a [`RawRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Str(String),
    Map(RawRecord),
    List(Vec<RawRecord>),
}

/// Generic record produced from one declaration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// String value for `key`; maps and lists read as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(RawValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Non-empty string value for `key`.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get_str(key).filter(|s| !s.is_empty())
    }

    pub fn get_map(&self, key: &str) -> Option<&RawRecord> {
        match self.fields.get(key) {
            Some(RawValue::Map(m)) => Some(m),
            _ => None,
        }
    }

    pub fn get_list(&self, key: &str) -> Option<&[RawRecord]> {
        match self.fields.get(key) {
            Some(RawValue::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn insert_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), RawValue::Str(value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Existing map under `key`, or a fresh one replacing any scalar.
    fn map_mut(&mut self, key: &str) -> &mut RawRecord {
        let slot = self
            .fields
            .entry(key.to_string())
            .or_insert_with(|| RawValue::Map(RawRecord::new()));
        if !matches!(slot, RawValue::Map(_)) {
            *slot = RawValue::Map(RawRecord::new());
        }
        match slot {
            RawValue::Map(m) => m,
            _ => unreachable!("slot was just set to a map"),
        }
    }

    /// Existing list under `key`, or a fresh one replacing any scalar.
    fn list_mut(&mut self, key: &str) -> &mut Vec<RawRecord> {
        let slot = self
            .fields
            .entry(key.to_string())
            .or_insert_with(|| RawValue::List(Vec::new()));
        if !matches!(slot, RawValue::List(_)) {
            *slot = RawValue::List(Vec::new());
        }
        match slot {
            RawValue::List(items) => items,
            _ => unreachable!("slot was just set to a list"),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert_str(k, v);
        }
        record
    }
}

/// Parser cursor between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    Uncontexted,
    InMap(String),
    /// Inside `apps:`; `item` is the index of the open list item, if any.
    InList { item: Option<usize> },
}

/// Parse one declaration file.
pub fn parse(raw: &str) -> RawRecord {
    let (record, _) = raw
        .lines()
        .fold((RawRecord::new(), Context::Uncontexted), |(mut record, ctx), line| {
            let ctx = apply_line(&mut record, ctx, line);
            (record, ctx)
        });
    record
}

fn apply_line(record: &mut RawRecord, ctx: Context, line: &str) -> Context {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return ctx;
    }
    let indent = line.len() - line.trim_start().len();
    let nested = indent >= 2;

    // `key:` with no inline value opens a new context.
    if indent == 0 && !trimmed.starts_with("- ") {
        if let Some(key) = trimmed.strip_suffix(':').map(str::trim) {
            if !key.is_empty() && !key.contains(':') {
                return if key == LIST_KEY {
                    record.list_mut(LIST_KEY);
                    Context::InList { item: None }
                } else {
                    record.map_mut(key);
                    Context::InMap(key.to_string())
                };
            }
        }
    }

    match ctx {
        Context::InList { item } => {
            if let Some(rest) = trimmed.strip_prefix("- ") {
                let mut new_item = RawRecord::new();
                if let Some((k, v)) = split_pair(rest) {
                    new_item.insert_str(k, v);
                }
                let items = record.list_mut(LIST_KEY);
                items.push(new_item);
                return Context::InList {
                    item: Some(items.len() - 1),
                };
            }

            if let (Some(index), true) = (item, nested) {
                if let Some((k, v)) = split_pair(trimmed) {
                    if let Some(current) = record.list_mut(LIST_KEY).get_mut(index) {
                        current.insert_str(k, v);
                    }
                }
                return ctx;
            }
        }
        Context::InMap(ref key) if nested => {
            if let Some((k, v)) = split_pair(trimmed) {
                record.map_mut(key).insert_str(k, v);
            }
            return ctx;
        }
        _ => {}
    }

    if let Some((k, v)) = split_pair(trimmed) {
        record.insert_str(k, v);
    }
    ctx
}

/// Split `key: value` at the first colon.
fn split_pair(text: &str) -> Option<(&str, &str)> {
    let (key, value) = text.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, strip_quotes(value.trim())))
}

fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}
