//! In-memory asset record store with ad-hoc querying.

use rustc_hash::FxHashMap;
use scenekit_core::FullId;
use std::fmt;

use crate::error::Result;
use crate::formats::{parse_records, DataFormat, ParseOptions};
use crate::query::Filter;
use crate::record::{
    extract_fields, Record, CUSTOM_ASSET_FIELD, FULL_ID_FIELD, ID_FIELD, SOURCE_FIELD,
};

/// A named collection of related assets sharing an identifier namespace and
/// load configuration.
#[derive(Debug, Clone, Default)]
pub struct AssetGroup {
    /// Group name; becomes the `source` field and the fullId prefix.
    pub name: String,
    /// Fields comma-split into arrays during delimited parsing.
    pub array_fields: Vec<String>,
    /// Default fields applied to every record loaded under this group.
    pub defaults: Option<Record>,
}

impl AssetGroup {
    /// Create a group with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Configure array-split fields.
    pub fn with_array_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.array_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Configure group-level default fields.
    pub fn with_defaults(mut self, defaults: Record) -> Self {
        self.defaults = Some(defaults);
        self
    }
}

/// How a data load interacts with records already in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Replace the entire record set (the default).
    #[default]
    Replace,
    /// Overwrite one named sub-field of existing records, keyed by fullId.
    Merge,
}

/// Options for a single data load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit format; wins over filename detection.
    pub format: Option<DataFormat>,
    /// Override for the local identifier field.
    pub asset_id_field: Option<String>,
    /// Load mode.
    pub mode: LoadMode,
    /// Target sub-field for merge loads. Merge without this degrades to a
    /// replace load.
    pub asset_field: Option<String>,
    /// Flatten JSONL array lines.
    pub flatten: bool,
}

/// Query parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    /// Query string; empty or `*:*` matches everything.
    pub query: String,
    /// Offset into the filtered match sequence.
    pub start: usize,
    /// Page size; 0 means unbounded.
    pub limit: usize,
    /// Project returned docs down to these fields.
    pub fields: Option<Vec<String>>,
    /// Extra predicate AND-ed onto the query string.
    pub filter: Option<Filter>,
}

impl QueryParams {
    /// Query with default pagination (everything).
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set pagination.
    pub fn with_page(mut self, start: usize, limit: usize) -> Self {
        self.start = start;
        self.limit = limit;
        self
    }

    /// Project results to the named fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Add an extra predicate on top of the query string.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// A page of query results.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    /// Matched records (after pagination and lazy conversion).
    pub docs: Vec<Record>,
    /// Echo of the requested start offset.
    pub start: usize,
    /// Total matches before pagination.
    pub num_found: usize,
}

/// Conversion hook applied to each record at load time.
pub type ConvertFn = Box<dyn Fn(Record) -> Record + Send + Sync>;
/// Conversion hook applied to records as they are read back (never cached).
pub type LazyConvertFn = Box<dyn Fn(&Record) -> Record + Send + Sync>;

/// Simple in-memory database of asset records.
///
/// Holds an insertion-ordered record sequence plus a fullId index for O(1)
/// lookup. Loading a duplicate fullId leaves both records in the sequence
/// while the index keeps only the last one.
#[derive(Default)]
pub struct AssetDb {
    id_field: String,
    records: Vec<Record>,
    index: FxHashMap<String, usize>,
    fields: Vec<String>,
    defaults: Option<Record>,
    convert: Option<ConvertFn>,
    lazy_convert: Option<LazyConvertFn>,
}

impl fmt::Debug for AssetDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetDb")
            .field("id_field", &self.id_field)
            .field("records", &self.records.len())
            .field("fields", &self.fields)
            .finish()
    }
}

impl AssetDb {
    /// Create an empty store with the default id field (`id`).
    pub fn new() -> Self {
        Self {
            id_field: ID_FIELD.to_string(),
            ..Default::default()
        }
    }

    /// Use a different local identifier field.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Global default fields applied to every loaded record.
    pub fn with_defaults(mut self, defaults: Record) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Conversion applied to each record when loaded.
    pub fn with_convert(mut self, convert: ConvertFn) -> Self {
        self.convert = Some(convert);
        self
    }

    /// Conversion applied to records on every read (computed, not cached).
    pub fn with_lazy_convert(mut self, lazy: LazyConvertFn) -> Self {
        self.lazy_convert = Some(lazy);
        self
    }

    /// Number of records in the sequence.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The field schema derived from the last bulk load.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The record sequence in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// All indexed fullIds (order unspecified).
    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Drop all records and the identifier index.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Load asset records from raw text.
    ///
    /// The format comes from `options.format` or the filename extension. In
    /// the default mode the whole record set is replaced and the field
    /// schema recomputed; in merge mode each incoming record overwrites the
    /// `options.asset_field` sub-field of the existing record with the same
    /// fullId.
    pub fn load_from_data(
        &mut self,
        group: &AssetGroup,
        data: &str,
        filename: &str,
        options: &LoadOptions,
    ) -> Result<()> {
        if let Some(field) = &options.asset_id_field {
            self.id_field = field.clone();
        }
        let format = options
            .format
            .unwrap_or_else(|| DataFormat::from_filename(filename));
        let parse_opts = ParseOptions {
            string_fields: vec![self.id_field.clone(), ID_FIELD.to_string()],
            array_fields: group.array_fields.clone(),
            flatten: options.flatten,
        };
        let incoming = parse_records(data, format, &parse_opts)?;
        log::info!("got {} asset records for {}", incoming.len(), group.name);

        if options.mode == LoadMode::Merge && options.asset_field.is_some() {
            let asset_field = options.asset_field.as_deref().unwrap_or_default();
            self.merge_records(group, incoming, asset_field);
        } else {
            self.replace_records(group, incoming);
        }
        Ok(())
    }

    fn merge_records(&mut self, group: &AssetGroup, incoming: Vec<Record>, asset_field: &str) {
        for mut m in incoming {
            let Some(local) = m.get_str(&self.id_field).map(str::to_string) else {
                log::warn!(
                    "skipping merge record without id field '{}'",
                    self.id_field
                );
                continue;
            };
            let full_id = FullId::new(&group.name, &local).to_string();
            let Some(&pos) = self.index.get(&full_id) else {
                // Documented fallback: merging against an absent record is a
                // silent no-op rather than an error.
                log::debug!("merge target {full_id} not found; skipping");
                continue;
            };
            m.remove(&self.id_field);
            m.remove(FULL_ID_FIELD);
            m.remove(SOURCE_FIELD);
            self.records[pos].set(asset_field, m.into_value());
        }
    }

    fn replace_records(&mut self, group: &AssetGroup, incoming: Vec<Record>) {
        let mut records = Vec::with_capacity(incoming.len());
        let mut index = FxHashMap::default();
        for mut m in incoming {
            if let Some(convert) = &self.convert {
                m = convert(m);
            }
            let Some(local) = m.get_str(&self.id_field).map(str::to_string) else {
                log::warn!("skipping record without id field '{}'", self.id_field);
                continue;
            };
            let full_id = FullId::new(&group.name, &local).to_string();
            m.set(FULL_ID_FIELD, full_id.clone());
            m.set(SOURCE_FIELD, group.name.clone());
            if self.id_field != ID_FIELD && !m.is_present(ID_FIELD) {
                m.set(ID_FIELD, local);
            }
            if let Some(defaults) = &group.defaults {
                for (k, v) in defaults.iter() {
                    m.set_default(k, v.clone());
                }
            }
            if let Some(defaults) = &self.defaults {
                for (k, v) in defaults.iter() {
                    m.set_default(k, v.clone());
                }
            }
            m.set(CUSTOM_ASSET_FIELD, true);
            // Last write wins in the index; the sequence keeps every record.
            index.insert(full_id, records.len());
            records.push(m);
        }
        self.records = records;
        self.index = index;
        self.fields = extract_fields(&self.records);
    }

    /// Execute a query, returning a page of matches.
    pub fn query(&self, params: &QueryParams) -> QueryResponse {
        let query = params.query.trim();
        let mut response = 'resp: {
            let terms: Vec<&str> = query.split_whitespace().collect();
            if params.filter.is_none() && terms.len() == 1 && !terms[0].contains('*') {
                // Search by fullId goes straight to the index.
                if let Some(id) = terms[0].strip_prefix("fullId:") {
                    let docs: Vec<Record> = self.get_asset_info(id).into_iter().collect();
                    break 'resp QueryResponse {
                        num_found: docs.len(),
                        docs,
                        start: 0,
                    };
                }
            }
            let filter = match (Filter::compile(query), params.filter.clone()) {
                (Some(a), Some(b)) => Some(a.and(b)),
                (Some(a), None) => Some(a),
                (None, extra) => extra,
            };
            self.matching(filter.as_ref(), params.start, params.limit)
        };
        if let Some(fields) = &params.fields {
            for doc in &mut response.docs {
                *doc = doc.project(fields);
            }
        }
        response
    }

    /// Collect records matching an optional filter, with pagination over
    /// the filtered sequence. `limit` 0 means unbounded; `num_found` counts
    /// all matches regardless of the page.
    pub fn matching(&self, filter: Option<&Filter>, start: usize, limit: usize) -> QueryResponse {
        let mut docs = Vec::new();
        let num_found = match filter {
            Some(f) => {
                let mut n = 0usize;
                for m in &self.records {
                    if f.matches(m) {
                        if n >= start && (limit == 0 || docs.len() < limit) {
                            docs.push(m.clone());
                        }
                        n += 1;
                    }
                }
                n
            }
            None => {
                let end = if limit == 0 {
                    self.records.len()
                } else {
                    start.saturating_add(limit).min(self.records.len())
                };
                if start < self.records.len() {
                    docs.extend(self.records[start..end].iter().cloned());
                }
                self.records.len()
            }
        };
        if let Some(lazy) = &self.lazy_convert {
            docs = docs.iter().map(|d| lazy(d)).collect();
        }
        QueryResponse {
            docs,
            start,
            num_found,
        }
    }

    /// The filter a query string would run with, `None` for the match-all
    /// queries.
    pub fn filter_for(&self, query: &str) -> Option<Filter> {
        Filter::compile(query)
    }

    /// O(1) lookup by fullId, with lazy conversion applied on read.
    pub fn get_asset_info(&self, full_id: &str) -> Option<Record> {
        let &pos = self.index.get(full_id)?;
        let record = &self.records[pos];
        Some(match &self.lazy_convert {
            Some(lazy) => lazy(record),
            None => record.clone(),
        })
    }
}
