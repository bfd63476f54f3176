//! Asset metadata loading, storage, and querying.
//!
//! Parses delimited and structured asset data (CSV, TSV, JSON, JSONL, id
//! lists) into flat [`Record`]s, holds them in an in-memory [`AssetDb`]
//! indexed by fullId, and answers ad-hoc [`Filter`] queries with pagination.

pub mod db;
pub mod error;
pub mod formats;
pub mod query;
pub mod record;

pub use db::{AssetDb, AssetGroup, LoadMode, LoadOptions, QueryParams, QueryResponse};
pub use error::{AssetError, QueryParseError, Result};
pub use formats::{parse_records, DataFormat, ParseOptions};
pub use query::Filter;
pub use record::{
    extract_fields, Record, CUSTOM_ASSET_FIELD, FULL_ID_FIELD, ID_FIELD, SOURCE_FIELD,
};
