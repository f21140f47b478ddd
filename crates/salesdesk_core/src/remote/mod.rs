//! Record-management API client boundary.
//!
//! # Responsibility
//! - Define the contract of the externally provided record service.
//! - Keep the wire shapes (success flag, message, per-record results) in
//!   one place so repository code never touches raw responses ad hoc.
//!
//! # Invariants
//! - The service is a black box: collections are addressed by table name,
//!   reads carry an explicit field projection, writes carry record lists.
//! - This module performs no translation; record maps use external field
//!   names only.

use crate::model::EntityId;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One raw record as the backend sees it: external field names to values.
pub type RecordMap = Map<String, Value>;

pub type ClientResult<T> = Result<T, ClientError>;

/// Transport-level failure reaching the client boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError(pub String);

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "record client error: {}", self.0)
    }
}

impl Error for ClientError {}

/// Sort direction for fetch ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Read request options: projection whitelist plus optional ordering.
#[derive(Debug, Clone, Default)]
pub struct FetchQuery {
    /// External field names the response records are restricted to.
    pub fields: Vec<&'static str>,
    pub order_by: Option<(&'static str, SortOrder)>,
}

impl FetchQuery {
    pub fn with_fields(fields: &'static [&'static str]) -> Self {
        Self {
            fields: fields.to_vec(),
            order_by: None,
        }
    }
}

/// Response to a collection fetch.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub success: bool,
    pub message: Option<String>,
    pub data: Vec<RecordMap>,
}

/// Response to a single-record fetch.
#[derive(Debug, Clone, Default)]
pub struct RecordResponse {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<RecordMap>,
}

/// Per-record outcome inside a batched write response.
#[derive(Debug, Clone, Default)]
pub struct RecordResult {
    pub success: bool,
    pub message: Option<String>,
    /// Field-level validation failures reported by the backend.
    pub errors: Vec<FieldFailure>,
    pub data: Option<RecordMap>,
}

/// One field-level validation failure from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field_label: String,
    pub message: String,
}

/// Response to a batched create/update/delete.
#[derive(Debug, Clone, Default)]
pub struct WriteResponse {
    pub success: bool,
    pub message: Option<String>,
    pub results: Vec<RecordResult>,
}

/// The externally provided record-management client.
///
/// Implementations live outside this crate (the hosting shell provides
/// one); tests drive a scripted fake.
#[async_trait]
pub trait RecordClient: Send + Sync {
    async fn fetch_records(&self, table: &str, query: &FetchQuery) -> ClientResult<QueryResponse>;

    async fn fetch_record_by_id(
        &self,
        table: &str,
        id: EntityId,
        query: &FetchQuery,
    ) -> ClientResult<RecordResponse>;

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RecordMap>,
    ) -> ClientResult<WriteResponse>;

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RecordMap>,
    ) -> ClientResult<WriteResponse>;

    async fn delete_records(&self, table: &str, ids: Vec<EntityId>)
        -> ClientResult<WriteResponse>;
}
