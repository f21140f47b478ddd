//! Remote-backed repository over the record-management client.
//!
//! # Responsibility
//! - Serve the remote storage variant of the CRUD contract.
//! - Translate every read/write through the entity's schema table.
//! - Convert backend failures into fail-soft results plus exactly one
//!   user-facing notification; nothing from here reaches the rendering
//!   layer as an unhandled fault.
//!
//! # Invariants
//! - Reads request the fixed field projection, never `*`.
//! - Writes submit updateable fields only; identity goes out as an
//!   integer.
//! - Batch write responses fan out: one notification per distinct record
//!   failure reason plus one per field-level validation message.

use crate::model::{Entity, EntityId};
use crate::notify::Notifier;
use crate::remote::{FetchQuery, RecordClient, RecordMap, RecordResult, WriteResponse};
use crate::repo::schema::{translate_patch, RemoteEntity};
use crate::repo::{EntityRepository, Patch, RepoError, RepoResult};
use async_trait::async_trait;
use log::{debug, error};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

/// Repository over one remote record collection.
pub struct RemoteRepository<E: RemoteEntity, C: RecordClient> {
    client: C,
    notifier: Arc<dyn Notifier>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: RemoteEntity, C: RecordClient> RemoteRepository<E, C> {
    pub fn new(client: C, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            _entity: PhantomData,
        }
    }

    fn query(&self) -> FetchQuery {
        FetchQuery::with_fields(E::FIELDS)
    }

    /// Reports one failure to the log stream and the user channel.
    fn report_failure(&self, operation: &str, message: &str) {
        error!(
            "event=remote_{operation} module=repo entity={} status=error error={message}",
            E::NAME
        );
        self.notifier.error(message);
    }

    /// Fans a batched write response out into notifications and extracts
    /// the first successful record, if any.
    fn unpack_write(&self, operation: &str, response: WriteResponse) -> Option<RecordResult> {
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| format!("Failed to {operation} {}", E::NAME));
            self.report_failure(operation, &message);
            return None;
        }

        let (succeeded, failed): (Vec<_>, Vec<_>) = response
            .results
            .into_iter()
            .partition(|result| result.success);

        if succeeded.is_empty() && failed.is_empty() {
            self.report_failure(
                operation,
                &format!("Failed to {operation} {}", E::NAME),
            );
            return None;
        }

        if !failed.is_empty() {
            error!(
                "event=remote_{operation} module=repo entity={} status=partial failed={}",
                E::NAME,
                failed.len()
            );
            // One notification per distinct failure reason; field-level
            // messages go out individually.
            let mut reported: Vec<&str> = Vec::new();
            for result in &failed {
                for failure in &result.errors {
                    self.notifier
                        .error(&format!("{}: {}", failure.field_label, failure.message));
                }
                if let Some(message) = &result.message {
                    if !reported.contains(&message.as_str()) {
                        reported.push(message.as_str());
                        self.notifier.error(message);
                    }
                }
            }
        }

        succeeded.into_iter().next()
    }
}

#[async_trait]
impl<E: RemoteEntity, C: RecordClient> EntityRepository<E> for RemoteRepository<E, C> {
    /// Fail-soft by contract: backend trouble yields an empty collection
    /// and a notification instead of a hard page crash.
    async fn get_all(&self) -> RepoResult<Vec<E>> {
        let started_at = Instant::now();
        let response = match self.client.fetch_records(E::TABLE, &self.query()).await {
            Ok(response) => response,
            Err(err) => {
                self.report_failure("fetch", &format!("Failed to fetch {} records", E::NAME));
                debug!(
                    "event=remote_fetch module=repo entity={} status=error transport_error={err}",
                    E::NAME
                );
                return Ok(Vec::new());
            }
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| format!("Failed to fetch {} records", E::NAME));
            self.report_failure("fetch", &message);
            return Ok(Vec::new());
        }

        let rows = response
            .data
            .iter()
            .map(E::from_record)
            .collect::<RepoResult<Vec<E>>>()?;
        debug!(
            "event=remote_fetch module=repo entity={} status=ok rows={} duration_ms={}",
            E::NAME,
            rows.len(),
            started_at.elapsed().as_millis()
        );
        Ok(rows)
    }

    async fn get_by_id(&self, id: EntityId) -> RepoResult<E> {
        let response = match self
            .client
            .fetch_record_by_id(E::TABLE, id, &self.query())
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.report_failure("fetch", &format!("Failed to fetch {} {id}", E::NAME));
                return Err(RepoError::Remote(err.to_string()));
            }
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| format!("Failed to fetch {} {id}", E::NAME));
            self.report_failure("fetch", &message);
            return Err(RepoError::Remote(message));
        }

        match response.data {
            Some(record) => E::from_record(&record),
            None => {
                self.report_failure("fetch", &format!("{} {id} was not found", E::DISPLAY));
                Err(RepoError::not_found::<E>(id))
            }
        }
    }

    async fn create(&self, entity: E) -> RepoResult<E> {
        let response = match self
            .client
            .create_records(E::TABLE, vec![entity.to_record()])
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.report_failure("create", &format!("Failed to create {}", E::NAME));
                return Err(RepoError::Remote(err.to_string()));
            }
        };

        match self.unpack_write("create", response) {
            Some(result) => match result.data {
                Some(record) => E::from_record(&record),
                None => Err(RepoError::Data(format!(
                    "create response for {} carried no record",
                    E::NAME
                ))),
            },
            None => Err(RepoError::Remote(format!("{} create failed", E::NAME))),
        }
    }

    async fn update(&self, id: EntityId, patch: Patch) -> RepoResult<E> {
        let record = update_payload::<E>(id, &patch);

        let response = match self.client.update_records(E::TABLE, vec![record]).await {
            Ok(response) => response,
            Err(err) => {
                self.report_failure("update", &format!("Failed to update {}", E::NAME));
                return Err(RepoError::Remote(err.to_string()));
            }
        };

        match self.unpack_write("update", response) {
            Some(result) => match result.data {
                Some(record) => E::from_record(&record),
                None => Err(RepoError::Data(format!(
                    "update response for {} carried no record",
                    E::NAME
                ))),
            },
            None => Err(RepoError::Remote(format!("{} update failed", E::NAME))),
        }
    }

    async fn delete(&self, id: EntityId) -> RepoResult<()> {
        let response = match self.client.delete_records(E::TABLE, vec![id]).await {
            Ok(response) => response,
            Err(err) => {
                self.report_failure("delete", &format!("Failed to delete {}", E::NAME));
                return Err(RepoError::Remote(err.to_string()));
            }
        };

        match self.unpack_write("delete", response) {
            Some(_) => Ok(()),
            None => Err(RepoError::Remote(format!("{} delete failed", E::NAME))),
        }
    }
}

/// Builds the outbound record for [`RemoteRepository::update`] without
/// sending it; exposed for schema-focused tests.
pub fn update_payload<E: RemoteEntity>(id: EntityId, patch: &Patch) -> RecordMap {
    let mut record = translate_patch::<E>(patch);
    record.insert("Id".to_string(), Value::from(id));
    record
}
