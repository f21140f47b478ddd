//! External record schema translation tables.
//!
//! # Responsibility
//! - Map every remote-backed entity between its external storage schema
//!   and the internal view-model shape, field by field.
//! - Keep write payloads restricted to updateable external fields.
//!
//! # Invariants
//! - Translation is symmetric: reading back a written record reproduces
//!   every field covered by the mapping table.
//! - Tags cross the boundary as one comma-delimited string and exist
//!   internally as an ordered sequence; the round-trip is lossless.
//! - Each entity has exactly one external schema. The duplicate
//!   `_c`-suffixed task schema that once existed upstream is not carried.

use crate::model::activity::Activity;
use crate::model::contact::Contact;
use crate::model::deal::{parse_stage, Deal};
use crate::model::lead::{parse_lead_status, Lead};
use crate::model::task::{parse_task_priority, parse_task_status, Task};
use crate::model::{join_tags, split_tags, Entity, EntityId};
use crate::remote::RecordMap;
use crate::repo::{Patch, RepoError, RepoResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Entity types served by the remote record API.
///
/// `TABLE` names the backing collection, `FIELDS` is the read projection
/// (external names), `PATCH_MAP` maps internal patch keys to the external
/// updateable fields they land in. A single internal key may fan out to
/// several external fields (the title/Name mirror).
pub trait RemoteEntity: Entity {
    const TABLE: &'static str;
    const FIELDS: &'static [&'static str];
    const PATCH_MAP: &'static [(&'static str, &'static str)];

    /// Full updateable-field payload for `create`.
    fn to_record(&self) -> RecordMap;

    /// Decodes one external record into the internal view-model shape.
    fn from_record(record: &RecordMap) -> RepoResult<Self>;
}

/// Translates an internal-keyed patch into an external-keyed write payload.
///
/// Only fields covered by the entity's `PATCH_MAP` survive; tag sequences
/// are joined back into their delimited storage form.
pub fn translate_patch<E: RemoteEntity>(patch: &Patch) -> RecordMap {
    let mut record = RecordMap::new();
    for (internal, external) in E::PATCH_MAP {
        if let Some(value) = patch.get(internal) {
            record.insert((*external).to_string(), externalize(external, value));
        }
    }
    record
}

fn externalize(external: &str, value: &Value) -> Value {
    if external == "Tags" {
        if let Value::Array(items) = value {
            let tags: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect();
            return Value::String(join_tags(&tags));
        }
    }
    value.clone()
}

fn record_id(record: &RecordMap, entity: &'static str) -> RepoResult<EntityId> {
    record
        .get("Id")
        .and_then(Value::as_i64)
        .ok_or_else(|| RepoError::Data(format!("missing or invalid Id in {entity} record")))
}

fn str_field(record: &RecordMap, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_str_field(record: &RecordMap, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn ref_field(record: &RecordMap, field: &str) -> Option<EntityId> {
    record.get(field).and_then(Value::as_i64)
}

fn f64_field(record: &RecordMap, field: &str) -> f64 {
    record.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

fn percent_field(record: &RecordMap, field: &str) -> u8 {
    record
        .get(field)
        .and_then(Value::as_u64)
        .unwrap_or(0)
        .min(100) as u8
}

fn tags_field(record: &RecordMap) -> Vec<String> {
    record
        .get("Tags")
        .and_then(Value::as_str)
        .map(split_tags)
        .unwrap_or_default()
}

fn datetime_field(
    record: &RecordMap,
    field: &str,
    entity: &'static str,
) -> RepoResult<DateTime<Utc>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(DateTime::UNIX_EPOCH),
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| {
                RepoError::Data(format!("invalid timestamp `{raw}` in {entity}.{field}"))
            }),
        Some(other) => Err(RepoError::Data(format!(
            "invalid timestamp `{other}` in {entity}.{field}"
        ))),
    }
}

fn date_field(record: &RecordMap, field: &str, entity: &'static str) -> RepoResult<NaiveDate> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(NaiveDate::default()),
        Some(Value::String(raw)) => {
            // Accept plain dates and full timestamps; the backend is loose here.
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .or_else(|_| {
                    DateTime::parse_from_rfc3339(raw).map(|parsed| parsed.date_naive())
                })
                .map_err(|_| RepoError::Data(format!("invalid date `{raw}` in {entity}.{field}")))
        }
        Some(other) => Err(RepoError::Data(format!(
            "invalid date `{other}` in {entity}.{field}"
        ))),
    }
}

fn opt_value(value: Option<EntityId>) -> Value {
    match value {
        Some(id) => Value::from(id),
        None => Value::Null,
    }
}

impl RemoteEntity for Contact {
    const TABLE: &'static str = "contact";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "Tags",
        "email",
        "phone",
        "company_id",
        "owner_id",
        "created_at",
        "last_activity",
    ];
    const PATCH_MAP: &'static [(&'static str, &'static str)] = &[
        ("name", "Name"),
        ("tags", "Tags"),
        ("email", "email"),
        ("phone", "phone"),
        ("company_id", "company_id"),
        ("owner_id", "owner_id"),
        ("last_activity", "last_activity"),
    ];

    fn to_record(&self) -> RecordMap {
        let mut record = RecordMap::new();
        record.insert("Name".to_string(), Value::String(self.name.clone()));
        record.insert("Tags".to_string(), Value::String(join_tags(&self.tags)));
        record.insert("email".to_string(), Value::String(self.email.clone()));
        record.insert("phone".to_string(), Value::String(self.phone.clone()));
        record.insert("company_id".to_string(), opt_value(self.company_id));
        record.insert("owner_id".to_string(), opt_value(self.owner_id));
        record.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        record.insert(
            "last_activity".to_string(),
            Value::String(self.last_activity.to_rfc3339()),
        );
        record
    }

    fn from_record(record: &RecordMap) -> RepoResult<Self> {
        Ok(Contact {
            id: record_id(record, Self::NAME)?,
            name: str_field(record, "Name"),
            email: str_field(record, "email"),
            phone: str_field(record, "phone"),
            company_id: ref_field(record, "company_id"),
            owner_id: ref_field(record, "owner_id"),
            tags: tags_field(record),
            created_at: datetime_field(record, "created_at", Self::NAME)?,
            last_activity: datetime_field(record, "last_activity", Self::NAME)?,
        })
    }
}

impl RemoteEntity for Deal {
    const TABLE: &'static str = "deal";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "Tags",
        "title",
        "value",
        "stage",
        "probability",
        "contact_id",
        "company_id",
        "owner_id",
        "close_date",
        "created_at",
    ];
    const PATCH_MAP: &'static [(&'static str, &'static str)] = &[
        // `Name` mirrors `title`; both carry the deal title on every write.
        ("title", "Name"),
        ("title", "title"),
        ("tags", "Tags"),
        ("value", "value"),
        ("stage", "stage"),
        ("probability", "probability"),
        ("contact_id", "contact_id"),
        ("company_id", "company_id"),
        ("owner_id", "owner_id"),
        ("close_date", "close_date"),
    ];

    fn to_record(&self) -> RecordMap {
        let mut record = RecordMap::new();
        record.insert("Name".to_string(), Value::String(self.title.clone()));
        record.insert("title".to_string(), Value::String(self.title.clone()));
        record.insert("Tags".to_string(), Value::String(join_tags(&self.tags)));
        record.insert("value".to_string(), Value::from(self.value));
        record.insert(
            "stage".to_string(),
            Value::String(self.stage.label().to_string()),
        );
        record.insert("probability".to_string(), Value::from(self.probability));
        record.insert("contact_id".to_string(), opt_value(self.contact_id));
        record.insert("company_id".to_string(), opt_value(self.company_id));
        record.insert("owner_id".to_string(), opt_value(self.owner_id));
        record.insert(
            "close_date".to_string(),
            Value::String(self.close_date.format("%Y-%m-%d").to_string()),
        );
        record.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        record
    }

    fn from_record(record: &RecordMap) -> RepoResult<Self> {
        let stage_raw = str_field(record, "stage");
        let stage = parse_stage(&stage_raw).ok_or_else(|| {
            RepoError::Data(format!("invalid stage value `{stage_raw}` in deal.stage"))
        })?;

        Ok(Deal {
            id: record_id(record, Self::NAME)?,
            title: str_field(record, "title"),
            value: f64_field(record, "value"),
            stage,
            contact_id: ref_field(record, "contact_id"),
            company_id: ref_field(record, "company_id"),
            owner_id: ref_field(record, "owner_id"),
            probability: percent_field(record, "probability"),
            close_date: date_field(record, "close_date", Self::NAME)?,
            tags: tags_field(record),
            created_at: datetime_field(record, "created_at", Self::NAME)?,
        })
    }
}

impl RemoteEntity for Task {
    const TABLE: &'static str = "task";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "Tags",
        "title",
        "description",
        "status",
        "priority",
        "due_date",
        "assigned_to",
        "related_entity_type",
        "related_entity_id",
        "estimated_hours",
        "actual_hours",
        "created_at",
        "updated_at",
    ];
    const PATCH_MAP: &'static [(&'static str, &'static str)] = &[
        ("title", "Name"),
        ("title", "title"),
        ("tags", "Tags"),
        ("description", "description"),
        ("status", "status"),
        ("priority", "priority"),
        ("due_date", "due_date"),
        ("assigned_to", "assigned_to"),
        ("related_entity_type", "related_entity_type"),
        ("related_entity_id", "related_entity_id"),
        ("estimated_hours", "estimated_hours"),
        ("actual_hours", "actual_hours"),
    ];

    fn to_record(&self) -> RecordMap {
        let mut record = RecordMap::new();
        record.insert("Name".to_string(), Value::String(self.title.clone()));
        record.insert("title".to_string(), Value::String(self.title.clone()));
        record.insert("Tags".to_string(), Value::String(join_tags(&self.tags)));
        record.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        record.insert(
            "status".to_string(),
            Value::String(self.status.label().to_string()),
        );
        record.insert(
            "priority".to_string(),
            Value::String(self.priority.label().to_string()),
        );
        record.insert(
            "due_date".to_string(),
            Value::String(self.due_date.format("%Y-%m-%d").to_string()),
        );
        record.insert("assigned_to".to_string(), opt_value(self.assigned_to));
        record.insert(
            "related_entity_type".to_string(),
            match &self.related_entity_type {
                Some(kind) => Value::String(kind.clone()),
                None => Value::Null,
            },
        );
        record.insert(
            "related_entity_id".to_string(),
            opt_value(self.related_entity_id),
        );
        record.insert(
            "estimated_hours".to_string(),
            Value::from(self.estimated_hours),
        );
        record.insert("actual_hours".to_string(), Value::from(self.actual_hours));
        record.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        record.insert(
            "updated_at".to_string(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        record
    }

    fn from_record(record: &RecordMap) -> RepoResult<Self> {
        let status_raw = str_field(record, "status");
        let status = parse_task_status(&status_raw).ok_or_else(|| {
            RepoError::Data(format!("invalid status value `{status_raw}` in task.status"))
        })?;
        let priority_raw = str_field(record, "priority");
        let priority = parse_task_priority(&priority_raw).ok_or_else(|| {
            RepoError::Data(format!(
                "invalid priority value `{priority_raw}` in task.priority"
            ))
        })?;

        Ok(Task {
            id: record_id(record, Self::NAME)?,
            title: str_field(record, "title"),
            description: str_field(record, "description"),
            status,
            priority,
            due_date: date_field(record, "due_date", Self::NAME)?,
            assigned_to: ref_field(record, "assigned_to"),
            related_entity_type: opt_str_field(record, "related_entity_type"),
            related_entity_id: ref_field(record, "related_entity_id"),
            estimated_hours: f64_field(record, "estimated_hours"),
            actual_hours: f64_field(record, "actual_hours"),
            tags: tags_field(record),
            created_at: datetime_field(record, "created_at", Self::NAME)?,
            updated_at: datetime_field(record, "updated_at", Self::NAME)?,
        })
    }
}

impl RemoteEntity for Lead {
    const TABLE: &'static str = "lead_c";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "Tags",
        "contact_information_c",
        "project_details_c",
        "status_c",
        "company_id_c",
        "app_contact_id_c",
        "CreatedOn",
    ];
    const PATCH_MAP: &'static [(&'static str, &'static str)] = &[
        ("name", "Name"),
        ("tags", "Tags"),
        ("contact_info", "contact_information_c"),
        ("project_details", "project_details_c"),
        ("status", "status_c"),
        ("company_id", "company_id_c"),
        ("contact_id", "app_contact_id_c"),
    ];

    fn to_record(&self) -> RecordMap {
        let mut record = RecordMap::new();
        record.insert("Name".to_string(), Value::String(self.name.clone()));
        record.insert("Tags".to_string(), Value::String(join_tags(&self.tags)));
        record.insert(
            "contact_information_c".to_string(),
            Value::String(self.contact_info.clone()),
        );
        record.insert(
            "project_details_c".to_string(),
            Value::String(self.project_details.clone()),
        );
        record.insert(
            "status_c".to_string(),
            Value::String(self.status.label().to_string()),
        );
        record.insert("company_id_c".to_string(), opt_value(self.company_id));
        record.insert("app_contact_id_c".to_string(), opt_value(self.contact_id));
        record
    }

    fn from_record(record: &RecordMap) -> RepoResult<Self> {
        let status_raw = str_field(record, "status_c");
        let status = parse_lead_status(&status_raw).ok_or_else(|| {
            RepoError::Data(format!(
                "invalid status value `{status_raw}` in lead_c.status_c"
            ))
        })?;

        Ok(Lead {
            id: record_id(record, Self::NAME)?,
            name: str_field(record, "Name"),
            status,
            contact_info: str_field(record, "contact_information_c"),
            project_details: str_field(record, "project_details_c"),
            company_id: ref_field(record, "company_id_c"),
            contact_id: ref_field(record, "app_contact_id_c"),
            tags: tags_field(record),
            created_at: datetime_field(record, "CreatedOn", Self::NAME)?,
        })
    }
}

impl RemoteEntity for Activity {
    const TABLE: &'static str = "app_Activity";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "type",
        "description",
        "entity_type",
        "entity_id",
        "user_id",
        "timestamp",
    ];
    const PATCH_MAP: &'static [(&'static str, &'static str)] = &[
        ("kind", "Name"),
        ("kind", "type"),
        ("description", "description"),
        ("entity_type", "entity_type"),
        ("entity_id", "entity_id"),
        ("user_id", "user_id"),
        ("timestamp", "timestamp"),
    ];

    fn to_record(&self) -> RecordMap {
        let mut record = RecordMap::new();
        record.insert("Name".to_string(), Value::String(self.kind.clone()));
        record.insert("type".to_string(), Value::String(self.kind.clone()));
        record.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        record.insert(
            "entity_type".to_string(),
            Value::String(self.entity_type.clone()),
        );
        record.insert("entity_id".to_string(), Value::from(self.entity_id));
        record.insert("user_id".to_string(), opt_value(self.user_id));
        record.insert(
            "timestamp".to_string(),
            Value::String(self.timestamp.to_rfc3339()),
        );
        record
    }

    fn from_record(record: &RecordMap) -> RepoResult<Self> {
        Ok(Activity {
            id: record_id(record, Self::NAME)?,
            kind: str_field(record, "type"),
            description: str_field(record, "description"),
            entity_type: str_field(record, "entity_type"),
            entity_id: record
                .get("entity_id")
                .and_then(Value::as_i64)
                .unwrap_or_default(),
            user_id: ref_field(record, "user_id"),
            timestamp: datetime_field(record, "timestamp", Self::NAME)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::deal::Stage;
    use serde_json::json;

    #[test]
    fn translate_patch_keeps_only_mapped_fields_and_joins_tags() {
        let patch = Patch::new()
            .set("name", json!("Ada Lovelace"))
            .set("tags", json!(["vip", "enterprise"]))
            .set("created_at", json!("2026-01-01T00:00:00Z"));
        let record = translate_patch::<Contact>(&patch);

        assert_eq!(record.get("Name"), Some(&json!("Ada Lovelace")));
        assert_eq!(record.get("Tags"), Some(&json!("vip,enterprise")));
        // created_at is server-managed and has no updateable mapping
        assert!(!record.contains_key("created_at"));
    }

    #[test]
    fn deal_patch_mirrors_title_into_name() {
        let patch = Patch::single("title", json!("Acme renewal"));
        let record = translate_patch::<Deal>(&patch);
        assert_eq!(record.get("Name"), Some(&json!("Acme renewal")));
        assert_eq!(record.get("title"), Some(&json!("Acme renewal")));
    }

    #[test]
    fn stage_patch_translates_to_external_stage_field() {
        let patch = Patch::single("stage", json!(Stage::Proposal.label()));
        let record = translate_patch::<Deal>(&patch);
        assert_eq!(record.get("stage"), Some(&json!("Proposal")));
    }

    #[test]
    fn from_record_rejects_unknown_stage() {
        let mut record = RecordMap::new();
        record.insert("Id".to_string(), json!(7));
        record.insert("stage".to_string(), json!("Negotiation"));
        let err = Deal::from_record(&record).unwrap_err();
        assert!(matches!(err, RepoError::Data(_)));
    }

    #[test]
    fn missing_id_is_a_data_error() {
        let record = RecordMap::new();
        assert!(matches!(
            Contact::from_record(&record),
            Err(RepoError::Data(_))
        ));
    }
}
