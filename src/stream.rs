use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Event name marking a row insertion in the change stream
pub const INSERT_EVENT: &str = "INSERT";

/// A record violating the stream contract
///
/// Missing attributes mean the upstream table schema and this service
/// disagree; per-record recovery is meaningless, so this aborts the batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed stream record: missing string attribute {field:?}")]
pub struct MalformedEvent {
    pub field: &'static str,
}

/// One batch of change-data-capture records as delivered by the runtime
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

/// A single change record
#[derive(Debug, Clone, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventName")]
    pub event_name: String,
    #[serde(rename = "dynamodb", default)]
    pub change: RecordChange,
}

/// The row-level portion of a change record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordChange {
    #[serde(rename = "Keys", default)]
    pub keys: HashMap<String, Attribute>,
    #[serde(rename = "NewImage", default)]
    pub new_image: HashMap<String, Attribute>,
}

/// A typed attribute value; only string attributes are consumed here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    #[serde(rename = "S")]
    pub s: Option<String>,
    #[serde(rename = "N")]
    pub n: Option<String>,
}

/// Identifiers extracted from one insert record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoInsert {
    pub user_id: String,
    pub photo_uuid: String,
    pub sort_key: String,
    /// Key of the original image in the photo bucket
    pub source_key: String,
}

impl PhotoInsert {
    fn from_record(record: &StreamRecord) -> Result<Self, MalformedEvent> {
        let user_id = string_attribute(&record.change.keys, "user_id")?;
        let photo_uuid = string_attribute(&record.change.new_image, "photo_uuid")?;
        let sort_key = string_attribute(&record.change.new_image, "sort_key")?;
        let source_key = format!("{}/original/{}", user_id, photo_uuid);

        Ok(Self {
            user_id,
            photo_uuid,
            sort_key,
            source_key,
        })
    }
}

/// Project a batch down to its insert records, lazily
///
/// Yields one [`PhotoInsert`] per `INSERT` record in arrival order;
/// non-insert records are skipped without error. The iterator borrows the
/// batch and can be restarted by calling again.
pub fn extract_inserts(
    batch: &StreamBatch,
) -> impl Iterator<Item = Result<PhotoInsert, MalformedEvent>> + '_ {
    batch
        .records
        .iter()
        .filter(|record| record.event_name == INSERT_EVENT)
        .map(PhotoInsert::from_record)
}

fn string_attribute(
    attributes: &HashMap<String, Attribute>,
    field: &'static str,
) -> Result<String, MalformedEvent> {
    attributes
        .get(field)
        .and_then(|attribute| attribute.s.clone())
        .ok_or(MalformedEvent { field })
}
