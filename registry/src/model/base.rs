use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and audit fields carried by every persisted record.
///
/// Embedded by value in the records that need it and flattened on the wire, so a
/// serialized `Source` shows `id`, `createBy`, ... next to its own fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEntity {
    pub id: Option<String>,
    pub create_by: Option<String>,
    pub create_time: Option<NaiveDateTime>,
    pub update_by: Option<String>,
    pub update_time: Option<NaiveDateTime>,
}

impl BaseEntity {
    /// A fresh identity created by `actor` now. Update fields start out unset.
    pub fn new_for(actor: &str) -> Self {
        Self {
            id: Some(new_id()),
            create_by: Some(actor.to_owned()),
            create_time: Some(Utc::now().naive_utc()),
            update_by: None,
            update_time: None,
        }
    }

    /// Record a modification by `actor`.
    pub fn touch(&mut self, actor: &str) {
        self.update_by = Some(actor.to_owned());
        self.update_time = Some(Utc::now().naive_utc());
    }
}

/// 32 lowercase hex chars (UUIDv7 without hyphens), time-ordered.
pub fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}
