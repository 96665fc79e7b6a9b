use serde::{Deserialize, Serialize};

use super::{BaseEntity, SourceStatus};

/// One configured external data source, owned by an organization.
///
/// The record is a plain holder: `config` is an opaque serialized payload and
/// `source_type` names the connector family, neither is interpreted here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(flatten)]
    pub base: BaseEntity,
    pub name: Option<String>,
    pub config: Option<String>,
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub org_id: Option<String>,
    pub status: Option<i8>,
}

impl Source {
    pub fn id(&self) -> Option<&str> {
        self.base.id.as_deref()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn with_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    pub fn with_status(mut self, status: i8) -> Self {
        self.status = Some(status);
        self
    }

    /// True only for an explicit archived code; an unset status is not archived.
    pub fn is_archived(&self) -> bool {
        self.status == Some(SourceStatus::Archived.code())
    }
}
