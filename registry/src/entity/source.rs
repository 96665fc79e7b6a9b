use sea_orm::{Set, entity::prelude::*};

use crate::model::{self, BaseEntity};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "source")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: Option<String>,
    /// Serialized config payload, secret fields sealed.
    #[sea_orm(column_type = "Text", nullable)]
    pub config: Option<String>,
    #[sea_orm(column_name = "type")]
    pub source_type: Option<String>,
    pub org_id: Option<String>,
    pub status: Option<i8>,
    pub create_by: Option<String>,
    pub create_time: Option<DateTime>,
    pub update_by: Option<String>,
    pub update_time: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for model::Source {
    fn from(m: Model) -> Self {
        Self {
            base: BaseEntity {
                id: Some(m.id),
                create_by: m.create_by,
                create_time: m.create_time,
                update_by: m.update_by,
                update_time: m.update_time,
            },
            name: m.name,
            config: m.config,
            source_type: m.source_type,
            org_id: m.org_id,
            status: m.status,
        }
    }
}

/// Every column is `Set`, so the result works for both insert and full-row update.
/// Fails when the record has no id yet.
impl TryFrom<model::Source> for ActiveModel {
    type Error = DbErr;

    fn try_from(s: model::Source) -> Result<Self, Self::Error> {
        let id = s
            .base
            .id
            .ok_or_else(|| DbErr::Custom("source has no id".to_string()))?;
        Ok(Self {
            id: Set(id),
            name: Set(s.name),
            config: Set(s.config),
            source_type: Set(s.source_type),
            org_id: Set(s.org_id),
            status: Set(s.status),
            create_by: Set(s.base.create_by),
            create_time: Set(s.base.create_time),
            update_by: Set(s.base.update_by),
            update_time: Set(s.base.update_time),
        })
    }
}
