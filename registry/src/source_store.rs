use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, sea_query::LikeExpr,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::crypto::{self, CryptoError};
use crate::entity::source;
use crate::model::{BaseEntity, Source, SourceStatus};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Source not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Config sealing failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Invalid config payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// Input for [`SourceStore::create`].
#[derive(Debug, Clone)]
pub struct NewSource {
    pub name: String,
    pub source_type: String,
    pub config: Value,
}

/// Input for [`SourceStore::update`]. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct SourceUpdate {
    pub name: Option<String>,
    pub source_type: Option<String>,
    /// Merged into the stored config: absent keys are kept, and a secret key sent as an
    /// empty string keeps its stored value.
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    /// List archived sources instead of active ones.
    pub archived: Option<bool>,
}

impl ListQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset of the requested page, `None` when it does not fit a SQL offset.
    pub fn offset(&self) -> Option<u64> {
        (self.page() - 1)
            .checked_mul(self.page_size())
            .filter(|offset| *offset <= i64::MAX as u64)
    }
}

/// Organization-scoped access to stored sources. A source owned by another
/// organization is reported as [`StoreError::NotFound`].
#[derive(Clone)]
pub struct SourceStore {
    db: DatabaseConnection,
    master_key: [u8; 32],
}

impl SourceStore {
    pub fn new(db: DatabaseConnection, master_key: [u8; 32]) -> Self {
        Self { db, master_key }
    }

    pub async fn create(
        &self,
        org_id: &str,
        actor: &str,
        input: NewSource,
    ) -> Result<Source, StoreError> {
        require("org id", org_id)?;
        let name = require("name", &input.name)?;
        let source_type = require("type", &input.source_type)?;

        if !self.is_name_available(org_id, name).await? {
            return Err(name_taken(name));
        }

        let mut config = input.config;
        crypto::seal_secrets(&mut config, &self.master_key)?;

        let record = Source {
            base: BaseEntity::new_for(actor),
            ..Default::default()
        }
        .with_name(name)
        .with_config(serde_json::to_string(&config)?)
        .with_type(source_type)
        .with_org_id(org_id)
        .with_status(SourceStatus::Active.code());

        let model = source::ActiveModel::try_from(record)?
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, name))?;

        tracing::info!(source_id = %model.id, org_id, name, "source created");
        Ok(model.into())
    }

    pub async fn get(&self, org_id: &str, id: &str) -> Result<Source, StoreError> {
        let model = source::Entity::find_by_id(id.to_owned())
            .filter(source::Column::OrgId.eq(org_id))
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(model.into())
    }

    /// One page of the org's sources, oldest first, plus the total match count.
    pub async fn list(
        &self,
        org_id: &str,
        params: &ListQuery,
    ) -> Result<(Vec<Source>, u64), StoreError> {
        let status = if params.archived.unwrap_or(false) {
            SourceStatus::Archived
        } else {
            SourceStatus::Active
        };

        if params.offset().is_none() {
            return Err(StoreError::Validation(format!(
                "page {} is out of range",
                params.page()
            )));
        }

        let mut query = source::Entity::find()
            .filter(source::Column::OrgId.eq(org_id))
            .filter(source::Column::Status.eq(status.code()));

        if let Some(ref search) = params.search
            && !search.is_empty()
        {
            let pattern = format!("%{}%", escape_like(search));
            query = query.filter(
                source::Column::Name.like(LikeExpr::new(pattern).escape('\\')),
            );
        }

        let paginator = query
            .order_by_asc(source::Column::CreateTime)
            .order_by_asc(source::Column::Id)
            .paginate(&self.db, params.page_size());

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page() - 1).await?;

        Ok((items.into_iter().map(Source::from).collect(), total))
    }

    pub async fn update(
        &self,
        org_id: &str,
        id: &str,
        actor: &str,
        input: SourceUpdate,
    ) -> Result<Source, StoreError> {
        let current = self.get(org_id, id).await?;
        let mut next = current.clone();

        if let Some(name) = input.name {
            let name = require("name", &name)?;
            if current.name.as_deref() != Some(name) && !self.is_name_available(org_id, name).await?
            {
                return Err(name_taken(name));
            }
            next.name = Some(name.to_owned());
        }

        if let Some(source_type) = input.source_type {
            next.source_type = Some(require("type", &source_type)?.to_owned());
        }

        if let Some(patch) = input.config {
            let existing = match current.config.as_deref() {
                Some(text) if !text.trim().is_empty() => {
                    serde_json::from_str(text).unwrap_or_else(|e| {
                        tracing::warn!(
                            source_id = id,
                            error = %e,
                            "stored config is not JSON, replacing it"
                        );
                        Value::Object(Map::new())
                    })
                }
                _ => Value::Object(Map::new()),
            };
            let mut merged = merge_config(existing, patch);
            crypto::seal_secrets(&mut merged, &self.master_key)?;
            next.config = Some(serde_json::to_string(&merged)?);
        }

        next.base.touch(actor);
        let name = next.name.clone().unwrap_or_default();
        let model = source::ActiveModel::try_from(next)?
            .update(&self.db)
            .await
            .map_err(|e| unique_violation(e, &name))?;

        tracing::info!(source_id = %model.id, org_id, "source updated");
        Ok(model.into())
    }

    /// Move the source out of the active listing. Archiving twice is not an error.
    pub async fn archive(&self, org_id: &str, id: &str, actor: &str) -> Result<Source, StoreError> {
        self.set_status(org_id, id, actor, SourceStatus::Archived)
            .await
    }

    pub async fn unarchive(
        &self,
        org_id: &str,
        id: &str,
        actor: &str,
    ) -> Result<Source, StoreError> {
        self.set_status(org_id, id, actor, SourceStatus::Active)
            .await
    }

    pub async fn delete(&self, org_id: &str, id: &str) -> Result<(), StoreError> {
        let result = source::Entity::delete_many()
            .filter(source::Column::Id.eq(id))
            .filter(source::Column::OrgId.eq(org_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(source_id = %id, org_id, "source deleted");
        Ok(())
    }

    /// Names are unique per organization, archived sources included.
    pub async fn is_name_available(&self, org_id: &str, name: &str) -> Result<bool, StoreError> {
        let count = source::Entity::find()
            .filter(source::Column::OrgId.eq(org_id))
            .filter(source::Column::Name.eq(name))
            .count(&self.db)
            .await?;
        Ok(count == 0)
    }

    /// The source's config with secrets in plaintext, for code that has to connect.
    /// Stored text that is not JSON comes back as a JSON string.
    pub fn open_config(&self, source: &Source) -> Result<Value, StoreError> {
        let mut config = match source.config.as_deref() {
            Some(text) if !text.trim().is_empty() => match serde_json::from_str(text) {
                Ok(value) => value,
                Err(_) => return Ok(Value::String(text.to_owned())),
            },
            _ => return Ok(Value::Object(Map::new())),
        };
        crypto::unseal_secrets(&mut config, &self.master_key)?;
        Ok(config)
    }

    async fn set_status(
        &self,
        org_id: &str,
        id: &str,
        actor: &str,
        status: SourceStatus,
    ) -> Result<Source, StoreError> {
        let mut record = self.get(org_id, id).await?;
        record.status = Some(status.code());
        record.base.touch(actor);

        let model = source::ActiveModel::try_from(record)?
            .update(&self.db)
            .await?;

        tracing::info!(source_id = %model.id, org_id, ?status, "source status changed");
        Ok(model.into())
    }
}

/// Overlay `patch` on `existing`. Objects merge key by key (recursively); any other
/// shape replaces the stored value outright.
pub fn merge_config(existing: Value, patch: Value) -> Value {
    match (existing, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (key, value) in patch {
                if crypto::is_secret_key(&key) && value.as_str() == Some("") {
                    continue;
                }
                let merged = match base.remove(&key) {
                    Some(old @ Value::Object(_)) if value.is_object() => merge_config(old, value),
                    _ => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}

/// Escape LIKE wildcards so `search` matches literally.
fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn name_taken(name: &str) -> StoreError {
    StoreError::Conflict(format!("Source name '{name}' already exists"))
}

fn unique_violation(e: DbErr, name: &str) -> StoreError {
    let msg = e.to_string();
    if msg.contains("UNIQUE") || msg.contains("unique") {
        name_taken(name)
    } else {
        StoreError::Db(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, Set};
    use serde_json::json;

    const ORG: &str = "org-1";
    const ACTOR: &str = "user-1";

    async fn setup() -> SourceStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SourceStore::new(db, [42u8; 32])
    }

    fn jdbc(name: &str) -> NewSource {
        NewSource {
            name: name.to_string(),
            source_type: "JDBC".to_string(),
            config: json!({
                "url": "jdbc:postgresql://db:5432/sales",
                "user": "report",
                "password": "hunter2"
            }),
        }
    }

    fn stored_config(source: &Source) -> Value {
        serde_json::from_str(source.config.as_deref().unwrap()).unwrap()
    }

    // --- create ---

    #[tokio::test]
    async fn test_create_populates_record() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();

        assert_eq!(s.name.as_deref(), Some("sales"));
        assert_eq!(s.source_type.as_deref(), Some("JDBC"));
        assert_eq!(s.org_id.as_deref(), Some(ORG));
        assert_eq!(s.status, Some(SourceStatus::Active.code()));
        assert_eq!(s.base.create_by.as_deref(), Some(ACTOR));
        assert!(s.base.create_time.is_some());
        assert!(s.base.update_by.is_none());
        assert_eq!(s.id().map(str::len), Some(32));
    }

    #[tokio::test]
    async fn test_create_seals_password() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();

        let raw = s.config.as_deref().unwrap();
        assert!(!raw.contains("hunter2"), "Password must not be stored in plaintext");
        assert_eq!(stored_config(&s)["user"], "report");

        let opened = store.open_config(&s).unwrap();
        assert_eq!(opened["password"], "hunter2");
    }

    #[tokio::test]
    async fn test_create_trims_and_validates() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("  sales  ")).await.unwrap();
        assert_eq!(s.name.as_deref(), Some("sales"));

        let err = store.create(ORG, ACTOR, jdbc("   ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let mut no_type = jdbc("other");
        no_type.source_type = String::new();
        let err = store.create(ORG, ACTOR, no_type).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = store.create("", ACTOR, jdbc("third")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name_in_same_org_conflicts() {
        let store = setup().await;
        store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();

        let err = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_same_name_allowed_across_orgs() {
        let store = setup().await;
        store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();
        store.create("org-2", ACTOR, jdbc("sales")).await.unwrap();
    }

    // --- get / delete ---

    #[tokio::test]
    async fn test_get_is_org_scoped() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();
        let id = s.id().unwrap();

        assert_eq!(store.get(ORG, id).await.unwrap(), s);
        assert!(matches!(
            store.get("org-2", id).await.unwrap_err(),
            StoreError::NotFound
        ));
        assert!(matches!(
            store.get(ORG, "missing").await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();
        let id = s.id().unwrap();

        assert!(matches!(
            store.delete("org-2", id).await.unwrap_err(),
            StoreError::NotFound
        ));
        store.delete(ORG, id).await.unwrap();
        assert!(matches!(
            store.get(ORG, id).await.unwrap_err(),
            StoreError::NotFound
        ));
        assert!(matches!(
            store.delete(ORG, id).await.unwrap_err(),
            StoreError::NotFound
        ));
        assert!(store.is_name_available(ORG, "sales").await.unwrap());
    }

    // --- list ---

    #[tokio::test]
    async fn test_list_pages_and_counts() {
        let store = setup().await;
        for i in 0..5 {
            store.create(ORG, ACTOR, jdbc(&format!("ds{i}"))).await.unwrap();
        }
        store.create("org-2", ACTOR, jdbc("elsewhere")).await.unwrap();

        let query = ListQuery {
            page: Some(2),
            page_size: Some(2),
            ..Default::default()
        };
        let (items, total) = store.list(ORG, &query).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|s| s.org_id.as_deref() == Some(ORG)));

        let last = ListQuery {
            page: Some(3),
            page_size: Some(2),
            ..Default::default()
        };
        let (items, _) = store.list(ORG, &last).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_list_search_filters_by_name() {
        let store = setup().await;
        store.create(ORG, ACTOR, jdbc("sales_eu")).await.unwrap();
        store.create(ORG, ACTOR, jdbc("sales_us")).await.unwrap();
        store.create(ORG, ACTOR, jdbc("inventory")).await.unwrap();

        let query = ListQuery {
            search: Some("sales".to_string()),
            ..Default::default()
        };
        let (items, total) = store.list(ORG, &query).await.unwrap();
        assert_eq!(total, 2);
        assert!(
            items
                .iter()
                .all(|s| s.name.as_deref().unwrap().starts_with("sales"))
        );
    }

    #[tokio::test]
    async fn test_list_separates_archived() {
        let store = setup().await;
        let a = store.create(ORG, ACTOR, jdbc("a")).await.unwrap();
        store.create(ORG, ACTOR, jdbc("b")).await.unwrap();
        store.archive(ORG, a.id().unwrap(), ACTOR).await.unwrap();

        let (active, _) = store.list(ORG, &ListQuery::default()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name.as_deref(), Some("b"));

        let archived_query = ListQuery {
            archived: Some(true),
            ..Default::default()
        };
        let (archived, _) = store.list(ORG, &archived_query).await.unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].name.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_list_search_treats_wildcards_literally() {
        let store = setup().await;
        store.create(ORG, ACTOR, jdbc("alpha")).await.unwrap();
        store.create(ORG, ACTOR, jdbc("beta")).await.unwrap();
        store.create(ORG, ACTOR, jdbc("a_b")).await.unwrap();
        store.create(ORG, ACTOR, jdbc("50%off")).await.unwrap();

        let search = |text: &str| ListQuery {
            search: Some(text.to_string()),
            ..Default::default()
        };

        let (items, total) = store.list(ORG, &search("_")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].name.as_deref(), Some("a_b"));

        let (items, total) = store.list(ORG, &search("%")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].name.as_deref(), Some("50%off"));
    }

    #[tokio::test]
    async fn test_list_rejects_page_past_offset_range() {
        let store = setup().await;
        store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();

        let query = ListQuery {
            page: Some(u64::MAX / 10),
            ..Default::default()
        };
        let err = store.list(ORG, &query).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let far = ListQuery {
            page: Some(1_000_000),
            ..Default::default()
        };
        let (items, total) = store.list(ORG, &far).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
    }

    #[test]
    fn test_list_query_bounds() {
        let q = ListQuery {
            page: Some(0),
            page_size: Some(1000),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), MAX_PAGE_SIZE);

        let q = ListQuery {
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(q.page_size(), 1);
        assert_eq!(ListQuery::default().page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(ListQuery::default().offset(), Some(0));

        let q = ListQuery {
            page: Some(u64::MAX),
            ..Default::default()
        };
        assert_eq!(q.offset(), None);
    }

    // --- update ---

    #[tokio::test]
    async fn test_update_renames_and_stamps() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();

        let updated = store
            .update(
                ORG,
                s.id().unwrap(),
                "user-2",
                SourceUpdate {
                    name: Some("revenue".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("revenue"));
        assert_eq!(updated.base.id, s.base.id);
        assert_eq!(updated.base.create_by, s.base.create_by);
        assert_eq!(updated.base.update_by.as_deref(), Some("user-2"));
        assert!(updated.base.update_time.is_some());
        assert_eq!(updated.config, s.config);
        assert!(store.is_name_available(ORG, "sales").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_to_taken_name_conflicts() {
        let store = setup().await;
        store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();
        let other = store.create(ORG, ACTOR, jdbc("inventory")).await.unwrap();

        let err = store
            .update(
                ORG,
                other.id().unwrap(),
                ACTOR,
                SourceUpdate {
                    name: Some("sales".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_keeping_own_name_is_fine() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();
        let updated = store
            .update(
                ORG,
                s.id().unwrap(),
                ACTOR,
                SourceUpdate {
                    name: Some("sales".to_string()),
                    source_type: Some("FILE".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.source_type.as_deref(), Some("FILE"));
    }

    #[tokio::test]
    async fn test_update_config_merges_and_keeps_blank_secret() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();

        let updated = store
            .update(
                ORG,
                s.id().unwrap(),
                ACTOR,
                SourceUpdate {
                    config: Some(json!({"user": "analyst", "password": ""})),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let opened = store.open_config(&updated).unwrap();
        assert_eq!(opened["user"], "analyst");
        assert_eq!(opened["password"], "hunter2");
        assert_eq!(opened["url"], "jdbc:postgresql://db:5432/sales");
    }

    #[tokio::test]
    async fn test_update_config_replaces_secret() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();

        let updated = store
            .update(
                ORG,
                s.id().unwrap(),
                ACTOR,
                SourceUpdate {
                    config: Some(json!({"password": "rotated"})),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.config.as_deref().unwrap().contains("rotated"));
        assert_eq!(store.open_config(&updated).unwrap()["password"], "rotated");
    }

    #[tokio::test]
    async fn test_update_other_org_not_found() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();
        let err = store
            .update("org-2", s.id().unwrap(), ACTOR, SourceUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_create_seals_prefixed_plaintext_secret() {
        let store = setup().await;
        let mut input = jdbc("sales");
        input.config = json!({"user": "report", "password": "_encrypted_hunter2"});
        let s = store.create(ORG, ACTOR, input).await.unwrap();

        assert_ne!(stored_config(&s)["password"], "_encrypted_hunter2");
        assert_eq!(store.open_config(&s).unwrap()["password"], "_encrypted_hunter2");
    }

    /// Overwrite the stored config column, bypassing the store.
    async fn put_raw_config(store: &SourceStore, id: &str, text: &str) -> Source {
        let model = source::ActiveModel {
            id: Set(id.to_owned()),
            config: Set(Some(text.to_owned())),
            ..Default::default()
        }
        .update(&store.db)
        .await
        .unwrap();
        model.into()
    }

    #[tokio::test]
    async fn test_non_json_config_is_opened_as_text() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("legacy")).await.unwrap();
        let raw = put_raw_config(&store, s.id().unwrap(), "host=db port=5432").await;

        assert_eq!(raw.config.as_deref(), Some("host=db port=5432"));
        assert_eq!(store.open_config(&raw).unwrap(), json!("host=db port=5432"));
    }

    #[tokio::test]
    async fn test_update_replaces_non_json_config() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("legacy")).await.unwrap();
        let id = s.id().unwrap();
        put_raw_config(&store, id, "host=db port=5432").await;

        let updated = store
            .update(
                ORG,
                id,
                ACTOR,
                SourceUpdate {
                    config: Some(json!({"host": "db", "password": "pw"})),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let opened = store.open_config(&updated).unwrap();
        assert_eq!(opened, json!({"host": "db", "password": "pw"}));
    }

    // --- archive ---

    #[tokio::test]
    async fn test_archive_and_unarchive() {
        let store = setup().await;
        let s = store.create(ORG, ACTOR, jdbc("sales")).await.unwrap();
        let id = s.id().unwrap();

        let archived = store.archive(ORG, id, ACTOR).await.unwrap();
        assert!(archived.is_archived());
        let again = store.archive(ORG, id, ACTOR).await.unwrap();
        assert!(again.is_archived());

        // Archived sources still hold their name.
        assert!(!store.is_name_available(ORG, "sales").await.unwrap());

        let restored = store.unarchive(ORG, id, "user-2").await.unwrap();
        assert_eq!(restored.status, Some(SourceStatus::Active.code()));
        assert_eq!(restored.base.update_by.as_deref(), Some("user-2"));
    }

    // --- config helpers ---

    #[test]
    fn test_merge_config_nested() {
        let existing = json!({"a": 1, "props": {"x": 1, "token": "_encrypted_t"}});
        let patch = json!({"b": 2, "props": {"y": 2, "token": ""}});
        assert_eq!(
            merge_config(existing, patch),
            json!({"a": 1, "b": 2, "props": {"x": 1, "y": 2, "token": "_encrypted_t"}})
        );
    }

    #[test]
    fn test_merge_config_non_object_replaces() {
        assert_eq!(merge_config(json!({"a": 1}), json!("raw")), json!("raw"));
        assert_eq!(merge_config(json!("raw"), json!({"a": 1})), json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_open_config_without_payload() {
        let store = setup().await;
        assert_eq!(store.open_config(&Source::default()).unwrap(), json!({}));
    }
}
