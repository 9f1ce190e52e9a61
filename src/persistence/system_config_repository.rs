//! PostgreSQL-backed [`SystemConfigRepository`].
//!
//! Every read filters out soft-deleted rows. Writes that touch more than
//! one statement run inside a database transaction.

use crate::{
    db::DbPool,
    domain::{
        entity::SystemConfig,
        repository::{Query, RepositoryError, RepositoryResult, SystemConfigRepository},
    },
    persistence::model::SystemConfigModel,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Stores system configs in the `system_config` table.
#[derive(Debug, Clone)]
pub struct PgSystemConfigRepository {
    pool: DbPool,
}

impl PgSystemConfigRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Builds a `LIKE` pattern matching `keyword` anywhere in the column.
///
/// Wildcards in the keyword are escaped so they match literally; the query
/// declares `\` as the escape character.
pub fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// A non-positive limit means "no limit"; Postgres treats `LIMIT NULL` that way.
fn limit_param(limit: i64) -> Option<i64> {
    (limit > 0).then_some(limit)
}

#[async_trait]
impl SystemConfigRepository for PgSystemConfigRepository {
    async fn create(&self, entity: &mut SystemConfig) -> RepositoryResult<()> {
        let model = SystemConfigModel::from(&*entity);

        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, SystemConfigModel>(
            r#"
            INSERT INTO system_config (tenant, env, type, config, description, creator, modifier)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(model.tenant)
        .bind(model.env)
        .bind(model.kind)
        .bind(model.config)
        .bind(model.description)
        .bind(model.creator)
        .bind(model.modifier)
        .fetch_one(&mut *tx)
        .await?;

        // Map the fresh row (id, timestamps) back before committing so a
        // mapping failure rolls the insert back.
        *entity = created.into_entity()?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        // Lock the live row so a concurrent delete cannot race us
        let existing: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM system_config
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_none() {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("UPDATE system_config SET deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn update(&self, entity: &mut SystemConfig) -> RepositoryResult<()> {
        if entity.id == 0 {
            return Err(RepositoryError::MissingId);
        }

        let model = SystemConfigModel::from(&*entity);

        let updated_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            UPDATE system_config
            SET tenant = $2,
                env = $3,
                type = $4,
                config = $5,
                description = $6,
                creator = $7,
                modifier = $8,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING updated_at
            "#,
        )
        .bind(model.id)
        .bind(model.tenant)
        .bind(model.env)
        .bind(model.kind)
        .bind(model.config)
        .bind(model.description)
        .bind(model.creator)
        .bind(model.modifier)
        .fetch_optional(&self.pool)
        .await?;

        entity.updated_at = updated_at.ok_or(RepositoryError::NotFound)?;

        Ok(())
    }

    async fn get(&self, id: i64) -> RepositoryResult<SystemConfig> {
        sqlx::query_as::<_, SystemConfigModel>(
            "SELECT * FROM system_config WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .into_entity()
    }

    async fn find(&self, query: &Query) -> RepositoryResult<Vec<SystemConfig>> {
        let rows = sqlx::query_as::<_, SystemConfigModel>(
            r#"
            SELECT * FROM system_config
            WHERE deleted_at IS NULL AND config LIKE $1 ESCAPE '\'
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(like_pattern(&query.keyword))
        .bind(limit_param(query.limit))
        .bind(query.offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SystemConfigModel::into_entity).collect()
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM system_config WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("redis"), "%redis%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn non_positive_limit_is_unbounded() {
        assert_eq!(limit_param(0), None);
        assert_eq!(limit_param(-5), None);
        assert_eq!(limit_param(25), Some(25));
    }

    // The tests below run against a throwaway database created by
    // `sqlx::test` from DATABASE_URL: `cargo test -- --ignored`.

    use crate::domain::entity::Env;

    fn entity(config: &str) -> SystemConfig {
        let mut entity = SystemConfig::new("acme", Env::Prod, "cache");
        entity.config = config.to_string();
        entity.creator = "alice".to_string();
        entity
    }

    async fn seed(repo: &PgSystemConfigRepository, configs: &[&str]) -> Vec<SystemConfig> {
        let mut created = Vec::new();
        for config in configs {
            let mut e = entity(config);
            repo.create(&mut e).await.unwrap();
            created.push(e);
        }
        created
    }

    fn configs(found: &[SystemConfig]) -> Vec<&str> {
        found.iter().map(|e| e.config.as_str()).collect()
    }

    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    #[sqlx::test(migrations = "./migrations")]
    async fn create_assigns_id_and_get_reads_it_back(pool: DbPool) {
        let repo = PgSystemConfigRepository::new(pool);

        let mut e = entity("{\"nodes\": 3}");
        repo.create(&mut e).await.unwrap();
        assert!(e.id > 0);

        let stored = repo.get(e.id).await.unwrap();
        assert_eq!(stored, e);
        assert!(matches!(repo.get(e.id + 1).await, Err(RepositoryError::NotFound)));
    }

    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    #[sqlx::test(migrations = "./migrations")]
    async fn update_bumps_timestamp_and_skips_missing_rows(pool: DbPool) {
        let repo = PgSystemConfigRepository::new(pool);
        let mut e = seed(&repo, &["v1"]).await.remove(0);
        let created_at = e.created_at;

        e.config = "v2".to_string();
        e.env = Env::Gray;
        repo.update(&mut e).await.unwrap();
        assert!(e.updated_at >= created_at);

        let stored = repo.get(e.id).await.unwrap();
        assert_eq!(stored.config, "v2");
        assert_eq!(stored.env, Env::Gray);
        assert_eq!(stored.updated_at, e.updated_at);

        let mut missing = entity("x");
        assert!(matches!(repo.update(&mut missing).await, Err(RepositoryError::MissingId)));
        missing.id = e.id + 100;
        assert!(matches!(repo.update(&mut missing).await, Err(RepositoryError::NotFound)));
    }

    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    #[sqlx::test(migrations = "./migrations")]
    async fn delete_is_soft_and_hides_the_row(pool: DbPool) {
        let repo = PgSystemConfigRepository::new(pool.clone());
        let created = seed(&repo, &["a", "b", "c"]).await;
        let id = created[1].id;

        repo.delete(id).await.unwrap();
        assert!(matches!(repo.delete(id).await, Err(RepositoryError::NotFound)));
        assert!(matches!(repo.get(id).await, Err(RepositoryError::NotFound)));
        assert_eq!(repo.count().await.unwrap(), 2);

        let mut deleted = created[1].clone();
        deleted.config = "revived".to_string();
        assert!(matches!(repo.update(&mut deleted).await, Err(RepositoryError::NotFound)));

        let deleted_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT deleted_at FROM system_config WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(deleted_at.is_some());
    }

    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    #[sqlx::test(migrations = "./migrations")]
    async fn find_filters_literally_and_pages(pool: DbPool) {
        let repo = PgSystemConfigRepository::new(pool);
        seed(&repo, &["50% off", "500 off", "a_b", "axb", "plain"]).await;

        let all = repo.find(&Query::default()).await.unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let query = Query { keyword: "50%".into(), ..Default::default() };
        assert_eq!(configs(&repo.find(&query).await.unwrap()), vec!["50% off"]);

        let query = Query { keyword: "a_b".into(), ..Default::default() };
        assert_eq!(configs(&repo.find(&query).await.unwrap()), vec!["a_b"]);

        let query = Query { offset: 1, limit: 2, keyword: String::new() };
        assert_eq!(configs(&repo.find(&query).await.unwrap()), vec!["500 off", "a_b"]);
    }

    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    #[sqlx::test(migrations = "./migrations")]
    async fn unknown_stored_env_is_an_invalid_record(pool: DbPool) {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO system_config (tenant, env, type) VALUES ('acme', 'staging', 'cache') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let repo = PgSystemConfigRepository::new(pool);
        assert!(matches!(
            repo.get(id).await,
            Err(RepositoryError::InvalidRecord { id: bad, .. }) if bad == id
        ));
    }
}
