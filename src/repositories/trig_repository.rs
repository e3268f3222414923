//! Repositorio de pilares, logs, fotos y usuarios
//!
//! Los handlers dependen solo del trait `TrigRepository`; la implementación
//! Postgres usa sqlx con queries en tiempo de ejecución.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::dto::ListParams;
use crate::models::{
    CreateLogRequest, CreatePhotoRequest, Photo, SiteStats, Trig, TrigLog, UpdateLogRequest,
    UpdateTrigRequest, UpdateUserRequest, User,
};
use crate::utils::errors::{AppError, AppResult};

/// Ámbito de un listado de logs o fotos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Trig(i64),
    User(i64),
}

impl Scope {
    fn trig_id(&self) -> Option<i64> {
        match self {
            Scope::Trig(id) => Some(*id),
            _ => None,
        }
    }

    fn user_id(&self) -> Option<i64> {
        match self {
            Scope::User(id) => Some(*id),
            _ => None,
        }
    }
}

#[async_trait]
pub trait TrigRepository: Send + Sync {
    async fn list_trigs(&self, params: &ListParams) -> AppResult<Vec<Trig>>;
    async fn find_trig(&self, id: i64) -> AppResult<Option<Trig>>;
    async fn update_trig(&self, id: i64, request: &UpdateTrigRequest) -> AppResult<Option<Trig>>;

    async fn list_logs(&self, scope: Scope, params: &ListParams) -> AppResult<Vec<TrigLog>>;
    async fn find_log(&self, id: i64) -> AppResult<Option<TrigLog>>;
    async fn create_log(&self, request: &CreateLogRequest) -> AppResult<TrigLog>;
    async fn update_log(&self, id: i64, request: &UpdateLogRequest) -> AppResult<Option<TrigLog>>;
    /// Devuelve el log borrado para poder invalidar por sus ids
    async fn delete_log(&self, id: i64) -> AppResult<Option<TrigLog>>;

    async fn list_photos(&self, scope: Scope, params: &ListParams) -> AppResult<Vec<Photo>>;
    async fn create_photo(&self, request: &CreatePhotoRequest) -> AppResult<Photo>;
    async fn delete_photo(&self, id: i64) -> AppResult<Option<Photo>>;

    async fn find_user(&self, id: i64) -> AppResult<Option<User>>;
    async fn update_user(&self, id: i64, request: &UpdateUserRequest) -> AppResult<Option<User>>;

    async fn site_stats(&self) -> AppResult<SiteStats>;
}

const TRIG_COLUMNS: &str = r#"
    t.id, t.waypoint, t.name, t.latitude, t.longitude, t.condition, t.updated_at,
    (SELECT COUNT(*) FROM tlog l WHERE l.trig_id = t.id) AS log_count
"#;

const LOG_COLUMNS: &str = r#"
    l.id, l.trig_id, l.user_id, u.name AS user_name, l.condition, l.comment, l.score, l.created_at
"#;

const PHOTO_COLUMNS: &str = r#"
    p.id, p.log_id, l.trig_id, l.user_id, p.caption, p.url, p.created_at
"#;

const USER_COLUMNS: &str = r#"
    u.id, u.name, u.homepage, u.about,
    (SELECT COUNT(*) FROM tlog l WHERE l.user_id = u.id) AS log_count,
    (SELECT COUNT(*) FROM tphoto p JOIN tlog l ON l.id = p.log_id WHERE l.user_id = u.id) AS photo_count
"#;

pub struct PgTrigRepository {
    pool: PgPool,
}

impl PgTrigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrigRepository for PgTrigRepository {
    async fn list_trigs(&self, params: &ListParams) -> AppResult<Vec<Trig>> {
        let query = format!(
            "SELECT {} FROM trig t WHERE ($1::text IS NULL OR t.condition = $1) ORDER BY t.id LIMIT $2 OFFSET $3",
            TRIG_COLUMNS
        );
        let trigs = sqlx::query_as::<_, Trig>(&query)
            .bind(params.condition())
            .bind(params.per_page() as i64)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(trigs)
    }

    async fn find_trig(&self, id: i64) -> AppResult<Option<Trig>> {
        let query = format!("SELECT {} FROM trig t WHERE t.id = $1", TRIG_COLUMNS);
        let trig = sqlx::query_as::<_, Trig>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(trig)
    }

    async fn update_trig(&self, id: i64, request: &UpdateTrigRequest) -> AppResult<Option<Trig>> {
        let updated = sqlx::query(
            r#"
            UPDATE trig
            SET name = COALESCE($2, name),
                condition = COALESCE($3, condition),
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(request.name.as_deref())
        .bind(request.condition.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_trig(id).await
    }

    async fn list_logs(&self, scope: Scope, params: &ListParams) -> AppResult<Vec<TrigLog>> {
        let query = format!(
            r#"
            SELECT {} FROM tlog l JOIN users u ON u.id = l.user_id
            WHERE ($1::bigint IS NULL OR l.trig_id = $1)
              AND ($2::bigint IS NULL OR l.user_id = $2)
              AND ($3::text IS NULL OR l.condition = $3)
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $4 OFFSET $5
            "#,
            LOG_COLUMNS
        );
        let logs = sqlx::query_as::<_, TrigLog>(&query)
            .bind(scope.trig_id())
            .bind(scope.user_id())
            .bind(params.condition())
            .bind(params.per_page() as i64)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }

    async fn find_log(&self, id: i64) -> AppResult<Option<TrigLog>> {
        let query = format!(
            "SELECT {} FROM tlog l JOIN users u ON u.id = l.user_id WHERE l.id = $1",
            LOG_COLUMNS
        );
        let log = sqlx::query_as::<_, TrigLog>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(log)
    }

    async fn create_log(&self, request: &CreateLogRequest) -> AppResult<TrigLog> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tlog (trig_id, user_id, condition, comment, score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(request.trig_id)
        .bind(request.user_id)
        .bind(&request.condition)
        .bind(&request.comment)
        .bind(request.score)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        // El estado del pilar es el del último log
        sqlx::query("UPDATE trig SET condition = $2, updated_at = $3 WHERE id = $1")
            .bind(request.trig_id)
            .bind(&request.condition)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_log(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("log {} missing after insert", id)))
    }

    async fn update_log(&self, id: i64, request: &UpdateLogRequest) -> AppResult<Option<TrigLog>> {
        let updated = sqlx::query(
            r#"
            UPDATE tlog
            SET condition = COALESCE($2, condition),
                comment = COALESCE($3, comment),
                score = COALESCE($4, score)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(request.condition.as_deref())
        .bind(request.comment.as_deref())
        .bind(request.score)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_log(id).await
    }

    async fn delete_log(&self, id: i64) -> AppResult<Option<TrigLog>> {
        let Some(log) = self.find_log(id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM tphoto WHERE log_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tlog WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(log))
    }

    async fn list_photos(&self, scope: Scope, params: &ListParams) -> AppResult<Vec<Photo>> {
        let query = format!(
            r#"
            SELECT {} FROM tphoto p JOIN tlog l ON l.id = p.log_id
            WHERE ($1::bigint IS NULL OR l.trig_id = $1)
              AND ($2::bigint IS NULL OR l.user_id = $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3 OFFSET $4
            "#,
            PHOTO_COLUMNS
        );
        let photos = sqlx::query_as::<_, Photo>(&query)
            .bind(scope.trig_id())
            .bind(scope.user_id())
            .bind(params.per_page() as i64)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(photos)
    }

    async fn create_photo(&self, request: &CreatePhotoRequest) -> AppResult<Photo> {
        let query = format!(
            r#"
            WITH inserted AS (
                INSERT INTO tphoto (log_id, caption, url, created_at)
                SELECT l.id, $2, $3, $4 FROM tlog l WHERE l.id = $1
                RETURNING *
            )
            SELECT {} FROM inserted p JOIN tlog l ON l.id = p.log_id
            "#,
            PHOTO_COLUMNS
        );
        sqlx::query_as::<_, Photo>(&query)
            .bind(request.log_id)
            .bind(&request.caption)
            .bind(&request.url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Log with id '{}' not found", request.log_id)))
    }

    async fn delete_photo(&self, id: i64) -> AppResult<Option<Photo>> {
        let query = format!(
            r#"
            WITH deleted AS (DELETE FROM tphoto WHERE id = $1 RETURNING *)
            SELECT {} FROM deleted p JOIN tlog l ON l.id = p.log_id
            "#,
            PHOTO_COLUMNS
        );
        let photo = sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(photo)
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        let query = format!("SELECT {} FROM users u WHERE u.id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i64, request: &UpdateUserRequest) -> AppResult<Option<User>> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                homepage = COALESCE($3, homepage),
                about = COALESCE($4, about)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(request.name.as_deref())
        .bind(request.homepage.as_deref())
        .bind(request.about.as_deref())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_user(id).await
    }

    async fn site_stats(&self) -> AppResult<SiteStats> {
        let (trigs, logs, photos, users): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM trig),
                (SELECT COUNT(*) FROM tlog),
                (SELECT COUNT(*) FROM tphoto),
                (SELECT COUNT(*) FROM users)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SiteStats {
            trigs,
            logs,
            photos,
            users,
            generated_at: Utc::now(),
        })
    }
}
