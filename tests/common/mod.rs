#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use tokio::sync::RwLock;
use tower::ServiceExt;

use trigpoint_api::cache::{CacheClient, CacheConfig, MemoryStore};
use trigpoint_api::config::AppConfig;
use trigpoint_api::dto::ListParams;
use trigpoint_api::models::{
    CreateLogRequest, CreatePhotoRequest, Photo, SiteStats, Trig, TrigLog, UpdateLogRequest,
    UpdateTrigRequest, UpdateUserRequest, User,
};
use trigpoint_api::repositories::{Scope, TrigRepository};
use trigpoint_api::utils::errors::{not_found_error, AppResult};
use trigpoint_api::{create_router, AppState};

pub const ADMIN_TOKEN: &str = "test-admin-token";

#[derive(Default)]
struct Tables {
    trigs: Vec<Trig>,
    logs: Vec<TrigLog>,
    photos: Vec<Photo>,
    users: Vec<User>,
}

/// Repositorio en memoria con dos pilares (42, 99) y dos usuarios (7, 8)
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn seeded() -> Self {
        let updated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let trig = |id: i64, name: &str| Trig {
            id,
            waypoint: format!("TP{:04}", id),
            name: name.to_string(),
            latitude: 51.0 + id as f64 / 100.0,
            longitude: -1.0,
            condition: "G".to_string(),
            log_count: 0,
            updated_at,
        };
        let user = |id: i64, name: &str| User {
            id,
            name: name.to_string(),
            homepage: None,
            about: String::new(),
            log_count: 0,
            photo_count: 0,
        };

        let tables = Tables {
            trigs: vec![trig(42, "Dunkery Beacon"), trig(99, "Ben Nevis")],
            users: vec![user(7, "ian"), user(8, "sarah")],
            logs: vec![
                TrigLog {
                    id: 1,
                    trig_id: 42,
                    user_id: 7,
                    user_name: "ian".to_string(),
                    condition: "G".to_string(),
                    comment: "Good".to_string(),
                    score: 7,
                    created_at: updated_at,
                },
                TrigLog {
                    id: 2,
                    trig_id: 99,
                    user_id: 8,
                    user_name: "sarah".to_string(),
                    condition: "D".to_string(),
                    comment: "Cracked".to_string(),
                    score: 4,
                    created_at: updated_at + Duration::hours(1),
                },
            ],
            photos: vec![Photo {
                id: 1,
                log_id: 1,
                trig_id: 42,
                user_id: 7,
                caption: "Summit".to_string(),
                url: "https://example.org/1.jpg".to_string(),
                created_at: updated_at,
            }],
        };

        Self {
            tables: RwLock::new(tables),
        }
    }

    pub async fn log_count(&self) -> usize {
        self.tables.read().await.logs.len()
    }
}

fn paginate<T: Clone>(items: Vec<T>, params: &ListParams) -> Vec<T> {
    items
        .into_iter()
        .skip(params.offset() as usize)
        .take(params.per_page() as usize)
        .collect()
}

fn in_scope(scope: Scope, trig_id: i64, user_id: i64) -> bool {
    match scope {
        Scope::All => true,
        Scope::Trig(id) => trig_id == id,
        Scope::User(id) => user_id == id,
    }
}

impl Tables {
    fn trig_with_counts(&self, trig: &Trig) -> Trig {
        Trig {
            log_count: self.logs.iter().filter(|l| l.trig_id == trig.id).count() as i64,
            ..trig.clone()
        }
    }

    fn user_with_counts(&self, user: &User) -> User {
        User {
            log_count: self.logs.iter().filter(|l| l.user_id == user.id).count() as i64,
            photo_count: self.photos.iter().filter(|p| p.user_id == user.id).count() as i64,
            ..user.clone()
        }
    }
}

#[async_trait]
impl TrigRepository for InMemoryRepository {
    async fn list_trigs(&self, params: &ListParams) -> AppResult<Vec<Trig>> {
        let tables = self.tables.read().await;
        let condition = params.condition();
        let trigs = tables
            .trigs
            .iter()
            .filter(|t| condition.as_deref().map_or(true, |c| t.condition == c))
            .map(|t| tables.trig_with_counts(t))
            .collect();
        Ok(paginate(trigs, params))
    }

    async fn find_trig(&self, id: i64) -> AppResult<Option<Trig>> {
        let tables = self.tables.read().await;
        Ok(tables
            .trigs
            .iter()
            .find(|t| t.id == id)
            .map(|t| tables.trig_with_counts(t)))
    }

    async fn update_trig(&self, id: i64, request: &UpdateTrigRequest) -> AppResult<Option<Trig>> {
        let mut tables = self.tables.write().await;
        let Some(trig) = tables.trigs.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &request.name {
            trig.name = name.clone();
        }
        if let Some(condition) = &request.condition {
            trig.condition = condition.clone();
        }
        trig.updated_at = Utc::now();
        let trig = trig.clone();
        Ok(Some(tables.trig_with_counts(&trig)))
    }

    async fn list_logs(&self, scope: Scope, params: &ListParams) -> AppResult<Vec<TrigLog>> {
        let tables = self.tables.read().await;
        let condition = params.condition();
        let mut logs: Vec<TrigLog> = tables
            .logs
            .iter()
            .filter(|l| in_scope(scope, l.trig_id, l.user_id))
            .filter(|l| condition.as_deref().map_or(true, |c| l.condition == c))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(logs, params))
    }

    async fn find_log(&self, id: i64) -> AppResult<Option<TrigLog>> {
        let tables = self.tables.read().await;
        Ok(tables.logs.iter().find(|l| l.id == id).cloned())
    }

    async fn create_log(&self, request: &CreateLogRequest) -> AppResult<TrigLog> {
        let mut tables = self.tables.write().await;
        let user_name = tables
            .users
            .iter()
            .find(|u| u.id == request.user_id)
            .map(|u| u.name.clone())
            .ok_or_else(|| not_found_error("User", &request.user_id.to_string()))?;

        let log = TrigLog {
            id: tables.logs.iter().map(|l| l.id).max().unwrap_or(0) + 1,
            trig_id: request.trig_id,
            user_id: request.user_id,
            user_name,
            condition: request.condition.clone(),
            comment: request.comment.clone(),
            score: request.score,
            created_at: Utc::now(),
        };
        tables.logs.push(log.clone());

        if let Some(trig) = tables.trigs.iter_mut().find(|t| t.id == request.trig_id) {
            trig.condition = request.condition.clone();
        }
        Ok(log)
    }

    async fn update_log(&self, id: i64, request: &UpdateLogRequest) -> AppResult<Option<TrigLog>> {
        let mut tables = self.tables.write().await;
        let Some(log) = tables.logs.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(condition) = &request.condition {
            log.condition = condition.clone();
        }
        if let Some(comment) = &request.comment {
            log.comment = comment.clone();
        }
        if let Some(score) = request.score {
            log.score = score;
        }
        Ok(Some(log.clone()))
    }

    async fn delete_log(&self, id: i64) -> AppResult<Option<TrigLog>> {
        let mut tables = self.tables.write().await;
        let Some(position) = tables.logs.iter().position(|l| l.id == id) else {
            return Ok(None);
        };
        tables.photos.retain(|p| p.log_id != id);
        Ok(Some(tables.logs.remove(position)))
    }

    async fn list_photos(&self, scope: Scope, params: &ListParams) -> AppResult<Vec<Photo>> {
        let tables = self.tables.read().await;
        let mut photos: Vec<Photo> = tables
            .photos
            .iter()
            .filter(|p| in_scope(scope, p.trig_id, p.user_id))
            .cloned()
            .collect();
        photos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(photos, params))
    }

    async fn create_photo(&self, request: &CreatePhotoRequest) -> AppResult<Photo> {
        let mut tables = self.tables.write().await;
        let log = tables
            .logs
            .iter()
            .find(|l| l.id == request.log_id)
            .cloned()
            .ok_or_else(|| not_found_error("Log", &request.log_id.to_string()))?;

        let photo = Photo {
            id: tables.photos.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            log_id: log.id,
            trig_id: log.trig_id,
            user_id: log.user_id,
            caption: request.caption.clone(),
            url: request.url.clone(),
            created_at: Utc::now(),
        };
        tables.photos.push(photo.clone());
        Ok(photo)
    }

    async fn delete_photo(&self, id: i64) -> AppResult<Option<Photo>> {
        let mut tables = self.tables.write().await;
        let Some(position) = tables.photos.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        Ok(Some(tables.photos.remove(position)))
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| tables.user_with_counts(u)))
    }

    async fn update_user(&self, id: i64, request: &UpdateUserRequest) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &request.name {
            user.name = name.clone();
        }
        if let Some(homepage) = &request.homepage {
            user.homepage = Some(homepage.clone());
        }
        if let Some(about) = &request.about {
            user.about = about.clone();
        }
        let user = user.clone();

        if let Some(name) = &request.name {
            for log in tables.logs.iter_mut().filter(|l| l.user_id == id) {
                log.user_name = name.clone();
            }
        }
        Ok(Some(tables.user_with_counts(&user)))
    }

    async fn site_stats(&self) -> AppResult<SiteStats> {
        let tables = self.tables.read().await;
        Ok(SiteStats {
            trigs: tables.trigs.len() as i64,
            logs: tables.logs.len() as i64,
            photos: tables.photos.len() as i64,
            users: tables.users.len() as i64,
            generated_at: Utc::now(),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub repository: Arc<InMemoryRepository>,
}

impl TestApp {
    /// App con cache en memoria y token de admin configurado
    pub fn new() -> Self {
        Self::build(Some(ADMIN_TOKEN), true)
    }

    pub fn build(admin_token: Option<&str>, cache_enabled: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let repository = Arc::new(InMemoryRepository::seeded());
        let cache = if cache_enabled {
            CacheClient::with_store(store.clone(), &CacheConfig::memory())
        } else {
            CacheClient::disabled()
        };
        let config = AppConfig {
            admin_api_token: admin_token.map(String::from),
            ..AppConfig::default()
        };

        let state = AppState::new(config, repository.clone(), cache);
        Self {
            router: create_router(state),
            store,
            repository,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: serde_json::Value) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
