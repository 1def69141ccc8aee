use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use super::admin::{check_auth, require_setup};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::catalog::group_by_category;
use crate::models::{CategoryGroup, Service, ServiceCategory, Staff};
use crate::state::AppState;

fn non_empty(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

// GET /api/admin/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ServiceCategory>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db();
    Ok(Json(queries::list_categories(&db)?))
}

// POST /api/admin/categories
#[derive(Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<ServiceCategory>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let category = ServiceCategory {
        id: uuid::Uuid::new_v4().to_string(),
        name: non_empty(&body.name, "name")?,
        sort_order: body.sort_order,
    };
    {
        let db = state.db();
        queries::insert_category(&db, &category)?;
    }
    tracing::info!(id = %category.id, name = %category.name, "service category created");
    Ok(Json(category))
}

// GET /api/admin/services
#[derive(Deserialize)]
pub struct ServicesQuery {
    pub category: Option<String>,
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ServicesQuery>,
) -> Result<Json<Vec<CategoryGroup>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let (categories, services) = {
        let db = state.db();
        (
            queries::list_categories(&db)?,
            queries::list_services(&db, query.category.as_deref())?,
        )
    };

    let mut groups = group_by_category(&categories, services);
    if query.category.is_some() {
        groups.retain(|g| !g.services.is_empty());
    }
    Ok(Json(groups))
}

// POST /api/admin/services, PUT /api/admin/services/:id
#[derive(Deserialize)]
pub struct ServiceRequest {
    pub name: String,
    pub category_id: Option<String>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

fn save_service(state: &AppState, id: String, body: ServiceRequest) -> Result<Service, AppError> {
    if body.duration_minutes <= 0 {
        return Err(AppError::BadRequest("duration_minutes must be positive".to_string()));
    }
    if body.price_cents < 0 {
        return Err(AppError::BadRequest("price_cents must not be negative".to_string()));
    }

    let service = Service {
        id,
        name: non_empty(&body.name, "name")?,
        category_id: body.category_id.filter(|c| !c.is_empty()),
        duration_minutes: body.duration_minutes,
        price_cents: body.price_cents,
        active: body.active,
    };
    let db = state.db();
    if let Some(category_id) = &service.category_id {
        let known = queries::list_categories(&db)?
            .iter()
            .any(|c| &c.id == category_id);
        if !known {
            return Err(AppError::BadRequest(format!("unknown category {category_id}")));
        }
    }
    queries::save_service(&db, &service)?;
    Ok(service)
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ServiceRequest>,
) -> Result<Json<Service>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let service = save_service(&state, uuid::Uuid::new_v4().to_string(), body)?;
    tracing::info!(id = %service.id, name = %service.name, "service created");
    Ok(Json(service))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ServiceRequest>,
) -> Result<Json<Service>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let exists = {
        let db = state.db();
        queries::get_service(&db, &id)?.is_some()
    };
    if !exists {
        return Err(AppError::NotFound(format!("service {id}")));
    }
    Ok(Json(save_service(&state, id, body)?))
}

// GET /api/admin/staff
#[derive(Deserialize)]
pub struct StaffQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<StaffQuery>,
) -> Result<Json<Vec<Staff>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db();
    Ok(Json(queries::list_staff(&db, query.active_only)?))
}

// POST /api/admin/staff
#[derive(Deserialize)]
pub struct StaffRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<StaffRequest>,
) -> Result<Json<Staff>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let email = non_empty(&body.email, "email")?;
    if !email.contains('@') {
        return Err(AppError::BadRequest(format!("invalid email {email:?}")));
    }
    let staff = Staff {
        id: uuid::Uuid::new_v4().to_string(),
        name: non_empty(&body.name, "name")?,
        email,
        phone: body.phone.filter(|p| !p.trim().is_empty()),
        active: true,
    };
    {
        let db = state.db();
        queries::insert_staff(&db, &staff)?;
    }
    tracing::info!(id = %staff.id, name = %staff.name, "staff member added");
    Ok(Json(staff))
}

// POST /api/admin/staff/:id/active
#[derive(Deserialize)]
pub struct StaffActiveRequest {
    pub active: bool,
}

pub async fn set_staff_active(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StaffActiveRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let updated = {
        let db = state.db();
        queries::set_staff_active(&db, &id, body.active)?
    };
    if updated {
        Ok(Json(serde_json::json!({"ok": true, "active": body.active})))
    } else {
        Err(AppError::NotFound(format!("staff {id}")))
    }
}
