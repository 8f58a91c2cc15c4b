//! HTTP surface. Every protected route names the (action, resource) it
//! requires at registration time; at request time the decision gate resolves
//! the session to a principal and the handler receives it on allow.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::authz::types::{AccountKind, Action, Module, OrgModule, Principal, Resource};
use crate::authz::{directory, gate, AuthzError};
use crate::errors::AppError;
use crate::session::SessionToken;
use crate::settings::Settings;
use crate::storage;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
}

/// Web-layer error: either a structured authorization refusal or a plain
/// application failure.
pub enum ApiError {
    Authz(AuthzError),
    App(AppError),
}

impl From<AuthzError> for ApiError {
    fn from(e: AuthzError) -> Self {
        ApiError::Authz(e)
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError::App(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Authz(e) => e.into_response(),
            ApiError::App(e) => {
                let status = match &e {
                    AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
                    AppError::NotFound(_) => StatusCode::NOT_FOUND,
                    _ => {
                        tracing::error!(error = %e, "request failed");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, Json(json!({ "error": e.to_string() }))).into_response()
            }
        }
    }
}

pub async fn serve(settings: Settings, db: DatabaseConnection) -> miette::Result<()> {
    let state = AppState {
        settings: Arc::new(settings),
        db,
    };

    let addr: SocketAddr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    )
    .parse()
    .into_diagnostic()?;

    let router = router(state);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    axum::serve(listener, router).await.into_diagnostic()?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/whoami", get(whoami))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/mine", get(my_notes))
        .route(
            "/notes/{id}",
            get(get_note).patch(update_note).delete(delete_note),
        )
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/users/{id}/groups", axum::routing::put(set_user_groups))
        .route(
            "/organizations",
            get(list_organizations).post(create_organization),
        )
        .route(
            "/organizations/{id}",
            get(get_organization).delete(delete_organization),
        )
        .route("/admins/{id}/groups", axum::routing::put(set_admin_groups))
        .route(
            "/admin/permissions",
            get(list_admin_permissions).post(create_admin_permission),
        )
        .route(
            "/admin/permissions/{id}",
            axum::routing::delete(delete_admin_permission),
        )
        .route(
            "/admin/permission-groups",
            get(list_admin_groups).post(create_admin_group),
        )
        .route(
            "/admin/permission-groups/{id}",
            axum::routing::put(update_admin_group).delete(delete_admin_group),
        )
        .route(
            "/organization/permissions",
            get(list_org_permissions).post(create_org_permission),
        )
        .route(
            "/organization/permissions/{id}",
            axum::routing::delete(delete_org_permission),
        )
        .route(
            "/organization/permission-groups",
            get(list_org_groups).post(create_org_group),
        )
        .route(
            "/organization/permission-groups/{id}",
            axum::routing::put(update_org_group).delete(delete_org_group),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Organization scope of a principal: organizations are their own scope,
/// users belong to one, platform admins see everything.
fn org_scope(principal: &Principal) -> Option<&str> {
    match principal {
        Principal::Organization(o) => Some(&o.id),
        Principal::User(u) => Some(&u.organization_id),
        Principal::Admin(_) => None,
    }
}

fn principal_json(principal: &Principal) -> Value {
    match principal {
        Principal::Admin(a) => json!({
            "id": a.id,
            "kind": "admin",
            "first_name": a.first_name,
            "last_name": a.last_name,
            "email": a.email,
            "role": a.role,
        }),
        Principal::Organization(o) => json!({
            "id": o.id,
            "kind": "organization",
            "name": o.name,
            "email": o.email,
        }),
        Principal::User(u) => json!({
            "id": u.id,
            "kind": "user",
            "first_name": u.first_name,
            "last_name": u.last_name,
            "email": u.email,
            "role": u.role,
            "organization_id": u.organization_id,
        }),
    }
}

// Authentication

#[derive(Deserialize)]
struct LoginRequest {
    kind: AccountKind,
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let account_id = storage::verify_login(&state.db, req.kind, &req.email, &req.password)
        .await?
        .ok_or_else(|| AppError::BadRequest("invalid credentials".to_string()))?;

    let session = storage::create_session(
        &state.db,
        &account_id,
        req.kind,
        state.settings.sessions.ttl_secs,
    )
    .await?;

    let cookie = SessionToken::new(session.session_id.clone());
    let body = json!({
        "token": session.session_id,
        "account_id": session.account_id,
        "kind": session.account_kind,
        "expires_at": session.expires_at,
    });

    Ok((
        [(header::SET_COOKIE, cookie.to_cookie_header(&state.settings))],
        Json(body),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(token) = SessionToken::from_headers(&headers) {
        storage::delete_session(&state.db, &token.session_id).await?;
    }
    Ok((
        [(header::SET_COOKIE, SessionToken::delete_cookie_header())],
        Json(json!({ "ok": true })),
    )
        .into_response())
}

async fn whoami(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let (kind, account_id) = gate::session_context(&state.db, &headers).await?;
    let principal = directory::resolve(&state.db, kind, &account_id).await?;
    Ok(Json(principal_json(&principal)))
}

// Notes

#[derive(Deserialize)]
struct CreateNoteRequest {
    title: String,
    content: String,
}

#[derive(Deserialize)]
struct UpdateNoteRequest {
    title: Option<String>,
    content: Option<String>,
}

async fn list_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Org(OrgModule::Note),
    )
    .await?;

    let notes = match org_scope(&principal) {
        Some(org_id) => storage::list_notes_for_org(&state.db, org_id).await?,
        None => storage::list_notes(&state.db).await?,
    };
    Ok(Json(json!({ "notes": notes })))
}

async fn my_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    // Authorship is sufficient here: a base user denied by the engine still
    // reads the notes they wrote.
    let account_id = match gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Org(OrgModule::Note),
    )
    .await
    {
        Ok(principal) => principal.id().to_string(),
        Err(AuthzError::PermissionDenied { .. }) => {
            let (kind, account_id) = gate::session_context(&state.db, &headers).await?;
            if kind != AccountKind::User {
                return Err(AuthzError::PermissionDenied {
                    action: Action::Read,
                    resource: Resource::Org(OrgModule::Note),
                }
                .into());
            }
            directory::resolve(&state.db, kind, &account_id).await?;
            account_id
        }
        Err(e) => return Err(e.into()),
    };

    let notes = storage::list_notes_for_author(&state.db, &account_id).await?;
    Ok(Json(json!({ "notes": notes })))
}

async fn create_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Create,
        Resource::Org(OrgModule::Note),
    )
    .await?;

    let organization_id = org_scope(&principal)
        .ok_or_else(|| {
            AppError::BadRequest("notes must be created by an organization-scoped account".into())
        })?
        .to_string();

    let note = storage::create_note(
        &state.db,
        storage::NewNote {
            title: req.title,
            content: req.content,
            author_id: principal.id().to_string(),
            organization_id,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(json!(note))))
}

/// Guard a single-note operation. The engine hard-denies base users; per the
/// user policy contract, the ownership check (author == caller) is performed
/// here at the resource layer after that denial.
async fn note_access(
    state: &AppState,
    headers: &HeaderMap,
    action: Action,
    note: &crate::entities::note::Model,
) -> Result<Principal, ApiError> {
    let principal = match gate::require(
        &state.db,
        headers,
        action,
        Resource::Org(OrgModule::Note),
    )
    .await
    {
        Ok(p) => p,
        Err(AuthzError::PermissionDenied { action, resource }) => {
            let (kind, account_id) = gate::session_context(&state.db, headers).await?;
            if kind == AccountKind::User && note.author_id == account_id {
                directory::resolve(&state.db, kind, &account_id).await?
            } else {
                return Err(AuthzError::PermissionDenied { action, resource }.into());
            }
        }
        Err(e) => return Err(e.into()),
    };

    // Tenant isolation: org-scoped principals only see their own notes.
    if let Some(scope) = org_scope(&principal) {
        if note.organization_id != scope {
            return Err(AppError::NotFound(format!("note {}", note.id)).into());
        }
    }
    Ok(principal)
}

async fn get_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let note = storage::get_note(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("note {}", id)))?;
    note_access(&state, &headers, Action::Read, &note).await?;
    Ok(Json(json!(note)))
}

async fn update_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let note = storage::get_note(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("note {}", id)))?;
    note_access(&state, &headers, Action::Update, &note).await?;

    let updated = storage::update_note(&state.db, &id, req.title, req.content).await?;
    Ok(Json(json!(updated)))
}

async fn delete_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let note = storage::get_note(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("note {}", id)))?;
    note_access(&state, &headers, Action::Delete, &note).await?;

    storage::delete_note(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Organization user roster

#[derive(Deserialize)]
struct CreateUserRequest {
    first_name: String,
    last_name: String,
    email: String,
    #[serde(default)]
    phone: String,
    password: String,
    role: crate::authz::types::UserRole,
    /// Required when the caller is a platform admin; otherwise inferred from
    /// the caller's organization.
    organization_id: Option<String>,
}

#[derive(Deserialize)]
struct SetGroupsRequest {
    group_ids: Vec<String>,
}

async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Org(OrgModule::User),
    )
    .await?;

    let users: Vec<Value> = match org_scope(&principal) {
        Some(org_id) => storage::list_users_for_org(&state.db, org_id).await?,
        None => storage::list_users(&state.db).await?,
    }
    .iter()
    .map(|u| principal_json(&Principal::User(u.clone())))
    .collect();
    Ok(Json(json!({ "users": users })))
}

async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Create,
        Resource::Org(OrgModule::User),
    )
    .await?;

    let organization_id = match org_scope(&principal) {
        Some(org_id) => org_id.to_string(),
        None => req.organization_id.clone().ok_or_else(|| {
            AppError::BadRequest("organization_id is required for platform callers".into())
        })?,
    };

    let user = storage::create_user(
        &state.db,
        storage::NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            password: req.password,
            role: req.role,
            organization_id,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(principal_json(&Principal::User(user))),
    ))
}

async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Org(OrgModule::User),
    )
    .await?;

    let user = storage::get_user(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;

    if let Some(scope) = org_scope(&principal) {
        if user.organization_id != scope {
            return Err(AppError::NotFound(format!("user {}", id)).into());
        }
    }
    Ok(Json(principal_json(&Principal::User(user))))
}

async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Delete,
        Resource::Org(OrgModule::User),
    )
    .await?;

    let user = storage::get_user(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
    if let Some(scope) = org_scope(&principal) {
        if user.organization_id != scope {
            return Err(AppError::NotFound(format!("user {}", id)).into());
        }
    }

    storage::delete_user(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_user_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<SetGroupsRequest>,
) -> Result<Json<Value>, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Update,
        Resource::Org(OrgModule::User),
    )
    .await?;

    storage::set_user_groups(&state.db, &id, &req.group_ids).await?;
    Ok(Json(json!({ "ok": true })))
}

// Organizations (platform module)

#[derive(Deserialize)]
struct CreateOrganizationRequest {
    name: String,
    email: String,
    #[serde(default)]
    phone: String,
    password: String,
}

async fn list_organizations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Platform(Module::Organization),
    )
    .await?;

    let orgs: Vec<Value> = storage::list_organizations(&state.db)
        .await?
        .iter()
        .map(|o| principal_json(&Principal::Organization(o.clone())))
        .collect();
    Ok(Json(json!({ "organizations": orgs })))
}

async fn create_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Create,
        Resource::Platform(Module::Organization),
    )
    .await?;

    let org = storage::create_organization(
        &state.db,
        storage::NewOrganization {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(principal_json(&Principal::Organization(org))),
    ))
}

async fn get_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Platform(Module::Organization),
    )
    .await?;

    let org = storage::get_organization(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("organization {}", id)))?;
    Ok(Json(principal_json(&Principal::Organization(org))))
}

async fn delete_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Delete,
        Resource::Platform(Module::Organization),
    )
    .await?;

    if !storage::delete_organization(&state.db, &id).await? {
        return Err(AppError::NotFound(format!("organization {}", id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// Platform permission catalog (admin side)

#[derive(Deserialize)]
struct CreateAdminPermissionRequest {
    action: Action,
    module: Module,
}

#[derive(Deserialize)]
struct CreateGroupRequest {
    name: String,
    #[serde(default)]
    permission_ids: Vec<String>,
}

#[derive(Deserialize)]
struct UpdateGroupRequest {
    permission_ids: Vec<String>,
}

async fn set_admin_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<SetGroupsRequest>,
) -> Result<Json<Value>, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Update,
        Resource::Platform(Module::Permission),
    )
    .await?;

    storage::set_admin_groups(&state.db, &id, &req.group_ids).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn list_admin_permissions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Platform(Module::Permission),
    )
    .await?;

    let permissions = storage::list_admin_permissions(&state.db).await?;
    Ok(Json(json!({ "permissions": permissions })))
}

async fn create_admin_permission(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAdminPermissionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Create,
        Resource::Platform(Module::Permission),
    )
    .await?;

    let perm = storage::create_admin_permission(&state.db, req.action, req.module).await?;
    Ok((StatusCode::CREATED, Json(json!(perm))))
}

async fn delete_admin_permission(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Delete,
        Resource::Platform(Module::Permission),
    )
    .await?;

    if !storage::delete_admin_permission(&state.db, &id).await? {
        return Err(AppError::NotFound(format!("permission {}", id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_admin_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Platform(Module::Permission),
    )
    .await?;

    let groups = storage::list_admin_groups(&state.db).await?;
    Ok(Json(json!({ "groups": groups })))
}

async fn create_admin_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Create,
        Resource::Platform(Module::Permission),
    )
    .await?;

    let group = storage::create_admin_group(&state.db, &req.name, &req.permission_ids).await?;
    Ok((StatusCode::CREATED, Json(json!(group))))
}

async fn update_admin_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Value>, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Update,
        Resource::Platform(Module::Permission),
    )
    .await?;

    storage::update_admin_group_permissions(&state.db, &id, &req.permission_ids).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn delete_admin_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Delete,
        Resource::Platform(Module::Permission),
    )
    .await?;

    if !storage::delete_admin_group(&state.db, &id).await? {
        return Err(AppError::NotFound(format!("group {}", id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

// Organization permission catalog

#[derive(Deserialize)]
struct CreateOrgPermissionRequest {
    action: Action,
    module: OrgModule,
    /// Required when the caller is a platform admin.
    organization_id: Option<String>,
}

#[derive(Deserialize)]
struct CreateOrgGroupRequest {
    name: String,
    #[serde(default)]
    permission_ids: Vec<String>,
    organization_id: Option<String>,
}

/// Query-string scope for platform callers on org-catalog listings;
/// org-scoped callers never need it.
#[derive(Deserialize, Default)]
struct OrgScopeQuery {
    organization_id: Option<String>,
}

fn resolve_org_id(principal: &Principal, explicit: Option<String>) -> Result<String, ApiError> {
    match org_scope(principal) {
        Some(org_id) => Ok(org_id.to_string()),
        None => explicit.ok_or_else(|| {
            AppError::BadRequest("organization_id is required for platform callers".into()).into()
        }),
    }
}

async fn list_org_permissions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(scope): Query<OrgScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Org(OrgModule::OrgPermission),
    )
    .await?;

    let org_id = resolve_org_id(&principal, scope.organization_id)?;
    let permissions = storage::list_org_permissions(&state.db, &org_id).await?;
    Ok(Json(json!({ "permissions": permissions })))
}

async fn create_org_permission(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateOrgPermissionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Create,
        Resource::Org(OrgModule::OrgPermission),
    )
    .await?;

    let org_id = resolve_org_id(&principal, req.organization_id)?;
    let perm = storage::create_org_permission(&state.db, &org_id, req.action, req.module).await?;
    Ok((StatusCode::CREATED, Json(json!(perm))))
}

async fn delete_org_permission(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Delete,
        Resource::Org(OrgModule::OrgPermission),
    )
    .await?;

    if !storage::delete_org_permission(&state.db, &id).await? {
        return Err(AppError::NotFound(format!("permission {}", id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_org_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(scope): Query<OrgScopeQuery>,
) -> Result<Json<Value>, ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Read,
        Resource::Org(OrgModule::OrgPermission),
    )
    .await?;

    let org_id = resolve_org_id(&principal, scope.organization_id)?;
    let groups = storage::list_org_groups(&state.db, &org_id).await?;
    Ok(Json(json!({ "groups": groups })))
}

async fn create_org_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateOrgGroupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let principal = gate::require(
        &state.db,
        &headers,
        Action::Create,
        Resource::Org(OrgModule::OrgPermission),
    )
    .await?;

    let org_id = resolve_org_id(&principal, req.organization_id)?;
    let group =
        storage::create_org_group(&state.db, &org_id, &req.name, &req.permission_ids).await?;
    Ok((StatusCode::CREATED, Json(json!(group))))
}

async fn update_org_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Value>, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Update,
        Resource::Org(OrgModule::OrgPermission),
    )
    .await?;

    storage::update_org_group_permissions(&state.db, &id, &req.permission_ids).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn delete_org_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    gate::require(
        &state.db,
        &headers,
        Action::Delete,
        Resource::Org(OrgModule::OrgPermission),
    )
    .await?;

    if !storage::delete_org_group(&state.db, &id).await? {
        return Err(AppError::NotFound(format!("group {}", id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
