use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::http::StatusCode;
use actix_web::{error, middleware, web, App, HttpResponse, HttpServer, Result};
use futures_util::stream;
use serde::Deserialize;
use tracing::info;

use crate::display::schedule_view;
use crate::error::{ActionOutcome, SlotError};
use crate::export::roster_csv;
use crate::registry::MySignups;
use crate::store::SlotStore;

const ADMIN_FLAG: &str = "is_admin";

pub struct AppState {
    pub store: SlotStore,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlotRequest {
    date: String,
    start_hour: u8,
    start_minute: u8,
    end_hour: u8,
    end_minute: u8,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    name: String,
}

/// The admin flag lives in the session cookie: set by a correct password,
/// gone when the browser session ends. Not persisted anywhere else, and not
/// a security boundary.
fn is_admin(session: &Session) -> bool {
    session
        .get::<bool>(ADMIN_FLAG)
        .ok()
        .flatten()
        .unwrap_or(false)
}

fn forbidden(message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ActionOutcome::failure(message))
}

fn error_response(err: SlotError) -> HttpResponse {
    let status = match err {
        SlotError::SlotNotFound => StatusCode::NOT_FOUND,
        SlotError::SlotExists | SlotError::AlreadySignedUp => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };
    HttpResponse::build(status).json(ActionOutcome::failure(err.to_string()))
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        session
            .insert(ADMIN_FLAG, true)
            .map_err(error::ErrorInternalServerError)?;
        Ok(HttpResponse::Ok().json(ActionOutcome::ok("Admin mode on")))
    } else {
        Ok(HttpResponse::Unauthorized().json(ActionOutcome::failure("Wrong password")))
    }
}

async fn admin_logout(session: Session) -> Result<HttpResponse> {
    session.remove(ADMIN_FLAG);
    Ok(HttpResponse::Ok().json(ActionOutcome::ok("Admin mode off")))
}

// Lets the page restore its admin controls after a reload
async fn session_info(session: Session) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "admin": is_admin(&session) })))
}

// Raw sorted snapshot of the collection
async fn get_slots(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.store.snapshot().await))
}

// Grouped schedule with per-device removability flags
async fn get_schedule(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let snapshot = state.store.snapshot().await;
    let mine = MySignups::load(&session);
    let sections = schedule_view(&snapshot, is_admin(&session), &mine);
    Ok(HttpResponse::Ok().json(sections))
}

// Pushes the full sorted snapshot as a `slots` server-sent event on every
// change. The payload is device-neutral; the page refetches /api/schedule
// for its decorated view when an event arrives.
async fn slot_events(state: web::Data<AppState>) -> Result<HttpResponse> {
    let subscription = state.store.subscribe().await;

    let events = stream::unfold(subscription, |mut sub| async move {
        let snapshot = sub.next().await?;
        let payload = serde_json::to_string(&snapshot).unwrap_or_else(|_| "[]".to_string());
        let frame = web::Bytes::from(format!("event: slots\ndata: {}\n\n", payload));
        Some((Ok::<_, actix_web::Error>(frame), sub))
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(events))
}

async fn create_slot(
    req: web::Json<NewSlotRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(forbidden("Admin only"));
    }

    match state
        .store
        .create_slot(
            &req.date,
            req.start_hour,
            req.start_minute,
            req.end_hour,
            req.end_minute,
        )
        .await
    {
        Ok(slot) => {
            info!(key = %slot.key, "slot created");
            Ok(HttpResponse::Ok().json(ActionOutcome::ok("Time slot added!")))
        }
        Err(err) => Ok(error_response(err)),
    }
}

async fn delete_slot(
    key: web::Path<String>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(forbidden("Admin only"));
    }

    state.store.remove_slot(&key).await;
    info!(key = %key.as_str(), "slot removed");
    Ok(HttpResponse::Ok().json(ActionOutcome::ok("Time slot removed")))
}

async fn clear_slots(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(forbidden("Admin only"));
    }

    state.store.clear_all().await;
    info!("all slots cleared");
    Ok(HttpResponse::Ok().json(ActionOutcome::ok("All slots cleared")))
}

async fn sign_up(
    key: web::Path<String>,
    req: web::Json<SignupRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Ok(error_response(SlotError::EmptyName));
    }

    match state.store.add_attendee(&key, name).await {
        Ok(()) => {
            // Record the name as this device's so it can be removed later
            let mut mine = MySignups::load(&session);
            mine.add(&key, name);
            mine.save(&session).map_err(error::ErrorInternalServerError)?;
            Ok(HttpResponse::Ok().json(ActionOutcome::ok(format!("{} signed up!", name))))
        }
        Err(err) => Ok(error_response(err)),
    }
}

async fn remove_attendee(
    path: web::Path<(String, String)>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (key, name) = path.into_inner();

    let mut mine = MySignups::load(&session);
    if !is_admin(&session) && !mine.contains(&key, &name) {
        return Ok(forbidden("You can only remove names added from this device"));
    }

    match state.store.remove_attendee(&key, &name).await {
        Ok(()) => {
            mine.remove(&key, &name);
            mine.save(&session).map_err(error::ErrorInternalServerError)?;
            Ok(HttpResponse::Ok().json(ActionOutcome::ok(format!("{} removed", name))))
        }
        Err(err) => Ok(error_response(err)),
    }
}

async fn export_roster(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(forbidden("Admin only"));
    }

    let snapshot = state.store.snapshot().await;
    let csv = roster_csv(&snapshot).map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(("Content-Disposition", "attachment; filename=\"roster.csv\""))
        .body(csv))
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Route table, shared between the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/login", web::post().to(admin_login))
        .route("/api/logout", web::post().to(admin_logout))
        .route("/api/session", web::get().to(session_info))
        .route("/api/slots", web::get().to(get_slots))
        .route("/api/slots", web::post().to(create_slot))
        .route("/api/slots", web::delete().to(clear_slots))
        .route("/api/slots/{key}", web::delete().to(delete_slot))
        .route("/api/slots/{key}/attendees", web::post().to(sign_up))
        .route(
            "/api/slots/{key}/attendees/{name}",
            web::delete().to(remove_attendee),
        )
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/events", web::get().to(slot_events))
        .route("/api/export", web::get().to(export_roster));
}

pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    // Served over plain HTTP on a local network, so the cookie cannot be
    // marked secure
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("slot-signups".to_string())
        .cookie_secure(false)
        .build()
}

pub async fn start_server(
    port: u16,
    admin_password: String,
    session_key: Key,
) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        store: SlotStore::new(),
        admin_password,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(session_middleware(session_key.clone()))
            .service(Files::new("/static", "static"))
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
