//! Scheduling API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! REST routes are nested under `/api/`, the slot stream lives at `/ws/slots`.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::core_state::CoreState;

/// Build the scheduling router.
pub fn scheduling_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/slot-catalog", get(endpoints::slots::catalog))
        .route(
            "/counsellors/:id/availability",
            get(endpoints::availability::get).put(endpoints::availability::put),
        )
        .route("/counsellors/:id/slots", get(endpoints::slots::resolve))
        .route(
            "/counsellors/:id/appointments",
            get(endpoints::appointments::for_counsellor),
        )
        .route(
            "/students/:id/appointments",
            get(endpoints::appointments::for_student),
        )
        .route("/appointments", post(endpoints::appointments::book))
        .route("/appointments/:id", delete(endpoints::appointments::cancel))
        .with_state(ctx.clone())
        // Slot lists go stale the moment someone books.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let ws_routes = Router::new()
        .route("/ws/slots", get(websocket::ws_upgrade))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .merge(ws_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_core() -> Arc<CoreState> {
        Arc::new(CoreState::in_memory().unwrap())
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(core: &Arc<CoreState>, req: Request<Body>) -> (StatusCode, Value) {
        let response = scheduling_router(core.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn booking(time: &str) -> Value {
        json!({
            "counsellor_id": "c-1",
            "counsellor_name": "Dr. Okafor",
            "student_id": "s-1",
            "date": "2024-01-01",
            "time": time,
            "reason": "exam stress"
        })
    }

    #[tokio::test]
    async fn health_ok() {
        let core = test_core();
        let response = scheduling_router(core)
            .oneshot(request("GET", "/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], true);
    }

    #[tokio::test]
    async fn unknown_counsellor_has_empty_availability() {
        let core = test_core();
        let (status, json) = send(&core, request("GET", "/api/counsellors/c-9/availability", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["counsellor_id"], "c-9");
        assert_eq!(json["availability"], json!({}));
    }

    #[tokio::test]
    async fn put_then_get_availability() {
        let core = test_core();
        let template = json!({"Monday": ["09:00 AM", "10:00 AM"], "Friday": ["02:00 PM"]});
        let (status, _) = send(
            &core,
            request("PUT", "/api/counsellors/c-1/availability", Some(template.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = send(&core, request("GET", "/api/counsellors/c-1/availability", None)).await;
        assert_eq!(json["availability"], template);
    }

    #[tokio::test]
    async fn put_drops_malformed_days() {
        let core = test_core();
        let body = json!({"Monday": ["09:00 AM", 7], "Someday": ["10:00 AM"], "Tuesday": "x"});
        let (status, json) =
            send(&core, request("PUT", "/api/counsellors/c-1/availability", Some(body))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["availability"], json!({"Monday": ["09:00 AM"]}));
    }

    #[tokio::test]
    async fn slots_exclude_bookings() {
        let core = test_core();
        send(
            &core,
            request(
                "PUT",
                "/api/counsellors/c-1/availability",
                Some(json!({"Monday": ["09:00 AM", "10:00 AM", "11:00 AM"]})),
            ),
        )
        .await;
        let (status, _) = send(&core, request("POST", "/api/appointments", Some(booking("10:00 AM")))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) =
            send(&core, request("GET", "/api/counsellors/c-1/slots?date=2024-01-01", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["slots"], json!(["09:00 AM", "11:00 AM"]));
        assert_eq!(json["degraded"], false);

        let (_, json) =
            send(&core, request("GET", "/api/counsellors/c-1/slots?date=2024-01-02", None)).await;
        assert_eq!(json["slots"], json!([]));
    }

    #[tokio::test]
    async fn slots_without_date_are_empty() {
        let core = test_core();
        let (status, json) = send(&core, request("GET", "/api/counsellors/c-1/slots", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["slots"], json!([]));
    }

    #[tokio::test]
    async fn slots_reject_bad_date() {
        let core = test_core();
        let (status, json) =
            send(&core, request("GET", "/api/counsellors/c-1/slots?date=Monday", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn book_list_and_cancel() {
        let core = test_core();
        let (_, created) = send(&core, request("POST", "/api/appointments", Some(booking("11:00 AM")))).await;
        send(&core, request("POST", "/api/appointments", Some(booking("09:00 AM")))).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (_, listed) = send(&core, request("GET", "/api/counsellors/c-1/appointments", None)).await;
        let times: Vec<&str> = listed["appointments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["time"].as_str().unwrap())
            .collect();
        assert_eq!(times, ["09:00 AM", "11:00 AM"]);

        let (_, on_day) = send(
            &core,
            request("GET", "/api/counsellors/c-1/appointments?date=2024-01-02", None),
        )
        .await;
        assert!(on_day["appointments"].as_array().unwrap().is_empty());

        let (_, student) = send(&core, request("GET", "/api/students/s-1/appointments", None)).await;
        assert_eq!(student["appointments"].as_array().unwrap().len(), 2);

        let (status, cancelled) =
            send(&core, request("DELETE", &format!("/api/appointments/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["time"], "11:00 AM");

        let (status, _) = send(&core, request("DELETE", &format!("/api/appointments/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn book_requires_time() {
        let core = test_core();
        let (status, json) = send(&core, request("POST", "/api/appointments", Some(booking("")))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn cancel_rejects_malformed_id() {
        let core = test_core();
        let (status, _) = send(&core, request("DELETE", "/api/appointments/not-a-uuid", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn catalog_lists_slots_and_days() {
        let core = test_core();
        let (status, json) = send(&core, request("GET", "/api/slot-catalog", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["slots"].as_array().unwrap().len(), 6);
        assert_eq!(json["days"][0], "Sunday");
        assert_eq!(json["days"][6], "Saturday");
    }
}
