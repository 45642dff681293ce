//! Transceiver handlers

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::api_ok;
use axum::{
    extract::{Path, State},
    Json,
};
use dbmvtx_core::api::{ApiResponse, SfpEventsResponse, SfpPresenceResponse};
use dbmvtx_core::PlatformError;

use tracing::debug;

/// Reports whether a module is plugged into a port.
///
/// # Endpoint
///
/// `GET /api/v0/sfp/:port`
///
/// # Path Parameters
///
/// - `port` - 0-based port index
pub(crate) async fn get_presence(
    State(state): State<AppState>,
    Path(port): Path<usize>,
) -> Result<Json<ApiResponse<SfpPresenceResponse>>, ApiError> {
    debug!("Request: GET /api/v0/sfp/{}", port);

    let presence = state
        .with_chassis(move |chassis| {
            let count = chassis.num_sfps();
            chassis
                .sfp(port)
                .map(|sfp| sfp.presence())
                .ok_or(PlatformError::OutOfRange {
                    kind: "SFP",
                    index: port,
                    count,
                })
        })
        .await??;

    api_ok!(SfpPresenceResponse {
        port,
        present: presence
    })
}

/// Lists the insertion/removal events recorded by the transceiver monitor,
/// oldest first.
///
/// # Endpoint
///
/// `GET /api/v0/sfp/events`
pub(crate) async fn get_events(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SfpEventsResponse>>, ApiError> {
    debug!("Request: GET /api/v0/sfp/events");

    api_ok!(SfpEventsResponse {
        events: state.events.snapshot()
    })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_json, TestApp};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use dbmvtx_core::{PortEvents, PresenceCode};
    use tower::ServiceExt;

    async fn get(app: &TestApp, uri: &str) -> Response {
        app.router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_presence() {
        let app = TestApp::new();

        let json = body_json(get(&app, "/api/v0/sfp/4").await.into_body()).await;
        assert_eq!(json["data"]["port"], 4);
        assert_eq!(json["data"]["present"], true);

        let json = body_json(get(&app, "/api/v0/sfp/5").await.into_body()).await;
        assert_eq!(json["data"]["present"], false);
    }

    #[tokio::test]
    async fn test_presence_out_of_range() {
        let app = TestApp::new();
        let response = get(&app, "/api/v0/sfp/32").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response.into_body()).await;
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_invalid_port() {
        let app = TestApp::new();
        let response = get(&app, "/api/v0/sfp/first").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_events() {
        let app = TestApp::new();
        let json = body_json(get(&app, "/api/v0/sfp/events").await.into_body()).await;
        assert!(json["data"]["events"].as_array().unwrap().is_empty());

        app.state.events.record(
            &PortEvents::from([(11, PresenceCode::Removed), (12, PresenceCode::Inserted)]),
            1_700_000_000_000,
        );

        let json = body_json(get(&app, "/api/v0/sfp/events").await.into_body()).await;
        let events = json["data"]["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["port"], 11);
        assert_eq!(events[0]["event"], "0");
        assert_eq!(events[1]["event"], "1");
    }
}
