use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower::ServiceExt; // for `oneshot`

use stall::{
    event::StatusBus,
    message::{repository::InMemoryMessageRepository, service::MessageService},
    room::service::{OccupancyConfig, OccupancyService},
    routes,
    websockets::serve_subscription,
    AppState, EventBus, SessionService, STATUS_CHANGED_TOPIC,
};

use super::mocks::{socket_pair, MockClient};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub event_bus: StatusBus,
    pub message_repository: Arc<InMemoryMessageRepository>,
    pub session_service: Arc<SessionService>,
    pub app: Router,
}

pub struct TestSetupBuilder {
    occupancy: OccupancyConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            occupancy: OccupancyConfig::default(),
        }
    }

    pub fn with_session_window(mut self, window: Duration, poll_interval: Duration) -> Self {
        self.occupancy = OccupancyConfig {
            session_window: window,
            poll_interval,
        };
        self
    }

    pub fn build(self) -> TestSetup {
        let event_bus = EventBus::new();
        let message_repository = Arc::new(InMemoryMessageRepository::new());
        let occupancy = OccupancyService::new(event_bus.clone(), self.occupancy);
        let session_service = Arc::new(SessionService::new(
            occupancy,
            MessageService::new(message_repository.clone()),
            event_bus.clone(),
        ));
        let app = routes::router(AppState::new(session_service.clone()));

        TestSetup {
            event_bus,
            message_repository,
            session_service,
            app,
        }
    }
}

impl TestSetup {
    /// Opens a status subscription the way the WebSocket endpoint does
    pub fn connect_subscriber(&self) -> (MockClient, JoinHandle<()>) {
        let (socket, client) = socket_pair();
        let updates = self.session_service.subscribe_status();
        let handle = tokio::spawn(serve_subscription(Box::new(socket), updates));
        (client, handle)
    }

    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count(STATUS_CHANGED_TOPIC)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.call(request).await
    }

    pub async fn post(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.call(request).await
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }
}
