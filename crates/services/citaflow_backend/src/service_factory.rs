// --- File: crates/services/citaflow_backend/src/service_factory.rs ---
//! Service factory wiring for the backend.
//!
//! Hands the scheduling engine its external collaborators. The only
//! notification transport shipped here logs the dispatch; a mail or SMS
//! transport plugs in by implementing [`NotificationService`] and swapping it
//! in the factory.

use citaflow_common::services::{
    BoxFuture, BoxedError, NotificationEvent, NotificationResult, NotificationService,
    ServiceFactory,
};
use citaflow_config::AppConfig;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Notification transport that records dispatches in the log stream.
pub struct LoggingNotificationService;

impl NotificationService for LoggingNotificationService {
    type Error = BoxedError;

    fn notify(
        &self,
        client_id: Uuid,
        event: NotificationEvent,
        payload: serde_json::Value,
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        Box::pin(async move {
            info!(%client_id, ?event, %payload, "notification dispatched");
            Ok(NotificationResult {
                id: Uuid::new_v4().to_string(),
                status: "logged".to_string(),
            })
        })
    }
}

/// The backend's [`ServiceFactory`] implementation.
pub struct CitaflowServiceFactory {
    #[allow(dead_code)]
    config: Arc<AppConfig>,
    notification: Arc<dyn NotificationService<Error = BoxedError>>,
}

impl CitaflowServiceFactory {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            notification: Arc::new(LoggingNotificationService),
        }
    }
}

impl ServiceFactory for CitaflowServiceFactory {
    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>> {
        Some(self.notification.clone())
    }
}
