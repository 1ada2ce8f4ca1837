// --- File: crates/citaflow_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! The scheduling core never talks to a mail server or task queue directly;
//! it requests delivery through [`NotificationService`] and lets the backend
//! decide the transport. These traits exist so implementations can be swapped
//! for tests.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for a boxed
/// `dyn std::error::Error + Send + Sync`.
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Events a client can be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationEvent {
    /// A new appointment was booked.
    AppointmentCreated,
    /// An appointment was cancelled by its owner.
    AppointmentCancelled,
}

/// Represents the result of a notification dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID the transport assigned to the message.
    pub id: String,
    /// The status reported by the transport.
    pub status: String,
}

/// A trait for notification dispatch.
///
/// Dispatch is fire-and-forget relative to the operation that triggers it:
/// the scheduling engine spawns the call and never lets a delivery failure
/// fail a booking or cancellation.
pub trait NotificationService: Send + Sync {
    /// Error type returned by notification operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Request that the given client be notified of an event.
    ///
    /// The payload carries event-specific data (appointment id, start time,
    /// attendance code); the implementation owns message construction and
    /// transport.
    fn notify(
        &self,
        client_id: Uuid,
        event: NotificationEvent,
        payload: serde_json::Value,
    ) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// A factory for creating service instances.
///
/// The backend implements this to hand the engine its collaborators; tests
/// implement it with stubs.
pub trait ServiceFactory: Send + Sync {
    /// Get a notification service instance, if one is configured.
    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>>;
}
