// --- File: crates/citaflow_scheduling/src/lib.rs ---
// Declare modules within this crate
pub mod availability;
#[cfg(test)]
mod availability_test;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod codes;
pub mod doc;
pub mod engine;
pub mod handlers;
pub mod ledger;
pub mod lifecycle;
pub mod models;
pub mod routes;
#[cfg(test)]
mod routes_test;
#[cfg(test)]
mod scheduling_proptest;
pub mod store;

pub use engine::{SchedulingEngine, SchedulingSettings};
pub use models::{Appointment, AppointmentStatus, Client, Office, Service};
pub use store::{memory::InMemoryStore, SchedulingStore};
