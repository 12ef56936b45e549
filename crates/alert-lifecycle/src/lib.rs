//! Alert lifecycle management.
//!
//! Tracks the active alert set per patient, turns detector verdicts into
//! trigger/update/resolve transitions, and publishes every transition on a
//! broadcast channel for downstream consumers. Notification policies that
//! rewrite an alert for delivery live in [`decorate`].

pub mod decorate;
pub mod events;
pub mod manager;

mod tests;

pub use decorate::{decorate, AlertPolicy};
pub use events::{AlertEvent, Transition};
pub use manager::AlertManager;
