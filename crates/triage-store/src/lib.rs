mod migrations;
pub mod models;
mod store;

pub use models::{ChatMessage, Incident, NewIncident};
pub use store::IncidentStore;
