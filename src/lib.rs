pub mod config;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use models::{AckRequest, BatchQuery, ChangeConsentRequest};
pub use routes::create_router;
pub use state::AppState;
