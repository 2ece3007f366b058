//! Client core for the Aula institute backend.
//!
//! Pure domain logic (payment reconciliation, enrollment grouping, per-student aggregation)
//! sits beside the I/O pieces: a typed REST [`Gateway`], a persisted [`Session`] and one
//! controller per screen under [`views`]. A front-end builds a [`views::ViewContext`] once
//! and drives the controllers.

pub mod aggregation;
pub mod api;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod ids;
pub mod models;
pub mod months;
pub mod reconciliation;
pub mod scope;
pub mod session;
pub mod storage;
pub mod views;

pub use api::Gateway;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use months::YearMonth;
pub use scope::RequestScope;
pub use session::Session;

use std::path::Path;
use std::sync::Arc;

/// Open the persisted session under `data_dir` and wire a gateway and view context to it.
pub fn connect(config: ClientConfig, data_dir: impl AsRef<Path>) -> Result<views::ViewContext> {
    let session = Arc::new(Session::open(data_dir)?);
    let gateway = Arc::new(Gateway::new(config, session)?);
    Ok(views::ViewContext::new(gateway))
}
