//! Tool handlers.
//!
//! - `fetch_api_data`: mock external API fetches
//! - `calculate_math`: arithmetic over numbers or an expression
//! - `query_database`: lookups over an in-memory dataset

pub mod api;
pub mod database;
pub mod expression;
pub mod math;

pub use api::ApiTool;
pub use database::DatabaseTool;
pub use math::MathTool;

use crate::capability::{Handler, RegistryBuilder};
use crate::config::Config;
use crate::error::RegistryError;

/// Registers every tool, in listing order.
///
/// # Errors
///
/// Returns an error if a tool name is already registered.
pub fn register(builder: &mut RegistryBuilder, config: &Config) -> Result<(), RegistryError> {
    builder
        .add(Handler::tool(ApiTool::new(&config.api)))?
        .add(Handler::tool(MathTool))?
        .add(Handler::tool(DatabaseTool::new()))?;
    Ok(())
}
