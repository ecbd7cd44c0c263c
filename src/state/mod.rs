/// State management module
///
/// This module handles all application state, including:
/// - The persisted session document (session.rs)
/// - The immutable image catalog for the open folder (catalog.rs)
/// - Pagination math over the catalog (pagination.rs)

pub mod catalog;
pub mod pagination;
pub mod session;

pub use catalog::Catalog;
pub use session::SessionState;
