pub mod document_handlers;
pub mod health_handlers;
pub mod store_handlers;
