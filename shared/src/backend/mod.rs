pub mod backend;
pub mod backend_access;
pub mod backend_ref;
pub mod category;
pub mod error;
pub mod item_stack;
pub mod scan_provider;
