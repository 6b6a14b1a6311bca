pub mod files;
pub mod show_context;
