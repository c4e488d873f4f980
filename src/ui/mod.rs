pub mod record_tabs;
pub mod schema_view;
