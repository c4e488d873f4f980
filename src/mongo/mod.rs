pub mod bson_format;
pub mod connection;
pub mod records;
pub mod schema;

mod tests;
