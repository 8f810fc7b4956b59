pub mod airtable;
pub mod assemble;
pub mod driver;
pub mod errors;
pub mod input;
pub mod record;
pub mod schema;
pub mod store;
pub mod timestamp;
