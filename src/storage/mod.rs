mod preferences;
mod schema;
mod types;

pub use preferences::{PreferenceStore, Unavailable};
pub use schema::Database;
pub use types::DatabaseError;
