mod versioned_schema;

pub use versioned_schema::{
    is_empty_database, Column, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
};
