mod models;
mod null_writer;
mod queries;
mod schema;
mod store;
mod trait_def;

pub use models::*;
pub use null_writer::NullWarehouseWriter;
pub use queries::{latest_query_set, ConflictPolicy, QuerySet, WriteTemplate, QUERY_SET_V_0};
pub use schema::{
    latest_schema, TABLE_ARTISTS, TABLE_SONGPLAYS, TABLE_SONGS, TABLE_TIME, TABLE_USERS,
    WAREHOUSE_VERSIONED_SCHEMAS,
};
pub use store::{UnitOfWork, UnitRollback, Warehouse};
pub use trait_def::WarehouseWriter;
