//! Database layer: pool, migrations and repositories for PostgreSQL.

mod forms;
mod pool;
mod repositories;

pub use forms::*;
pub use pool::{create_pool, run_migrations, DbPool};
pub use repositories::*;
