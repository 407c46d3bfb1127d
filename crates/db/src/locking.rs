//! Row locking that degrades gracefully on backends without `FOR UPDATE`.

use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, QuerySelect, Select};

/// Adds `FOR UPDATE` when the backend supports row locks.
///
/// SQLite serializes writers at the database level, so the plain select is
/// already safe there.
pub(crate) fn for_update<E, C>(select: Select<E>, conn: &C) -> Select<E>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    match conn.get_database_backend() {
        DbBackend::Sqlite => select,
        _ => select.lock_exclusive(),
    }
}
