//! Table definitions, created at startup if absent. No migrations.

/// Storage backend, decided from the connection URL scheme. The DDL for
/// auto-incrementing primary keys differs between the two.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    #[must_use]
    pub fn of(url: &str) -> Self {
        if url.starts_with("sqlite") {
            Dialect::Sqlite
        } else {
            Dialect::Postgres
        }
    }

    fn id_column(self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::Postgres => "BIGSERIAL PRIMARY KEY",
        }
    }
}

/// DDL statements in dependency order.
#[must_use]
pub fn statements(dialect: Dialect) -> [String; 4] {
    let id = dialect.id_column();

    [
        format!(
            "
            CREATE TABLE IF NOT EXISTS users (
                id {id},
                username TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                age BIGINT NOT NULL,
                password TEXT NOT NULL
            )
            "
        ),
        format!(
            "
            CREATE TABLE IF NOT EXISTS posts (
                id {id},
                date TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                author_id BIGINT NOT NULL REFERENCES users (id)
            )
            "
        ),
        format!(
            "
            CREATE TABLE IF NOT EXISTS comments (
                id {id},
                date TEXT NOT NULL,
                comment TEXT NOT NULL,
                author_id BIGINT NOT NULL REFERENCES users (id),
                post_id BIGINT NOT NULL REFERENCES posts (id)
            )
            "
        ),
        format!(
            "
            CREATE TABLE IF NOT EXISTS sessions (
                id {id},
                user_id BIGINT NOT NULL REFERENCES users (id),
                token_hash TEXT NOT NULL UNIQUE,
                created_at BIGINT NOT NULL
            )
            "
        ),
    ]
}
