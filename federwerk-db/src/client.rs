use crate::record::{CommentRecord, PostRecord, SessionRecord, UserRecord};
use crate::schema::{Dialect, statements};
use federwerk_common::model::auth::{HashedPassword, Session, SessionTokenHash};
use federwerk_common::model::comment::{Comment, CommentMarker, CreateComment};
use federwerk_common::model::post::{CreatePost, Post, PostMarker};
use federwerk_common::model::user::{CreateUser, Email, User, UserMarker};
use federwerk_common::model::{Id, ModelValidationError};
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, query, query_as, query_scalar};
use std::sync::Once;
use thiserror::Error;

static INSTALL_DRIVERS: Once = Once::new();

/// Registers the compiled-in `Any` drivers. The registry accepts only one
/// installation per process, so every pool construction funnels through
/// this.
pub fn install_drivers() {
    INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
}

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("A stored timestamp was out of range: {0}")]
    Timestamp(#[from] time::error::ComponentRange),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Repository over the shared connection pool. Constructed once at
/// startup and passed down explicitly; there is no process-global handle.
pub struct DbClient {
    pool: AnyPool,
    dialect: Dialect,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: AnyPool, dialect: Dialect) -> Self {
        Self { pool, dialect }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        install_drivers();

        let pool = AnyPoolOptions::new().max_connections(5).connect(url).await?;

        Ok(Self::new(pool, Dialect::of(url)))
    }

    /// Creates missing tables. Idempotent.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in statements(self.dialect) {
            query(&statement).execute(&self.pool).await?;
        }

        Ok(())
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT id, username, email, age, password
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(UserRecord::into_user).transpose()?;
        Ok(user)
    }

    /// Looks up a user with the stored password hash, for credential
    /// verification at login.
    pub async fn fetch_user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, HashedPassword)>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT id, username, email, age, password
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.get())
        .fetch_optional(&self.pool)
        .await?;

        let credentials = record.map(UserRecord::into_credentials).transpose()?;
        Ok(credentials)
    }

    pub async fn create_user(&self, user: &CreateUser) -> Result<Id<UserMarker>> {
        let id = query_scalar::<_, i64>(
            "
            INSERT INTO users (username, email, age, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&user.username)
        .bind(user.email.get())
        .bind(user.age)
        .bind(user.password.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(id.into())
    }

    pub async fn update_username(&self, user_id: Id<UserMarker>, username: &str) -> Result<()> {
        query("UPDATE users SET username = $1 WHERE id = $2")
            .bind(username)
            .bind(user_id.get())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(
            "
            SELECT
                posts.id, posts.date, posts.title, posts.body, posts.author_id,
                users.username, users.email, users.age
            FROM posts JOIN users ON users.id = posts.author_id
            WHERE posts.id = $1
            ",
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    /// All posts in insertion order, each joined with its author.
    pub async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(
            "
            SELECT
                posts.id, posts.date, posts.title, posts.body, posts.author_id,
                users.username, users.email, users.age
            FROM posts JOIN users ON users.id = posts.author_id
            ORDER BY posts.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    pub async fn fetch_user_posts(&self, author: Id<UserMarker>) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(
            "
            SELECT
                posts.id, posts.date, posts.title, posts.body, posts.author_id,
                users.username, users.email, users.age
            FROM posts JOIN users ON users.id = posts.author_id
            WHERE posts.author_id = $1
            ORDER BY posts.id
            ",
        )
        .bind(author.get())
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    pub async fn create_post(&self, post: &CreatePost) -> Result<Id<PostMarker>> {
        let id = query_scalar::<_, i64>(
            "
            INSERT INTO posts (date, title, body, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(post.date.get())
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.author.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(id.into())
    }

    /// Reports whether a row was actually deleted, so callers can turn a
    /// missing post into a clean not-found instead of silently succeeding.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let result = query("DELETE FROM posts WHERE id = $1")
            .bind(post_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn create_comment(&self, comment: &CreateComment) -> Result<Id<CommentMarker>> {
        let id = query_scalar::<_, i64>(
            "
            INSERT INTO comments (date, comment, author_id, post_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(comment.date.get())
        .bind(&comment.comment)
        .bind(comment.author.get())
        .bind(comment.post.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(id.into())
    }

    pub async fn fetch_post_comments(&self, post: Id<PostMarker>) -> Result<Vec<Comment>> {
        let records = query_as::<_, CommentRecord>(
            "
            SELECT id, date, comment, author_id, post_id
            FROM comments
            WHERE post_id = $1
            ORDER BY id
            ",
        )
        .bind(post.get())
        .fetch_all(&self.pool)
        .await?;

        let comments = records
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<_, _>>()?;
        Ok(comments)
    }

    pub async fn fetch_user_comments(&self, author: Id<UserMarker>) -> Result<Vec<Comment>> {
        let records = query_as::<_, CommentRecord>(
            "
            SELECT id, date, comment, author_id, post_id
            FROM comments
            WHERE author_id = $1
            ORDER BY id
            ",
        )
        .bind(author.get())
        .fetch_all(&self.pool)
        .await?;

        let comments = records
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<_, _>>()?;
        Ok(comments)
    }

    pub async fn create_session(&self, session: &Session) -> Result<()> {
        query(
            "
            INSERT INTO sessions (user_id, token_hash, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(session.user.get())
        .bind(session.token_hash.encoded())
        .bind(session.created_at.unix_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn fetch_session(&self, token_hash: &SessionTokenHash) -> Result<Option<Session>> {
        let record = query_as::<_, SessionRecord>(
            "
            SELECT user_id, token_hash, created_at
            FROM sessions
            WHERE token_hash = $1
            ",
        )
        .bind(token_hash.encoded())
        .fetch_optional(&self.pool)
        .await?;

        let session = record.map(Session::try_from).transpose()?;
        Ok(session)
    }

    pub async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<()> {
        query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash.encoded())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
