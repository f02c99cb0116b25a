use federwerk_common::model::ModelValidationError;
use federwerk_common::model::auth::{HashedPassword, Session, SessionTokenHash};
use federwerk_common::model::comment::Comment;
use federwerk_common::model::post::{Post, PostDate};
use federwerk_common::model::user::{Email, User};
use time::UtcDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub age: i64,
    pub password: String,
}

/// A post row joined with its author.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub struct PostRecord {
    pub id: i64,
    pub date: String,
    pub title: String,
    pub body: String,
    pub author_id: i64,
    pub username: String,
    pub email: String,
    pub age: i64,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: i64,
    pub date: String,
    pub comment: String,
    pub author_id: i64,
    pub post_id: i64,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub struct SessionRecord {
    pub user_id: i64,
    pub token_hash: String,
    pub created_at: i64,
}

impl UserRecord {
    pub fn into_user(self) -> Result<User, ModelValidationError> {
        Ok(User {
            id: self.id.into(),
            username: self.username,
            email: Email::new(self.email)?,
            age: self.age,
        })
    }

    pub fn into_credentials(self) -> Result<(User, HashedPassword), ModelValidationError> {
        let password = HashedPassword::from_stored(self.password.clone());
        Ok((self.into_user()?, password))
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            date: PostDate::new(value.date)?,
            title: value.title,
            body: value.body,
            author: User {
                id: value.author_id.into(),
                username: value.username,
                email: Email::new(value.email)?,
                age: value.age,
            },
        })
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            date: PostDate::new(value.date)?,
            comment: value.comment,
            author: value.author_id.into(),
            post: value.post_id.into(),
        })
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = crate::client::DbError;

    fn try_from(value: SessionRecord) -> Result<Self, Self::Error> {
        let token_hash: SessionTokenHash = value
            .token_hash
            .parse()
            .map_err(ModelValidationError::from)?;

        Ok(Self {
            user: value.user_id.into(),
            token_hash,
            created_at: UtcDateTime::from_unix_timestamp(value.created_at)?,
        })
    }
}
