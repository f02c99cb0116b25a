use crate::model::Id;
use crate::model::post::{PostDate, PostMarker};
use crate::model::user::UserMarker;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

/// Comments are part of the schema and repository, but no route serves
/// them yet.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub date: PostDate,
    pub comment: String,
    pub author: Id<UserMarker>,
    pub post: Id<PostMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreateComment {
    pub date: PostDate,
    pub comment: String,
    pub author: Id<UserMarker>,
    pub post: Id<PostMarker>,
}
