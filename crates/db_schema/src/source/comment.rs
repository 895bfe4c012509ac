use crate::{
  newtypes::{CommentId, CommunityId, PersonId, PostId},
  schema::comment,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = comment)]
#[diesel(check_for_backend(diesel::pg::Pg))]
/// A comment on a post, optionally replying to another comment.
pub struct Comment {
  pub id: CommentId,
  pub post_id: PostId,
  pub parent_id: Option<CommentId>,
  pub creator_id: PersonId,
  pub community_id: CommunityId,
  pub content: String,
  pub like_count: i32,
  pub dislike_count: i32,
  pub published_at: DateTime<Utc>,
}

#[derive(Clone, Debug, derive_new::new, Insertable)]
#[diesel(table_name = comment)]
pub struct CommentInsertForm {
  pub post_id: PostId,
  pub creator_id: PersonId,
  pub community_id: CommunityId,
  pub content: String,
  #[new(default)]
  pub parent_id: Option<CommentId>,
  #[new(default)]
  pub published_at: Option<DateTime<Utc>>,
}
