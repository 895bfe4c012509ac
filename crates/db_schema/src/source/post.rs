use crate::{
  newtypes::{CommunityId, PersonId, PostId},
  schema::post,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = post)]
#[diesel(check_for_backend(diesel::pg::Pg))]
/// A post.
pub struct Post {
  pub id: PostId,
  pub name: String,
  /// An optional post body, in markdown.
  pub body: Option<String>,
  pub creator_id: PersonId,
  pub community_id: CommunityId,
  /// Number of upvotes currently recorded for the post.
  pub like_count: i32,
  /// Number of downvotes currently recorded for the post.
  pub dislike_count: i32,
  pub published_at: DateTime<Utc>,
}

#[derive(Clone, Debug, derive_new::new, Insertable)]
#[diesel(table_name = post)]
pub struct PostInsertForm {
  pub name: String,
  pub creator_id: PersonId,
  pub community_id: CommunityId,
  #[new(default)]
  pub body: Option<String>,
  #[new(default)]
  pub published_at: Option<DateTime<Utc>>,
}
