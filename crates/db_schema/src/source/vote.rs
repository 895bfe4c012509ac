use crate::{
  newtypes::{CommentId, PersonId, PostId},
  schema::{comment_vote, post_vote},
  source::{comment::Comment, post::Post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VoteDirection {
  Up,
  Down,
}

impl VoteDirection {
  pub fn from_upvote(vote_is_upvote: bool) -> Self {
    if vote_is_upvote {
      VoteDirection::Up
    } else {
      VoteDirection::Down
    }
  }

  pub fn is_upvote(self) -> bool {
    self == VoteDirection::Up
  }

  pub fn opposite(self) -> Self {
    match self {
      VoteDirection::Up => VoteDirection::Down,
      VoteDirection::Down => VoteDirection::Up,
    }
  }

  /// How much the target author's reputation moves when a vote in this direction is recorded.
  pub fn reputation_weight(self) -> i32 {
    match self {
      VoteDirection::Up => 1,
      VoteDirection::Down => -1,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum VoteTargetId {
  Post(PostId),
  Comment(CommentId),
}

/// The denormalized counters stored on a post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteCounts {
  pub like_count: i32,
  pub dislike_count: i32,
}

impl VoteCounts {
  /// Upvotes minus downvotes.
  pub fn score(&self) -> i32 {
    self.like_count - self.dislike_count
  }
}

impl From<(i32, i32)> for VoteCounts {
  fn from((like_count, dislike_count): (i32, i32)) -> Self {
    VoteCounts {
      like_count,
      dislike_count,
    }
  }
}

/// A post or comment that is being voted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteTarget {
  Post(Post),
  Comment(Comment),
}

impl From<Post> for VoteTarget {
  fn from(post: Post) -> Self {
    VoteTarget::Post(post)
  }
}

impl From<Comment> for VoteTarget {
  fn from(comment: Comment) -> Self {
    VoteTarget::Comment(comment)
  }
}

#[derive(PartialEq, Eq, Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(crate::source::post::Post))]
#[diesel(table_name = post_vote)]
#[diesel(primary_key(person_id, post_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostVote {
  pub person_id: PersonId,
  pub post_id: PostId,
  pub vote_is_upvote: bool,
  pub voted_at: DateTime<Utc>,
}

#[derive(Clone, derive_new::new, Insertable)]
#[diesel(table_name = post_vote)]
pub struct PostVoteForm {
  pub post_id: PostId,
  pub person_id: PersonId,
  pub vote_is_upvote: bool,
  #[new(value = "Utc::now()")]
  pub voted_at: DateTime<Utc>,
}

#[derive(PartialEq, Eq, Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(crate::source::comment::Comment))]
#[diesel(table_name = comment_vote)]
#[diesel(primary_key(person_id, comment_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentVote {
  pub person_id: PersonId,
  pub comment_id: CommentId,
  pub post_id: PostId,
  pub vote_is_upvote: bool,
  pub voted_at: DateTime<Utc>,
}

#[derive(Clone, derive_new::new, Insertable)]
#[diesel(table_name = comment_vote)]
pub struct CommentVoteForm {
  pub comment_id: CommentId,
  pub post_id: PostId,
  pub person_id: PersonId,
  pub vote_is_upvote: bool,
  #[new(value = "Utc::now()")]
  pub voted_at: DateTime<Utc>,
}

/// One voter's vote on one target, independent of the kind of target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
  pub person_id: PersonId,
  pub target: VoteTargetId,
  pub direction: VoteDirection,
  pub voted_at: DateTime<Utc>,
}

impl From<PostVote> for VoteRecord {
  fn from(vote: PostVote) -> Self {
    VoteRecord {
      person_id: vote.person_id,
      target: VoteTargetId::Post(vote.post_id),
      direction: VoteDirection::from_upvote(vote.vote_is_upvote),
      voted_at: vote.voted_at,
    }
  }
}

impl From<CommentVote> for VoteRecord {
  fn from(vote: CommentVote) -> Self {
    VoteRecord {
      person_id: vote.person_id,
      target: VoteTargetId::Comment(vote.comment_id),
      direction: VoteDirection::from_upvote(vote.vote_is_upvote),
      voted_at: vote.voted_at,
    }
  }
}
