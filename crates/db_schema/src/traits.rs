use crate::{
  newtypes::{CommunityId, PersonId},
  source::vote::{VoteCounts, VoteDirection, VoteTargetId},
};
use forum_diesel_utils::connection::DbPool;
use forum_utils::error::ForumResult;

#[async_trait]
pub trait Crud {
  type InsertForm;
  type IdType;
  async fn create(pool: &mut DbPool<'_>, form: &Self::InsertForm) -> ForumResult<Self>
  where
    Self: Sized;
  async fn read(pool: &mut DbPool<'_>, id: Self::IdType) -> ForumResult<Self>
  where
    Self: Sized;
  async fn delete(pool: &mut DbPool<'_>, id: Self::IdType) -> ForumResult<usize>
  where
    Self: Sized;
}

/// A row that carries like and dislike counters and can be voted on.
#[async_trait]
pub trait Votable {
  type IdType;

  fn vote_target_id(&self) -> VoteTargetId;
  /// The person whose reputation moves when this item is voted on.
  fn creator_id(&self) -> PersonId;
  fn community_id(&self) -> CommunityId;
  fn counts(&self) -> VoteCounts;

  /// Reads the row and locks it until the surrounding transaction ends. Every vote on the same
  /// item is serialized by this lock. The lock is `FOR NO KEY UPDATE`, so inserts that only
  /// reference the row through a foreign key are not blocked.
  async fn read_for_update(pool: &mut DbPool<'_>, id: Self::IdType) -> ForumResult<Self>
  where
    Self: Sized;

  /// Adds the deltas to the stored counters in a single statement. A counter never goes below
  /// zero.
  async fn adjust_counts(
    pool: &mut DbPool<'_>,
    id: Self::IdType,
    like_delta: i32,
    dislike_delta: i32,
  ) -> ForumResult<VoteCounts>
  where
    Self: Sized;
}

/// The vote ledger for one kind of target. At most one row exists per voter and item.
#[async_trait]
pub trait Likeable {
  type Form;
  type IdType;

  /// Fails with `DuplicateVote` when the voter already has a vote on the item.
  async fn like(pool: &mut DbPool<'_>, form: &Self::Form) -> ForumResult<Self>
  where
    Self: Sized;
  async fn read(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    item_id: Self::IdType,
  ) -> ForumResult<Option<Self>>
  where
    Self: Sized;
  /// Removes the vote only if it has the given direction. Returns the number of deleted rows.
  async fn remove_like(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    item_id: Self::IdType,
    direction: VoteDirection,
  ) -> ForumResult<usize>
  where
    Self: Sized;
  async fn count(
    pool: &mut DbPool<'_>,
    item_id: Self::IdType,
    direction: VoteDirection,
  ) -> ForumResult<i64>
  where
    Self: Sized;
}
