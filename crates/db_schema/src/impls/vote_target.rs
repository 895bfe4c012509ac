use crate::{
  newtypes::{CommunityId, PersonId},
  source::{
    comment::Comment,
    post::Post,
    vote::{VoteCounts, VoteTarget, VoteTargetId},
  },
  traits::{Crud, Votable},
};
use forum_diesel_utils::connection::DbPool;
use forum_utils::error::ForumResult;
use tracing::warn;

impl VoteTarget {
  /// Loads the target from storage.
  pub async fn read(pool: &mut DbPool<'_>, target_id: VoteTargetId) -> ForumResult<Self> {
    Ok(match target_id {
      VoteTargetId::Post(post_id) => Post::read(pool, post_id).await?.into(),
      VoteTargetId::Comment(comment_id) => Comment::read(pool, comment_id).await?.into(),
    })
  }

  pub fn id(&self) -> VoteTargetId {
    match self {
      VoteTarget::Post(p) => p.vote_target_id(),
      VoteTarget::Comment(c) => c.vote_target_id(),
    }
  }

  pub fn creator_id(&self) -> PersonId {
    match self {
      VoteTarget::Post(p) => Votable::creator_id(p),
      VoteTarget::Comment(c) => Votable::creator_id(c),
    }
  }

  pub fn community_id(&self) -> CommunityId {
    match self {
      VoteTarget::Post(p) => Votable::community_id(p),
      VoteTarget::Comment(c) => Votable::community_id(c),
    }
  }

  pub fn counts(&self) -> VoteCounts {
    match self {
      VoteTarget::Post(p) => p.counts(),
      VoteTarget::Comment(c) => c.counts(),
    }
  }

  /// Re-reads the target and holds a row lock on it until the surrounding transaction ends.
  /// Fails with `NotFound` if the target was deleted in the meantime.
  pub async fn lock(&self, pool: &mut DbPool<'_>) -> ForumResult<Self> {
    Ok(match self {
      VoteTarget::Post(p) => Post::read_for_update(pool, p.id).await?.into(),
      VoteTarget::Comment(c) => Comment::read_for_update(pool, c.id).await?.into(),
    })
  }

  /// Applies the deltas to the stored counters and returns the new values.
  ///
  /// `self` should be the locked snapshot of the target. If a delta would take a counter below
  /// zero, the counter is clamped to zero and the anomaly is logged, since it means the counters
  /// and the vote ledger disagreed before this change.
  pub async fn adjust_counts(
    &self,
    pool: &mut DbPool<'_>,
    like_delta: i32,
    dislike_delta: i32,
  ) -> ForumResult<VoteCounts> {
    let current = self.counts();
    if current.like_count + like_delta < 0 || current.dislike_count + dislike_delta < 0 {
      warn!(
        "Vote counters of {:?} would go negative: likes {} + {}, dislikes {} + {}. Clamping to zero.",
        self.id(),
        current.like_count,
        like_delta,
        current.dislike_count,
        dislike_delta,
      );
    }

    match self {
      VoteTarget::Post(p) => Post::adjust_counts(pool, p.id, like_delta, dislike_delta).await,
      VoteTarget::Comment(c) => {
        Comment::adjust_counts(pool, c.id, like_delta, dislike_delta).await
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    newtypes::PostId,
    source::{
      community::{Community, CommunityInsertForm},
      person::{Person, PersonInsertForm},
      post::{Post, PostInsertForm},
      vote::{VoteCounts, VoteTarget, VoteTargetId},
    },
    traits::Crud,
  };
  use forum_diesel_utils::connection::build_db_pool_for_tests;
  use forum_utils::error::{ForumErrorType, ForumResult};
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  #[tokio::test]
  #[serial]
  async fn test_counter_maintenance() -> ForumResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let author = Person::create(pool, &PersonInsertForm::new("counter_author".into())).await?;
    let inserted_community = Community::create(
      pool,
      &CommunityInsertForm::new("test community_counter".into(), "nada".to_owned()),
    )
    .await?;
    let inserted_post = Post::create(
      pool,
      &PostInsertForm::new("A test post".into(), author.id, inserted_community.id),
    )
    .await?;

    let target = VoteTarget::read(pool, VoteTargetId::Post(inserted_post.id)).await?;
    assert_eq!(VoteTarget::Post(inserted_post.clone()), target);
    assert_eq!(author.id, target.creator_id());
    assert_eq!(inserted_community.id, target.community_id());

    let counts = target.adjust_counts(pool, 1, 0).await?;
    assert_eq!(VoteCounts::from((1, 0)), counts);

    let locked = target.lock(pool).await?;
    assert_eq!(counts, locked.counts());

    // The snapshot shows no dislikes, so this is clamped
    let counts = locked.adjust_counts(pool, -1, -1).await?;
    assert_eq!(VoteCounts::default(), counts);

    let missing = VoteTarget::read(pool, VoteTargetId::Post(PostId(-1))).await;
    assert!(matches!(
      missing.map_err(|e| e.error_type),
      Err(ForumErrorType::NotFound)
    ));

    Person::delete(pool, author.id).await?;
    Community::delete(pool, inserted_community.id).await?;

    Ok(())
  }
}
