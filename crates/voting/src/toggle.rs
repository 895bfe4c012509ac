use crate::{
  reputation::adjust_reputation,
  state::{VoteState, VoteTransition},
};
use diesel_async::scoped_futures::ScopedFutureExt;
use forum_db_schema::{
  newtypes::PersonId,
  source::vote::{VoteDirection, VoteRecord, VoteTarget},
};
use forum_diesel_utils::connection::{get_conn, DbPool};
use forum_utils::error::{ForumErrorType, ForumResult};
use tracing::{info, warn};

/// Upvotes the target, or clears the voter's upvote if they already upvoted it. Returns the
/// change in the author's reputation.
#[tracing::instrument(skip(pool, target), fields(target = ?target.id()))]
pub async fn toggle_up(
  pool: &mut DbPool<'_>,
  voter_id: PersonId,
  target: &VoteTarget,
) -> ForumResult<i32> {
  toggle(pool, voter_id, target, VoteDirection::Up).await
}

/// Downvotes the target, or clears the voter's downvote if they already downvoted it. Returns
/// the change in the author's reputation.
#[tracing::instrument(skip(pool, target), fields(target = ?target.id()))]
pub async fn toggle_down(
  pool: &mut DbPool<'_>,
  voter_id: PersonId,
  target: &VoteTarget,
) -> ForumResult<i32> {
  toggle(pool, voter_id, target, VoteDirection::Down).await
}

/// The implicit upvote an author gives a post or comment they just created. Fails with
/// `InvariantViolation` if the voter already has a vote on the target.
#[tracing::instrument(skip(pool, target), fields(target = ?target.id()))]
pub async fn create_voting(
  pool: &mut DbPool<'_>,
  voter_id: PersonId,
  target: &VoteTarget,
) -> ForumResult<i32> {
  let target = target.clone();
  let conn = &mut get_conn(pool).await?;
  conn
    .run_transaction(|conn| {
      async move {
        let pool = &mut conn.into();
        let target = target.lock(pool).await?;
        if let Some(existing) = VoteRecord::read(pool, voter_id, target.id()).await? {
          warn!(
            "Person {} already voted {} on {:?}, refusing the creation vote",
            voter_id,
            existing.direction,
            target.id()
          );
          Err(ForumErrorType::InvariantViolation)?
        }
        let transition = VoteState::NoVote.toggle(VoteDirection::Up);
        apply(pool, voter_id, &target, &transition).await?;
        Ok(transition.reputation_delta)
      }
      .scope_boxed()
    })
    .await
}

/// The voter's current vote on the target.
pub async fn vote_state(
  pool: &mut DbPool<'_>,
  voter_id: PersonId,
  target: &VoteTarget,
) -> ForumResult<VoteState> {
  let record = VoteRecord::read(pool, voter_id, target.id()).await?;
  Ok(VoteState::from(record.as_ref()))
}

async fn toggle(
  pool: &mut DbPool<'_>,
  voter_id: PersonId,
  target: &VoteTarget,
  direction: VoteDirection,
) -> ForumResult<i32> {
  let target = target.clone();
  let conn = &mut get_conn(pool).await?;
  conn
    .run_transaction(|conn| {
      async move {
        let pool = &mut conn.into();
        // Every vote on this target waits here until the previous one commits, so the state
        // read below is never stale.
        let target = target.lock(pool).await?;
        let record = VoteRecord::read(pool, voter_id, target.id()).await?;
        let transition = VoteState::from(record.as_ref()).toggle(direction);
        apply(pool, voter_id, &target, &transition).await?;
        info!(
          "Person {} moved from {} to {} on {:?}",
          voter_id,
          transition.from,
          transition.to,
          target.id()
        );
        Ok(transition.reputation_delta)
      }
      .scope_boxed()
    })
    .await
}

/// Writes a transition to the ledger, the target's counters and the author's reputation. Must
/// run inside the transaction that locked `target`.
async fn apply(
  pool: &mut DbPool<'_>,
  voter_id: PersonId,
  target: &VoteTarget,
  transition: &VoteTransition,
) -> ForumResult<()> {
  if let Some(direction) = transition.remove {
    if !VoteRecord::remove_vote(pool, voter_id, target.id(), direction).await? {
      warn!(
        "Expected a {} vote by person {} on {:?} but found none",
        direction,
        voter_id,
        target.id()
      );
      Err(ForumErrorType::InvariantViolation)?
    }
  }
  if let Some(direction) = transition.add {
    if let Err(e) = VoteRecord::add_vote(pool, voter_id, target, direction).await {
      if e.error_type == ForumErrorType::DuplicateVote {
        warn!(
          "Person {} already has a vote on {:?}, not adding a {} vote",
          voter_id,
          target.id(),
          direction
        );
      }
      return Err(e);
    }
  }

  target
    .adjust_counts(pool, transition.like_delta, transition.dislike_delta)
    .await?;
  adjust_reputation(
    pool,
    target.creator_id(),
    target.community_id(),
    transition.reputation_delta,
  )
  .await?;

  Ok(())
}
