use diesel_async::scoped_futures::ScopedFutureExt;
use forum_db_schema::{
  newtypes::{CommunityId, PersonId},
  source::{
    community::{CommunityMember, CommunityMemberForm},
    person::Person,
  },
};
use forum_diesel_utils::connection::{get_conn, DbPool};
use forum_utils::error::ForumResult;
use tracing::debug;

/// A person's reputation in one community and across the whole site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reputation {
  pub community: i32,
  pub global: i32,
}

/// Makes the person a member of the community if they aren't one yet. Memberships created
/// here don't follow the community.
pub async fn auto_enroll(
  pool: &mut DbPool<'_>,
  person_id: PersonId,
  community_id: CommunityId,
) -> ForumResult<CommunityMember> {
  let form = CommunityMemberForm {
    following: Some(false),
    ..CommunityMemberForm::new(community_id, person_id)
  };
  CommunityMember::get_or_create(pool, &form).await
}

/// Moves the person's community reputation and global reputation by `delta`, enrolling them in
/// the community first when needed. Both counters change or neither does.
#[tracing::instrument(skip(pool))]
pub async fn adjust_reputation(
  pool: &mut DbPool<'_>,
  person_id: PersonId,
  community_id: CommunityId,
  delta: i32,
) -> ForumResult<Reputation> {
  let conn = &mut get_conn(pool).await?;
  conn
    .run_transaction(|conn| {
      async move {
        let pool = &mut conn.into();
        auto_enroll(pool, person_id, community_id).await?;
        let member =
          CommunityMember::adjust_reputation(pool, community_id, person_id, delta).await?;
        let person = Person::adjust_reputation(pool, person_id, delta).await?;
        debug!(
          "Reputation of person {} is now {} in community {}, {} overall",
          person_id, member.reputation, community_id, person.reputation
        );
        Ok(Reputation {
          community: member.reputation,
          global: person.reputation,
        })
      }
      .scope_boxed()
    })
    .await
}

pub async fn read_reputation(
  pool: &mut DbPool<'_>,
  person_id: PersonId,
  community_id: CommunityId,
) -> ForumResult<Reputation> {
  let global = Person::read_reputation(pool, person_id).await?;
  let community = if CommunityMember::is_member(pool, community_id, person_id).await? {
    CommunityMember::read(pool, community_id, person_id)
      .await?
      .reputation
  } else {
    0
  };
  Ok(Reputation { community, global })
}
