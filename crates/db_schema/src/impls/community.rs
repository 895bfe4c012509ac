use crate::{
  newtypes::{CommunityId, PersonId},
  schema::{community, community_member},
  source::community::{Community, CommunityInsertForm, CommunityMember, CommunityMemberForm},
  traits::Crud,
  utils::map_database_error,
};
use diesel::{
  dsl::{exists, insert_into},
  result::DatabaseErrorKind,
  select,
  ExpressionMethods,
  QueryDsl,
};
use diesel_async::RunQueryDsl;
use forum_diesel_utils::connection::{get_conn, DbPool};
use forum_utils::error::{ForumErrorType, ForumResult};
use tracing::info;

#[async_trait]
impl Crud for Community {
  type InsertForm = CommunityInsertForm;
  type IdType = CommunityId;

  async fn create(pool: &mut DbPool<'_>, form: &CommunityInsertForm) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      insert_into(community::table)
        .values(form)
        .get_result::<Self>(conn)
        .await?,
    )
  }

  async fn read(pool: &mut DbPool<'_>, community_id: CommunityId) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(community::table.find(community_id).first(conn).await?)
  }

  async fn delete(pool: &mut DbPool<'_>, community_id: CommunityId) -> ForumResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(community::table.find(community_id))
        .execute(conn)
        .await?,
    )
  }
}

impl CommunityMember {
  /// Returns the membership described by the form, creating it first if it doesn't exist yet.
  /// An existing membership is left untouched.
  pub async fn get_or_create(
    pool: &mut DbPool<'_>,
    form: &CommunityMemberForm,
  ) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    let inserted = insert_into(community_member::table)
      .values(form)
      .on_conflict((community_member::community_id, community_member::person_id))
      .do_nothing()
      .execute(conn)
      .await
      .map_err(|e| {
        map_database_error(
          e,
          DatabaseErrorKind::ForeignKeyViolation,
          ForumErrorType::NotFound,
        )
      })?;
    if inserted > 0 {
      info!(
        "Enrolled person {} in community {}",
        form.person_id, form.community_id
      );
    }

    Ok(
      community_member::table
        .find((form.community_id, form.person_id))
        .first(conn)
        .await?,
    )
  }

  pub async fn read(
    pool: &mut DbPool<'_>,
    community_id: CommunityId,
    person_id: PersonId,
  ) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      community_member::table
        .find((community_id, person_id))
        .first(conn)
        .await?,
    )
  }

  pub async fn is_member(
    pool: &mut DbPool<'_>,
    community_id: CommunityId,
    person_id: PersonId,
  ) -> ForumResult<bool> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      select(exists(
        community_member::table.find((community_id, person_id)),
      ))
      .get_result(conn)
      .await?,
    )
  }

  /// Adds `delta` to the reputation held in the community. The membership must exist.
  pub async fn adjust_reputation(
    pool: &mut DbPool<'_>,
    community_id: CommunityId,
    person_id: PersonId,
    delta: i32,
  ) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::update(community_member::table.find((community_id, person_id)))
        .set(community_member::reputation.eq(community_member::reputation + delta))
        .get_result::<Self>(conn)
        .await?,
    )
  }
}
