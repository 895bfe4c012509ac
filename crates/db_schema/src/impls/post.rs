use crate::{
  newtypes::{CommunityId, PersonId, PostId},
  schema::post,
  source::{
    post::{Post, PostInsertForm},
    vote::{VoteCounts, VoteTargetId},
  },
  traits::{Crud, Votable},
  utils::{functions::greatest, map_database_error},
};
use diesel::{dsl::insert_into, result::DatabaseErrorKind, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use forum_diesel_utils::connection::{get_conn, DbPool};
use forum_utils::error::{ForumErrorType, ForumResult};

#[async_trait]
impl Crud for Post {
  type InsertForm = PostInsertForm;
  type IdType = PostId;

  async fn create(pool: &mut DbPool<'_>, form: &PostInsertForm) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(post::table)
      .values(form)
      .get_result::<Self>(conn)
      .await
      .map_err(|e| {
        map_database_error(
          e,
          DatabaseErrorKind::ForeignKeyViolation,
          ForumErrorType::NotFound,
        )
      })
  }

  async fn read(pool: &mut DbPool<'_>, post_id: PostId) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(post::table.find(post_id).first(conn).await?)
  }

  async fn delete(pool: &mut DbPool<'_>, post_id: PostId) -> ForumResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(diesel::delete(post::table.find(post_id)).execute(conn).await?)
  }
}

#[async_trait]
impl Votable for Post {
  type IdType = PostId;

  fn vote_target_id(&self) -> VoteTargetId {
    VoteTargetId::Post(self.id)
  }

  fn creator_id(&self) -> PersonId {
    self.creator_id
  }

  fn community_id(&self) -> CommunityId {
    self.community_id
  }

  fn counts(&self) -> VoteCounts {
    VoteCounts {
      like_count: self.like_count,
      dislike_count: self.dislike_count,
    }
  }

  async fn read_for_update(pool: &mut DbPool<'_>, post_id: PostId) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(post::table.find(post_id).for_no_key_update().first(conn).await?)
  }

  async fn adjust_counts(
    pool: &mut DbPool<'_>,
    post_id: PostId,
    like_delta: i32,
    dislike_delta: i32,
  ) -> ForumResult<VoteCounts> {
    let conn = &mut get_conn(pool).await?;
    let counts = diesel::update(post::table.find(post_id))
      .set((
        post::like_count.eq(greatest(post::like_count + like_delta, 0)),
        post::dislike_count.eq(greatest(post::dislike_count + dislike_delta, 0)),
      ))
      .returning((post::like_count, post::dislike_count))
      .get_result::<(i32, i32)>(conn)
      .await?;
    Ok(counts.into())
  }
}
