use crate::{
  newtypes::{CommentId, CommunityId, PersonId},
  schema::comment,
  source::{
    comment::{Comment, CommentInsertForm},
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
impl Crud for Comment {
  type InsertForm = CommentInsertForm;
  type IdType = CommentId;

  async fn create(pool: &mut DbPool<'_>, form: &CommentInsertForm) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(comment::table)
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

  async fn read(pool: &mut DbPool<'_>, comment_id: CommentId) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(comment::table.find(comment_id).first(conn).await?)
  }

  async fn delete(pool: &mut DbPool<'_>, comment_id: CommentId) -> ForumResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(comment::table.find(comment_id))
        .execute(conn)
        .await?,
    )
  }
}

#[async_trait]
impl Votable for Comment {
  type IdType = CommentId;

  fn vote_target_id(&self) -> VoteTargetId {
    VoteTargetId::Comment(self.id)
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

  async fn read_for_update(pool: &mut DbPool<'_>, comment_id: CommentId) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      comment::table
        .find(comment_id)
        .for_no_key_update()
        .first(conn)
        .await?,
    )
  }

  async fn adjust_counts(
    pool: &mut DbPool<'_>,
    comment_id: CommentId,
    like_delta: i32,
    dislike_delta: i32,
  ) -> ForumResult<VoteCounts> {
    let conn = &mut get_conn(pool).await?;
    let counts = diesel::update(comment::table.find(comment_id))
      .set((
        comment::like_count.eq(greatest(comment::like_count + like_delta, 0)),
        comment::dislike_count.eq(greatest(comment::dislike_count + dislike_delta, 0)),
      ))
      .returning((comment::like_count, comment::dislike_count))
      .get_result::<(i32, i32)>(conn)
      .await?;
    Ok(counts.into())
  }
}
