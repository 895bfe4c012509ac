use crate::{
  newtypes::{CommentId, PersonId, PostId},
  schema::{comment_vote, post_vote},
  source::vote::{
    CommentVote,
    CommentVoteForm,
    PostVote,
    PostVoteForm,
    VoteDirection,
    VoteRecord,
    VoteTarget,
    VoteTargetId,
  },
  traits::Likeable,
  utils::map_database_error,
};
use diesel::{
  dsl::insert_into,
  result::{DatabaseErrorKind, Error as DieselError},
  ExpressionMethods,
  OptionalExtension,
  QueryDsl,
};
use diesel_async::RunQueryDsl;
use forum_diesel_utils::connection::{get_conn, DbPool};
use forum_utils::error::{ForumError, ForumErrorType, ForumResult};

/// The primary key of the vote tables allows one row per voter and target.
fn map_insert_error(e: DieselError) -> ForumError {
  match e {
    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => map_database_error(
      e,
      DatabaseErrorKind::UniqueViolation,
      ForumErrorType::DuplicateVote,
    ),
    e => map_database_error(
      e,
      DatabaseErrorKind::ForeignKeyViolation,
      ForumErrorType::NotFound,
    ),
  }
}

#[async_trait]
impl Likeable for PostVote {
  type Form = PostVoteForm;
  type IdType = PostId;

  async fn like(pool: &mut DbPool<'_>, form: &PostVoteForm) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(post_vote::table)
      .values(form)
      .get_result::<Self>(conn)
      .await
      .map_err(map_insert_error)
  }

  async fn read(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    post_id: PostId,
  ) -> ForumResult<Option<Self>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      post_vote::table
        .find((person_id, post_id))
        .first(conn)
        .await
        .optional()?,
    )
  }

  async fn remove_like(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    post_id: PostId,
    direction: VoteDirection,
  ) -> ForumResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(
        post_vote::table
          .find((person_id, post_id))
          .filter(post_vote::vote_is_upvote.eq(direction.is_upvote())),
      )
      .execute(conn)
      .await?,
    )
  }

  async fn count(
    pool: &mut DbPool<'_>,
    post_id: PostId,
    direction: VoteDirection,
  ) -> ForumResult<i64> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      post_vote::table
        .filter(post_vote::post_id.eq(post_id))
        .filter(post_vote::vote_is_upvote.eq(direction.is_upvote()))
        .count()
        .get_result(conn)
        .await?,
    )
  }
}

#[async_trait]
impl Likeable for CommentVote {
  type Form = CommentVoteForm;
  type IdType = CommentId;

  async fn like(pool: &mut DbPool<'_>, form: &CommentVoteForm) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    insert_into(comment_vote::table)
      .values(form)
      .get_result::<Self>(conn)
      .await
      .map_err(map_insert_error)
  }

  async fn read(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    comment_id: CommentId,
  ) -> ForumResult<Option<Self>> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      comment_vote::table
        .find((person_id, comment_id))
        .first(conn)
        .await
        .optional()?,
    )
  }

  async fn remove_like(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    comment_id: CommentId,
    direction: VoteDirection,
  ) -> ForumResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(
        comment_vote::table
          .find((person_id, comment_id))
          .filter(comment_vote::vote_is_upvote.eq(direction.is_upvote())),
      )
      .execute(conn)
      .await?,
    )
  }

  async fn count(
    pool: &mut DbPool<'_>,
    comment_id: CommentId,
    direction: VoteDirection,
  ) -> ForumResult<i64> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      comment_vote::table
        .filter(comment_vote::comment_id.eq(comment_id))
        .filter(comment_vote::vote_is_upvote.eq(direction.is_upvote()))
        .count()
        .get_result(conn)
        .await?,
    )
  }
}

impl VoteRecord {
  pub async fn read(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    target: VoteTargetId,
  ) -> ForumResult<Option<Self>> {
    Ok(match target {
      VoteTargetId::Post(post_id) => PostVote::read(pool, person_id, post_id)
        .await?
        .map(Into::into),
      VoteTargetId::Comment(comment_id) => CommentVote::read(pool, person_id, comment_id)
        .await?
        .map(Into::into),
    })
  }

  pub async fn has_vote(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    target: VoteTargetId,
    direction: VoteDirection,
  ) -> ForumResult<bool> {
    let vote = Self::read(pool, person_id, target).await?;
    Ok(vote.is_some_and(|v| v.direction == direction))
  }

  /// Deletes the voter's vote if it points in `direction`. Returns whether a vote was deleted.
  pub async fn remove_vote(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    target: VoteTargetId,
    direction: VoteDirection,
  ) -> ForumResult<bool> {
    let removed = match target {
      VoteTargetId::Post(post_id) => {
        PostVote::remove_like(pool, person_id, post_id, direction).await?
      }
      VoteTargetId::Comment(comment_id) => {
        CommentVote::remove_like(pool, person_id, comment_id, direction).await?
      }
    };
    Ok(removed > 0)
  }

  /// Records a new vote. Fails with `DuplicateVote` if the voter already voted on the target,
  /// in either direction.
  pub async fn add_vote(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    target: &VoteTarget,
    direction: VoteDirection,
  ) -> ForumResult<Self> {
    Ok(match target {
      VoteTarget::Post(post) => {
        let form = PostVoteForm::new(post.id, person_id, direction.is_upvote());
        PostVote::like(pool, &form).await?.into()
      }
      VoteTarget::Comment(comment) => {
        let form =
          CommentVoteForm::new(comment.id, comment.post_id, person_id, direction.is_upvote());
        CommentVote::like(pool, &form).await?.into()
      }
    })
  }

  /// The number of recorded votes in `direction` on the target.
  pub async fn count(
    pool: &mut DbPool<'_>,
    target: VoteTargetId,
    direction: VoteDirection,
  ) -> ForumResult<i64> {
    match target {
      VoteTargetId::Post(post_id) => PostVote::count(pool, post_id, direction).await,
      VoteTargetId::Comment(comment_id) => CommentVote::count(pool, comment_id, direction).await,
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    newtypes::PersonId,
    source::{
      comment::{Comment, CommentInsertForm},
      community::{Community, CommunityInsertForm},
      person::{Person, PersonInsertForm},
      post::{Post, PostInsertForm},
      vote::{VoteDirection, VoteRecord, VoteTarget, VoteTargetId},
    },
    traits::Crud,
  };
  use forum_diesel_utils::connection::build_db_pool_for_tests;
  use forum_utils::error::{ForumErrorType, ForumResult};
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  #[tokio::test]
  #[serial]
  async fn test_post_ledger() -> ForumResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let author = Person::create(pool, &PersonInsertForm::new("ledger_author".into())).await?;
    let voter = Person::create(pool, &PersonInsertForm::new("ledger_voter".into())).await?;
    let inserted_community = Community::create(
      pool,
      &CommunityInsertForm::new("test community_ledger".into(), "nada".to_owned()),
    )
    .await?;
    let inserted_post = Post::create(
      pool,
      &PostInsertForm::new("A test post".into(), author.id, inserted_community.id),
    )
    .await?;
    let target = VoteTarget::Post(inserted_post.clone());
    let target_id = VoteTargetId::Post(inserted_post.id);

    assert_eq!(None, VoteRecord::read(pool, voter.id, target_id).await?);

    let vote = VoteRecord::add_vote(pool, voter.id, &target, VoteDirection::Up).await?;
    assert_eq!(voter.id, vote.person_id);
    assert_eq!(target_id, vote.target);
    assert_eq!(VoteDirection::Up, vote.direction);

    assert!(VoteRecord::has_vote(pool, voter.id, target_id, VoteDirection::Up).await?);
    assert!(!VoteRecord::has_vote(pool, voter.id, target_id, VoteDirection::Down).await?);
    assert_eq!(1, VoteRecord::count(pool, target_id, VoteDirection::Up).await?);
    assert_eq!(0, VoteRecord::count(pool, target_id, VoteDirection::Down).await?);

    // A second vote by the same person is rejected, whatever its direction
    let duplicate = VoteRecord::add_vote(pool, voter.id, &target, VoteDirection::Down).await;
    assert!(matches!(
      duplicate.map_err(|e| e.error_type),
      Err(ForumErrorType::DuplicateVote)
    ));

    // Removing in the wrong direction leaves the vote alone
    assert!(!VoteRecord::remove_vote(pool, voter.id, target_id, VoteDirection::Down).await?);
    assert!(VoteRecord::remove_vote(pool, voter.id, target_id, VoteDirection::Up).await?);
    assert!(!VoteRecord::remove_vote(pool, voter.id, target_id, VoteDirection::Up).await?);
    assert_eq!(None, VoteRecord::read(pool, voter.id, target_id).await?);

    // Voters must exist
    let missing = VoteRecord::add_vote(pool, PersonId(-1), &target, VoteDirection::Up).await;
    assert!(matches!(
      missing.map_err(|e| e.error_type),
      Err(ForumErrorType::NotFound)
    ));

    Person::delete(pool, author.id).await?;
    Person::delete(pool, voter.id).await?;
    Community::delete(pool, inserted_community.id).await?;

    Ok(())
  }

  #[tokio::test]
  #[serial]
  async fn test_comment_ledger() -> ForumResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let author = Person::create(pool, &PersonInsertForm::new("comment_author".into())).await?;
    let voter = Person::create(pool, &PersonInsertForm::new("comment_voter".into())).await?;
    let inserted_community = Community::create(
      pool,
      &CommunityInsertForm::new("test community_comment_ledger".into(), "nada".to_owned()),
    )
    .await?;
    let inserted_post = Post::create(
      pool,
      &PostInsertForm::new("A test post".into(), author.id, inserted_community.id),
    )
    .await?;
    let inserted_comment = Comment::create(
      pool,
      &CommentInsertForm::new(
        inserted_post.id,
        author.id,
        inserted_community.id,
        "A test comment".into(),
      ),
    )
    .await?;
    let target = VoteTarget::Comment(inserted_comment.clone());
    let target_id = VoteTargetId::Comment(inserted_comment.id);

    VoteRecord::add_vote(pool, voter.id, &target, VoteDirection::Down).await?;
    VoteRecord::add_vote(pool, author.id, &target, VoteDirection::Down).await?;
    assert_eq!(2, VoteRecord::count(pool, target_id, VoteDirection::Down).await?);

    // Votes on the comment are not votes on its post
    let post_target = VoteTargetId::Post(inserted_post.id);
    assert_eq!(None, VoteRecord::read(pool, voter.id, post_target).await?);

    assert!(VoteRecord::remove_vote(pool, voter.id, target_id, VoteDirection::Down).await?);
    assert_eq!(1, VoteRecord::count(pool, target_id, VoteDirection::Down).await?);

    Person::delete(pool, author.id).await?;
    Person::delete(pool, voter.id).await?;
    Community::delete(pool, inserted_community.id).await?;

    Ok(())
  }
}
