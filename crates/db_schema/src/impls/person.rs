use crate::{
  newtypes::PersonId,
  schema::person,
  source::person::{Person, PersonInsertForm},
  traits::Crud,
};
use diesel::{dsl::insert_into, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use forum_diesel_utils::connection::{get_conn, DbPool};
use forum_utils::error::ForumResult;

#[async_trait]
impl Crud for Person {
  type InsertForm = PersonInsertForm;
  type IdType = PersonId;

  async fn create(pool: &mut DbPool<'_>, form: &PersonInsertForm) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      insert_into(person::table)
        .values(form)
        .get_result::<Self>(conn)
        .await?,
    )
  }

  async fn read(pool: &mut DbPool<'_>, person_id: PersonId) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(person::table.find(person_id).first(conn).await?)
  }

  async fn delete(pool: &mut DbPool<'_>, person_id: PersonId) -> ForumResult<usize> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::delete(person::table.find(person_id))
        .execute(conn)
        .await?,
    )
  }
}

impl Person {
  /// Adds `delta` to the global reputation in one statement, so concurrent adjustments never
  /// overwrite each other.
  pub async fn adjust_reputation(
    pool: &mut DbPool<'_>,
    person_id: PersonId,
    delta: i32,
  ) -> ForumResult<Self> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      diesel::update(person::table.find(person_id))
        .set(person::reputation.eq(person::reputation + delta))
        .get_result::<Self>(conn)
        .await?,
    )
  }

  pub async fn read_reputation(pool: &mut DbPool<'_>, person_id: PersonId) -> ForumResult<i32> {
    let conn = &mut get_conn(pool).await?;
    Ok(
      person::table
        .find(person_id)
        .select(person::reputation)
        .first(conn)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    newtypes::PersonId,
    source::person::{Person, PersonInsertForm},
    traits::Crud,
  };
  use forum_diesel_utils::connection::build_db_pool_for_tests;
  use forum_utils::error::{ForumErrorType, ForumResult};
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  #[tokio::test]
  #[serial]
  async fn test_crud() -> ForumResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let new_person = PersonInsertForm::new("holly".into());
    let inserted_person = Person::create(pool, &new_person).await?;

    let expected_person = Person {
      id: inserted_person.id,
      name: "holly".into(),
      reputation: 0,
      published_at: inserted_person.published_at,
    };

    let read_person = Person::read(pool, inserted_person.id).await?;
    let num_deleted = Person::delete(pool, inserted_person.id).await?;

    assert_eq!(expected_person, read_person);
    assert_eq!(expected_person, inserted_person);
    assert_eq!(1, num_deleted);

    let missing = Person::read(pool, inserted_person.id).await;
    assert!(matches!(
      missing.map_err(|e| e.error_type),
      Err(ForumErrorType::NotFound)
    ));

    Ok(())
  }

  #[tokio::test]
  #[serial]
  async fn test_adjust_reputation() -> ForumResult<()> {
    let pool = &build_db_pool_for_tests();
    let pool = &mut pool.into();

    let inserted_person = Person::create(pool, &PersonInsertForm::new("terry".into())).await?;

    Person::adjust_reputation(pool, inserted_person.id, 1).await?;
    Person::adjust_reputation(pool, inserted_person.id, -3).await?;
    let updated = Person::adjust_reputation(pool, inserted_person.id, 1).await?;
    assert_eq!(-1, updated.reputation);
    assert_eq!(-1, Person::read_reputation(pool, inserted_person.id).await?);

    let missing = Person::adjust_reputation(pool, PersonId(-1), 1).await;
    assert!(matches!(
      missing.map_err(|e| e.error_type),
      Err(ForumErrorType::NotFound)
    ));

    Person::delete(pool, inserted_person.id).await?;

    Ok(())
  }
}
