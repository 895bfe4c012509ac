use crate::{newtypes::PersonId, schema::person};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = person)]
#[diesel(check_for_backend(diesel::pg::Pg))]
/// A person who can author posts and comments, and vote on them.
pub struct Person {
  pub id: PersonId,
  pub name: String,
  /// The sum of the votes received on everything this person authored, across all communities.
  pub reputation: i32,
  pub published_at: DateTime<Utc>,
}

#[derive(Clone, derive_new::new, Insertable)]
#[diesel(table_name = person)]
pub struct PersonInsertForm {
  pub name: String,
  #[new(default)]
  pub published_at: Option<DateTime<Utc>>,
}
