use crate::{
  newtypes::{CommunityId, PersonId},
  schema::{community, community_member},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = community)]
#[diesel(check_for_backend(diesel::pg::Pg))]
/// A community.
pub struct Community {
  pub id: CommunityId,
  pub name: String,
  /// A longer title, that can contain other characters, and doesn't have to be unique.
  pub title: String,
  pub published_at: DateTime<Utc>,
}

#[derive(Clone, derive_new::new, Insertable)]
#[diesel(table_name = community)]
pub struct CommunityInsertForm {
  pub name: String,
  pub title: String,
  #[new(default)]
  pub published_at: Option<DateTime<Utc>>,
}

#[derive(
  Clone,
  PartialEq,
  Eq,
  Debug,
  Serialize,
  Deserialize,
  Queryable,
  Selectable,
  Identifiable,
  Associations,
)]
#[diesel(belongs_to(crate::source::community::Community))]
#[diesel(table_name = community_member)]
#[diesel(primary_key(community_id, person_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
/// A person's membership in a community, holding their reputation there.
pub struct CommunityMember {
  pub community_id: CommunityId,
  pub person_id: PersonId,
  pub reputation: i32,
  /// False when the membership was created implicitly, by receiving a vote in the community.
  pub following: bool,
  pub is_admin: bool,
  pub is_owner: bool,
  pub published_at: DateTime<Utc>,
}

#[derive(Clone, derive_new::new, Insertable)]
#[diesel(table_name = community_member)]
pub struct CommunityMemberForm {
  pub community_id: CommunityId,
  pub person_id: PersonId,
  #[new(default)]
  pub following: Option<bool>,
  #[new(default)]
  pub is_admin: Option<bool>,
  #[new(default)]
  pub is_owner: Option<bool>,
}
