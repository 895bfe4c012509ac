use forum_db_schema::source::vote::{VoteDirection, VoteRecord};
use serde::{Deserialize, Serialize};
use strum::Display;

/// What a voter currently has recorded on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
  #[default]
  NoVote,
  Upvoted,
  Downvoted,
}

impl VoteState {
  pub fn from_direction(direction: Option<VoteDirection>) -> Self {
    match direction {
      None => VoteState::NoVote,
      Some(VoteDirection::Up) => VoteState::Upvoted,
      Some(VoteDirection::Down) => VoteState::Downvoted,
    }
  }

  pub fn direction(self) -> Option<VoteDirection> {
    match self {
      VoteState::NoVote => None,
      VoteState::Upvoted => Some(VoteDirection::Up),
      VoteState::Downvoted => Some(VoteDirection::Down),
    }
  }

  /// Clicking the direction that is already recorded clears the vote. Any other click replaces
  /// whatever is recorded with a vote in that direction.
  pub fn toggle(self, direction: VoteDirection) -> VoteTransition {
    let to = if self.direction() == Some(direction) {
      VoteState::NoVote
    } else {
      VoteState::from_direction(Some(direction))
    };
    VoteTransition::between(self, to)
  }
}

impl From<Option<&VoteRecord>> for VoteState {
  fn from(record: Option<&VoteRecord>) -> Self {
    VoteState::from_direction(record.map(|r| r.direction))
  }
}

/// Everything a single toggle changes: the ledger rows to delete and insert, the counter deltas
/// and the reputation delta for the target's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
  pub from: VoteState,
  pub to: VoteState,
  pub remove: Option<VoteDirection>,
  pub add: Option<VoteDirection>,
  pub like_delta: i32,
  pub dislike_delta: i32,
  pub reputation_delta: i32,
}

impl VoteTransition {
  fn between(from: VoteState, to: VoteState) -> Self {
    let mut transition = VoteTransition {
      from,
      to,
      remove: from.direction(),
      add: to.direction(),
      like_delta: 0,
      dislike_delta: 0,
      reputation_delta: 0,
    };
    if let Some(removed) = transition.remove {
      transition.count(removed, -1);
      transition.reputation_delta -= removed.reputation_weight();
    }
    if let Some(added) = transition.add {
      transition.count(added, 1);
      transition.reputation_delta += added.reputation_weight();
    }
    transition
  }

  fn count(&mut self, direction: VoteDirection, delta: i32) {
    match direction {
      VoteDirection::Up => self.like_delta += delta,
      VoteDirection::Down => self.dislike_delta += delta,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{
    VoteState::{Downvoted, NoVote, Upvoted},
    *,
  };
  use forum_db_schema::source::vote::VoteDirection::{Down, Up};
  use pretty_assertions::assert_eq;

  fn transition(
    from: VoteState,
    to: VoteState,
    remove: Option<VoteDirection>,
    add: Option<VoteDirection>,
    (like_delta, dislike_delta, reputation_delta): (i32, i32, i32),
  ) -> VoteTransition {
    VoteTransition {
      from,
      to,
      remove,
      add,
      like_delta,
      dislike_delta,
      reputation_delta,
    }
  }

  #[test]
  fn test_transition_table() {
    assert_eq!(
      transition(NoVote, Upvoted, None, Some(Up), (1, 0, 1)),
      NoVote.toggle(Up)
    );
    assert_eq!(
      transition(NoVote, Downvoted, None, Some(Down), (0, 1, -1)),
      NoVote.toggle(Down)
    );
    assert_eq!(
      transition(Upvoted, NoVote, Some(Up), None, (-1, 0, -1)),
      Upvoted.toggle(Up)
    );
    assert_eq!(
      transition(Upvoted, Downvoted, Some(Up), Some(Down), (-1, 1, -2)),
      Upvoted.toggle(Down)
    );
    assert_eq!(
      transition(Downvoted, Upvoted, Some(Down), Some(Up), (1, -1, 2)),
      Downvoted.toggle(Up)
    );
    assert_eq!(
      transition(Downvoted, NoVote, Some(Down), None, (0, -1, 1)),
      Downvoted.toggle(Down)
    );
  }

  fn weight(state: VoteState) -> i32 {
    state.direction().map_or(0, VoteDirection::reputation_weight)
  }

  #[test]
  fn test_toggle_twice_is_neutral() {
    let first = NoVote.toggle(Up);
    let second = first.to.toggle(Up);
    assert_eq!(NoVote, second.to);
    assert_eq!(0, first.reputation_delta + second.reputation_delta);
    assert_eq!(0, first.like_delta + second.like_delta);

    // From any state, the deltas of a transition add up to the difference between the states
    for start in [NoVote, Upvoted, Downvoted] {
      for direction in [Up, Down] {
        let first = start.toggle(direction);
        let second = first.to.toggle(direction);
        assert_eq!(
          weight(second.to) - weight(start),
          first.reputation_delta + second.reputation_delta,
          "{start} {direction}"
        );
      }
    }
  }

  #[test]
  fn test_sequence_matches_table() {
    let clicks = [Up, Down, Down, Up, Up, Down, Up];
    let mut state = NoVote;
    let mut likes = 0;
    let mut dislikes = 0;
    let mut reputation = 0;
    for click in clicks {
      let t = state.toggle(click);
      assert_eq!(state, t.from);
      state = t.to;
      likes += t.like_delta;
      dislikes += t.dislike_delta;
      reputation += t.reputation_delta;
      assert!((0..=1).contains(&likes) && (0..=1).contains(&dislikes));
      assert!(likes + dislikes <= 1);
    }
    // Up, Down, Down leaves nothing; Up, Up leaves nothing; Down, Up ends upvoted
    assert_eq!(Upvoted, state);
    assert_eq!((1, 0, 1), (likes, dislikes, reputation));
  }

  #[test]
  fn test_state_from_record() {
    assert_eq!(NoVote, VoteState::from(None::<&VoteRecord>));
    assert_eq!(Downvoted, VoteState::from_direction(Some(Down)));
    assert_eq!(Some(Up), Upvoted.direction());
    assert_eq!("Downvoted", Downvoted.to_string());
  }
}
