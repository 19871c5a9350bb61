use crate::app::exchange::ExchangeOutcome;
use crate::catalog::{DecisionLabel, ProductId};

/// Key code for '1'.
pub const KEY_DISLIKE: u32 = 49;
/// Key code for '2'.
pub const KEY_LIKE: u32 = 50;

#[derive(Debug)]
pub enum AppEvent {
    Start(ProductId),
    KeyReleased(u32),
    Exchange(ExchangeOutcome),
}

pub fn decision_for_key(key_code: u32) -> Option<DecisionLabel> {
    match key_code {
        KEY_DISLIKE => Some(DecisionLabel::Disliked),
        KEY_LIKE => Some(DecisionLabel::Liked),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_and_two_map_to_decisions() {
        assert_eq!(decision_for_key(49), Some(DecisionLabel::Disliked));
        assert_eq!(decision_for_key(50), Some(DecisionLabel::Liked));
        assert_eq!(decision_for_key(51), None);
        assert_eq!(decision_for_key(13), None);
    }
}
