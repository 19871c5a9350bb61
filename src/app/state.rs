use crate::app::display::{DecisionBoard, ProductView};
use crate::catalog::Product;

/// Everything one widget session knows. There is at most one current product,
/// and it always comes from the newest response applied so far.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub current: Option<Product>,
    pub view: Option<ProductView>,
    pub board: DecisionBoard,
    pub displayed_sequence: u64,
    pub next_sequence: u64,
    pub pending: usize,
    pub last_error: Option<String>,
    pub dropped_responses: u64,
}

impl SessionState {
    pub fn allocate_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.pending += 1;
        self.next_sequence
    }

    pub fn is_stale(&self, sequence: u64) -> bool {
        sequence <= self.displayed_sequence
    }

    pub fn is_waiting(&self) -> bool {
        self.pending > 0
    }
}
