use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::display::{DisplayConfig, ProductView};
use crate::app::events::{decision_for_key, AppEvent};
use crate::app::exchange::{ExchangeOutcome, ExchangeRequest, ExchangeWorker};
use crate::app::source::ProductSource;
use crate::app::state::SessionState;
use crate::catalog::{DecisionLabel, ProductId};

pub struct SessionController {
    display: DisplayConfig,
    worker: ExchangeWorker,
    state: SessionState,
}

impl SessionController {
    pub fn new(source: Arc<dyn ProductSource>, display: DisplayConfig) -> Self {
        Self {
            display,
            worker: ExchangeWorker::new(source),
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> Option<&ProductView> {
        self.state.view.as_ref()
    }

    pub fn source(&self) -> Arc<dyn ProductSource> {
        self.worker.source()
    }

    pub fn dispatch(&mut self, event: AppEvent) {
        match event {
            AppEvent::Start(product_id) => self.start(product_id),
            AppEvent::KeyReleased(key_code) => self.handle_key(key_code),
            AppEvent::Exchange(outcome) => self.apply(outcome),
        }
    }

    pub fn start(&mut self, product_id: ProductId) {
        info!(%product_id, "loading first product");
        self.request(product_id, DecisionLabel::First);
    }

    /// Records the decision against the product on screen and asks for the
    /// next one. Keys other than '1' and '2' are ignored.
    pub fn handle_key(&mut self, key_code: u32) {
        let Some(label) = decision_for_key(key_code) else {
            return;
        };
        let Some(view) = self.state.view.clone() else {
            debug!(key_code, "no product on screen yet; ignoring key");
            return;
        };

        self.state.board.record_decision(&view, label);
        self.request(view.product_id, label);
    }

    /// Applies every exchange that finished since the last frame. Returns
    /// whether anything changed.
    pub fn poll(&mut self) -> bool {
        let outcomes = self.worker.poll();
        let changed = !outcomes.is_empty();
        for outcome in outcomes {
            self.apply(outcome);
        }
        changed
    }

    fn request(&mut self, product_id: ProductId, label: DecisionLabel) {
        let sequence = self.state.allocate_sequence();
        debug!(sequence, %product_id, %label, "submitting exchange");
        self.worker.submit(ExchangeRequest {
            sequence,
            product_id,
            label,
        });
    }

    fn apply(&mut self, outcome: ExchangeOutcome) {
        let sequence = outcome.sequence();
        self.state.pending = self.state.pending.saturating_sub(1);

        if self.state.is_stale(sequence) {
            self.state.dropped_responses += 1;
            debug!(
                sequence,
                displayed = self.state.displayed_sequence,
                "dropping stale exchange response"
            );
            return;
        }

        match outcome.result {
            Ok(product) => {
                self.state.view = Some(ProductView::display(&product, &self.display));
                self.state.current = Some(product);
                self.state.displayed_sequence = sequence;
                self.state.last_error = None;
            }
            Err(error) => {
                warn!(
                    sequence,
                    product_id = %outcome.request.product_id,
                    label = %outcome.request.label,
                    "exchange failed: {error}"
                );
                self.state.last_error = Some(error.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::app::events::{KEY_DISLIKE, KEY_LIKE};
    use crate::catalog::Product;
    use crate::error::AppError;

    #[derive(Default)]
    struct RecordingSource {
        calls: Mutex<Vec<(ProductId, DecisionLabel)>>,
        fail: bool,
    }

    impl ProductSource for RecordingSource {
        fn fetch_next(
            &self,
            product_id: ProductId,
            label: DecisionLabel,
        ) -> Result<Product, AppError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((product_id, label));
            if self.fail {
                return Err(AppError::NotFound("server unavailable".to_string()));
            }
            let next = if label.is_decision() {
                product_id.get() + 1
            } else {
                product_id.get()
            };
            Ok(product(next))
        }

        fn load_image(&self, _image_src: &str) -> Result<Vec<u8>, AppError> {
            Ok(Vec::new())
        }
    }

    fn id(value: i64) -> ProductId {
        ProductId::new(value).expect("id")
    }

    fn product(value: i64) -> Product {
        Product {
            id: id(value),
            description: format!("product {value}"),
            image_file: format!("{value}.jpg"),
            url: format!("p/{value}"),
            prices: None,
        }
    }

    fn display() -> DisplayConfig {
        DisplayConfig {
            image_base: "http://127.0.0.1:8080/static/images".to_string(),
            link_base: "http://www.macys.com/".to_string(),
        }
    }

    fn controller_with(source: Arc<RecordingSource>) -> SessionController {
        SessionController::new(source, display())
    }

    fn settle(controller: &mut SessionController) {
        let outcome = controller
            .worker
            .wait(Duration::from_secs(5))
            .expect("exchange should finish");
        controller.dispatch(AppEvent::Exchange(outcome));
    }

    fn outcome(sequence: u64, value: i64) -> ExchangeOutcome {
        ExchangeOutcome {
            request: ExchangeRequest {
                sequence,
                product_id: id(value),
                label: DecisionLabel::Liked,
            },
            result: Ok(product(value)),
        }
    }

    #[test]
    fn start_requests_first_product_and_displays_it() {
        let source = Arc::new(RecordingSource::default());
        let mut controller = controller_with(Arc::clone(&source));

        controller.dispatch(AppEvent::Start(id(1082639)));
        settle(&mut controller);

        let view = controller.view().expect("view");
        assert_eq!(view.product_id, id(1082639));
        assert_eq!(view.link_href, "http://www.macys.com/p/1082639");
        assert_eq!(
            source.calls.lock().expect("calls").as_slice(),
            &[(id(1082639), DecisionLabel::First)]
        );
        assert_eq!(controller.state().pending, 0);
    }

    #[test]
    fn keys_route_current_product_with_matching_label() {
        let source = Arc::new(RecordingSource::default());
        let mut controller = controller_with(Arc::clone(&source));
        controller.start(id(7));
        settle(&mut controller);

        controller.dispatch(AppEvent::KeyReleased(KEY_DISLIKE));
        settle(&mut controller);
        controller.dispatch(AppEvent::KeyReleased(KEY_LIKE));
        settle(&mut controller);

        let calls = source.calls.lock().expect("calls").clone();
        assert_eq!(
            calls,
            vec![
                (id(7), DecisionLabel::First),
                (id(7), DecisionLabel::Disliked),
                (id(8), DecisionLabel::Liked),
            ]
        );
        let state = controller.state();
        assert_eq!(
            state.current.as_ref().map(|product| product.id),
            Some(id(9))
        );
        assert_eq!(state.board.disliked.len(), 1);
        assert_eq!(state.board.liked.len(), 1);
        assert_eq!(state.board.disliked[0].product_id, id(7));
        assert_eq!(state.board.liked[0].product_id, id(8));
    }

    #[test]
    fn other_keys_send_nothing() {
        let source = Arc::new(RecordingSource::default());
        let mut controller = controller_with(Arc::clone(&source));
        controller.start(id(7));
        settle(&mut controller);

        controller.handle_key(51);
        controller.handle_key(32);

        assert_eq!(source.calls.lock().expect("calls").len(), 1);
        assert!(controller.state().board.is_empty());
        assert_eq!(controller.state().pending, 0);
    }

    #[test]
    fn keys_before_first_product_are_ignored() {
        let source = Arc::new(RecordingSource::default());
        let mut controller = controller_with(Arc::clone(&source));

        controller.handle_key(KEY_LIKE);

        assert!(source.calls.lock().expect("calls").is_empty());
        assert!(controller.state().board.is_empty());
    }

    #[test]
    fn older_response_never_replaces_newer_one() {
        let mut controller = controller_with(Arc::new(RecordingSource::default()));
        controller.state.next_sequence = 3;
        controller.state.pending = 3;

        controller.dispatch(AppEvent::Exchange(outcome(3, 30)));
        controller.dispatch(AppEvent::Exchange(outcome(1, 10)));
        controller.dispatch(AppEvent::Exchange(outcome(3, 31)));

        let state = controller.state();
        assert_eq!(
            state.current.as_ref().map(|product| product.id),
            Some(id(30))
        );
        assert_eq!(state.displayed_sequence, 3);
        assert_eq!(state.dropped_responses, 2);
        assert_eq!(state.pending, 0);
    }

    #[test]
    fn failures_keep_current_product_and_surface_error() {
        let mut controller = controller_with(Arc::new(RecordingSource {
            fail: true,
            ..RecordingSource::default()
        }));
        controller.dispatch(AppEvent::Exchange(outcome(1, 5)));
        controller.state.next_sequence = 1;

        controller.handle_key(KEY_LIKE);
        settle(&mut controller);

        let state = controller.state();
        assert_eq!(
            state.current.as_ref().map(|product| product.id),
            Some(id(5))
        );
        assert!(state
            .last_error
            .as_deref()
            .is_some_and(|error| error.contains("server unavailable")));
        assert_eq!(state.board.liked.len(), 1);
    }

    #[test]
    fn poll_applies_finished_exchanges() {
        let mut controller = controller_with(Arc::new(RecordingSource::default()));
        controller.start(id(3));

        let mut changed = false;
        for _ in 0..500 {
            if controller.poll() {
                changed = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(changed);
        assert_eq!(controller.view().map(|view| view.product_id), Some(id(3)));
    }
}
