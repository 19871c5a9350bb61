use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::app::source::ProductSource;
use crate::catalog::{DecisionLabel, Product, ProductId};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub sequence: u64,
    pub product_id: ProductId,
    pub label: DecisionLabel,
}

#[derive(Debug)]
pub struct ExchangeOutcome {
    pub request: ExchangeRequest,
    pub result: Result<Product, AppError>,
}

impl ExchangeOutcome {
    pub fn sequence(&self) -> u64 {
        self.request.sequence
    }
}

/// Runs each exchange on its own thread so slow responses never block the
/// window. Outcomes arrive in completion order, not submission order.
pub struct ExchangeWorker {
    source: Arc<dyn ProductSource>,
    result_tx: mpsc::Sender<ExchangeOutcome>,
    result_rx: mpsc::Receiver<ExchangeOutcome>,
}

impl ExchangeWorker {
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        Self {
            source,
            result_tx,
            result_rx,
        }
    }

    pub fn source(&self) -> Arc<dyn ProductSource> {
        Arc::clone(&self.source)
    }

    pub fn submit(&self, request: ExchangeRequest) {
        let source = Arc::clone(&self.source);
        let result_tx = self.result_tx.clone();

        thread::spawn(move || {
            let result = source.fetch_next(request.product_id, request.label);
            if result_tx.send(ExchangeOutcome { request, result }).is_err() {
                debug!(
                    sequence = request.sequence,
                    "exchange finished after session closed"
                );
            }
        });
    }

    /// Drains every outcome that has arrived since the last poll.
    pub fn poll(&self) -> Vec<ExchangeOutcome> {
        self.result_rx.try_iter().collect()
    }

    pub fn wait(&self, timeout: Duration) -> Option<ExchangeOutcome> {
        self.result_rx.recv_timeout(timeout).ok()
    }
}
