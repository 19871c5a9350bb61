pub mod controller;
pub mod display;
pub mod events;
pub mod exchange;
pub mod source;
pub mod state;

pub use controller::SessionController;
pub use display::{DecisionBoard, DisplayConfig, ProductView, Thumbnail};
pub use events::AppEvent;
pub use source::{first_product_id, LocalSource, ProductSource, RemoteSource};
pub use state::SessionState;
