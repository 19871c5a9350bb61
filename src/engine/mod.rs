pub mod next;
pub mod policy;

pub use next::{NextProductService, SERVER_SESSION_ID};
pub use policy::{CatalogWalk, NextProductPolicy};
