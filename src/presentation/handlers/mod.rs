mod health;
mod media_processing;

pub use health::health_handler;
pub use media_processing::{queue_status_handler, recover_handler, reprocess_handler};
