use std::sync::Arc;

use crate::application::ports::MediaRepository;
use crate::application::services::{MediaProcessingQueue, RecoveryScanner};

#[derive(Clone)]
pub struct AppState {
    pub queue: MediaProcessingQueue,
    pub recovery: Arc<RecoveryScanner>,
    pub repository: Arc<dyn MediaRepository>,
}
