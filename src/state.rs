use std::sync::Arc;

use crate::database::Store;
use crate::media::MediaStorage;

/// Shared handler state: the storage backend and the media directory.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: MediaStorage,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, media: MediaStorage) -> Self {
        Self { store, media }
    }
}
