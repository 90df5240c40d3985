//! Application state shared by the HTTP handlers

use std::sync::Arc;

use crate::infrastructure::crag::CragController;

/// Application state; the controller is built once at start-up
#[derive(Debug, Clone)]
pub struct AppState {
    pub controller: Arc<CragController>,
}

impl AppState {
    pub fn new(controller: CragController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
