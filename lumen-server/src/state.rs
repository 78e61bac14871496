use lumen_core::ScanController;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub controller: ScanController,
}

impl AppState {
    pub fn new(controller: ScanController) -> Self {
        Self { controller }
    }
}
