use std::sync::Arc;

use phishershield_core::gateway::ScanService;
use phishershield_core::signals::reports::MemoryReportStore;

#[derive(Clone)]
pub struct AppState {
    pub scan: Arc<ScanService>,
    pub reports: Arc<MemoryReportStore>,
}
