// Application state for HTTP handlers
use crate::application::aggregate_service::AggregateLookup;
use crate::application::config_service::ConfigEditor;
use crate::application::dashboard_state::SharedDashboard;
use crate::application::gateway::ClientGateway;
use crate::application::notifier::NotificationCenter;
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::application::script_service::ScriptService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ClientGateway>,
    pub dashboard: SharedDashboard,
    pub scheduler: RefreshScheduler,
    pub aggregates: AggregateLookup,
    pub scripts: ScriptService,
    pub config_editor: Arc<ConfigEditor>,
    pub notifications: Arc<NotificationCenter>,
}
