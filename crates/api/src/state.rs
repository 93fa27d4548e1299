use std::sync::Arc;

use portal_core::labs::LabCatalog;
use portal_core::notify::Notifier;
use portal_core::store::PortalStore;
use portal_workflow::{CollaborationMatcher, LabAllocator, PortalAnalytics, ProjectLifecycle};

use crate::config::ServerConfig;

/// Shared application state available to all handlers via Axum's `State` extractor.
///
/// The workflow managers share one store and one notifier.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PortalStore>,
    pub config: Arc<ServerConfig>,
    pub projects: ProjectLifecycle,
    pub labs: LabAllocator,
    pub collaborations: CollaborationMatcher,
    pub analytics: PortalAnalytics,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PortalStore>,
        notifier: Arc<dyn Notifier>,
        catalog: LabCatalog,
        config: ServerConfig,
    ) -> Self {
        Self {
            projects: ProjectLifecycle::new(Arc::clone(&store), Arc::clone(&notifier)),
            labs: LabAllocator::new(Arc::clone(&store), Arc::clone(&notifier), Arc::new(catalog)),
            collaborations: CollaborationMatcher::new(Arc::clone(&store), notifier),
            analytics: PortalAnalytics::new(Arc::clone(&store)),
            config: Arc::new(config),
            store,
        }
    }
}
