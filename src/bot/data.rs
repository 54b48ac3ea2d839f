use std::fmt;
use std::sync::Arc;

use crate::config::Settings;
use crate::db::store::ConfigStore;
use crate::services::broadcast::BroadcastScheduler;
use crate::services::lifecycle::Reconciler;
use crate::services::relay::AdminRelay;
use crate::services::transport::ChatTransport;

/// Shared data available to all commands and handlers
pub struct Data {
    pub settings: Settings,
    pub store: Arc<dyn ConfigStore>,
    pub transport: Arc<dyn ChatTransport>,
    pub scheduler: Arc<BroadcastScheduler>,
    pub reconciler: Arc<Reconciler>,
    pub relay: AdminRelay,
}

impl Data {
    /// Wire every component to the same store and transport
    pub fn new(
        settings: Settings,
        store: Arc<dyn ConfigStore>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        let scheduler = Arc::new(BroadcastScheduler::new(transport.clone()));
        let reconciler = Arc::new(Reconciler::new(
            store.clone(),
            scheduler.clone(),
            transport.clone(),
            settings.purge_limit,
            settings.purge_pacing,
        ));
        let relay = AdminRelay::new(store.clone(), scheduler.clone(), settings.relay_confirmation);

        Self {
            settings,
            store,
            transport,
            scheduler,
            reconciler,
            relay,
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("pending_deletions", &self.scheduler.pending_count())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;
