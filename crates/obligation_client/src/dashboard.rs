//! Main view: identity, peers and the two obligation lists.

use std::{fmt, sync::Arc};

use shared::{
    domain::{ObligationRecord, Party},
    protocol::ObligationCollection,
};
use tracing::{debug, warn};

use crate::{
    api::ObligationApi,
    create_modal::{CreateModalParams, CreateObligationModal},
    dialog::DialogHost,
    error::ClientError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Identity,
    Peers,
    Obligations,
    MyObligations,
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoadSource::Identity => "identity",
            LoadSource::Peers => "peers",
            LoadSource::Obligations => "obligations",
            LoadSource::MyObligations => "my obligations",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub source: LoadSource,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub this_node: Option<Party>,
    pub peers: Vec<Party>,
    pub obligations: Vec<ObligationRecord>,
    pub my_obligations: Vec<ObligationRecord>,
    pub load_failures: Vec<LoadFailure>,
}

pub struct DashboardController {
    api: Arc<dyn ObligationApi>,
    dialogs: Arc<dyn DialogHost>,
    state: DashboardState,
}

impl DashboardController {
    pub fn new(api: Arc<dyn ObligationApi>, dialogs: Arc<dyn DialogHost>) -> Self {
        Self {
            api,
            dialogs,
            state: DashboardState::default(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Runs the four initial loads concurrently. A failed load is recorded
    /// and never keeps the others from landing.
    pub async fn initialize(&mut self) {
        let api = Arc::clone(&self.api);
        let (me, peers, obligations, my_obligations) = futures::join!(
            api.me(),
            api.peers(),
            api.obligations(),
            api.my_obligations()
        );

        self.apply_identity(me);
        self.apply_peers(peers);
        let _ = self.apply_collection(LoadSource::Obligations, obligations);
        let _ = self.apply_collection(LoadSource::MyObligations, my_obligations);
    }

    pub async fn load_identity(&mut self) -> Option<&Party> {
        let result = self.api.me().await;
        self.apply_identity(result);
        self.state.this_node.as_ref()
    }

    pub async fn load_peers(&mut self) -> &[Party] {
        let result = self.api.peers().await;
        self.apply_peers(result);
        &self.state.peers
    }

    pub async fn get_obligations(&mut self) -> Result<&[ObligationRecord], ClientError> {
        let result = self.api.obligations().await;
        self.apply_collection(LoadSource::Obligations, result)
    }

    pub async fn get_my_obligations(&mut self) -> Result<&[ObligationRecord], ClientError> {
        let result = self.api.my_obligations().await;
        self.apply_collection(LoadSource::MyObligations, result)
    }

    /// The returned dialog belongs to the caller; the dashboard does not
    /// observe how it ends.
    pub fn open_create_modal(&self) -> CreateObligationModal {
        CreateObligationModal::new(CreateModalParams {
            api: Arc::clone(&self.api),
            api_base: self.api.base_url().clone(),
            peers: self.state.peers.clone(),
            dialogs: Arc::clone(&self.dialogs),
        })
    }

    fn apply_identity(&mut self, result: Result<Party, ClientError>) {
        match result {
            Ok(me) => {
                self.clear_failure(LoadSource::Identity);
                self.state.this_node = Some(me);
            }
            Err(err) => self.record_failure(LoadSource::Identity, &err),
        }
    }

    fn apply_peers(&mut self, result: Result<Vec<Party>, ClientError>) {
        match result {
            Ok(peers) => {
                self.clear_failure(LoadSource::Peers);
                self.state.peers = peers;
            }
            Err(err) => self.record_failure(LoadSource::Peers, &err),
        }
    }

    fn apply_collection(
        &mut self,
        source: LoadSource,
        result: Result<ObligationCollection, ClientError>,
    ) -> Result<&[ObligationRecord], ClientError> {
        let collection = match result {
            Ok(collection) => collection,
            Err(err) => {
                self.record_failure(source, &err);
                return Err(err);
            }
        };

        self.clear_failure(source);
        let records = collection.into_display_order();
        debug!(%source, count = records.len(), "obligation list loaded");
        let slot = match source {
            LoadSource::MyObligations => &mut self.state.my_obligations,
            _ => &mut self.state.obligations,
        };
        *slot = records;
        Ok(slot.as_slice())
    }

    fn record_failure(&mut self, source: LoadSource, err: &ClientError) {
        warn!(%source, error = %err, "dashboard load failed");
        self.clear_failure(source);
        self.state.load_failures.push(LoadFailure {
            source,
            message: err.to_string(),
        });
    }

    fn clear_failure(&mut self, source: LoadSource) {
        self.state
            .load_failures
            .retain(|failure| failure.source != source);
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
