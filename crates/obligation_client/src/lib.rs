//! Client for the obligation ledger REST API and the presentation
//! controllers built on it.

pub mod api;
pub mod create_modal;
pub mod dashboard;
pub mod dialog;
pub mod error;
pub mod message_modal;

pub use api::{
    Flow, HttpObligationApi, LifecycleAction, ObligationApi, Transition, DEFAULT_API_BASE,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use create_modal::{
    CreateModalParams, CreateObligationModal, ModalError, ModalState, ObligationForm,
    SubmitOutcome,
};
pub use dashboard::{DashboardController, DashboardState, LoadFailure, LoadSource};
pub use dialog::DialogHost;
pub use error::ClientError;
pub use message_modal::MessageModal;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
