//! Creation dialog: amount form, client-side validation, submission.

use std::sync::Arc;

use shared::{
    domain::{Amount, AmountError, Party},
    protocol::MessagePayload,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{api::ObligationApi, dialog::DialogHost, message_modal::MessageModal};

/// Values handed to the creation dialog when it is opened.
#[derive(Clone)]
pub struct CreateModalParams {
    pub api: Arc<dyn ObligationApi>,
    pub api_base: Url,
    pub peers: Vec<Party>,
    pub dialogs: Arc<dyn DialogHost>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObligationForm {
    pub amount: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Editing,
    Submitting,
    Closed,
    Dismissed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Invalid(AmountError),
    Submitted(MessagePayload),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModalError {
    #[error("creation dialog is no longer editable (state: {0:?})")]
    NotEditing(ModalState),
}

pub struct CreateObligationModal {
    params: CreateModalParams,
    form: ObligationForm,
    form_error: bool,
    state: ModalState,
}

impl CreateObligationModal {
    pub fn new(params: CreateModalParams) -> Self {
        Self {
            params,
            form: ObligationForm::default(),
            form_error: false,
            state: ModalState::Editing,
        }
    }

    pub fn peers(&self) -> &[Party] {
        &self.params.peers
    }

    pub fn api_base(&self) -> &Url {
        &self.params.api_base
    }

    pub fn form(&self) -> &ObligationForm {
        &self.form
    }

    pub fn form_error(&self) -> bool {
        self.form_error
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn set_amount(&mut self, raw: impl Into<String>) {
        self.form.amount = raw.into();
    }

    /// Validates the form and, when valid, submits it. Server replies and
    /// transport failures are both shown through one message dialog.
    pub async fn create(&mut self) -> Result<SubmitOutcome, ModalError> {
        self.ensure_editing()?;

        let amount = match self.form.amount.parse::<Amount>() {
            Ok(amount) => amount,
            Err(err) => {
                debug!(input = %self.form.amount, error = %err, "obligation form rejected");
                self.form_error = true;
                return Ok(SubmitOutcome::Invalid(err));
            }
        };

        self.form_error = false;
        self.state = ModalState::Submitting;
        info!(%amount, api_base = %self.params.api_base, "submitting obligation");

        let payload = match self.params.api.create_obligation(amount).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "obligation submission got no response");
                MessagePayload::transport_failure(err.to_string())
            }
        };

        self.state = ModalState::Closed;
        self.params
            .dialogs
            .open_message(MessageModal::new(payload.clone()));
        Ok(SubmitOutcome::Submitted(payload))
    }

    pub fn cancel(&mut self) -> Result<(), ModalError> {
        self.ensure_editing()?;
        self.state = ModalState::Dismissed;
        Ok(())
    }

    fn ensure_editing(&self) -> Result<(), ModalError> {
        if self.state == ModalState::Editing {
            Ok(())
        } else {
            Err(ModalError::NotEditing(self.state))
        }
    }
}

#[cfg(test)]
#[path = "tests/create_modal_tests.rs"]
mod tests;
