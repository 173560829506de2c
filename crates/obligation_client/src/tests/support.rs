//! Test doubles shared by the controller tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{
    domain::{Amount, Party},
    error::ApiException,
    protocol::{MessagePayload, ObligationCollection},
};
use url::Url;

use crate::{
    api::ObligationApi, dialog::DialogHost, error::ClientError, message_modal::MessageModal,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Me,
    Peers,
    Obligations,
    MyObligations,
    Create(String),
}

pub struct FakeApi {
    base_url: Url,
    pub me: Option<&'static str>,
    peers: Mutex<Option<Vec<&'static str>>>,
    pub obligations: Option<Value>,
    pub my_obligations: Option<Value>,
    pub create_reply: Option<MessagePayload>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn healthy() -> Self {
        Self {
            base_url: Url::parse("http://ledger.test/api/obligations/").expect("url"),
            me: Some("O=BankA,L=London,C=GB"),
            peers: Mutex::new(Some(vec!["O=BankB,L=Paris,C=FR"])),
            obligations: Some(json!({
                "0": {"state": {"data": "A"}},
                "1": {"state": {"data": "B"}},
            })),
            my_obligations: Some(json!({"k": {"state": {"data": "mine"}}})),
            create_reply: Some(MessagePayload::from_response(200, "tx-1")),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            me: None,
            peers: Mutex::new(None),
            obligations: None,
            my_obligations: None,
            create_reply: None,
            ..Self::healthy()
        }
    }

    /// `None` makes every following peers call fail.
    pub fn set_peers(&self, peers: Option<Vec<&'static str>>) {
        *self.peers.lock().expect("peers lock") = peers;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Create(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

fn unavailable(endpoint: &str) -> ClientError {
    ClientError::Api {
        endpoint: endpoint.to_string(),
        source: ApiException::new(Some(503), "ledger unavailable"),
    }
}

fn collection(endpoint: &str, value: &Option<Value>) -> Result<ObligationCollection, ClientError> {
    let value = value.clone().ok_or_else(|| unavailable(endpoint))?;
    ObligationCollection::from_value(value).map_err(|source| ClientError::MalformedCollection {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[async_trait]
impl ObligationApi for FakeApi {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn me(&self) -> Result<Party, ClientError> {
        self.record(Call::Me);
        self.me.map(Party::new).ok_or_else(|| unavailable("me"))
    }

    async fn peers(&self) -> Result<Vec<Party>, ClientError> {
        self.record(Call::Peers);
        self.peers
            .lock()
            .expect("peers lock")
            .as_ref()
            .map(|peers| peers.iter().copied().map(Party::new).collect())
            .ok_or_else(|| unavailable("peers"))
    }

    async fn obligations(&self) -> Result<ObligationCollection, ClientError> {
        self.record(Call::Obligations);
        collection("obligations", &self.obligations)
    }

    async fn my_obligations(&self) -> Result<ObligationCollection, ClientError> {
        self.record(Call::MyObligations);
        collection("my-obligations", &self.my_obligations)
    }

    async fn create_obligation(&self, amount: Amount) -> Result<MessagePayload, ClientError> {
        self.record(Call::Create(format!("amount={amount}")));
        self.create_reply
            .clone()
            .ok_or_else(|| unavailable("create-obligation"))
    }
}

#[derive(Default)]
pub struct RecordingDialogs {
    opened: Mutex<Vec<MessageModal>>,
}

impl RecordingDialogs {
    pub fn opened(&self) -> Vec<MessageModal> {
        self.opened.lock().expect("dialogs lock").clone()
    }
}

impl DialogHost for RecordingDialogs {
    fn open_message(&self, modal: MessageModal) {
        self.opened.lock().expect("dialogs lock").push(modal);
    }
}
