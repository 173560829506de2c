use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{Amount, ObligationRecord, Party},
    error::{ApiError, ApiException},
    protocol::{
        AmountRequest, CreateObligationForm, ExternalIdRequest, MeResponse, MessagePayload,
        ObligationCollection, PeersResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_API_BASE: &str = "http://localhost:10050/api/obligations/";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ME: &str = "me";
const PEERS: &str = "peers";
const OBLIGATIONS: &str = "obligations";
const MY_OBLIGATIONS: &str = "my-obligations";
const CREATE_OBLIGATION: &str = "create-obligation";
const ALL_CONSUMED: &str = "all-consumed";
const ALL_UNCONSUMED: &str = "all-unconsumed";

/// Read and create operations the presentation controllers depend on.
#[async_trait]
pub trait ObligationApi: Send + Sync {
    fn base_url(&self) -> &Url;
    async fn me(&self) -> Result<Party, ClientError>;
    async fn peers(&self) -> Result<Vec<Party>, ClientError>;
    async fn obligations(&self) -> Result<ObligationCollection, ClientError>;
    async fn my_obligations(&self) -> Result<ObligationCollection, ClientError>;
    /// Any HTTP response, successful or not, is returned as a payload.
    /// Only failures to obtain a response are errors.
    async fn create_obligation(&self, amount: Amount) -> Result<MessagePayload, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Pledge,
    Redeem,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flow::Pledge => "pledge",
            Flow::Redeem => "redeem",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    Deny,
    Cancel,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::Approve => "approve",
            Transition::Deny => "deny",
            Transition::Cancel => "cancel",
        })
    }
}

/// Pledge and redeem lifecycle calls of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    Request {
        flow: Flow,
        amount: u64,
    },
    Transition {
        transition: Transition,
        flow: Flow,
        external_id: String,
    },
}

impl LifecycleAction {
    pub fn endpoint(&self) -> String {
        match self {
            LifecycleAction::Request { flow, .. } => format!("request-{flow}"),
            LifecycleAction::Transition {
                transition, flow, ..
            } => format!("{transition}-{flow}"),
        }
    }
}

pub struct HttpObligationApi {
    http: Client,
    base_url: Url,
}

impl HttpObligationApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(endpoint)
            .map_err(|source| ClientError::InvalidBaseUrl {
                url: format!("{}{endpoint}", self.base_url),
                source,
            })
    }

    /// Single obligation by linear or external id.
    pub async fn obligation(&self, id: &str) -> Result<ObligationRecord, ClientError> {
        let url = self.record_url(id)?;
        self.fetch_json(id, self.http.get(url)).await
    }

    /// The id always becomes exactly one percent-encoded segment below the
    /// base path.
    fn record_url(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    pub async fn consumed(&self) -> Result<Vec<ObligationRecord>, ClientError> {
        let url = self.endpoint_url(ALL_CONSUMED)?;
        self.fetch_json(ALL_CONSUMED, self.http.get(url)).await
    }

    pub async fn unconsumed(&self) -> Result<Vec<ObligationRecord>, ClientError> {
        let url = self.endpoint_url(ALL_UNCONSUMED)?;
        self.fetch_json(ALL_UNCONSUMED, self.http.get(url)).await
    }

    pub async fn lifecycle(&self, action: &LifecycleAction) -> Result<MessagePayload, ClientError> {
        let endpoint = action.endpoint();
        let url = self.endpoint_url(&endpoint)?;
        let request = match action {
            LifecycleAction::Request { amount, .. } => {
                self.http.post(url).json(&AmountRequest { amount: *amount })
            }
            LifecycleAction::Transition { external_id, .. } => {
                self.http.post(url).json(&ExternalIdRequest {
                    external_id: external_id.clone(),
                })
            }
        };
        self.fetch_message(&endpoint, request).await
    }

    async fn fetch_collection(&self, endpoint: &str) -> Result<ObligationCollection, ClientError> {
        let url = self.endpoint_url(endpoint)?;
        let value: Value = self.fetch_json(endpoint, self.http.get(url)).await?;
        ObligationCollection::from_value(value).map_err(|source| {
            ClientError::MalformedCollection {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        debug!(endpoint, "ledger read");
        let res = request
            .send()
            .await
            .map_err(|source| transport(endpoint, source))?;
        let status = res.status();
        let body = res.text().await.map_err(|source| transport(endpoint, source))?;

        if !status.is_success() {
            let message = ApiError::parse_message(&body).unwrap_or(body);
            return Err(ClientError::Api {
                endpoint: endpoint.to_string(),
                source: ApiException::new(Some(status.as_u16()), message),
            });
        }

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn fetch_message(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<MessagePayload, ClientError> {
        debug!(endpoint, "ledger write");
        let res = request
            .send()
            .await
            .map_err(|source| transport(endpoint, source))?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(|source| transport(endpoint, source))?;
        debug!(endpoint, status, "ledger write answered");
        Ok(MessagePayload::from_response(status, &body))
    }
}

#[async_trait]
impl ObligationApi for HttpObligationApi {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn me(&self) -> Result<Party, ClientError> {
        let url = self.endpoint_url(ME)?;
        let body: MeResponse = self.fetch_json(ME, self.http.get(url)).await?;
        Ok(body.me)
    }

    async fn peers(&self) -> Result<Vec<Party>, ClientError> {
        let url = self.endpoint_url(PEERS)?;
        let body: PeersResponse = self.fetch_json(PEERS, self.http.get(url)).await?;
        Ok(body.peers)
    }

    async fn obligations(&self) -> Result<ObligationCollection, ClientError> {
        self.fetch_collection(OBLIGATIONS).await
    }

    async fn my_obligations(&self) -> Result<ObligationCollection, ClientError> {
        self.fetch_collection(MY_OBLIGATIONS).await
    }

    async fn create_obligation(&self, amount: Amount) -> Result<MessagePayload, ClientError> {
        let url = self.endpoint_url(CREATE_OBLIGATION)?;
        let request = self.http.post(url).form(&CreateObligationForm::new(amount));
        self.fetch_message(CREATE_OBLIGATION, request).await
    }
}

fn transport(endpoint: &str, source: reqwest::Error) -> ClientError {
    ClientError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// Parses the base URL and makes sure it ends with `/` so endpoint names
/// join below it instead of replacing its last segment.
pub fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let candidate = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&candidate).map_err(|source| ClientError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
