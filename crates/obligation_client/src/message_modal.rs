//! Result dialog shown after a create or lifecycle call.

use shared::protocol::MessagePayload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageModal {
    payload: MessagePayload,
    open: bool,
}

impl MessageModal {
    pub fn new(payload: MessagePayload) -> Self {
        Self {
            payload,
            open: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.payload.data
    }

    pub fn status(&self) -> Option<u16> {
        self.payload.status
    }

    pub fn payload(&self) -> &MessagePayload {
        &self.payload
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn dismiss(&mut self) {
        self.open = false;
    }
}
