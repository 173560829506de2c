//! Seam between the controllers and whatever renders dialogs.

use crate::message_modal::MessageModal;

/// Opens dialogs on behalf of the controllers. Closing outcomes are not
/// reported back; the controllers never wait on them.
pub trait DialogHost: Send + Sync {
    fn open_message(&self, modal: MessageModal);
}
