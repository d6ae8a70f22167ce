//! Delivery of a finished export to the host's download facility.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
#[error("download rejected: {0}")]
pub struct SinkError(pub String);

#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, download: Download) -> Result<(), SinkError>;
}

/// Holds the delivered download so a handler can return it as an attachment.
#[derive(Default)]
pub struct AttachmentSink {
    slot: Mutex<Option<Download>>,
}

impl AttachmentSink {
    pub fn take(&self) -> Option<Download> {
        self.slot.lock().take()
    }
}

#[async_trait]
impl DownloadSink for AttachmentSink {
    async fn deliver(&self, download: Download) -> Result<(), SinkError> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(SinkError("a download was already delivered".to_string()));
        }
        *slot = Some(download);
        Ok(())
    }
}
