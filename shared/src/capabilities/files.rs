use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upload::{FileId, PreviewHandle};

/// Shell-side file access: preview handles and data-URI reads. The core only
/// ever sees `FileId`s, never file contents.
#[derive(Clone)]
pub struct Files<E> {
    context: CapabilityContext<FilesOperation, E>,
}

impl<Ev> Capability<Ev> for Files<Ev> {
    type Operation = FilesOperation;
    type MappedSelf<MappedEv> = Files<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Files::new(self.context.map_event(f))
    }
}

impl<E> Files<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<FilesOperation, E>) -> Self {
        Self { context }
    }

    /// Allocates a preview resource. Every handle produced here must be
    /// passed to `revoke_preview` exactly once.
    pub fn create_preview<F>(&self, file: FileId, make_event: F)
    where
        F: FnOnce(FilesResult) -> E + Send + 'static,
    {
        self.request(FilesOperation::CreatePreview { file }, make_event);
    }

    pub fn revoke_preview(&self, handle: PreviewHandle) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(FilesOperation::RevokePreview { handle })
                .await;
        });
    }

    pub fn read_data_url<F>(&self, file: FileId, make_event: F)
    where
        F: FnOnce(FilesResult) -> E + Send + 'static,
    {
        self.request(FilesOperation::ReadDataUrl { file }, make_event);
    }

    fn request<F>(&self, operation: FilesOperation, make_event: F)
    where
        F: FnOnce(FilesResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FilesOperation {
    CreatePreview { file: FileId },
    RevokePreview { handle: PreviewHandle },
    ReadDataUrl { file: FileId },
}

impl Operation for FilesOperation {
    type Output = FilesResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FilesOutput {
    Preview(PreviewHandle),
    DataUrl(String),
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FilesError {
    #[error("file no longer available: {file}")]
    FileGone { file: String },

    #[error("read failed: {reason}")]
    ReadFailed { reason: String },

    #[error("preview unsupported for this file")]
    PreviewUnsupported,
}

pub type FilesResult = Result<FilesOutput, FilesError>;
