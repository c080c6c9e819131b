pub mod event;
pub mod job;
pub mod monitor;
pub mod pipeline;
pub mod worker;
pub mod workspace;

pub use event::{ProgressReporter, UploadEvent, UploadOutcome, UploadState};
pub use job::{UploadJob, UploadRequest};
pub use monitor::JobRecord;
pub use pipeline::{PipelineSettings, UploadPipeline};
pub use worker::{spawn_upload, UploadHandle};
pub use workspace::{TempWorkspace, WorkspaceProvider};
