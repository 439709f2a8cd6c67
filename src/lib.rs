pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod session;
pub mod submit;

pub use config::Config;
pub use datasource::{
    DataSourceError, EventSource, HistoryClient, IndexerAuth, IndexerClient, MockEventSource,
};
pub use domain::{
    Address, AllocationSet, Bucket, Contract, Decimal, EventKind, HistoricalEvent, TxId,
    ValidationError,
};
pub use engine::{SplitProfile, Suggestion, Tier};
pub use error::{AppError, SplitError};
pub use session::{SharedSession, SplitSession};
pub use submit::{MockSubmitter, PayoutSubmitter, SubmissionRequest};
