pub mod dispatcher;
pub mod engine;

pub use crate::domain::model::{
    AggregateResult, DispatchSummary, EndpointCatalog, EndpointDescriptor, FetchOutcome,
    FetchStrategy,
};
pub use crate::domain::ports::{ConfigProvider, JsonSource};
pub use crate::utils::error::Result;
