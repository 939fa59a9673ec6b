pub mod envelope;
pub mod remote;
pub mod text;
pub mod types;

pub use envelope::{Request, RequestError, Response};
pub use remote::{PageListing, ProcessOptions, ProcessPageRequest};
pub use types::{
    AnalysisSummary, Category, RegionKind, ViolationSpan, ViolationSummary,
};
