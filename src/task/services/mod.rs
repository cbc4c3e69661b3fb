//! Application services for marketplace lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    AcceptOutcome, ApplyRequest, CompletionOutcome, ConflictError, MarketplaceError,
    MarketplaceResult, MarketplaceService, NotFoundError,
};
