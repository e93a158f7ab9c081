pub mod payload;
pub mod executor;
pub mod selector;
pub mod allowlist;

pub use payload::PayloadShapeStage;
pub use executor::ExecutorMembershipStage;
pub use selector::SelectorExtractionStage;
pub use allowlist::AllowListStage;
