//! Relay gate: the single authoritative authorization point.
//!
//! Every forwarded action passes through the [`PolicyEvaluator`], which runs
//! four ordered stages and returns a [`relay_types::Decision`]:
//!
//! 1. **Payload Shape**: the payload must carry a 4-byte selector
//! 2. **Executor Membership**: the caller must be a registered executor
//! 3. **Selector Extraction**: the selector is read from the payload prefix
//! 4. **Allow-list Check**: `allowed && (!scoped || selectors[selector])`
//!
//! The first denying stage ends the evaluation. The pipeline is fail-closed:
//! it only runs with all four stages present in canonical order.
//!
//! State lives in the [`AllowListStore`] and [`ExecutorRegistry`]. The
//! evaluator reads them through the [`AllowListProvider`] and
//! [`ExecutorProvider`] traits, so it never needs write access.

pub mod allowlist;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod mocks;
pub mod registry;
pub mod stages;
pub mod traits;

pub use allowlist::{AllowListSnapshot, AllowListStore, TargetConfig};
pub use context::{GateContext, StageRecord, StageResult};
pub use error::GateError;
pub use evaluator::{Evaluation, PolicyEvaluator};
pub use mocks::{StaticAllowList, StaticExecutors};
pub use registry::ExecutorRegistry;
pub use stages::{
    AllowListStage, ExecutorMembershipStage, PayloadShapeStage, SelectorExtractionStage,
};
pub use traits::{AllowListProvider, ExecutorProvider, GateStage};
