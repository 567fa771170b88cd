//! Prover side: live slots, fold sessions and the one-shot batch prover

mod batch_prover;
mod live;
mod session;

pub use batch_prover::{BatchMetadata, BatchProver, BatchProverConfig, PreparedBatch};
pub use live::LiveSlots;
pub use session::{FoldSession, FoldSnapshot};
