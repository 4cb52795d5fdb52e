//! The concurrent streaming dispatcher.
//!
//! A producer frames the input into line chunks and hands them to a pool of
//! shard workers through a bounded [`chunk_queue::ChunkQueue`]. Each worker
//! owns exactly one output sink. The [`pipeline::Pipeline`] starts every
//! participant, propagates cancellation on the first fatal error and
//! aggregates the outcome.

pub mod chunk_queue;
pub mod pipeline;
pub mod worker;

#[cfg(test)]
mod tests;

pub use chunk_queue::{ChunkQueue, ChunkQueueState, Dispatch};
pub use pipeline::{Pipeline, PipelineConfig, RunSummary, ShardTarget};
pub use worker::{ShardWorker, WorkerState, WorkerSummary};
