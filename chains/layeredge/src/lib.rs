//! # LayerEdge Light-Node Keeper
//!
//! Keeps the LayerEdge light node of every configured wallet running: each
//! hour it checks every wallet's node status and submits a signed
//! activation request for inactive ones.

pub mod api;
pub mod config;
pub mod orchestrator;
pub mod session;

pub use orchestrator::{CycleOrchestrator, CycleReport, LiveSessionFactory, SessionFactory};
pub use session::{NodeClient, NodeSession};
