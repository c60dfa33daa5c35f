pub mod agents;
pub mod context;
pub mod outlet;
pub mod state;
pub mod validation;
pub mod workflow;
