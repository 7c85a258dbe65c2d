pub mod orchestrator;
pub mod result;
