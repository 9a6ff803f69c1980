pub mod core;
pub mod graph;
pub mod index;
pub mod llm;
pub mod logging;
pub mod server;
pub mod state;
pub mod tools;
