pub mod cli;
pub mod color_gate;
pub mod config;
pub mod error;
pub mod features;
pub mod matcher;
pub mod pipeline;
pub mod policy;
pub mod reference;
pub mod runner;
pub mod scanner;
pub mod video;
