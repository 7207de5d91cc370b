//! CLI module graph.

pub mod board;
pub mod command;
pub mod output;
pub mod place;
pub mod result;
pub mod seed;
pub mod simulate;
