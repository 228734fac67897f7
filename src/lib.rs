//! docmill: documentation generation for a CLI tool catalog.
//!
//! Takes a JSON catalog of tool descriptions and produces per-tool and
//! per-family Markdown pages through a staged pipeline: annotations and
//! parameter tables, LLM-generated example prompts, template composition
//! with an optional AI improvement pass, and family assembly.
//!
//! # Usage
//! The `docmill` binary drives the pipeline via subcommands; the library
//! exposes every stage for integration tests and embedding.

pub mod catalog;
pub mod cli;
pub mod compose;
pub mod config;
pub mod contract;
pub mod family;
pub mod frontmatter;
pub mod llm;
pub mod load_config;
pub mod normalize;
pub mod pipeline;
pub mod sections;
pub mod slug;

pub use cli::{run, Cli, Commands};
