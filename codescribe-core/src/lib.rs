#![doc = "codescribe-core: core pipeline for codescribe."]

//! This crate holds everything between "a path on disk" and "text on screen or in a PDF":
//! loading the source, building the prompt, calling the local model, extracting the
//! completion and exporting the result. The CLI crate only wires these together.
//!
//! # Usage
//! Most callers want [`analyse::analyse`] for a single run, or [`session::Session`]
//! when several actions (open, clear, save) share one displayed document.

pub mod analyse;
pub mod code_to_pdf;
pub mod config;
pub mod contract;
pub mod export;
pub mod extract;
pub mod loader;
pub mod markdown;
pub mod ollama;
pub mod prompt;
pub mod session;
