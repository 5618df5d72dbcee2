//! BCS multiple-choice question generator.
//!
//! Text goes through normalization, script detection and feature extraction;
//! `assembler::QuizAssembler` then asks an optional remote model and fills any
//! gap with rule-based questions, always returning exactly the requested count.
//! The HTTP layer (`state`, `logic`, `protocol`, `routes`) is a thin wrapper.

pub mod assembler;
pub mod cache;
pub mod config;
pub mod distribution;
pub mod domain;
pub mod error;
pub mod extract;
pub mod features;
pub mod language;
pub mod llm;
pub mod logic;
pub mod normalize;
pub mod parser;
pub mod protocol;
pub mod quality;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod synth;
pub mod telemetry;
pub mod util;
pub mod wording;
