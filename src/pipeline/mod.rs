// src/pipeline/mod.rs

pub mod classifier;
pub mod extractors;
pub mod normalizer;
pub mod pacing;
pub mod readers;
pub mod sorter;
pub mod vision;
pub mod writers;
