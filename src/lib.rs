//! VideoForge - batch video operations on top of ffmpeg
//!
//! Interactive actions (convert, compress, speed, resolution, filter, voice,
//! trim) and a combo pipeline that chains them through scoped scratch
//! directories.

pub mod actions;
pub mod cli;
pub mod combo;
pub mod config;
pub mod configurator;
pub mod error;
pub mod files;
pub mod media;
pub mod pipeline;
pub mod prompt;
pub mod selector;
pub mod steps;
