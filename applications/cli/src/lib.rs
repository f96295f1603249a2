//! Tagsync command-line application
//!
//! `extract` writes a CSV of the library's tags, the CSV is edited in a
//! spreadsheet, `plan` previews and `update` writes it back. `convert` turns
//! video files into MP3 first.

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
