//! Aula terminal front-end: argument parsing, environment config and text rendering
//! on top of the `aula_client_core` view controllers.

pub mod cli;
pub mod commands;
pub mod config;
pub mod render;
