//! homeval: terminal and browser frontend for a residential price
//! prediction backend.
//!
//! The crate is split the same way the binary uses it:
//! - [`api`] talks to the backend and validates what comes back
//! - [`predictor`] and [`dashboard`] are the two view controllers
//! - [`cli`] and [`web`] are the surfaces that drive them
//! - [`config`] and [`telemetry`] carry settings and the request log

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod predictor;
pub mod telemetry;
pub mod utils;
pub mod web;
