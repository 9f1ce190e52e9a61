//! A REST service managing system configuration records.
//!
//! Requests flow through the axum router in [`route`], the middleware stack
//! in [`server`] and the handler pipeline in [`handlers`], down to a
//! [`domain::repository::SystemConfigRepository`] backed by PostgreSQL.
//! Options come from flags, a config file and the environment (see
//! [`options`]).

pub mod config;
pub mod db;
pub mod domain;
pub mod errcode;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod options;
pub mod persistence;
pub mod route;
pub mod server;
pub mod state;
pub mod version;
