//! HTTP middleware applied around every route.

pub mod access_log;
pub mod timeout;
