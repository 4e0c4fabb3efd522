//! HTTP front-end for brandrag.
//!
//! Serves a small web form, a health probe and the JSON `/ask` endpoint over
//! one shared [`AppContext`].

pub mod page;
pub mod routes;
pub mod server;

pub use server::{build_router, serve, AppContext, PipelineInit};
