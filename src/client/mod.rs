//! Looker API client and authentication.
//!
//! This module provides the [`QueryApi`] contract the extraction engine is
//! written against, the [`LookerClient`] HTTP implementation, and [`Auth`].

mod api;
mod auth;
mod looker;

pub use api::{
    CreatedQuery, CreatedTask, QueryApi, QuerySpec, ResultFormat, TaskPoll, TaskStatus,
};
pub use auth::Auth;
pub use looker::{ClientOptions, DEFAULT_API_VERSION, DEFAULT_HTTP_TIMEOUT, LookerClient};
