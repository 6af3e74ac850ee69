//! # API Route Modules
//!
//! - `auth`: sign-in (password and one-time code), sign-out, password
//!   recovery, phone change, and the current-user view. Everything that needs
//!   a live session sits behind the session gate in [`crate::auth`].

pub mod auth;
