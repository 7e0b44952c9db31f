//! HTTP clients and authentication.
//!
//! This module provides the [`IsamsClient`] for the school-management API,
//! the [`GoogleClient`] shared by the warehouse and file collaborators, and
//! OAuth2 client-credentials token acquisition.

mod auth;
pub mod google;
mod isams;
mod secrets;

pub use auth::{AccessToken, Auth, Credentials, request_access_token};
pub use google::{GoogleClient, GoogleEndpoints};
pub use isams::{IsamsClient, take_records};
pub use secrets::{SecretManager, decode_payload};
