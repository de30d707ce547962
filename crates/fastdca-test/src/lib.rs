//! # FastDCA Test
//!
//! In-memory HTTP testing for FastDCA servers. [`TestClient`] hands
//! requests to [`Server::dispatch`](fastdca_server::Server::dispatch), so
//! tests exercise routing, dependency resolution and error envelopes
//! without binding a port.
//!
//! ## Example
//!
//! ```rust,ignore
//! let client = TestClient::new(app(AppConfig::default()));
//!
//! let response = client.get("/blog/99").send().await;
//! response
//!     .assert_status(StatusCode::NOT_FOUND)
//!     .assert_error_message("Object ID 99 not found");
//! ```

#![doc(html_root_url = "https://docs.rs/fastdca-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
