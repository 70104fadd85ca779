//! tilewrap testing infrastructure
//!
//! In-memory stand-ins for every party the wrapper talks to: the wrapped
//! provider and its tiles, the component factory, and the host's sinks. The
//! mocks count calls per operation and can be told to fail the next call, so
//! tests can assert both what was forwarded and what was not.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tilewrap-testkit = { path = "../tilewrap-testkit" }
//! ```
//!
//! ```rust,no_run
//! use tilewrap_testkit::{MockCredential, RecordingEvents};
//!
//! let wrapped = MockCredential::connectable(3);
//! let host = RecordingEvents::new();
//! assert_eq!(wrapped.field_count(), 3);
//! assert!(host.events().is_empty());
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod host;
pub mod mocks;
pub mod strategies;

pub use host::{AlwaysContinue, RecordedEvent, RecordingEvents, RecordingProviderEvents};
pub use mocks::{MockCredential, MockFactory, MockProvider};
