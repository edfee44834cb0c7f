// SPDX-License-Identifier: MIT OR Apache-2.0

mod client;
mod config;
mod request;
mod transport;
mod xml;

pub use client::ApiClient;
pub use config::{TransportConfig, USER_AGENT};
pub use request::Request;
pub use transport::{HttpTransport, Transport};
pub use xml::{Record, flatten};

#[cfg(test)]
pub(crate) use transport::testing;
