//! Tower middleware wrapped around the hyper client.

mod default_headers;

pub use default_headers::{DefaultHeadersLayer, DefaultHeadersService};
