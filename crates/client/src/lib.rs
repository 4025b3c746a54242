//! Client code for banner.
//!
//! This crate provides the HTTP fetch layer, directory listing and named-API
//! catalog sources, payload decoding, and the acquisition pipeline that ties
//! them to the core cache, selector and dedup tracker.

pub mod catalog;
pub mod decode;
pub mod fetch;
pub mod listing;
pub mod pipeline;

pub use catalog::{NamedApi, fetch_api_list, parse_api_list};
pub use decode::{DecodeError, DecodedImage, FormatHint, decode_image};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, HttpSource};
pub use listing::{DirectoryListing, ListingConfig};
pub use pipeline::{AcquisitionPipeline, AcquisitionResult, Failure, HttpPipeline, Mode, Stage};
