//! Photo Derivatives Service
//!
//! Reacts to insert events from the photo gallery table's change stream,
//! derives a thumbnail and a high-quality variant from the original image in
//! S3, and writes the public URLs of both derivatives back onto the photo
//! record. One failed photo never aborts the batch.
//!
//! ## Architecture
//!
//! ```text
//! Change stream batch         S3 Bucket                  DynamoDB
//! ┌──────────────┐           ┌─────────────────┐        ┌──────────────┐
//! │ INSERT       │           │ {user}/original/ │        │ photo_info.  │
//! │ records      │──────────▶│ {user}/small/    │        │   mobile_*   │
//! └──────────────┘           │ {user}/large/    │        │   _url       │
//!        │                   └─────────────────┘        └──────────────┘
//!        ▼                        ▲       │                     ▲
//! ┌──────────────┐                │       ▼                     │
//! │ Stream       │          ┌───────────┐ ┌────────────┐        │
//! │ Filter       │─────────▶│ Publisher │▶│ Generator  │        │
//! └──────────────┘          └───────────┘ └────────────┘        │
//!                                 │                             │
//!                                 ▼                             │
//!                           ┌───────────┐                       │
//!                           │ Metadata  │───────────────────────┘
//!                           │ Updater   │
//!                           └───────────┘
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod generator;
pub mod handler;
pub mod metadata_store;
pub mod object_store;
pub mod publisher;
pub mod stream;

pub use config::Config;
pub use encoding::{EncodingError, ImageEncoding};
pub use error::PipelineError;
pub use generator::{DerivativeGenerator, EncodedDerivative};
pub use handler::{BatchOutcome, PhotoPipeline};
pub use metadata_store::PhotoMetadataStore;
pub use object_store::{PhotoObjectStore, SourceObject};
pub use publisher::{DerivativePublisher, DerivativeProfile, LARGE_PROFILE, SMALL_PROFILE};
pub use stream::{extract_inserts, MalformedEvent, PhotoInsert, StreamBatch, StreamRecord};
