#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`SbomBuildError`)
//! - [`types`]: Document types (`SbomFormat`, `SbomDocument`, `SbomOptions`,
//!   `ArtifactDigests`)
//! - [`util`]: Checksum translation, purl construction, artifact digests
//! - [`spdx`]: SPDX 2.3 JSON assembly (package/relationship style)
//! - [`cyclonedx`]: CycloneDX 1.5 JSON assembly (component/dependency-graph
//!   style)

pub mod cyclonedx;
pub mod error;
pub mod spdx;
pub mod types;
pub mod util;

// --- Public API Re-exports ---

// Error
pub use error::SbomBuildError;

// Types
pub use types::{ArtifactDigests, SbomDocument, SbomFormat, SbomOptions};

// Helpers
pub use util::{artifact_digests, translate_checksum};
