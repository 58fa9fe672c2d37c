//! Face-attribute analysis.
//!
//! A thin client over the detector's REST API with local image validation,
//! table-driven error classification, and a summary of the attributes the
//! presentation layer displays.

mod attributes;
mod classify;
mod client;

pub use attributes::{Age, Beauty, FaceAttributes, FaceQuality, FaceSummary, Hair, Labeled, QualityRating};
pub use client::FaceClient;
