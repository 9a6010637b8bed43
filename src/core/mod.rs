//! # Core Module
//!
//! This module provides the resource container shared between the engine's single-threaded
//! systems.
//!
//! ## Key Components
//! - `StResource`: Single-threaded reference-counted resource with interior mutability

pub mod st_resource;

pub use st_resource::StResource;
