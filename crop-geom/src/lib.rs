// SPDX-License-Identifier: MIT
//! # crop-geom: Crop Geometry for Dataset Captioning
//!
//! Pure geometry used by the dataset caption client: snapping crop rectangles
//! into image bounds, centering, extend-anchor placement and training-grid
//! alignment.
//!
//! ## Key Components
//!
//! - [`rect`]: crop rectangle type, `snap`/`center` normalization and the
//!   [`rect::CropTool`] widget-state wrapper with change notification
//! - [`anchor`]: the nine symbolic extend anchors and their canvas offsets
//! - [`grid`]: training-resolution alignment to the 64px grid
//!
//! ## Design Notes
//!
//! - `snap` always produces a valid rectangle for finite positive image
//!   dimensions; it never errors.
//! - Rectangle fields differing by less than half a pixel count as unchanged,
//!   so floating-point redraw jitter never triggers another correction pass.
//! - Programmatic mutation of the crop tool is protected by a single-flight
//!   scoped lock ([`rect::ScopedMutation`]); nested snap application while a
//!   mutation is in progress is suppressed rather than recursed into.

pub mod anchor;
pub mod grid;
pub mod rect;

pub use anchor::ExtendAnchor;
pub use grid::{aligned_resolution, round_up_to_grid, GRID_SIZE};
pub use rect::{center, snap, CropTool, MutationFlag, Rect, ScopedMutation};
