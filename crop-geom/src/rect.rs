// SPDX-License-Identifier: MIT
//! # Crop Rectangle Normalization
//!
//! Snapping and centering of crop rectangles in image pixel space, plus the
//! [`CropTool`] state wrapper that applies normalization on every mutation
//! and notifies subscribers of bound changes.
//!
//! The invariant maintained by [`snap`]:
//! `0 <= x`, `0 <= y`, `x + width <= image_w`, `y + height <= image_h`,
//! `width >= 1`, `height >= 1`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Rectangle fields differing by less than this many pixels count as
/// unchanged. Keeps floating-point redraws from feeding back into endless
/// sub-pixel corrections.
pub const CHANGE_THRESHOLD: f64 = 0.5;

/// A crop rectangle in image pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether any field differs from `other` by at least [`CHANGE_THRESHOLD`].
    pub fn differs_from(&self, other: &Rect) -> bool {
        (self.x - other.x).abs() >= CHANGE_THRESHOLD
            || (self.y - other.y).abs() >= CHANGE_THRESHOLD
            || (self.width - other.width).abs() >= CHANGE_THRESHOLD
            || (self.height - other.height).abs() >= CHANGE_THRESHOLD
    }
}

/// Snap a rectangle into the bounds of an `image_w` x `image_h` image.
///
/// Width and height are clamped to `[1, image_w]` / `[1, image_h]` first,
/// then the origin is clamped so the rectangle never exceeds the image.
/// Always produces a valid rectangle for finite positive image dimensions.
pub fn snap(rect: Rect, image_w: f64, image_h: f64) -> Rect {
    let width = rect.width.clamp(1.0, image_w);
    let height = rect.height.clamp(1.0, image_h);
    let x = rect.x.clamp(0.0, image_w - width);
    let y = rect.y.clamp(0.0, image_h - height);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Recenter a rectangle within the image without altering its size.
pub fn center(rect: Rect, image_w: f64, image_h: f64) -> Rect {
    Rect {
        x: (image_w - rect.width) / 2.0,
        y: (image_h - rect.height) / 2.0,
        ..rect
    }
}

/// Shared single-flight flag guarding programmatic crop mutations.
///
/// Cloning yields a handle to the same flag, so an embedding widget adapter
/// can observe (or hold) the lock the crop tool uses internally.
#[derive(Clone, Debug, Default)]
pub struct MutationFlag(Arc<AtomicBool>);

impl MutationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a scoped mutation is currently in progress.
    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// RAII guard for a scoped crop mutation.
///
/// Acquired before programmatically mutating crop state and released on drop,
/// including on unwind, so a panicking change handler can never leave the
/// tool permanently locked.
pub struct ScopedMutation {
    flag: MutationFlag,
}

impl ScopedMutation {
    /// Acquire the lock, or `None` when a mutation is already in flight.
    pub fn try_acquire(flag: &MutationFlag) -> Option<Self> {
        if flag.0.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self { flag: flag.clone() })
    }
}

impl Drop for ScopedMutation {
    fn drop(&mut self) {
        self.flag.0.store(false, Ordering::SeqCst);
    }
}

type BoundsHandler = Box<dyn FnMut(&Rect) + Send>;

/// Stateful crop-tool wrapper around [`snap`].
///
/// Holds the current rectangle and image bounds. Every requested rectangle is
/// snapped before it is stored; sub-threshold changes are dropped; accepted
/// changes are pushed to subscribers registered via
/// [`CropTool::on_bounds_changed`]. The tool carries no rendering logic, so a
/// controller can derive display state from the notifications alone.
pub struct CropTool {
    image_w: f64,
    image_h: f64,
    rect: Rect,
    lock: MutationFlag,
    handlers: Vec<BoundsHandler>,
}

impl CropTool {
    /// Create a tool covering the whole `image_w` x `image_h` image.
    pub fn new(image_w: f64, image_h: f64) -> Self {
        Self {
            image_w,
            image_h,
            rect: Rect::new(0.0, 0.0, image_w, image_h),
            lock: MutationFlag::new(),
            handlers: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn image_size(&self) -> (f64, f64) {
        (self.image_w, self.image_h)
    }

    /// Handle to the single-flight lock protecting programmatic mutations.
    pub fn lock_handle(&self) -> MutationFlag {
        self.lock.clone()
    }

    /// Subscribe to accepted bound changes.
    pub fn on_bounds_changed(&mut self, handler: impl FnMut(&Rect) + Send + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Request a new rectangle.
    ///
    /// The rectangle is snapped into image bounds first. Returns `true` when
    /// the stored rectangle actually changed (by at least half a pixel) and
    /// subscribers were notified. Calls made while a scoped mutation is in
    /// progress are suppressed and return `false`.
    pub fn set_rect(&mut self, requested: Rect) -> bool {
        let Some(_guard) = ScopedMutation::try_acquire(&self.lock) else {
            return false;
        };
        let snapped = snap(requested, self.image_w, self.image_h);
        if !snapped.differs_from(&self.rect) {
            return false;
        }
        self.rect = snapped;
        let rect = self.rect;
        for handler in &mut self.handlers {
            handler(&rect);
        }
        true
    }

    /// Recenter the current rectangle within the image.
    pub fn center(&mut self) -> bool {
        let centered = center(self.rect, self.image_w, self.image_h);
        self.set_rect(centered)
    }

    /// Point the tool at a new image, resetting the rectangle to cover it.
    /// Subscribers stay registered and are notified of the reset bounds.
    pub fn reset(&mut self, image_w: f64, image_h: f64) {
        self.image_w = image_w;
        self.image_h = image_h;
        let full = Rect::new(0.0, 0.0, image_w, image_h);
        if !self.set_rect(full) {
            // Same bounds as before; still record them.
            self.rect = snap(full, image_w, image_h);
        }
    }
}
