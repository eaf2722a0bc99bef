// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen drawable pool.
//!
//! [`OffscreenLayer`] stands in for a GPU layer: it hands out at most
//! `max_in_flight` [`OffscreenDrawable`]s at a time, and a drawable goes back
//! to the pool when dropped. A zero-area layer produces nothing.

use alloc::rc::Rc;
use core::cell::Cell;

use kurbo::Size;
use surface_view_core::drawable::{Drawable, DrawableSource};

#[derive(Debug)]
struct Pool {
    in_flight: Cell<usize>,
    presented_count: Cell<u64>,
    last_presented: Cell<Option<u64>>,
}

/// A drawable from an [`OffscreenLayer`].
#[derive(Debug)]
pub struct OffscreenDrawable {
    serial: u64,
    size: Size,
    pool: Rc<Pool>,
}

impl OffscreenDrawable {
    /// Returns the drawable's serial number, unique per layer.
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Returns the pixel size the drawable was created with.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }
}

impl Drawable for OffscreenDrawable {
    fn present(&self) {
        self.pool
            .presented_count
            .set(self.pool.presented_count.get() + 1);
        self.pool.last_presented.set(Some(self.serial));
    }
}

impl Drop for OffscreenDrawable {
    fn drop(&mut self) {
        self.pool.in_flight.set(self.pool.in_flight.get() - 1);
    }
}

/// A layer producing offscreen drawables from a bounded pool.
#[derive(Debug)]
pub struct OffscreenLayer {
    size: Size,
    max_in_flight: usize,
    next_serial: u64,
    pool: Rc<Pool>,
}

impl OffscreenLayer {
    /// Default pool size, matching `CAMetalLayer`'s triple buffering.
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 3;

    /// Creates a layer of the given pixel size.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self::with_max_in_flight(size, Self::DEFAULT_MAX_IN_FLIGHT)
    }

    /// Creates a layer that allows `max_in_flight` outstanding drawables.
    #[must_use]
    pub fn with_max_in_flight(size: Size, max_in_flight: usize) -> Self {
        Self {
            size,
            max_in_flight,
            next_serial: 0,
            pool: Rc::new(Pool {
                in_flight: Cell::new(0),
                presented_count: Cell::new(0),
                last_presented: Cell::new(None),
            }),
        }
    }

    /// Changes the size of subsequently produced drawables.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Returns the number of drawables currently handed out.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pool.in_flight.get()
    }

    /// Returns the serial of the most recently presented drawable.
    #[must_use]
    pub fn last_presented(&self) -> Option<u64> {
        self.pool.last_presented.get()
    }

    /// Returns how many drawables have been presented.
    #[must_use]
    pub fn presented_count(&self) -> u64 {
        self.pool.presented_count.get()
    }
}

impl DrawableSource for OffscreenLayer {
    type Drawable = OffscreenDrawable;

    fn next_drawable(&mut self) -> Option<OffscreenDrawable> {
        if self.size.is_zero_area() || self.in_flight() >= self.max_in_flight {
            return None;
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.pool.in_flight.set(self.in_flight() + 1);
        Some(OffscreenDrawable {
            serial,
            size: self.size,
            pool: Rc::clone(&self.pool),
        })
    }

    fn drawable_size(&self) -> Size {
        self.size
    }
}
