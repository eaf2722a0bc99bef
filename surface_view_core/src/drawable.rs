// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawables and the layers that produce them.
//!
//! A [`DrawableSource`] is the GPU-compositable layer behind the view
//! (`CAMetalLayer`, an offscreen pool). It hands out [`Drawable`]s, one per
//! frame. The view borrows a drawable through a [`DrawableSlot`] for the
//! duration of one frame and then either presents it or releases it back to
//! the layer by dropping it.

use kurbo::Size;

/// A GPU-presentable surface handle for one frame.
///
/// Dropping a drawable without presenting it returns it to its layer.
pub trait Drawable {
    /// Schedules this drawable for presentation.
    fn present(&self);
}

/// The layer that produces drawables for the view.
pub trait DrawableSource {
    /// The drawable type handed out by this layer.
    type Drawable: Drawable;

    /// Returns the next drawable, or `None` when the surface cannot produce
    /// one (zero-sized, not yet configured, every drawable in flight).
    fn next_drawable(&mut self) -> Option<Self::Drawable>;

    /// Returns the size of the drawables this source produces, in pixels.
    fn drawable_size(&self) -> Size;
}

/// Outcome of drawable acquisition for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Acquisition {
    /// Nobody asked for a drawable.
    #[default]
    NotRequested,
    /// A drawable was obtained.
    Acquired,
    /// A drawable was requested and none was available.
    Unavailable,
}

/// Single-slot holder for the current drawable.
///
/// The slot asks its source for a drawable only when empty, so repeated
/// accesses within a frame return the same drawable.
#[derive(Debug)]
pub struct DrawableSlot<D> {
    current: Option<D>,
    acquisition: Acquisition,
}

impl<D> Default for DrawableSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DrawableSlot<D> {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: None,
            acquisition: Acquisition::NotRequested,
        }
    }

    /// Returns the held drawable, acquiring one from `source` if the slot is
    /// empty.
    ///
    /// Returns `None` when the source has nothing to give; a later call may
    /// succeed.
    pub fn acquire<S>(&mut self, source: &mut S) -> Option<&D>
    where
        S: DrawableSource<Drawable = D> + ?Sized,
    {
        if self.current.is_none() {
            match source.next_drawable() {
                Some(drawable) => {
                    self.current = Some(drawable);
                    self.acquisition = Acquisition::Acquired;
                }
                None => {
                    if self.acquisition != Acquisition::Acquired {
                        self.acquisition = Acquisition::Unavailable;
                    }
                }
            }
        }
        self.current.as_ref()
    }

    /// Returns the held drawable without acquiring.
    #[must_use]
    pub fn peek(&self) -> Option<&D> {
        self.current.as_ref()
    }

    /// Removes and returns the held drawable.
    pub fn take(&mut self) -> Option<D> {
        self.current.take()
    }

    /// Starts a new frame's bookkeeping.
    ///
    /// A drawable acquired before the frame counts as acquired for it.
    pub fn begin_frame(&mut self) {
        self.acquisition = if self.current.is_some() {
            Acquisition::Acquired
        } else {
            Acquisition::NotRequested
        };
    }

    /// Drops any held drawable, returning it to its layer.
    ///
    /// Returns `true` if a drawable was released.
    pub fn release(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Returns what happened to drawable acquisition this frame.
    #[must_use]
    pub const fn acquisition(&self) -> Acquisition {
        self.acquisition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[derive(Debug)]
    struct TestDrawable {
        id: u32,
        presented: Rc<Cell<u32>>,
    }

    impl Drawable for TestDrawable {
        fn present(&self) {
            self.presented.set(self.presented.get() + 1);
        }
    }

    struct TestSource {
        next_id: u32,
        available: bool,
        presented: Rc<Cell<u32>>,
    }

    impl TestSource {
        fn new(available: bool) -> Self {
            Self {
                next_id: 0,
                available,
                presented: Rc::new(Cell::new(0)),
            }
        }
    }

    impl DrawableSource for TestSource {
        type Drawable = TestDrawable;

        fn next_drawable(&mut self) -> Option<TestDrawable> {
            if !self.available {
                return None;
            }
            self.next_id += 1;
            Some(TestDrawable {
                id: self.next_id,
                presented: Rc::clone(&self.presented),
            })
        }

        fn drawable_size(&self) -> Size {
            Size::new(64.0, 64.0)
        }
    }

    #[test]
    fn repeated_acquire_returns_same_drawable() {
        let mut source = TestSource::new(true);
        let mut slot = DrawableSlot::new();
        slot.begin_frame();
        let first = slot.acquire(&mut source).map(|d| d.id);
        let second = slot.acquire(&mut source).map(|d| d.id);
        assert_eq!(first, Some(1));
        assert_eq!(second, Some(1), "slot holds one drawable per frame");
        assert_eq!(slot.acquisition(), Acquisition::Acquired);
    }

    #[test]
    fn unavailable_surface_yields_none() {
        let mut source = TestSource::new(false);
        let mut slot = DrawableSlot::new();
        slot.begin_frame();
        assert!(slot.acquire(&mut source).is_none());
        assert_eq!(slot.acquisition(), Acquisition::Unavailable);

        // The surface becomes ready later in the same frame.
        source.available = true;
        assert!(slot.acquire(&mut source).is_some());
        assert_eq!(slot.acquisition(), Acquisition::Acquired);
    }

    #[test]
    fn take_then_acquire_fetches_a_new_drawable() {
        let mut source = TestSource::new(true);
        let mut slot = DrawableSlot::new();
        let _ = slot.acquire(&mut source);
        let taken = slot.take().expect("drawable was acquired");
        taken.present();
        assert_eq!(source.presented.get(), 1);
        assert_eq!(slot.acquire(&mut source).map(|d| d.id), Some(2));
    }

    #[test]
    fn release_reports_whether_a_drawable_was_held() {
        let mut source = TestSource::new(true);
        let mut slot = DrawableSlot::new();
        assert!(!slot.release());
        let _ = slot.acquire(&mut source);
        assert!(slot.release());
        assert!(slot.peek().is_none());
    }

    #[test]
    fn begin_frame_keeps_pre_acquired_drawable() {
        let mut source = TestSource::new(true);
        let mut slot = DrawableSlot::new();
        let _ = slot.acquire(&mut source);
        slot.begin_frame();
        assert_eq!(slot.acquisition(), Acquisition::Acquired);
        assert_eq!(slot.peek().map(|d| d.id), Some(1));
    }
}
