// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Frame-counted tweens and a scheduler keyed by animation target.
//!
//! Tweens advance one step per display frame. Starting a tween on a target
//! that already has one cancels the old tween through its [`CancelToken`],
//! so the newest animation always wins. Nothing here reads a clock.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Values that can be blended
pub trait Lerp: Clone {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

/// Easing curve mapping linear progress to eased progress
pub type Easing = fn(f64) -> f64;

pub fn linear(t: f64) -> f64 {
    t
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// A transition from `start` to `end` over a fixed number of frames
#[derive(Debug, Clone)]
pub struct Tween<T> {
    start: T,
    end: T,
    frames: u32,
    frame: u32,
    easing: Easing,
}

impl<T: Lerp> Tween<T> {
    /// An ease-out-cubic tween. Zero frames is treated as one.
    pub fn new(start: T, end: T, frames: u32) -> Self {
        Self {
            start,
            end,
            frames: frames.max(1),
            frame: 0,
            easing: ease_out_cubic,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.frames
    }

    pub fn end(&self) -> &T {
        &self.end
    }

    /// Advance one frame and return the new value.
    ///
    /// The last frame returns `end` exactly.
    pub fn step(&mut self) -> T {
        self.frame = (self.frame + 1).min(self.frames);
        if self.is_finished() {
            return self.end.clone();
        }
        let t = (self.easing)(f64::from(self.frame) / f64::from(self.frames));
        self.start.lerp(&self.end, t)
    }
}

/// Shared cancellation flag for one running tween
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Running tweens, at most one per target
#[derive(Debug)]
pub struct Scheduler<K, T> {
    running: BTreeMap<K, (Tween<T>, CancelToken)>,
}

impl<K, T> Default for Scheduler<K, T> {
    fn default() -> Self {
        Self {
            running: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, T: Lerp> Scheduler<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween on `target`, cancelling the one already running there
    pub fn start(&mut self, target: K, tween: Tween<T>) -> CancelToken {
        let token = CancelToken::default();
        if let Some((_, previous)) = self.running.insert(target, (tween, token.clone())) {
            previous.cancel();
        }
        token
    }

    /// Cancel the tween on `target`. Returns false if none was running.
    pub fn cancel(&mut self, target: &K) -> bool {
        match self.running.remove(target) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, target: &K) -> bool {
        self.running.contains_key(target)
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    /// Advance every live tween one frame, reporting each new value.
    ///
    /// Finished and externally cancelled tweens are dropped. Returns the
    /// number of tweens still running.
    pub fn tick<F>(&mut self, mut on_frame: F) -> usize
    where
        F: FnMut(&K, T),
    {
        self.running.retain(|target, (tween, token)| {
            if token.is_cancelled() {
                return false;
            }
            on_frame(target, tween.step());
            !tween.is_finished()
        });
        self.running.len()
    }
}
