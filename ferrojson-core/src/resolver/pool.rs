// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Number of segments in the pool.
const NUM_SEGMENTS: usize = 16;

/// Items above this many retained per segment are dropped on return.
const MAX_IDLE_PER_SEGMENT: usize = 8;

static THREAD_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static SEGMENT_INDEX: Cell<usize> = Cell::new(
        (THREAD_ID_COUNTER.fetch_add(1, Ordering::Relaxed) as usize) % NUM_SEGMENTS
    );
}

struct Segment<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Segment<T> {
    fn new() -> Self {
        Segment {
            items: Mutex::new(Vec::new()),
        }
    }

    #[inline(always)]
    fn get(&self, factory: &dyn Fn() -> T) -> T {
        self.items.lock().pop().unwrap_or_else(factory)
    }

    #[inline(always)]
    fn put(&self, item: T) {
        let mut items = self.items.lock();
        if items.len() < MAX_IDLE_PER_SEGMENT {
            items.push(item);
        }
    }
}

/// A segmented pool of scratch objects, one lock per segment.
///
/// Threads are spread over the segments so concurrent encoders rarely contend.
/// Items are reset before they go back, so a borrower always starts from a
/// clean object.
pub struct Pool<T> {
    segments: [Segment<T>; NUM_SEGMENTS],
    factory: Box<dyn Fn() -> T + Send + Sync>,
    reset: fn(&mut T),
}

impl<T> Pool<T> {
    pub fn new<F>(factory: F, reset: fn(&mut T)) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Pool {
            segments: std::array::from_fn(|_| Segment::new()),
            factory: Box::new(factory),
            reset,
        }
    }

    /// Borrows an item, runs the handler and returns the item to the pool.
    ///
    /// Borrow and return are always paired, whatever the handler returns.
    #[inline(always)]
    pub fn borrow_mut<R>(&self, handler: impl FnOnce(&mut T) -> R) -> R {
        let segment_idx = SEGMENT_INDEX.with(|idx| idx.get());
        let segment = &self.segments[segment_idx];

        let mut obj = segment.get(&*self.factory);
        let result = handler(&mut obj);
        (self.reset)(&mut obj);
        segment.put(obj);
        result
    }

    /// Number of idle items currently held, across all segments.
    pub fn idle(&self) -> usize {
        self.segments.iter().map(|s| s.items.lock().len()).sum()
    }
}

/// Pool of byte buffers used for scratch encoding.
pub type BufferPool = Pool<Vec<u8>>;

pub fn buffer_pool() -> BufferPool {
    Pool::new(|| Vec::with_capacity(512), |buf: &mut Vec<u8>| buf.clear())
}
