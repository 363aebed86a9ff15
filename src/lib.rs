//! # classbump - A Size-Classed Bump Allocator
//!
//! This crate provides a **segmented bump allocator** for scratch memory that
//! lives for one scope: many small allocations, no individual frees, one bulk
//! release at the end.
//!
//! ## Overview
//!
//! Every request is rounded up to a power-of-two **size class**. Each class
//! owns a bucket with its own chain of chunks, and allocation is a pointer
//! bump inside the newest chunk of that chain:
//!
//! ```text
//!   Size Classes and Buckets:
//!
//!   alloc(10) ──► class 2^4
//!                    │
//!   ┌────────┐       ▼
//!   │ 2^3    │──► [chunk]
//!   ├────────┤
//!   │ 2^4    │──► [newest chunk] ──► [full chunk] ──► [full chunk]
//!   ├────────┤         │
//!   │ 2^5    │         ▼
//!   ├────────┤   ┌──┬──┬──┬──┬──┬──────────────────┐
//!   │  ...   │   │16│16│16│16│16│       free       │
//!   ├────────┤   └──┴──┴──┴──┴──┴──────────────────┘
//!   │ 2^max  │                  ▲
//!   └────────┘                  └── cursor (next alloc)
//!
//!   Fast allocation: O(1) - round the cursor up, move it by the class size.
//! ```
//!
//! When the newest chunk cannot fit another slot, a fresh chunk is acquired
//! and becomes the head. Full chunks are never reused, so no pointer moves
//! until [`BumpAllocator::release`].
//!
//! ## Crate Structure
//!
//! ```text
//!   classbump
//!   ├── align      - Alignment macro (align!) and rounding helpers
//!   ├── block      - Raw block descriptor traded with providers
//!   ├── class      - Size-class router
//!   ├── chunk      - Chunk table addressed by handle (internal)
//!   ├── bucket     - Per-class bump bucket (internal)
//!   ├── provider   - MemoryProvider trait and the libc-backed SystemProvider
//!   ├── config     - ArenaConfig and OversizePolicy
//!   ├── error      - ArenaError, ProviderError, ConfigError
//!   └── bump       - BumpAllocator facade
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use classbump::{ArenaConfig, BumpAllocator};
//!
//! let mut allocator = BumpAllocator::new(ArenaConfig::default()).unwrap();
//!
//! let ptr = allocator.alloc(10).unwrap().cast::<u64>();
//!
//! unsafe {
//!     ptr.as_ptr().write(42);
//!     assert_eq!(ptr.as_ptr().read(), 42);
//! }
//!
//! // No-op, kept for call sites written against a general allocator.
//! allocator.free(ptr.cast());
//!
//! // Hands every chunk back. `ptr` must not be used after this.
//! allocator.release().unwrap();
//! ```
//!
//! ## Oversize Requests
//!
//! Requests above `max_class_bytes` either get a dedicated block (still
//! reclaimed by `release`) or fail with [`ArenaError::SizeTooLarge`],
//! depending on [`OversizePolicy`].
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **No individual frees**: `free` is a no-op
//! - **No resizing**: blocks are never grown in place
//! - **Unix-only**: `SystemProvider` requires `libc` and `posix_memalign`
//!
//! ## Safety
//!
//! Pointers handed out by the allocator are raw: the caller is responsible
//! for not touching them after `release` or drop.

pub mod align;
mod block;
mod bucket;
mod bump;
mod chunk;
mod class;
mod config;
mod error;
mod provider;

pub use block::Block;
pub use bump::{ArenaStats, BumpAllocator};
pub use class::SizeClasses;
pub use config::{ArenaConfig, DEFAULT_CHUNK_BYTES, DEFAULT_MAX_CLASS_BYTES, OversizePolicy};
pub use error::{ArenaError, ConfigError, ProviderError};
pub use provider::{MemoryProvider, SystemProvider};
