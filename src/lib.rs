//! Generates files of fixed-size, self-identifying blocks for poking at block
//! devices and filesystems by hand.
//!
//! Every block begins with an 8-byte marker and every following 8-byte slot
//! holds the block's own index, all little-endian. With the default layout a
//! block is 4096 bytes, so block `i` lives at offset `i * 4096` and reads as
//! `ef be ad de ef be ad de` followed by 511 copies of `i`.

mod layout;
mod size;
mod writer;

pub use layout::{BlockLayout, DEFAULT_BLOCK_SIZE, DEFAULT_MARKER, MAX_BLOCK_SIZE, SLOT_WIDTH};
pub use size::{bytes_from_megabytes, BYTES_PER_MEGABYTE};
pub use writer::{BlockWriter, OutputMode};
