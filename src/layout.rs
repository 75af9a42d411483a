use byteorder::{ByteOrder, LittleEndian};

/// Width of every field in a block: the marker and each index slot.
pub const SLOT_WIDTH: usize = std::mem::size_of::<u64>();

pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024;
pub const DEFAULT_MARKER: u64 = 0xdead_beef_dead_beef;
/// Largest block size accepted; one block is held in memory while writing.
pub const MAX_BLOCK_SIZE: usize = 1 << 30;

/// Geometry of a generated block.
///
/// A block is `block_size` bytes: the marker in the first slot, then the
/// block's index repeated in every remaining slot. All fields are encoded
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    block_size: usize,
    marker: u64,
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            marker: DEFAULT_MARKER,
        }
    }
}

impl BlockLayout {
    pub fn new(block_size: usize, marker: u64) -> anyhow::Result<Self> {
        if block_size < SLOT_WIDTH {
            anyhow::bail!("block size {block_size} is smaller than one {SLOT_WIDTH}-byte slot");
        }
        if block_size > MAX_BLOCK_SIZE {
            anyhow::bail!("block size {block_size} exceeds the {MAX_BLOCK_SIZE}-byte limit");
        }
        if block_size % SLOT_WIDTH != 0 {
            anyhow::bail!("block size {block_size} is not a multiple of {SLOT_WIDTH}");
        }
        Ok(Self { block_size, marker })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn marker(&self) -> u64 {
        self.marker
    }

    pub fn slots_per_block(&self) -> usize {
        self.block_size / SLOT_WIDTH
    }

    /// Number of whole blocks that fit in `bytes`. Any remainder is dropped.
    pub fn block_count(&self, bytes: u64) -> u64 {
        bytes / self.block_size as u64
    }

    /// Writes the content of block `index` into `buf`.
    ///
    /// Panics if `buf` is not exactly one block long.
    pub fn fill_block(&self, index: u64, buf: &mut [u8]) {
        assert_eq!(buf.len(), self.block_size);
        let (marker, payload) = buf.split_at_mut(SLOT_WIDTH);
        LittleEndian::write_u64(marker, self.marker);
        for slot in payload.chunks_exact_mut(SLOT_WIDTH) {
            LittleEndian::write_u64(slot, index);
        }
    }

    pub fn block(&self, index: u64) -> Vec<u8> {
        let mut buf = vec![0; self.block_size];
        self.fill_block(index, &mut buf);
        buf
    }
}
