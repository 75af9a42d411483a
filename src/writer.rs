use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::layout::BlockLayout;

/// How the output file is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Truncate the destination and write into it directly. A failed run
    /// leaves whatever was written so far on disk.
    #[default]
    InPlace,
    /// Write to a temporary file next to the destination and rename it into
    /// place once every block is on disk.
    Atomic,
}

pub struct BlockWriter {
    layout: BlockLayout,
}

impl BlockWriter {
    pub fn new(layout: BlockLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Writes blocks `0..count` to `out` in index order.
    pub fn write_blocks<W: Write>(&self, out: &mut W, count: u64) -> std::io::Result<()> {
        if count == 0 {
            return Ok(());
        }
        let mut buf = vec![0; self.layout.block_size()];
        for index in 0..count {
            self.layout.fill_block(index, &mut buf);
            out.write_all(&buf)?;
        }
        Ok(())
    }

    /// Creates or overwrites `path` with `count` blocks.
    pub fn write_file<P: AsRef<Path>>(
        &self,
        path: P,
        count: u64,
        mode: OutputMode,
    ) -> anyhow::Result<()> {
        let path = path.as_ref();
        debug!(?path, count, ?mode, layout = ?self.layout, "writing blocks");
        match mode {
            OutputMode::InPlace => self.write_in_place(path, count),
            OutputMode::Atomic => self.write_atomic(path, count),
        }
    }

    fn write_in_place(&self, path: &Path, count: u64) -> anyhow::Result<()> {
        let file = File::create(path).with_context(|| format!("error creating {path:?}"))?;
        let mut out = BufWriter::new(file);
        self.write_blocks(&mut out, count)
            .and_then(|_| out.flush())
            .with_context(|| format!("error writing {path:?}"))?;
        trace!(?path, "flushed");
        Ok(())
    }

    fn write_atomic(&self, path: &Path, count: u64) -> anyhow::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("error creating temporary file in {dir:?}"))?;
        trace!(tmp = ?tmp.path(), "staging");
        {
            let mut out = BufWriter::new(tmp.as_file_mut());
            self.write_blocks(&mut out, count)
                .and_then(|_| out.flush())
                .with_context(|| format!("error writing temporary file for {path:?}"))?;
        }
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("error syncing temporary file for {path:?}"))?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("error renaming temporary file to {path:?}"))?;
        trace!(?path, "persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{ByteOrder, LittleEndian};

    use super::*;

    #[test]
    fn writes_blocks_in_order() {
        let layout = BlockLayout::new(32, 7).unwrap();
        let mut out = Vec::new();
        BlockWriter::new(layout).write_blocks(&mut out, 3).unwrap();

        assert_eq!(out.len(), 96);
        for (index, block) in out.chunks_exact(32).enumerate() {
            assert_eq!(LittleEndian::read_u64(&block[..8]), 7);
            for slot in block[8..].chunks_exact(8) {
                assert_eq!(LittleEndian::read_u64(slot), index as u64);
            }
        }
    }

    #[test]
    fn zero_blocks_writes_nothing() {
        let mut out = Vec::new();
        BlockWriter::new(BlockLayout::default())
            .write_blocks(&mut out, 0)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn matches_concatenated_blocks() {
        let layout = BlockLayout::default();
        let mut out = Vec::new();
        BlockWriter::new(layout).write_blocks(&mut out, 4).unwrap();
        let expected: Vec<u8> = (0..4).flat_map(|i| layout.block(i)).collect();
        assert_eq!(out, expected);
    }

    struct FailAfter {
        remaining: usize,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.remaining == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn propagates_write_errors() {
        let mut out = FailAfter { remaining: 4096 + 100 };
        let err = BlockWriter::new(BlockLayout::default())
            .write_blocks(&mut out, 10)
            .unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }
}
