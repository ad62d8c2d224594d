//! Chunk planning — pure byte-range arithmetic, no I/O.

use chunkpipe_core::error::UploadError;
use chunkpipe_core::result::UploadResult;
use chunkpipe_core::types::chunk::ChunkSpec;

/// Split `[0, total_len)` into an ordered sequence of chunks of at most
/// `chunk_size` bytes. The final chunk may be shorter. Indices start at
/// zero and increase monotonically; the ranges are contiguous and
/// non-overlapping.
pub fn plan(total_len: u64, chunk_size: u64) -> UploadResult<Vec<ChunkSpec>> {
    if chunk_size == 0 {
        return Err(UploadError::InvalidChunkSize { chunk_size });
    }

    let mut chunks = Vec::with_capacity(chunks_total(total_len, chunk_size));
    let mut start = 0u64;
    let mut index = 0usize;
    while start < total_len {
        let end = (start + chunk_size).min(total_len);
        chunks.push(ChunkSpec { index, start, end });
        start = end;
        index += 1;
    }
    Ok(chunks)
}

/// Number of chunks a file of `total_len` bytes needs, never less
/// than one.
pub fn chunks_total(total_len: u64, chunk_size: u64) -> usize {
    let total = total_len.div_ceil(chunk_size.max(1)) as usize;
    total.max(1)
}
