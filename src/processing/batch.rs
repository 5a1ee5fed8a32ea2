//! Splitting entry sequences into request sized chunks.

use crate::models::Chunk;
use itertools::{EitherOrBoth, Itertools};

/// Split `entries` into `ceil(N/size)` slices, all of length `size` except
/// possibly the last. Order is preserved. A `size` of 0 is treated as 1.
pub fn chunk_entries(entries: &[String], size: usize) -> Vec<&[String]> {
    entries.chunks(size.max(1)).collect()
}

/// Pair add and remove sequences into mutation chunks by position.
///
/// Chunk `i` takes `add[i*size..]` and `remove[i*size..]`, each capped at
/// `size`. The two sides are not matched by content, so when one side is
/// longer the trailing chunks carry entries from that side only. The chunk
/// count is the larger of the two per-side chunk counts.
pub fn pair_chunks(add: &[String], remove: &[String], size: usize) -> Vec<Chunk> {
    chunk_entries(add, size)
        .into_iter()
        .zip_longest(chunk_entries(remove, size))
        .map(|pair| match pair {
            EitherOrBoth::Both(add, remove) => Chunk {
                add: add.to_vec(),
                remove: remove.to_vec(),
            },
            EitherOrBoth::Left(add) => Chunk {
                add: add.to_vec(),
                remove: vec![],
            },
            EitherOrBoth::Right(remove) => Chunk {
                add: vec![],
                remove: remove.to_vec(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidrs(n: usize, third_octet: u8) -> Vec<String> {
        (0..n)
            .map(|i| format!("10.{}.{third_octet}.{}/32", i / 256, i % 256))
            .collect()
    }

    #[test]
    fn test_chunk_entries_counts() {
        for (n, k, expected) in [(0, 100, 0), (1, 100, 1), (100, 100, 1), (101, 100, 2), (250, 100, 3), (7, 3, 3)] {
            let entries = cidrs(n, 0);
            let chunks = chunk_entries(&entries, k);
            assert_eq!(chunks.len(), expected, "N={n} K={k}");
            if let Some((last, full)) = chunks.split_last() {
                assert!(full.iter().all(|c| c.len() == k), "N={n} K={k}");
                let last_len = if n % k == 0 { k } else { n % k };
                assert_eq!(last.len(), last_len, "N={n} K={k}");
            }
            assert_eq!(chunks.concat(), entries, "concatenation rebuilds the input");
        }
    }

    #[test]
    fn test_chunk_entries_zero_size() {
        let entries = cidrs(3, 0);
        assert_eq!(chunk_entries(&entries, 0).len(), 3);
    }

    #[test]
    fn test_pair_chunks_by_position() {
        let add = cidrs(250, 1);
        let remove = cidrs(120, 2);
        let chunks = pair_chunks(&add, &remove, 100);

        assert_eq!(chunks.len(), 3, "max(3 add chunks, 2 remove chunks)");
        assert_eq!(chunks[0].add, add[0..100]);
        assert_eq!(chunks[0].remove, remove[0..100]);
        assert_eq!(chunks[1].add, add[100..200]);
        assert_eq!(chunks[1].remove, remove[100..120]);
        assert_eq!(chunks[2].add, add[200..250]);
        assert!(chunks[2].remove.is_empty(), "remove side exhausted");
    }

    #[test]
    fn test_pair_chunks_remove_only() {
        let remove = cidrs(5, 2);
        let chunks = pair_chunks(&[], &remove, 2);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.add.is_empty()));
        assert_eq!(chunks[2].remove, vec!["10.0.2.4/32"]);
    }

    #[test]
    fn test_pair_chunks_nothing_to_do() {
        assert!(pair_chunks(&[], &[], 100).is_empty());
    }
}
