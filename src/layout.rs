// phase | bc1 | linker1 | bc2 | linker2 | bc3 | ACG | umi | GAC | tail...

use crate::{barcode::BLOCK_LEN, linker::LinkerSpans};

pub const UMI_LEN: usize = 8;
pub const ANCHOR: &[u8] = b"ACGGAC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlocks<'a> {
    pub blocks: [&'a [u8]; 3],
    pub block_starts: [usize; 3],
    pub umi: &'a [u8],
    pub umi_start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFailure {
    Truncated,
    AnchorMutated,
    MissingTail,
}

#[derive(Debug, Clone)]
pub struct BlockExtractor {
    anchor: Vec<u8>,
}

impl Default for BlockExtractor {
    fn default() -> Self {
        BlockExtractor {
            anchor: ANCHOR.to_vec(),
        }
    }
}

impl BlockExtractor {
    pub fn new(anchor: &[u8]) -> Self {
        BlockExtractor {
            anchor: anchor.to_vec(),
        }
    }

    // bc2 is whatever lies between the linkers, so its length is checked by
    // the corrector rather than here.
    pub fn extract<'a>(
        &self,
        seq: &'a [u8],
        offset: usize,
        spans: &LinkerSpans,
    ) -> Result<RawBlocks<'a>, LayoutFailure> {
        let l1_end = spans.linker1.end;
        let l2_start = spans.linker2.start;
        let l2_end = spans.linker2.end;

        let (expected_open, expected_close) = self.anchor.split_at(self.anchor.len() / 2);

        let bc3_start = l2_end;
        let open_anchor = bc3_start + BLOCK_LEN;
        let umi_start = open_anchor + expected_open.len();
        let close_anchor = umi_start + UMI_LEN;
        let tail_start = close_anchor + expected_close.len();

        let slice = move |start: usize, end: usize| seq.get(start..end).ok_or(LayoutFailure::Truncated);

        let bc1 = slice(offset, offset + BLOCK_LEN)?;
        let bc2 = seq.get(l1_end..l2_start).unwrap_or_default();
        let bc3 = slice(bc3_start, open_anchor)?;
        let opening = slice(open_anchor, umi_start)?;
        let umi = slice(umi_start, close_anchor)?;
        let closing = slice(close_anchor, tail_start)?;

        if opening != expected_open || closing != expected_close {
            return Err(LayoutFailure::AnchorMutated);
        }

        if seq.len() <= tail_start {
            return Err(LayoutFailure::MissingTail);
        }

        Ok(RawBlocks {
            blocks: [bc1, bc2, bc3],
            block_starts: [offset, l1_end, bc3_start],
            umi,
            umi_start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::{LinkerHit, LINKER1, LINKER2};

    fn synthetic(tail: &[u8]) -> (Vec<u8>, LinkerSpans) {
        let seq = [
            &b"GCA"[..], b"AACCGG", LINKER1, b"TTGGCC", LINKER2, b"CAGTCA", b"ACG", b"ATATATAT",
            b"GAC", tail,
        ]
        .concat();
        let spans = LinkerSpans {
            linker1: LinkerHit { start: 9, end: 24, mismatches: 0 },
            linker2: LinkerHit { start: 30, end: 45, mismatches: 0 },
        };
        (seq, spans)
    }

    #[test]
    fn test_extract_blocks() {
        let (seq, spans) = synthetic(b"TTT");
        let raw = BlockExtractor::default().extract(&seq, 3, &spans).unwrap();
        assert_eq!(raw.blocks, [&b"AACCGG"[..], b"TTGGCC", b"CAGTCA"]);
        assert_eq!(raw.block_starts, [3, 24, 45]);
        assert_eq!(raw.umi, b"ATATATAT");
        assert_eq!(raw.umi_start, 54);
    }

    #[test]
    fn test_anchor_mutation_is_fatal() {
        for position in [51, 52, 53, 62, 63, 64] {
            let (mut seq, spans) = synthetic(b"T");
            seq[position] = if seq[position] == b'T' { b'A' } else { b'T' };
            assert_eq!(
                BlockExtractor::default().extract(&seq, 3, &spans),
                Err(LayoutFailure::AnchorMutated),
                "position {}",
                position
            );
        }
    }

    #[test]
    fn test_missing_tail() {
        let (seq, spans) = synthetic(b"");
        assert_eq!(
            BlockExtractor::default().extract(&seq, 3, &spans),
            Err(LayoutFailure::MissingTail)
        );
    }

    #[test]
    fn test_truncated_read() {
        let (seq, spans) = synthetic(b"");
        assert_eq!(
            BlockExtractor::default().extract(&seq[..58], 3, &spans),
            Err(LayoutFailure::Truncated)
        );
    }

    #[test]
    fn test_overlapping_linkers_yield_empty_bc2() {
        let (seq, mut spans) = synthetic(b"T");
        spans.linker2.start = 20;
        let raw = BlockExtractor::default().extract(&seq, 3, &spans).unwrap();
        assert!(raw.blocks[1].is_empty());
    }
}
