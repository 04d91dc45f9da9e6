use crate::{
    distance::hamming,
    error::{DecodeError, Result},
    parser::StreamingLineParser,
};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const BLOCK_LEN: usize = 6;
pub const EXPECTED_BLOCKS: usize = 96;

#[derive(Debug, Clone)]
pub struct ReferenceBarcodeSet {
    blocks: Vec<[u8; BLOCK_LEN]>,
    lookup: HashSet<[u8; BLOCK_LEN]>,
}

impl ReferenceBarcodeSet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let set = Self::from_reader(file)?;
        debug!("Loaded {} reference blocks from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut set = ReferenceBarcodeSet {
            blocks: Vec::with_capacity(EXPECTED_BLOCKS),
            lookup: HashSet::with_capacity(EXPECTED_BLOCKS),
        };

        for (index, line) in StreamingLineParser::new(reader).enumerate() {
            let line = line?;
            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }
            set.push(index + 1, trimmed)?;
        }

        set.finish()
    }

    pub fn from_blocks<I, B>(blocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut set = ReferenceBarcodeSet {
            blocks: Vec::new(),
            lookup: HashSet::new(),
        };
        for (index, block) in blocks.into_iter().enumerate() {
            set.push(index + 1, block.as_ref().trim_ascii())?;
        }
        set.finish()
    }

    fn push(&mut self, line: usize, raw: &[u8]) -> Result<()> {
        let invalid = |reason: String| DecodeError::InvalidReferenceBlock {
            line,
            block: String::from_utf8_lossy(raw).into_owned(),
            reason,
        };

        if raw.len() != BLOCK_LEN {
            return Err(invalid(format!(
                "expected {} bases, found {}",
                BLOCK_LEN,
                raw.len()
            )));
        }

        let mut block = [0u8; BLOCK_LEN];
        for (slot, &base) in block.iter_mut().zip(raw) {
            let base = base.to_ascii_uppercase();
            if !matches!(base, b'A' | b'C' | b'G' | b'T') {
                return Err(invalid(format!("invalid base {:?}", base as char)));
            }
            *slot = base;
        }

        if self.lookup.insert(block) {
            self.blocks.push(block);
        } else {
            warn!(
                "Duplicate reference block {} at line {} ignored",
                String::from_utf8_lossy(&block),
                line
            );
        }
        Ok(())
    }

    fn finish(self) -> Result<Self> {
        if self.blocks.is_empty() {
            return Err(DecodeError::EmptyReference);
        }
        if self.blocks.len() != EXPECTED_BLOCKS {
            warn!(
                "Reference set has {} blocks, expected {}",
                self.blocks.len(),
                EXPECTED_BLOCKS
            );
        }
        Ok(self)
    }

    #[inline]
    pub fn contains(&self, block: &[u8]) -> bool {
        <[u8; BLOCK_LEN]>::try_from(block)
            .map(|b| self.lookup.contains(&b))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8; BLOCK_LEN]> {
        self.blocks.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    Exact,
    Corrected { distance: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectedBlock {
    pub sequence: [u8; BLOCK_LEN],
    pub correction: Correction,
}

impl CorrectedBlock {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.sequence
    }

    #[inline]
    pub fn is_exact(&self) -> bool {
        self.correction == Correction::Exact
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRejection {
    WrongLength(usize),
    TooDistant(usize),
}

pub struct BarcodeCorrector<'r> {
    reference: &'r ReferenceBarcodeSet,
    max_distance: usize,
}

impl<'r> BarcodeCorrector<'r> {
    pub fn new(reference: &'r ReferenceBarcodeSet) -> Self {
        BarcodeCorrector {
            reference,
            max_distance: 1,
        }
    }

    pub fn max_distance(mut self, distance: usize) -> Self {
        self.max_distance = distance;
        self
    }

    pub fn correct(&self, block: &[u8]) -> std::result::Result<CorrectedBlock, BlockRejection> {
        let raw: [u8; BLOCK_LEN] = block
            .try_into()
            .map_err(|_| BlockRejection::WrongLength(block.len()))?;

        if self.reference.lookup.contains(&raw) {
            return Ok(CorrectedBlock {
                sequence: raw,
                correction: Correction::Exact,
            });
        }

        let mut best: Option<(&[u8; BLOCK_LEN], usize)> = None;
        for known in self.reference.iter() {
            let distance = hamming(&raw, known).unwrap_or(BLOCK_LEN);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((known, distance));
                if distance == 1 {
                    break;
                }
            }
        }

        match best {
            Some((known, distance)) if distance <= self.max_distance => Ok(CorrectedBlock {
                sequence: *known,
                correction: Correction::Corrected { distance },
            }),
            Some((_, distance)) => Err(BlockRejection::TooDistant(distance)),
            None => Err(BlockRejection::TooDistant(BLOCK_LEN)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ReferenceBarcodeSet {
        ReferenceBarcodeSet::from_blocks(["AAAAAA", "CCCCCC", "GGGGGG", "ACGTAC"]).unwrap()
    }

    #[test]
    fn test_exact_block_is_unchanged() {
        let reference = reference();
        let corrector = BarcodeCorrector::new(&reference);
        for block in reference.iter() {
            let corrected = corrector.correct(block).unwrap();
            assert_eq!(&corrected.sequence, block);
            assert!(corrected.is_exact());
        }
    }

    #[test]
    fn test_single_substitution_is_corrected() {
        let reference = reference();
        let corrector = BarcodeCorrector::new(&reference);
        let corrected = corrector.correct(b"ACGTAA").unwrap();
        assert_eq!(corrected.as_bytes(), b"ACGTAC");
        assert_eq!(corrected.correction, Correction::Corrected { distance: 1 });
    }

    #[test]
    fn test_distant_block_is_rejected() {
        let reference = reference();
        let corrector = BarcodeCorrector::new(&reference);
        assert_eq!(corrector.correct(b"AACCGG"), Err(BlockRejection::TooDistant(4)));
        assert_eq!(corrector.correct(b"ACGTA"), Err(BlockRejection::WrongLength(5)));
        assert_eq!(corrector.correct(b"ACGTACG"), Err(BlockRejection::WrongLength(7)));
    }

    #[test]
    fn test_wider_correction_limit() {
        let reference = reference();
        let corrector = BarcodeCorrector::new(&reference).max_distance(2);
        let corrected = corrector.correct(b"ACGTTT").unwrap();
        assert_eq!(corrected.as_bytes(), b"ACGTAC");
        assert_eq!(corrected.correction, Correction::Corrected { distance: 2 });
    }

    #[test]
    fn test_reference_loading_errors() {
        assert!(matches!(
            ReferenceBarcodeSet::from_reader(&b"\n\n"[..]),
            Err(DecodeError::EmptyReference)
        ));
        assert!(matches!(
            ReferenceBarcodeSet::from_reader(&b"AAAAAA\nCCCCC\n"[..]),
            Err(DecodeError::InvalidReferenceBlock { line: 2, .. })
        ));
        assert!(matches!(
            ReferenceBarcodeSet::from_reader(&b"AAAANA\n"[..]),
            Err(DecodeError::InvalidReferenceBlock { line: 1, .. })
        ));
    }

    #[test]
    fn test_reference_loading_normalises() {
        let set = ReferenceBarcodeSet::from_reader(&b"acgtac\r\n  AAAAAA \nACGTAC\n"[..]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(b"ACGTAC"));
        assert!(set.contains(b"AAAAAA"));
        assert!(!set.contains(b"AAAAA"));
    }
}
