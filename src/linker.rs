use crate::distance::hamming_within;

pub const LINKER1: &[u8] = b"TAGCCATCGCATTGC";
pub const LINKER2: &[u8] = b"TACCTCTGAGCTGAA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkerHit {
    pub start: usize,
    pub end: usize,
    pub mismatches: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkerSpans {
    pub linker1: LinkerHit,
    pub linker2: LinkerHit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkerFailure {
    AmbiguousBase,
    Linker1Missing,
    Linker2Missing,
}

#[derive(Debug, Clone)]
pub struct LinkerLocator {
    linker1: Vec<u8>,
    linker2: Vec<u8>,
    max_mismatches: usize,
}

impl Default for LinkerLocator {
    fn default() -> Self {
        LinkerLocator {
            linker1: LINKER1.to_vec(),
            linker2: LINKER2.to_vec(),
            max_mismatches: 1,
        }
    }
}

impl LinkerLocator {
    pub fn new(linker1: &[u8], linker2: &[u8]) -> Self {
        LinkerLocator {
            linker1: linker1.to_vec(),
            linker2: linker2.to_vec(),
            ..Default::default()
        }
    }

    pub fn max_mismatches(mut self, mismatches: usize) -> Self {
        self.max_mismatches = mismatches;
        self
    }

    pub fn locate(&self, seq: &[u8]) -> Result<LinkerSpans, LinkerFailure> {
        if crate::simd::contains_char(seq, b'N') {
            return Err(LinkerFailure::AmbiguousBase);
        }

        let linker1 = find_motif(seq, &self.linker1, self.max_mismatches)
            .ok_or(LinkerFailure::Linker1Missing)?;
        let linker2 = find_motif(seq, &self.linker2, self.max_mismatches)
            .ok_or(LinkerFailure::Linker2Missing)?;

        Ok(LinkerSpans { linker1, linker2 })
    }
}

pub fn find_motif(seq: &[u8], motif: &[u8], max_mismatches: usize) -> Option<LinkerHit> {
    if motif.is_empty() || seq.len() < motif.len() {
        return None;
    }

    let mut best: Option<LinkerHit> = None;
    for (start, window) in seq.windows(motif.len()).enumerate() {
        let limit = best.map_or(max_mismatches, |b| b.mismatches.saturating_sub(1));
        if best.is_some_and(|b| b.mismatches == 0) {
            break;
        }
        if let Some(mismatches) = hamming_within(window, motif, limit) {
            best = Some(LinkerHit {
                start,
                end: start + motif.len(),
                mismatches,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read() -> Vec<u8> {
        [
            &b"CT"[..], b"AAACCC", LINKER1, b"CCCCCC", LINKER2, b"GGGGGG", b"ACG", b"TTTTTTTT",
            b"GAC", b"T",
        ]
        .concat()
    }

    #[test]
    fn test_exact_linkers() {
        let spans = LinkerLocator::default().locate(&read()).unwrap();
        assert_eq!(spans.linker1.start, 8);
        assert_eq!(spans.linker1.end, 23);
        assert_eq!(spans.linker1.mismatches, 0);
        assert_eq!(spans.linker2.start, 29);
        assert_eq!(spans.linker2.end, 44);
    }

    #[test]
    fn test_single_substitution_tolerated() {
        let mut read = read();
        read[10] = b'T';
        let spans = LinkerLocator::default().locate(&read).unwrap();
        assert_eq!(spans.linker1.start, 8);
        assert_eq!(spans.linker1.mismatches, 1);
    }

    #[test]
    fn test_two_substitutions_rejected() {
        let mut read = read();
        read[30] = b'G';
        read[33] = b'A';
        assert_eq!(
            LinkerLocator::default().locate(&read),
            Err(LinkerFailure::Linker2Missing)
        );
    }

    #[test]
    fn test_ambiguous_base() {
        let mut read = read();
        read[60] = b'N';
        assert_eq!(
            LinkerLocator::default().locate(&read),
            Err(LinkerFailure::AmbiguousBase)
        );
    }

    #[test]
    fn test_prefers_exact_over_earlier_mismatch() {
        let mut seq = b"TAGCCATCGCATTGA".to_vec();
        seq.extend_from_slice(b"AC");
        seq.extend_from_slice(LINKER1);
        let hit = find_motif(&seq, LINKER1, 1).unwrap();
        assert_eq!(hit.start, 17);
        assert_eq!(hit.mismatches, 0);
    }

    #[test]
    fn test_leftmost_among_ties() {
        let mut seq = b"TAGCCATCGCATTGA".to_vec();
        seq.extend_from_slice(b"TAGCCATCGCATTGT");
        let hit = find_motif(&seq, LINKER1, 1).unwrap();
        assert_eq!(hit.start, 0);
        assert_eq!(hit.mismatches, 1);
    }

    #[test]
    fn test_short_sequence() {
        assert_eq!(find_motif(b"TAGCC", LINKER1, 1), None);
    }
}
