use crate::{barcode::BLOCK_LEN, layout::UMI_LEN, record::QualityEncoding};

#[derive(Debug, Clone)]
pub struct QualityGate {
    min_quality: u8,
    max_low_quality: usize,
    encoding: QualityEncoding,
}

impl Default for QualityGate {
    fn default() -> Self {
        QualityGate {
            min_quality: 10,
            max_low_quality: 0,
            encoding: QualityEncoding::Phred33,
        }
    }
}

impl QualityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_quality(mut self, phred: u8) -> Self {
        self.min_quality = phred;
        self
    }

    pub fn max_low_quality(mut self, bases: usize) -> Self {
        self.max_low_quality = bases;
        self
    }

    pub fn encoding(mut self, encoding: QualityEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[inline]
    pub fn threshold_byte(&self) -> u8 {
        self.encoding.threshold_byte(self.min_quality)
    }

    // Low-quality bases inside `qual[start..start + len]`; a window running
    // past the end counts the missing positions as low quality.
    pub fn count_window(&self, qual: &[u8], start: usize, len: usize) -> usize {
        let end = start.saturating_add(len);
        let available = qual.get(start.min(qual.len())..end.min(qual.len())).unwrap_or_default();
        let missing = len - available.len();
        let threshold = self.threshold_byte();
        available.iter().filter(|&&b| b < threshold).count() + missing
    }

    pub fn check(
        &self,
        qual: &[u8],
        block_starts: &[usize; 3],
        umi_start: usize,
    ) -> Result<usize, usize> {
        let low = block_starts
            .iter()
            .map(|&start| self.count_window(qual, start, BLOCK_LEN))
            .sum::<usize>()
            + self.count_window(qual, umi_start, UMI_LEN);

        if low > self.max_low_quality {
            Err(low)
        } else {
            Ok(low)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTS: [usize; 3] = [0, 10, 20];

    #[test]
    fn test_all_high_quality_passes() {
        let qual = vec![b'I'; 40];
        assert_eq!(QualityGate::default().check(&qual, &STARTS, 30), Ok(0));
    }

    #[test]
    fn test_single_low_base_fails_strict_gate() {
        let mut qual = vec![b'I'; 40];
        qual[33] = b'*';
        assert_eq!(QualityGate::default().check(&qual, &STARTS, 30), Err(1));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut qual = vec![b'I'; 40];
        qual[2] = b'+';
        assert_eq!(QualityGate::default().check(&qual, &STARTS, 30), Ok(0));
    }

    #[test]
    fn test_bases_outside_windows_are_ignored() {
        let mut qual = vec![b'I'; 40];
        qual[7] = b'#';
        qual[38] = b'#';
        assert_eq!(QualityGate::default().check(&qual, &STARTS, 30), Ok(0));
    }

    #[test]
    fn test_looser_budget() {
        let mut qual = vec![b'I'; 40];
        qual[1] = b'#';
        qual[11] = b'#';
        let gate = QualityGate::new().max_low_quality(2);
        assert_eq!(gate.check(&qual, &STARTS, 30), Ok(2));
        qual[21] = b'#';
        assert_eq!(gate.check(&qual, &STARTS, 30), Err(3));
    }

    #[test]
    fn test_window_past_end_counts_as_low() {
        let qual = vec![b'I'; 34];
        assert_eq!(QualityGate::default().count_window(&qual, 30, UMI_LEN), 4);
        assert_eq!(QualityGate::default().count_window(&qual, 40, UMI_LEN), 8);
    }

    #[test]
    fn test_count_window_counts_only_bytes_below_threshold() {
        let qual = b"I*+#IIII,!";
        let gate = QualityGate::default();
        assert_eq!(gate.count_window(qual, 0, BLOCK_LEN), 2);
        assert_eq!(gate.count_window(qual, 2, UMI_LEN), 2);

        let phred64 = QualityGate::new().encoding(QualityEncoding::Phred64);
        assert_eq!(phred64.count_window(b"hhhJII", 0, BLOCK_LEN), 2);
    }
}
