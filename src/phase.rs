use crate::{barcode::BLOCK_LEN, distance::levenshtein};

pub const CANONICAL_PHASES: [&[u8]; 6] = [b"", b"A", b"CT", b"GCA", b"TGCG", b"ATCGA"];

#[derive(Debug, Clone)]
pub struct PhaseTable {
    entries: Vec<Vec<u8>>,
}

impl Default for PhaseTable {
    fn default() -> Self {
        PhaseTable::new(CANONICAL_PHASES)
    }
}

impl PhaseTable {
    pub fn new<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        PhaseTable {
            entries: entries.into_iter().map(|p| p.as_ref().to_vec()).collect(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|e| e.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseCall {
    pub entry: usize,
    pub offset: usize,
    pub distance: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseFailure {
    NoRoom,
    TooDistant(usize),
}

#[derive(Debug, Clone)]
pub struct PhaseCorrector {
    table: PhaseTable,
    tolerance: usize,
}

impl Default for PhaseCorrector {
    fn default() -> Self {
        PhaseCorrector {
            table: PhaseTable::default(),
            tolerance: 2,
        }
    }
}

impl PhaseCorrector {
    pub fn new(table: PhaseTable) -> Self {
        PhaseCorrector {
            table,
            ..Default::default()
        }
    }

    pub fn tolerance(mut self, tolerance: usize) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn phase_block(seq: &[u8], linker1_start: usize) -> Option<&[u8]> {
        linker1_start
            .checked_sub(BLOCK_LEN)
            .and_then(|end| seq.get(..end))
    }

    pub fn classify(&self, seq: &[u8], linker1_start: usize) -> Result<PhaseCall, PhaseFailure> {
        let block = Self::phase_block(seq, linker1_start).ok_or(PhaseFailure::NoRoom)?;

        if let Some(entry) = self.table.entries().position(|p| p == block) {
            return Ok(PhaseCall {
                entry,
                offset: block.len(),
                distance: 0,
            });
        }

        let mut nearest: Option<(usize, usize, usize)> = None;
        for (entry, phase) in self.table.entries().enumerate() {
            let distance = levenshtein(block, phase);
            if nearest.map_or(true, |(_, _, d)| distance < d) {
                nearest = Some((entry, phase.len(), distance));
            }
        }

        match nearest {
            Some((entry, offset, distance)) if distance <= self.tolerance => Ok(PhaseCall {
                entry,
                offset,
                distance,
            }),
            Some((_, _, distance)) => Err(PhaseFailure::TooDistant(distance)),
            None => Err(PhaseFailure::TooDistant(block.len())),
        }
    }
}
