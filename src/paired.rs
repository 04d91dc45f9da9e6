use crate::{error::Result, reader::LineIter, record::SamRecord};
use log::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPair {
    pub read1: Vec<u8>,
    pub read2: Vec<u8>,
}

impl ReadPair {
    pub fn new(read1: Vec<u8>, read2: Vec<u8>) -> Self {
        ReadPair { read1, read2 }
    }

    pub fn read1_record(&self) -> SamRecord<'_> {
        SamRecord::from_line(&self.read1)
    }
}

pub struct ReadPairs {
    lines: LineIter,
    orphan_records: usize,
}

impl ReadPairs {
    pub fn new(lines: LineIter) -> Self {
        ReadPairs {
            lines,
            orphan_records: 0,
        }
    }

    // Trailing read1 lines that had no mate; only final once exhausted.
    pub fn orphan_records(&self) -> usize {
        self.orphan_records
    }
}

impl Iterator for ReadPairs {
    type Item = Result<ReadPair>;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.lines.next(), self.lines.next()) {
            (Some(Ok(read1)), Some(Ok(read2))) => Some(Ok(ReadPair { read1, read2 })),
            (Some(Err(e)), _) | (_, Some(Err(e))) => Some(Err(e)),
            (Some(Ok(read1)), None) => {
                self.orphan_records += 1;
                warn!(
                    "Input ends with an unpaired read1 ({}), skipped",
                    String::from_utf8_lossy(SamRecord::from_line(&read1).name())
                );
                None
            }
            (None, _) => None,
        }
    }
}
