use crate::decoder::{BadBlockCause, DecoderConfig, DropReason, Outcome};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BadBlockBreakdown {
    pub malformed_record: usize,
    pub truncated: usize,
    pub anchor_mutated: usize,
    pub missing_tail: usize,
    pub uncorrectable: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub pairs: usize,
    pub emitted: usize,
    pub bad_phase: usize,
    pub bad_linker: usize,
    pub bad_block: usize,
    pub low_quality: usize,
    // Rejections per block position; one pair may reject several blocks.
    pub block_rejections: [usize; 3],
    pub bad_block_causes: BadBlockBreakdown,
    pub corrected_blocks: usize,
    pub orphan_records: usize,
}

impl DecodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &Outcome) {
        self.pairs += 1;
        match outcome {
            Outcome::Emitted { corrected_blocks } => {
                self.emitted += 1;
                self.corrected_blocks += corrected_blocks;
            }
            Outcome::Dropped(DropReason::BadPhase(_)) => self.bad_phase += 1,
            Outcome::Dropped(DropReason::BadLinker(_)) => self.bad_linker += 1,
            Outcome::Dropped(DropReason::LowQuality { .. }) => self.low_quality += 1,
            Outcome::Dropped(DropReason::BadBlock(cause)) => {
                self.bad_block += 1;
                let causes = &mut self.bad_block_causes;
                match cause {
                    BadBlockCause::MalformedRecord => causes.malformed_record += 1,
                    BadBlockCause::Truncated => causes.truncated += 1,
                    BadBlockCause::AnchorMutated => causes.anchor_mutated += 1,
                    BadBlockCause::MissingTail => causes.missing_tail += 1,
                    BadBlockCause::Uncorrectable(rejected) => {
                        causes.uncorrectable += 1;
                        for (count, block) in self.block_rejections.iter_mut().zip(rejected.0) {
                            if block.is_some() {
                                *count += 1;
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn merge(&mut self, other: &DecodeStats) {
        self.pairs += other.pairs;
        self.emitted += other.emitted;
        self.bad_phase += other.bad_phase;
        self.bad_linker += other.bad_linker;
        self.bad_block += other.bad_block;
        self.low_quality += other.low_quality;
        for (mine, theirs) in self.block_rejections.iter_mut().zip(other.block_rejections) {
            *mine += theirs;
        }
        let causes = &mut self.bad_block_causes;
        causes.malformed_record += other.bad_block_causes.malformed_record;
        causes.truncated += other.bad_block_causes.truncated;
        causes.anchor_mutated += other.bad_block_causes.anchor_mutated;
        causes.missing_tail += other.bad_block_causes.missing_tail;
        causes.uncorrectable += other.bad_block_causes.uncorrectable;
        self.corrected_blocks += other.corrected_blocks;
        self.orphan_records += other.orphan_records;
    }

    pub fn dropped(&self) -> usize {
        self.bad_phase + self.bad_linker + self.bad_block + self.low_quality
    }

    pub fn is_conserved(&self) -> bool {
        self.emitted + self.dropped() == self.pairs
    }

    pub fn emit_rate(&self) -> f64 {
        if self.pairs == 0 {
            0.0
        } else {
            self.emitted as f64 / self.pairs as f64
        }
    }

    pub fn print_summary(&self) {
        let stdout = io::stdout();
        // A closed stdout leaves nothing to report to.
        let _ = self.write_summary(stdout.lock());
    }

    pub fn write_summary<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "Decoding Statistics:")?;
        writeln!(out, "  Read pairs: {}", self.pairs)?;
        writeln!(out, "  Emitted: {} ({:.2}%)", self.emitted, self.emit_rate() * 100.0)?;
        writeln!(out, "  Bad phase: {}", self.bad_phase)?;
        writeln!(out, "  Bad linker: {}", self.bad_linker)?;
        writeln!(out, "  Bad block: {}", self.bad_block)?;
        writeln!(
            out,
            "    malformed {}, truncated {}, anchor {}, tail {}, uncorrectable {}",
            self.bad_block_causes.malformed_record,
            self.bad_block_causes.truncated,
            self.bad_block_causes.anchor_mutated,
            self.bad_block_causes.missing_tail,
            self.bad_block_causes.uncorrectable
        )?;
        writeln!(
            out,
            "    rejected bc1 {}, bc2 {}, bc3 {}",
            self.block_rejections[0], self.block_rejections[1], self.block_rejections[2]
        )?;
        writeln!(out, "  Low quality: {}", self.low_quality)?;
        writeln!(out, "  Corrected blocks: {}", self.corrected_blocks)?;
        if self.orphan_records > 0 {
            writeln!(out, "  Orphan read1 records: {}", self.orphan_records)?;
        }
        out.flush()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub config: &'a DecoderConfig,
    pub stats: &'a DecodeStats,
}

impl<'a> RunReport<'a> {
    pub fn new(config: &'a DecoderConfig, stats: &'a DecodeStats) -> Self {
        RunReport { config, stats }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
