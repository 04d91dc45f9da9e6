use crate::{
    barcode::{BarcodeCorrector, BlockRejection, CorrectedBlock, ReferenceBarcodeSet, BLOCK_LEN},
    error::{DecodeError, Result},
    layout::{BlockExtractor, LayoutFailure, ANCHOR, UMI_LEN},
    linker::{LinkerFailure, LinkerLocator, LinkerSpans, LINKER1, LINKER2},
    phase::{PhaseCall, PhaseCorrector, PhaseFailure, PhaseTable, CANONICAL_PHASES},
    quality::QualityGate,
    record::{QualityEncoding, SamRecord},
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CELL_BARCODE_LEN: usize = 3 * BLOCK_LEN;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub linker1: String,
    pub linker2: String,
    pub anchor: String,
    pub phases: Vec<String>,
    pub linker_mismatches: usize,
    pub phase_tolerance: usize,
    pub max_correction_distance: usize,
    pub max_low_quality: usize,
    pub min_quality: u8,
    pub quality_encoding: QualityEncoding,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        let text = |b: &[u8]| String::from_utf8_lossy(b).into_owned();
        DecoderConfig {
            linker1: text(LINKER1),
            linker2: text(LINKER2),
            anchor: text(ANCHOR),
            phases: CANONICAL_PHASES.iter().map(|p| text(*p)).collect(),
            linker_mismatches: 1,
            phase_tolerance: 2,
            max_correction_distance: 1,
            max_low_quality: 0,
            min_quality: 10,
            quality_encoding: QualityEncoding::Phred33,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn linker_mismatches(mut self, mismatches: usize) -> Self {
        self.linker_mismatches = mismatches;
        self
    }

    pub fn phase_tolerance(mut self, tolerance: usize) -> Self {
        self.phase_tolerance = tolerance;
        self
    }

    pub fn max_correction_distance(mut self, distance: usize) -> Self {
        self.max_correction_distance = distance;
        self
    }

    pub fn max_low_quality(mut self, bases: usize) -> Self {
        self.max_low_quality = bases;
        self
    }

    pub fn min_quality(mut self, phred: u8) -> Self {
        self.min_quality = phred;
        self
    }

    pub fn quality_encoding(mut self, encoding: QualityEncoding) -> Self {
        self.quality_encoding = encoding;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.linker1.is_empty() || self.linker2.is_empty() {
            return Err(DecodeError::InvalidConfig("linker motifs must not be empty".into()));
        }
        if self.anchor.len() < 2 || self.anchor.len() % 2 != 0 {
            return Err(DecodeError::InvalidConfig(format!(
                "anchor {:?} must have an even, non-zero length",
                self.anchor
            )));
        }
        if self.phases.is_empty() {
            return Err(DecodeError::InvalidConfig("phase table is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RejectedBlocks(pub [Option<BlockRejection>; 3]);

impl RejectedBlocks {
    pub fn is_rejected(&self, block: usize) -> bool {
        self.0.get(block).is_some_and(|r| r.is_some())
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|r| r.is_some()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadBlockCause {
    // Fewer than 11 columns, or SEQ and QUAL lengths differ.
    MalformedRecord,
    Truncated,
    AnchorMutated,
    MissingTail,
    Uncorrectable(RejectedBlocks),
}

impl From<LayoutFailure> for BadBlockCause {
    fn from(failure: LayoutFailure) -> Self {
        match failure {
            LayoutFailure::Truncated => BadBlockCause::Truncated,
            LayoutFailure::AnchorMutated => BadBlockCause::AnchorMutated,
            LayoutFailure::MissingTail => BadBlockCause::MissingTail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    BadPhase(PhaseFailure),
    BadLinker(LinkerFailure),
    BadBlock(BadBlockCause),
    LowQuality { low_bases: usize },
}

impl DropReason {
    pub fn category(&self) -> OutcomeCategory {
        match self {
            DropReason::BadPhase(_) => OutcomeCategory::DroppedBadPhase,
            DropReason::BadLinker(_) => OutcomeCategory::DroppedBadLinker,
            DropReason::BadBlock(_) => OutcomeCategory::DroppedBadBlock,
            DropReason::LowQuality { .. } => OutcomeCategory::DroppedLowQuality,
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::BadPhase(PhaseFailure::NoRoom) => write!(f, "bad phase: no room for bc1"),
            DropReason::BadPhase(PhaseFailure::TooDistant(d)) => {
                write!(f, "bad phase: nearest phase block at distance {}", d)
            }
            DropReason::BadLinker(LinkerFailure::AmbiguousBase) => write!(f, "bad linker: N in read"),
            DropReason::BadLinker(failure) => write!(f, "bad linker: {:?}", failure),
            DropReason::BadBlock(BadBlockCause::Uncorrectable(rejected)) => {
                write!(f, "bad block: {} uncorrectable block(s) {:?}", rejected.count(), rejected.0)
            }
            DropReason::BadBlock(cause) => write!(f, "bad block: {:?}", cause),
            DropReason::LowQuality { low_bases } => {
                write!(f, "low quality: {} low-quality base(s)", low_bases)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCategory {
    Emitted,
    DroppedBadPhase,
    DroppedBadLinker,
    DroppedBadBlock,
    DroppedLowQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Emitted { corrected_blocks: usize },
    Dropped(DropReason),
}

impl Outcome {
    pub fn of(result: &std::result::Result<DecodedBarcode, DropReason>) -> Self {
        match result {
            Ok(decoded) => Outcome::Emitted {
                corrected_blocks: decoded.corrected_blocks(),
            },
            Err(reason) => Outcome::Dropped(*reason),
        }
    }

    pub fn category(&self) -> OutcomeCategory {
        match self {
            Outcome::Emitted { .. } => OutcomeCategory::Emitted,
            Outcome::Dropped(reason) => reason.category(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    pub blocks: [CorrectedBlock; 3],
    pub umi: [u8; UMI_LEN],
    pub phase: PhaseCall,
    pub linkers: LinkerSpans,
    pub block_starts: [usize; 3],
    pub umi_start: usize,
}

impl DecodedBarcode {
    pub fn cell_barcode(&self) -> [u8; CELL_BARCODE_LEN] {
        let mut barcode = [0u8; CELL_BARCODE_LEN];
        for (chunk, block) in barcode.chunks_exact_mut(BLOCK_LEN).zip(&self.blocks) {
            chunk.copy_from_slice(&block.sequence);
        }
        barcode
    }

    pub fn corrected_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_exact()).count()
    }
}

pub struct Decoder {
    reference: ReferenceBarcodeSet,
    config: DecoderConfig,
    locator: LinkerLocator,
    phase: PhaseCorrector,
    extractor: BlockExtractor,
    gate: QualityGate,
}

impl Decoder {
    pub fn new(reference: ReferenceBarcodeSet, config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(reference, config))
    }

    pub fn with_defaults(reference: ReferenceBarcodeSet) -> Self {
        Self::assemble(reference, DecoderConfig::default())
    }

    // Callers must have validated `config`.
    fn assemble(reference: ReferenceBarcodeSet, config: DecoderConfig) -> Self {
        let locator = LinkerLocator::new(config.linker1.as_bytes(), config.linker2.as_bytes())
            .max_mismatches(config.linker_mismatches);
        let phase = PhaseCorrector::new(PhaseTable::new(&config.phases))
            .tolerance(config.phase_tolerance);
        let extractor = BlockExtractor::new(config.anchor.as_bytes());
        let gate = QualityGate::new()
            .min_quality(config.min_quality)
            .max_low_quality(config.max_low_quality)
            .encoding(config.quality_encoding);

        Decoder {
            reference,
            config,
            locator,
            phase,
            extractor,
            gate,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceBarcodeSet {
        &self.reference
    }

    pub fn decode(&self, read1: &SamRecord) -> std::result::Result<DecodedBarcode, DropReason> {
        if !read1.is_decodable() {
            return Err(DropReason::BadBlock(BadBlockCause::MalformedRecord));
        }
        self.decode_sequence(read1.seq(), read1.qual())
    }

    pub fn decode_sequence(
        &self,
        seq: &[u8],
        qual: &[u8],
    ) -> std::result::Result<DecodedBarcode, DropReason> {
        let linkers = self.locator.locate(seq).map_err(DropReason::BadLinker)?;

        let phase = self
            .phase
            .classify(seq, linkers.linker1.start)
            .map_err(DropReason::BadPhase)?;

        let raw = self
            .extractor
            .extract(seq, phase.offset, &linkers)
            .map_err(|failure| DropReason::BadBlock(failure.into()))?;

        // All three blocks are corrected so every rejection is attributed.
        let corrector = BarcodeCorrector::new(&self.reference)
            .max_distance(self.config.max_correction_distance);
        let results = raw.blocks.map(|block| corrector.correct(block));
        let [Ok(bc1), Ok(bc2), Ok(bc3)] = results else {
            let rejected = RejectedBlocks(results.map(|r| r.err()));
            return Err(DropReason::BadBlock(BadBlockCause::Uncorrectable(rejected)));
        };

        self.gate
            .check(qual, &raw.block_starts, raw.umi_start)
            .map_err(|low_bases| DropReason::LowQuality { low_bases })?;

        let umi: [u8; UMI_LEN] = raw
            .umi
            .try_into()
            .map_err(|_| DropReason::BadBlock(BadBlockCause::Truncated))?;

        Ok(DecodedBarcode {
            blocks: [bc1, bc2, bc3],
            umi,
            phase,
            linkers,
            block_starts: raw.block_starts,
            umi_start: raw.umi_start,
        })
    }
}
