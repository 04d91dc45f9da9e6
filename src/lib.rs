pub mod barcode;
pub mod buffer;
pub mod compare;
pub mod decoder;
pub mod distance;
pub mod error;
pub mod layout;
pub mod linker;
pub mod metrics;
pub mod paired;
pub mod parallel;
pub mod parser;
pub mod phase;
pub mod quality;
pub mod reader;
pub mod record;
pub mod simd;
pub mod tagger;
pub mod writer;

pub use barcode::{BarcodeCorrector, ReferenceBarcodeSet};
pub use compare::CompareReport;
pub use decoder::{DecodedBarcode, Decoder, DecoderConfig, DropReason, Outcome, OutcomeCategory};
pub use error::{DecodeError, Result};
pub use metrics::{DecodeStats, RunReport};
pub use parallel::ParallelTagger;
pub use reader::{SamReader, SamStream};
pub use record::{QualityEncoding, SamRecord};
pub use tagger::Tagger;
pub use writer::SamWriter;
