use crate::{
    decoder::{DecodedBarcode, Decoder, DropReason, Outcome},
    error::Result,
    metrics::DecodeStats,
    paired::ReadPair,
    reader::SamStream,
    writer::SamWriter,
};
use log::{debug, info};
use std::io::Write;

pub const PROGRESS_INTERVAL: usize = 1_000_000;

pub struct Tagger {
    decoder: Decoder,
}

impl Tagger {
    pub fn new(decoder: Decoder) -> Self {
        Tagger { decoder }
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn run<W: Write>(&self, stream: SamStream, mut writer: SamWriter<W>) -> Result<DecodeStats> {
        let SamStream { headers, mut pairs } = stream;
        write_headers(&headers, &mut writer)?;

        let mut stats = DecodeStats::new();
        for pair in pairs.by_ref() {
            let pair = pair?;
            let result = self.decoder.decode(&pair.read1_record());
            settle(&pair, &result, &mut writer, &mut stats)?;
        }
        stats.orphan_records = pairs.orphan_records();

        writer.finish()?;
        info!(
            "Processed {} read pairs, emitted {}",
            stats.pairs, stats.emitted
        );
        Ok(stats)
    }
}

pub(crate) fn write_headers<W: Write>(headers: &[Vec<u8>], writer: &mut SamWriter<W>) -> Result<()> {
    for line in headers {
        writer.write_header_line(line)?;
    }
    Ok(())
}

pub(crate) fn settle<W: Write>(
    pair: &ReadPair,
    result: &std::result::Result<DecodedBarcode, DropReason>,
    writer: &mut SamWriter<W>,
    stats: &mut DecodeStats,
) -> Result<()> {
    stats.record(&Outcome::of(result));
    match result {
        Ok(decoded) => writer.write_tagged(&pair.read2, decoded)?,
        Err(reason) => debug!(
            "Dropped {}: {}",
            String::from_utf8_lossy(pair.read1_record().name()),
            reason
        ),
    }

    if stats.pairs % PROGRESS_INTERVAL == 0 {
        info!("Processed {} read pairs ({} emitted)", stats.pairs, stats.emitted);
    }
    Ok(())
}
