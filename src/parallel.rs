use crate::{
    decoder::Decoder,
    error::{DecodeError, Result},
    metrics::DecodeStats,
    paired::ReadPair,
    reader::SamStream,
    tagger::{settle, write_headers},
    writer::SamWriter,
};
use crossbeam_channel::bounded;
use log::info;
use rayon::prelude::*;
use std::io::{self, Write};
use std::thread;

const DEFAULT_BATCH_SIZE: usize = 10_000;
const QUEUE_SIZE: usize = 4;

pub struct ParallelTagger {
    decoder: Decoder,
    num_threads: usize,
    batch_size: usize,
}

impl ParallelTagger {
    pub fn new(decoder: Decoder) -> Self {
        ParallelTagger {
            decoder,
            num_threads: rayon::current_num_threads(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn run<W: Write>(&self, stream: SamStream, mut writer: SamWriter<W>) -> Result<DecodeStats> {
        if self.num_threads == 0 {
            return Err(DecodeError::InvalidConfig("thread count must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(DecodeError::InvalidConfig("batch size must be at least 1".into()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map_err(|e| DecodeError::InvalidConfig(e.to_string()))?;

        let SamStream { headers, mut pairs } = stream;
        write_headers(&headers, &mut writer)?;

        let (sender, receiver) = bounded::<Result<Vec<ReadPair>>>(QUEUE_SIZE);
        let batch_size = self.batch_size;

        let reader_thread = thread::spawn(move || {
            let mut batch = Vec::with_capacity(batch_size);
            for pair in pairs.by_ref() {
                match pair {
                    Ok(pair) => {
                        batch.push(pair);
                        if batch.len() == batch_size {
                            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                            if sender.send(Ok(full)).is_err() {
                                return pairs.orphan_records();
                            }
                        }
                    }
                    Err(e) => {
                        let _ = sender.send(Err(e));
                        return pairs.orphan_records();
                    }
                }
            }
            if !batch.is_empty() {
                let _ = sender.send(Ok(batch));
            }
            pairs.orphan_records()
        });

        let mut stats = DecodeStats::new();
        for batch in receiver.iter() {
            let batch = batch?;
            let results: Vec<_> = pool.install(|| {
                batch
                    .par_iter()
                    .map(|pair| self.decoder.decode(&pair.read1_record()))
                    .collect()
            });

            for (pair, result) in batch.iter().zip(&results) {
                settle(pair, result, &mut writer, &mut stats)?;
            }
        }

        stats.orphan_records = reader_thread
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "reader thread panicked"))?;

        writer.finish()?;
        info!(
            "Processed {} read pairs on {} threads, emitted {}",
            stats.pairs, self.num_threads, stats.emitted
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::ReferenceBarcodeSet;
    use crate::reader::SamReader;

    #[test]
    fn test_zero_threads_is_rejected() {
        let reference = ReferenceBarcodeSet::from_blocks(["AACCGG"]).unwrap();
        let stream = SamReader::from_reader(&b"@HD\n@PG\n"[..]).into_stream().unwrap();
        let tagger = ParallelTagger::new(Decoder::with_defaults(reference)).threads(0);
        assert!(matches!(
            tagger.run(stream, SamWriter::new(Vec::new())),
            Err(DecodeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let reference = ReferenceBarcodeSet::from_blocks(["AACCGG"]).unwrap();
        let stream = SamReader::from_reader(&b""[..]).into_stream().unwrap();
        let tagger = ParallelTagger::new(Decoder::with_defaults(reference)).batch_size(0);
        assert!(matches!(
            tagger.run(stream, SamWriter::new(Vec::new())),
            Err(DecodeError::InvalidConfig(_))
        ));
    }
}
