use crate::{error::Result, paired::ReadPairs, parser::{LineParser, StreamingLineParser}};
use flate2::read::MultiGzDecoder;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

pub const HEADER_LINES: usize = 2;

pub type LineIter = Box<dyn Iterator<Item = Result<Vec<u8>>> + Send>;

pub enum SamReader {
    Mmap(MmapLines),
    Streaming(LineIter),
}

impl SamReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.as_os_str() == "-" {
            Ok(Self::from_reader(io::stdin()))
        } else if path.extension().and_then(|s| s.to_str()) == Some("gz") {
            Self::from_gzip_file(path)
        } else {
            Self::from_file(path)
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self::from_reader(io::empty()));
        }
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(SamReader::Mmap(MmapLines::new(mmap)))
    }

    pub fn from_gzip_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(MultiGzDecoder::new(BufReader::new(file))))
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        SamReader::Streaming(Box::new(StreamingLineParser::new(reader)))
    }

    pub fn into_lines(self) -> LineIter {
        match self {
            SamReader::Mmap(lines) => Box::new(lines),
            SamReader::Streaming(iter) => iter,
        }
    }

    pub fn into_stream(self) -> Result<SamStream> {
        let mut lines = self.into_lines();
        let mut headers = Vec::with_capacity(HEADER_LINES);
        for _ in 0..HEADER_LINES {
            match lines.next() {
                Some(line) => headers.push(line?),
                None => break,
            }
        }

        Ok(SamStream {
            headers,
            pairs: ReadPairs::new(lines),
        })
    }
}

pub struct SamStream {
    pub headers: Vec<Vec<u8>>,
    pub pairs: ReadPairs,
}

pub struct MmapLines {
    mmap: Mmap,
    pos: usize,
}

impl MmapLines {
    pub fn new(mmap: Mmap) -> Self {
        MmapLines { mmap, pos: 0 }
    }
}

impl Iterator for MmapLines {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut parser = LineParser::new(&self.mmap);
        parser.pos = self.pos;
        let line = parser.next_line()?.to_vec();
        self.pos = parser.pos;
        Some(Ok(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAM: &[u8] = b"@HD\tVN:1.6\n@PG\tID:bc\nr1\n r2\nr3\n";

    #[test]
    fn test_mmap_and_stream_agree() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAM).unwrap();
        file.flush().unwrap();

        let mapped: Vec<_> = SamReader::from_path(file.path())
            .unwrap()
            .into_lines()
            .collect::<Result<_>>()
            .unwrap();
        let streamed: Vec<_> = SamReader::from_reader(SAM)
            .into_lines()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(mapped, streamed);
        assert_eq!(mapped.len(), 5);
    }

    #[test]
    fn test_headers_are_split_off() {
        let stream = SamReader::from_reader(SAM).into_stream().unwrap();
        assert_eq!(stream.headers, vec![b"@HD\tVN:1.6".to_vec(), b"@PG\tID:bc".to_vec()]);
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let stream = SamReader::from_path(file.path()).unwrap().into_stream().unwrap();
        assert!(stream.headers.is_empty());
        assert_eq!(stream.pairs.count(), 0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(SamReader::from_path("/nonexistent/input.sam").is_err());
    }
}
