use crate::{decoder::DecodedBarcode, error::Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const CELL_BARCODE_TAG: &[u8] = b"XC:Z:";
pub const UMI_TAG: &[u8] = b"XM:Z:";

pub enum SamWriter<W: Write> {
    Plain(BufWriter<W>),
    Gzip(GzEncoder<BufWriter<W>>),
}

impl SamWriter<File> {
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;

        if path.extension().and_then(|s| s.to_str()) == Some("gz") {
            Ok(SamWriter::Gzip(GzEncoder::new(
                BufWriter::new(file),
                Compression::default(),
            )))
        } else {
            Ok(SamWriter::Plain(BufWriter::new(file)))
        }
    }
}

impl SamWriter<io::Stdout> {
    pub fn to_stdout() -> Self {
        SamWriter::Plain(BufWriter::new(io::stdout()))
    }
}

impl<W: Write> SamWriter<W> {
    pub fn new(writer: W) -> Self {
        SamWriter::Plain(BufWriter::new(writer))
    }

    pub fn new_gzip(writer: W, compression: Compression) -> Self {
        SamWriter::Gzip(GzEncoder::new(BufWriter::new(writer), compression))
    }

    fn inner(&mut self) -> &mut dyn Write {
        match self {
            SamWriter::Plain(w) => w,
            SamWriter::Gzip(w) => w,
        }
    }

    pub fn write_header_line(&mut self, line: &[u8]) -> Result<()> {
        let writer = self.inner();
        writer.write_all(line)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_tagged(&mut self, read2: &[u8], decoded: &DecodedBarcode) -> Result<()> {
        let writer = self.inner();
        writer.write_all(read2)?;
        writer.write_all(b"\t")?;
        writer.write_all(CELL_BARCODE_TAG)?;
        writer.write_all(&decoded.cell_barcode())?;
        writer.write_all(b"\t")?;
        writer.write_all(UMI_TAG)?;
        writer.write_all(&decoded.umi)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner().flush()?;
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        match self {
            SamWriter::Plain(mut w) => w.flush()?,
            SamWriter::Gzip(w) => w.finish()?.flush()?,
        }
        Ok(())
    }
}
