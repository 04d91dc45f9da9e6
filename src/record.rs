use serde::{Deserialize, Serialize};
use std::fmt;

pub const SEQ_FIELD: usize = 9;
pub const QUAL_FIELD: usize = 10;
pub const MIN_FIELDS: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityEncoding {
    Phred33,
    Phred64,
}

impl QualityEncoding {
    pub fn offset(&self) -> u8 {
        match self {
            QualityEncoding::Phred33 => 33,
            QualityEncoding::Phred64 => 64,
        }
    }

    pub fn threshold_byte(&self, phred: u8) -> u8 {
        self.offset().saturating_add(phred)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamRecord<'a> {
    line: &'a [u8],
    fields: Vec<&'a [u8]>,
}

impl<'a> SamRecord<'a> {
    pub fn from_line(line: &'a [u8]) -> Self {
        let mut fields = Vec::with_capacity(16);
        let mut start = 0;
        while let Some(tab) = crate::simd::find_char(line, b'\t', start) {
            fields.push(&line[start..tab]);
            start = tab + 1;
        }
        fields.push(&line[start..]);

        SamRecord { line, fields }
    }

    #[inline]
    pub fn line(&self) -> &'a [u8] {
        self.line
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&'a [u8]> {
        self.fields.get(index).copied()
    }

    #[inline]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn name(&self) -> &'a [u8] {
        self.fields[0]
    }

    #[inline]
    pub fn seq(&self) -> &'a [u8] {
        self.field(SEQ_FIELD).unwrap_or_default()
    }

    #[inline]
    pub fn qual(&self) -> &'a [u8] {
        self.field(QUAL_FIELD).unwrap_or_default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq().is_empty()
    }

    pub fn is_decodable(&self) -> bool {
        self.num_fields() >= MIN_FIELDS && self.seq().len() == self.qual().len()
    }

    pub fn tag_value(&self, tag: &[u8]) -> Option<&'a [u8]> {
        self.fields
            .iter()
            .skip(MIN_FIELDS)
            .find(|f| f.starts_with(tag))
            .map(|f| &f[tag.len()..])
    }
}

impl<'a> fmt::Display for SamRecord<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.line))
    }
}
