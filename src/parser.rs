use crate::{buffer::BufferedReader, error::Result};
use std::io::Read;

#[inline]
fn strip_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

pub struct LineParser<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) pos: usize,
    line: usize,
}

impl<'a> LineParser<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        LineParser {
            data,
            pos: 0,
            line: 0,
        }
    }

    #[inline]
    pub fn line_number(&self) -> usize {
        self.line
    }

    #[inline]
    pub fn next_line(&mut self) -> Option<&'a [u8]> {
        if self.pos >= self.data.len() {
            return None;
        }

        let start = self.pos;
        let end = match crate::simd::find_char(self.data, b'\n', start) {
            Some(newline) => {
                self.pos = newline + 1;
                newline
            }
            None => {
                self.pos = self.data.len();
                self.data.len()
            }
        };
        self.line += 1;

        Some(strip_cr(&self.data[start..end]))
    }
}

impl<'a> Iterator for LineParser<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}

pub struct StreamingLineParser<R: Read> {
    reader: BufferedReader<R>,
    scanned: usize,
}

impl<R: Read> StreamingLineParser<R> {
    pub fn new(reader: R) -> Self {
        StreamingLineParser {
            reader: BufferedReader::new(reader),
            scanned: 0,
        }
    }

    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        StreamingLineParser {
            reader: BufferedReader::with_capacity(capacity, reader),
            scanned: 0,
        }
    }

    pub fn parse_next(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            let buffer = self.reader.consumed();
            if let Some(newline) = crate::simd::find_char(buffer, b'\n', self.scanned) {
                let line = strip_cr(&buffer[..newline]).to_vec();
                self.reader.consume(newline + 1);
                self.scanned = 0;
                return Ok(Some(line));
            }
            self.scanned = buffer.len();

            if self.reader.is_eof() {
                if buffer.is_empty() {
                    return Ok(None);
                }
                let line = strip_cr(buffer).to_vec();
                let len = buffer.len();
                self.reader.consume(len);
                self.scanned = 0;
                return Ok(Some(line));
            }

            self.reader.fill_buffer()?;
        }
    }
}

impl<R: Read> Iterator for StreamingLineParser<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_parser_terminators() {
        let data = b"@HD\tVN:1.0\r\n@PG\tID:x\nread\tlast";
        let lines: Vec<_> = LineParser::new(data).collect();
        assert_eq!(lines, vec![&b"@HD\tVN:1.0"[..], b"@PG\tID:x", b"read\tlast"]);
    }

    #[test]
    fn test_line_parser_keeps_empty_lines() {
        let lines: Vec<_> = LineParser::new(b"a\n\nb\n").collect();
        assert_eq!(lines, vec![&b"a"[..], b"", b"b"]);
    }

    #[test]
    fn test_streaming_matches_in_memory() {
        let data = b"first line\nsecond\r\n\nthird without newline".to_vec();
        let streamed: Vec<Vec<u8>> = StreamingLineParser::with_capacity(4, &data[..])
            .collect::<Result<_>>()
            .unwrap();
        let expected: Vec<Vec<u8>> = LineParser::new(&data).map(|l| l.to_vec()).collect();
        assert_eq!(streamed, expected);
    }
}
