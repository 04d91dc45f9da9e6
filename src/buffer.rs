use std::io::{self, Read};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

pub struct BufferedReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    pos: usize,
    cap: usize,
    eof: bool,
}

impl<R: Read> BufferedReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, reader)
    }

    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        BufferedReader {
            reader,
            buffer: vec![0; capacity.max(1)],
            pos: 0,
            cap: 0,
            eof: false,
        }
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.cap - self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    #[inline]
    pub fn consumed(&self) -> &[u8] {
        &self.buffer[self.pos..self.cap]
    }

    #[inline]
    pub fn consume(&mut self, amt: usize) {
        self.pos = std::cmp::min(self.pos + amt, self.cap);
    }

    pub fn fill_buffer(&mut self) -> io::Result<usize> {
        if self.eof {
            return Ok(0);
        }

        if self.pos > 0 {
            self.buffer.copy_within(self.pos..self.cap, 0);
            self.cap -= self.pos;
            self.pos = 0;
        }

        if self.cap == self.buffer.len() {
            let grown = self.buffer.len() * 2;
            self.buffer.resize(grown, 0);
        }

        let bytes_read = loop {
            match self.reader.read(&mut self.buffer[self.cap..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if bytes_read == 0 {
            self.eof = true;
        }
        self.cap += bytes_read;
        Ok(bytes_read)
    }
}
