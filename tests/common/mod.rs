#![allow(dead_code)]

use ddseq_tagger::linker::{LINKER1, LINKER2};
use ddseq_tagger::ReferenceBarcodeSet;

/// Pairwise Hamming distance of at least 4.
pub const BLOCKS: [&str; 6] = ["AAAAAA", "CCCCCC", "GGGGGG", "TTTTTT", "ACGTAC", "CATGCA"];

pub fn reference() -> ReferenceBarcodeSet {
    ReferenceBarcodeSet::from_blocks(BLOCKS).unwrap()
}

pub fn reference_file_contents() -> String {
    BLOCKS.iter().map(|b| format!("{}\n", b)).collect()
}

pub fn read1_seq(phase: &[u8], blocks: [&[u8]; 3], umi: &[u8], tail: &[u8]) -> Vec<u8> {
    [
        phase, blocks[0], LINKER1, blocks[1], LINKER2, blocks[2], b"ACG", umi, b"GAC", tail,
    ]
    .concat()
}

pub fn sam_line(name: &str, flag: u16, seq: &[u8], qual: &[u8]) -> String {
    format!(
        "{}\t{}\t*\t0\t0\t*\t*\t0\t0\t{}\t{}",
        name,
        flag,
        String::from_utf8_lossy(seq),
        String::from_utf8_lossy(qual)
    )
}

/// A read1/read2 pair whose read1 decodes to `blocks` and `umi`.
pub fn good_pair(name: &str, blocks: [&str; 3], umi: &str) -> (String, String) {
    let seq = read1_seq(
        b"CT",
        [blocks[0].as_bytes(), blocks[1].as_bytes(), blocks[2].as_bytes()],
        umi.as_bytes(),
        b"TTTT",
    );
    let qual = vec![b'I'; seq.len()];
    (
        sam_line(name, 77, &seq, &qual),
        sam_line(name, 141, b"GATTACA", b"IIIIIII"),
    )
}

/// A pair whose read1 has no recognisable linker.
pub fn bad_pair(name: &str) -> (String, String) {
    let seq = b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT";
    let qual = vec![b'I'; seq.len()];
    (
        sam_line(name, 77, seq, &qual),
        sam_line(name, 141, b"GATTACA", b"IIIIIII"),
    )
}

pub const HEADERS: [&str; 2] = ["@HD\tVN:1.6\tSO:unsorted", "@PG\tID:ddseq\tPN:test"];

pub fn sam_text(pairs: &[(String, String)]) -> String {
    let mut text = String::new();
    for header in HEADERS {
        text.push_str(header);
        text.push('\n');
    }
    for (read1, read2) in pairs {
        text.push_str(read1);
        text.push('\n');
        text.push_str(read2);
        text.push('\n');
    }
    text
}

pub fn tagged(read2: &str, blocks: [&str; 3], umi: &str) -> String {
    format!("{}\tXC:Z:{}{}{}\tXM:Z:{}", read2, blocks[0], blocks[1], blocks[2], umi)
}
