use crate::{error::Result, reader::SamReader};
use log::{info, warn};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub barcode: String,
    pub umi: String,
}

impl fmt::Display for TagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.barcode, self.umi)
    }
}

#[derive(Debug, Clone)]
pub struct TagScheme {
    barcode: Regex,
    umi: Regex,
}

impl TagScheme {
    pub fn new(barcode_tag: &str, umi_tag: &str) -> Result<Self> {
        let pattern = |tag: &str| Regex::new(&format!(r"^{}:Z:(\w+)", regex::escape(tag)));
        Ok(TagScheme {
            barcode: pattern(barcode_tag)?,
            umi: pattern(umi_tag)?,
        })
    }

    pub fn reference() -> Result<Self> {
        Self::new("XB", "XU")
    }

    pub fn custom() -> Result<Self> {
        Self::new("XC", "XM")
    }

    fn find(pattern: &Regex, fields: &[&str]) -> Option<String> {
        fields
            .iter()
            .find_map(|field| pattern.captures(field))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_ascii_uppercase())
    }

    // Name and tags of one SAM line, `None` for header lines. A record is
    // tagged only when both tags are present.
    pub fn parse_line(&self, line: &str) -> Option<(String, Option<TagPair>)> {
        if line.starts_with('@') || line.is_empty() {
            return None;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let tags = match (Self::find(&self.barcode, &fields), Self::find(&self.umi, &fields)) {
            (Some(barcode), Some(umi)) => Some(TagPair { barcode, umi }),
            _ => None,
        };
        Some((fields[0].to_string(), tags))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub name: String,
    pub reference: Option<TagPair>,
    pub custom: Option<TagPair>,
    pub read1: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareReport {
    pub only_in_custom: usize,
    pub only_in_reference: usize,
    pub exact: usize,
    pub mismatches: Vec<Mismatch>,
}

impl CompareReport {
    pub fn from_lines<R, C>(reference: R, custom: C) -> Result<Self>
    where
        R: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        let reference_scheme = TagScheme::reference()?;
        let custom_scheme = TagScheme::custom()?;

        let mut expected: HashMap<String, Option<TagPair>> = reference
            .into_iter()
            .filter_map(|line| reference_scheme.parse_line(&line))
            .collect();

        let mut report = CompareReport::default();
        for line in custom {
            let Some((name, tags)) = custom_scheme.parse_line(&line) else {
                continue;
            };
            match expected.remove(&name) {
                None => report.only_in_custom += 1,
                Some(reference) if reference == tags => report.exact += 1,
                Some(reference) => report.mismatches.push(Mismatch {
                    name,
                    reference,
                    custom: tags,
                    read1: None,
                }),
            }
        }
        report.only_in_reference = expected.len();
        report.mismatches.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(report)
    }

    pub fn from_paths<P: AsRef<Path>>(reference: P, custom: P) -> Result<Self> {
        let reference = read_lines(reference.as_ref())?;
        let custom = read_lines(custom.as_ref())?;
        Self::from_lines(reference, custom)
    }

    pub fn attach_read1<P: AsRef<Path>>(&mut self, fastq: P) -> Result<()> {
        let wanted: HashSet<&str> = self.mismatches.iter().map(|m| m.name.as_str()).collect();
        let mut sequences: HashMap<String, String> = HashMap::new();

        let lines = read_lines(fastq.as_ref())?;
        for record in lines.chunks(4) {
            let [header, seq, ..] = record else {
                continue;
            };
            let Some(id) = header.strip_prefix('@').and_then(|h| h.split_whitespace().next()) else {
                continue;
            };
            if wanted.contains(id) {
                sequences.insert(id.to_string(), seq.clone());
            }
        }

        for mismatch in &mut self.mismatches {
            mismatch.read1 = sequences.remove(&mismatch.name);
            if mismatch.read1.is_none() {
                warn!("Read {} not found in the read1 FASTQ", mismatch.name);
            }
        }
        Ok(())
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "Records only in custom output: {}", self.only_in_custom)?;
        writeln!(writer, "Records only in reference output: {}", self.only_in_reference)?;
        writeln!(writer, "Records with matching tags: {}", self.exact)?;
        writeln!(writer, "Records with mismatched tags: {}", self.mismatches.len())?;

        let show = |tags: &Option<TagPair>| match tags {
            Some(tags) => tags.to_string(),
            None => "untagged".to_string(),
        };
        for mismatch in &self.mismatches {
            writeln!(writer)?;
            writeln!(writer, "{}\treference\t{}", mismatch.name, show(&mismatch.reference))?;
            writeln!(writer, "{}\tcustom\t{}", mismatch.name, show(&mismatch.custom))?;
            if let Some(read1) = &mismatch.read1 {
                writeln!(writer, "Read 1 sequence: {}", read1)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn print_summary(&self) {
        println!("Comparison Summary:");
        println!("  Only in custom: {}", self.only_in_custom);
        println!("  Only in reference: {}", self.only_in_reference);
        println!("  Matching: {}", self.exact);
        println!("  Mismatched: {}", self.mismatches.len());
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let lines = SamReader::from_path(path)?
        .into_lines()
        .map(|line| line.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
        .collect::<Result<Vec<_>>>()?;
    info!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}
