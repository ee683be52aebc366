//! Line-oriented list files (custom domains, custom elements).
//!
//! Small files go through a buffered reader; files at or above the threshold
//! are memory-mapped and split on `\n` with `memchr`.
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use memmap2::Mmap;

/// Lists at least this large are memory-mapped.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024;

/// An open list file, yielding raw lines without their terminators.
pub enum ListFile {
    Buffered(Lines<BufReader<File>>),
    Mapped { map: Mmap, pos: usize },
}

impl ListFile {
    pub fn open<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("stat {}", path.display()))?
            .len();
        if len < threshold_bytes {
            return Ok(ListFile::Buffered(BufReader::new(file).lines()));
        }
        debug!("mapping {} ({} bytes)", path.display(), len);
        // SAFETY: read-only map owned by the iterator; list files are not
        // expected to change while being read.
        let map = unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.display()))?;
        Ok(ListFile::Mapped { map, pos: 0 })
    }
}

impl Iterator for ListFile {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ListFile::Buffered(lines) => lines.next(),
            ListFile::Mapped { map, pos } => {
                let data: &[u8] = map;
                if *pos >= data.len() {
                    return None;
                }
                let start = *pos;
                let end = memchr::memchr(b'\n', &data[start..]).map_or(data.len(), |i| start + i);
                *pos = end + 1;
                let line = data[start..end].strip_suffix(b"\r").unwrap_or(&data[start..end]);
                Some(Ok(String::from_utf8_lossy(line).into_owned()))
            }
        }
    }
}

/// Keep a list entry unless it is blank or a `#` comment.
fn list_entry(line: &str) -> Option<String> {
    let entry = line.trim();
    (!entry.is_empty() && !entry.starts_with('#')).then(|| entry.to_string())
}

pub fn parse_list_contents(contents: &str) -> Vec<String> {
    contents.lines().filter_map(list_entry).collect()
}

/// Read a list file: one entry per line, blanks and `#` comments skipped.
pub fn read_list_file<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut out = Vec::new();
    for line in ListFile::open(path, threshold_bytes)? {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        out.extend(list_entry(&line));
    }
    Ok(out)
}
