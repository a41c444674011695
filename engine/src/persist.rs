//! Two-section flat text snapshot.
//!
//! Section 1 holds one catalog line per document,
//! `id,location,title,length,norm,snapshot`, terminated by the marker line
//! `section2`. Section 2 holds one dictionary line per term,
//! `term,df,ctf;doc,tf:doc,tf`, terminated by the marker line `end`.
//!
//! Commas inside the title and snapshot fields are written as `~` and
//! restored to commas on read. Source text that itself contains `~` does not
//! survive a round-trip unchanged; the loader does not validate against it.
//! The format is not versioned.

use crate::error::{Error, Result};
use crate::index::{DictEntry, Index, Posting, SourceRecord};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const CATALOG_TERMINATOR: &str = "section2";
const DICTIONARY_TERMINATOR: &str = "end";

/// Counts of snapshot lines that failed to parse and were skipped.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub malformed_catalog: usize,
    pub malformed_dictionary: usize,
}

pub fn snapshot_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

fn escape(field: &str) -> String {
    field.replace(',', "~")
}

fn unescape(field: &str) -> String {
    field.replace('~', ",")
}

fn storage_error(path: &Path, source: io::Error) -> Error {
    Error::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    }
}

impl Index {
    /// Write the catalog and dictionary to `path`. Records are written in
    /// ascending id order and terms in sorted order, so equal indexes produce
    /// identical snapshots.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| storage_error(path, err))?;
        let mut out = BufWriter::new(file);
        self.write_snapshot(&mut out)
            .map_err(|err| storage_error(path, err))
    }

    fn write_snapshot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for record in self.documents_sorted() {
            writeln!(
                out,
                "{},{},{},{},{:.4},{}",
                record.id,
                record.location,
                escape(&record.title),
                record.length,
                record.norm,
                escape(&record.snapshot),
            )?;
        }
        writeln!(out, "{CATALOG_TERMINATOR}")?;

        for (term, entry) in self.terms_sorted() {
            let postings = entry
                .postings()
                .as_slice()
                .iter()
                .map(|p| format!("{},{}", p.doc_id, p.term_frequency))
                .collect::<Vec<_>>()
                .join(":");
            writeln!(
                out,
                "{},{},{};{}",
                term,
                entry.document_frequency(),
                entry.collection_term_frequency(),
                postings,
            )?;
        }
        writeln!(out, "{DICTIONARY_TERMINATOR}")?;
        out.flush()
    }

    /// Reconstruct an index from a snapshot without re-scanning documents.
    ///
    /// A malformed catalog or dictionary line is logged, counted in the
    /// report and skipped; the rest of the snapshot still loads. A dictionary
    /// line whose postings are not strictly increasing by doc id is rejected
    /// as malformed rather than admitted, since the merge-join in query
    /// evaluation depends on that ordering. An unreadable `path` fails the
    /// whole load.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Index, LoadReport)> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| storage_error(path, err))?;
        let mut lines = BufReader::new(file).lines();
        let mut index = Index::new();
        let mut report = LoadReport::default();

        for line in lines.by_ref() {
            let line = line.map_err(|err| storage_error(path, err))?;
            if line.eq_ignore_ascii_case(CATALOG_TERMINATOR) {
                break;
            }
            match parse_catalog_line(&line) {
                Some(record) => {
                    index.next_doc_id = index.next_doc_id.max(record.id + 1);
                    index.catalog.insert(record.id, record);
                }
                None => {
                    let id = line.split(',').next().unwrap_or("");
                    tracing::warn!(id = %id, "malformed catalog line, skipping");
                    report.malformed_catalog += 1;
                }
            }
        }

        for line in lines {
            let line = line.map_err(|err| storage_error(path, err))?;
            if line.eq_ignore_ascii_case(DICTIONARY_TERMINATOR) {
                break;
            }
            match parse_dictionary_line(&line) {
                Some((term, entry)) => {
                    index.dictionary.insert(term, entry);
                }
                None => {
                    let term = line.split(',').next().unwrap_or("");
                    tracing::warn!(term = %term, "malformed dictionary line, skipping");
                    report.malformed_dictionary += 1;
                }
            }
        }

        Ok((index, report))
    }
}

fn parse_catalog_line(line: &str) -> Option<SourceRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 6 {
        return None;
    }
    Some(SourceRecord {
        id: fields[0].parse().ok()?,
        location: fields[1].to_string(),
        title: unescape(fields[2]),
        length: fields[3].parse().ok()?,
        norm: fields[4].parse().ok()?,
        snapshot: unescape(fields[5]),
    })
}

fn parse_dictionary_line(line: &str) -> Option<(String, DictEntry)> {
    let (stats, postings) = line.split_once(';')?;
    let fields: Vec<&str> = stats.split(',').collect();
    if fields.len() != 3 {
        return None;
    }
    let mut entry = DictEntry::from_stats(fields[1].parse().ok()?, fields[2].parse().ok()?);
    // Empty chunks are skipped so snapshots written with a trailing posting
    // separator still parse.
    for chunk in postings.split(':').filter(|chunk| !chunk.is_empty()) {
        let (doc_id, term_frequency) = chunk.split_once(',')?;
        let posting = Posting {
            doc_id: doc_id.parse().ok()?,
            term_frequency: term_frequency.parse().ok()?,
        };
        if !entry.push_parsed(posting) {
            return None;
        }
    }
    Some((fields[0].to_string(), entry))
}
