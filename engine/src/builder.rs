use crate::index::{DocId, Index, SourceRecord};
use crate::tokenizer::{is_indexable, split_words, Normalizer};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Stored in `SourceRecord::snapshot` until a caller attaches real excerpt
/// text.
const SNAPSHOT_PLACEHOLDER: &str = "notext";

/// Build-time diagnostics.
#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    /// Locations that could not be read, in encounter order.
    pub skipped: Vec<String>,
}

impl Index {
    /// Ingest `locations` in order, assigning doc ids sequentially from the
    /// instance's counter.
    ///
    /// A source that cannot be read is skipped and reported; its id is still
    /// consumed, so later documents keep the ids their list position implies.
    /// A location seen before gets a fresh id and contributes postings but no
    /// second catalog record.
    pub fn build<N, P>(&mut self, locations: &[P], normalizer: &N) -> BuildReport
    where
        N: Normalizer,
        P: AsRef<Path>,
    {
        let mut report = BuildReport::default();
        let mut seen: HashSet<String> = self
            .catalog
            .values()
            .map(|record| record.location.clone())
            .collect();

        for location in locations {
            let location = location.as_ref();
            let location_str = location.display().to_string();
            let doc_id = self.next_doc_id;
            self.next_doc_id += 1;

            if let Err(err) =
                self.ingest_source(location, &location_str, doc_id, &mut seen, normalizer)
            {
                tracing::warn!(location = %location_str, error = %err, "source unavailable, skipping");
                report.skipped.push(location_str);
            }
        }
        report
    }

    fn ingest_source<N: Normalizer>(
        &mut self,
        location: &Path,
        display: &str,
        doc_id: DocId,
        seen: &mut HashSet<String>,
        normalizer: &N,
    ) -> io::Result<()> {
        let file = File::open(location)?;
        if seen.insert(display.to_string()) {
            self.catalog.insert(
                doc_id,
                SourceRecord {
                    id: doc_id,
                    location: display.to_string(),
                    title: display.to_string(),
                    length: 0,
                    norm: 0.0,
                    snapshot: SNAPSHOT_PLACEHOLDER.to_string(),
                },
            );
        }

        let mut length = 0u32;
        for line in BufReader::new(file).lines() {
            length += self.index_line(&line?, doc_id, normalizer);
        }
        // Absent for a repeated location; the first record keeps its length.
        if let Some(record) = self.catalog.get_mut(&doc_id) {
            record.length = length;
        }
        Ok(())
    }

    /// Index one line for `doc_id`, returning its word-split token count.
    /// Stop words and short tokens count toward the length but are not
    /// indexed.
    fn index_line<N: Normalizer>(&mut self, line: &str, doc_id: DocId, normalizer: &N) -> u32 {
        let words = split_words(line);
        let count = words.len() as u32;
        for word in words {
            if !is_indexable(&word) {
                continue;
            }
            let term = normalizer.normalize(&word);
            self.dictionary.entry(term).or_default().record(doc_id);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Posting;
    use crate::tokenizer::{IdentityNormalizer, StemNormalizer};

    fn two_doc_index() -> Index {
        let mut index = Index::new();
        index.index_line("the cat sat", 0, &IdentityNormalizer);
        index.index_line("the cat ran", 1, &IdentityNormalizer);
        index
    }

    #[test]
    fn dictionary_counts_after_two_documents() {
        let index = two_doc_index();

        let cat = index.term("cat").expect("cat indexed");
        assert_eq!(cat.document_frequency(), 2);
        assert_eq!(cat.collection_term_frequency(), 2);
        assert_eq!(
            cat.postings().as_slice(),
            &[
                Posting { doc_id: 0, term_frequency: 1 },
                Posting { doc_id: 1, term_frequency: 1 },
            ]
        );

        let sat = index.term("sat").expect("sat indexed");
        assert_eq!(sat.document_frequency(), 1);
        assert_eq!(
            sat.postings().as_slice(),
            &[Posting { doc_id: 0, term_frequency: 1 }]
        );

        let ran = index.term("ran").expect("ran indexed");
        assert_eq!(ran.document_frequency(), 1);
        assert_eq!(
            ran.postings().as_slice(),
            &[Posting { doc_id: 1, term_frequency: 1 }]
        );
    }

    #[test]
    fn stop_words_and_short_tokens_are_not_indexed() {
        let index = two_doc_index();
        assert!(index.term("the").is_none());

        let mut index = Index::new();
        index.index_line("a I x ox", 0, &IdentityNormalizer);
        assert!(index.term("a").is_none());
        assert!(index.term("i").is_none());
        assert!(index.term("x").is_none());
        assert!(index.term("ox").is_some());
    }

    #[test]
    fn line_count_includes_stop_words() {
        let mut index = Index::new();
        let count = index.index_line("the cat sat", 0, &IdentityNormalizer);
        assert_eq!(count, 3);
        assert_eq!(index.index_line("...", 0, &IdentityNormalizer), 0);
    }

    #[test]
    fn repeated_occurrences_bump_frequencies_once_per_doc() {
        let mut index = Index::new();
        index.index_line("cat cat cat", 0, &IdentityNormalizer);
        let cat = index.term("cat").expect("cat indexed");
        assert_eq!(cat.document_frequency(), 1);
        assert_eq!(cat.collection_term_frequency(), 3);
        assert_eq!(
            cat.postings().as_slice(),
            &[Posting { doc_id: 0, term_frequency: 3 }]
        );
    }

    #[test]
    fn stemming_merges_inflections_under_one_key() {
        let mut index = Index::new();
        index.index_line("running runs", 0, &StemNormalizer::new());
        let run = index.term("run").expect("stemmed key");
        assert_eq!(run.document_frequency(), 1);
        assert_eq!(run.collection_term_frequency(), 2);
        assert!(index.term("running").is_none());
    }
}
