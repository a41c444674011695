use serde::Serialize;
use std::collections::HashMap;

pub type DocId = u32;

/// Metadata for one ingested document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRecord {
    pub id: DocId,
    /// Origin path or URL of the document.
    pub location: String,
    pub title: String,
    /// Total word-split token count across all lines, stop words included.
    pub length: u32,
    /// Weighting slot reserved for scoring; persisted but never computed
    /// during a build.
    pub norm: f64,
    /// Free text attached to the document, e.g. a placeholder or excerpt.
    pub snapshot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
}

/// Postings for one term, strictly increasing by doc_id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of the owning term in `doc_id`.
    ///
    /// Documents are ingested in increasing id order, so an existing posting
    /// for `doc_id` can only be the tail. Returns true when a new posting was
    /// appended, i.e. this is the term's first occurrence in the document.
    pub(crate) fn record(&mut self, doc_id: DocId) -> bool {
        match self.postings.last_mut() {
            Some(last) if last.doc_id == doc_id => {
                last.term_frequency += 1;
                false
            }
            _ => {
                self.postings.push(Posting {
                    doc_id,
                    term_frequency: 1,
                });
                true
            }
        }
    }

    /// Append a posting decoded from a snapshot. Returns false if the posting
    /// would break the ascending doc_id invariant.
    pub(crate) fn push_ordered(&mut self, posting: Posting) -> bool {
        if let Some(last) = self.postings.last() {
            if posting.doc_id <= last.doc_id {
                return false;
            }
        }
        self.postings.push(posting);
        true
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn as_slice(&self) -> &[Posting] {
        &self.postings
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.postings.iter().map(|p| p.doc_id)
    }
}

/// Dictionary entry: aggregate term statistics plus the posting list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictEntry {
    document_frequency: u32,
    collection_term_frequency: u64,
    postings: PostingList,
}

impl DictEntry {
    /// Record one occurrence of the term in `doc_id`, keeping both counters
    /// in step with the posting list.
    pub(crate) fn record(&mut self, doc_id: DocId) {
        if self.postings.record(doc_id) {
            self.document_frequency += 1;
        }
        self.collection_term_frequency += 1;
    }

    /// Entry reconstructed from persisted statistics; postings follow via
    /// `push_parsed`.
    pub(crate) fn from_stats(document_frequency: u32, collection_term_frequency: u64) -> Self {
        Self {
            document_frequency,
            collection_term_frequency,
            postings: PostingList::new(),
        }
    }

    pub(crate) fn push_parsed(&mut self, posting: Posting) -> bool {
        self.postings.push_ordered(posting)
    }

    /// Number of distinct documents containing the term.
    pub fn document_frequency(&self) -> u32 {
        self.document_frequency
    }

    /// Total occurrence count of the term across the collection.
    pub fn collection_term_frequency(&self) -> u64 {
        self.collection_term_frequency
    }

    pub fn postings(&self) -> &PostingList {
        &self.postings
    }
}

/// One index instance: the document catalog plus the term dictionary.
///
/// Build, query, save and load all operate on a value of this type; callers
/// must serialize those calls on a single instance, there is no internal
/// locking.
#[derive(Debug, Default)]
pub struct Index {
    pub(crate) catalog: HashMap<DocId, SourceRecord>,
    pub(crate) dictionary: HashMap<String, DictEntry>,
    pub(crate) next_doc_id: DocId,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn term_count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn term(&self, term: &str) -> Option<&DictEntry> {
        self.dictionary.get(term)
    }

    pub fn document(&self, id: DocId) -> Option<&SourceRecord> {
        self.catalog.get(&id)
    }

    /// Catalog records in ascending id order.
    pub fn documents_sorted(&self) -> Vec<&SourceRecord> {
        let mut records: Vec<&SourceRecord> = self.catalog.values().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Dictionary entries in term order.
    pub fn terms_sorted(&self) -> Vec<(&str, &DictEntry)> {
        let mut terms: Vec<(&str, &DictEntry)> = self
            .dictionary
            .iter()
            .map(|(term, entry)| (term.as_str(), entry))
            .collect();
        terms.sort_by_key(|(term, _)| *term);
        terms
    }
}
