use crate::index::{DocId, Index, Posting};
use crate::tokenizer::split_words;
use serde::Serialize;
use std::cmp::Ordering;

/// One matching document for a boolean query. A copy of the catalog data,
/// not a handle into the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryMatch {
    pub doc_id: DocId,
    pub title: String,
    pub length: u32,
}

/// Why a query produced no matches. Surfaced identically to users; callers
/// can branch on the reason for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NoMatchReason {
    /// The phrase contained no tokens.
    EmptyQuery,
    /// A query term is not in the dictionary.
    TermAbsent(String),
    /// Every term is present but no document contains all of them.
    EmptyIntersection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QueryOutcome {
    /// Matches in ascending doc id order.
    Matches(Vec<QueryMatch>),
    NoResults(NoMatchReason),
}

impl Index {
    /// Evaluate a boolean AND query: the documents containing every query
    /// term, irrespective of position.
    ///
    /// Query tokens are lowercased but looked up literally, with no stop-word
    /// filtering and no normalization, so the caller controls whether the
    /// query vocabulary matches the build-time dictionary keys.
    pub fn boolean_and(&self, phrase: &str) -> QueryOutcome {
        let terms = split_words(phrase);
        if terms.is_empty() {
            return QueryOutcome::NoResults(NoMatchReason::EmptyQuery);
        }

        // Every term's presence is checked even once the running intersection
        // is empty, so an absent term reports as absence rather than as an
        // empty intersection.
        let mut docs: Option<Vec<DocId>> = None;
        for term in &terms {
            let entry = match self.term(term) {
                Some(entry) => entry,
                None => return QueryOutcome::NoResults(NoMatchReason::TermAbsent(term.clone())),
            };
            docs = Some(match docs {
                None => entry.postings().doc_ids().collect(),
                Some(acc) => intersect(&acc, entry.postings().as_slice()),
            });
        }

        let docs = docs.unwrap_or_default();
        if docs.is_empty() {
            return QueryOutcome::NoResults(NoMatchReason::EmptyIntersection);
        }
        let matches = docs
            .into_iter()
            .map(|doc_id| match self.document(doc_id) {
                Some(record) => QueryMatch {
                    doc_id,
                    title: record.title.clone(),
                    length: record.length,
                },
                // A posting without a catalog record (repeated location).
                None => QueryMatch {
                    doc_id,
                    title: String::new(),
                    length: 0,
                },
            })
            .collect();
        QueryOutcome::Matches(matches)
    }
}

/// Sorted merge-join of an accumulated doc id set with a posting list. Both
/// sides ascend, so each cursor only moves forward: O(n + m).
fn intersect(acc: &[DocId], postings: &[Posting]) -> Vec<DocId> {
    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < acc.len() && j < postings.len() {
        match acc[i].cmp(&postings[j].doc_id) {
            Ordering::Equal => {
                out.push(acc[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postings(ids: &[DocId]) -> Vec<Posting> {
        ids.iter()
            .map(|&doc_id| Posting { doc_id, term_frequency: 1 })
            .collect()
    }

    #[test]
    fn merge_join_emits_common_ids_in_order() {
        let acc = vec![0, 2, 4, 7, 9];
        let list = postings(&[1, 2, 3, 4, 9, 12]);
        assert_eq!(intersect(&acc, &list), vec![2, 4, 9]);
    }

    #[test]
    fn merge_join_with_disjoint_lists_is_empty() {
        let acc = vec![0, 2, 4];
        let list = postings(&[1, 3, 5]);
        assert!(intersect(&acc, &list).is_empty());
    }

    #[test]
    fn merge_join_with_empty_side_is_empty() {
        assert!(intersect(&[], &postings(&[1, 2])).is_empty());
        assert!(intersect(&[1, 2], &[]).is_empty());
    }
}
