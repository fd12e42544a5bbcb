//! Ordered, newest-first collection of committed ideas.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::JournalError;
use crate::models::{IdeaDraft, IdeaRecord};
use crate::sizing::IdeaMetrics;

/// Answer to the "clear all saved ideas?" question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Granted,
    Declined,
}

impl Confirmation {
    /// Interpret a typed answer; only "y" or "yes" grants.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Self::Granted,
            _ => Self::Declined,
        }
    }
}

/// Journal of committed ideas. Ids are unique; the newest record is first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalStore {
    records: Vec<IdeaRecord>,
}

impl JournalStore {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a journal from stored rows, dropping repeated ids.
    pub fn from_records(records: Vec<IdeaRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let total = records.len();

        let records: Vec<IdeaRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.id))
            .collect();

        if records.len() != total {
            warn!(
                dropped = total - records.len(),
                "Stored journal contained duplicate ids"
            );
        }

        Self { records }
    }

    /// Snapshot the draft and its metrics as a new record at the front.
    pub fn commit(
        &mut self,
        draft: &IdeaDraft,
        metrics: &IdeaMetrics,
        id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<&IdeaRecord, JournalError> {
        let missing = draft.missing_prices();
        if !missing.is_empty() {
            return Err(JournalError::MissingFields(missing));
        }
        if self.get(id).is_some() {
            return Err(JournalError::DuplicateId(id));
        }

        let record = IdeaRecord {
            id,
            idea: draft.clone(),
            reward_risk_ratio: Some(metrics.reward_risk),
            lot_size: Some(metrics.sizing.lot_size),
            created_at,
        };

        debug!(id = %id, pair = %record.idea.pair, "Committed idea");
        self.records.insert(0, record);
        Ok(&self.records[0])
    }

    /// Remove a record by id. Returns `None` when no record matched.
    pub fn remove(&mut self, id: Uuid) -> Option<IdeaRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }

    /// Remove every record if the trader confirmed. Returns how many went.
    pub fn clear(&mut self, confirmation: Confirmation) -> usize {
        match confirmation {
            Confirmation::Granted => {
                let removed = self.records.len();
                self.records.clear();
                removed
            }
            Confirmation::Declined => 0,
        }
    }

    /// Records matching every whitespace-separated token of `query`.
    pub fn filter(&self, query: &str) -> JournalFilter<'_> {
        JournalFilter {
            records: &self.records,
            tokens: query
                .split_whitespace()
                .map(str::to_lowercase)
                .collect(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&IdeaRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[IdeaRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IdeaRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lazy, read-only view over the journal. Iterate it as often as needed.
#[derive(Debug, Clone)]
pub struct JournalFilter<'a> {
    records: &'a [IdeaRecord],
    tokens: Vec<String>,
}

impl<'a> JournalFilter<'a> {
    pub fn iter(&self) -> FilterIter<'a, '_> {
        FilterIter {
            inner: self.records.iter(),
            filter: self,
        }
    }

    /// Case-insensitive substring match of all tokens against the record's
    /// JSON form. An empty query matches everything.
    pub fn matches(&self, record: &IdeaRecord) -> bool {
        if self.tokens.is_empty() {
            return true;
        }

        let haystack = serde_json::to_string(record)
            .unwrap_or_default()
            .to_lowercase();
        self.tokens.iter().all(|t| haystack.contains(t.as_str()))
    }
}

impl<'a, 'f> IntoIterator for &'f JournalFilter<'a> {
    type Item = &'a IdeaRecord;
    type IntoIter = FilterIter<'a, 'f>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`JournalFilter::iter`].
pub struct FilterIter<'a, 'f> {
    inner: std::slice::Iter<'a, IdeaRecord>,
    filter: &'f JournalFilter<'a>,
}

impl<'a, 'f> Iterator for FilterIter<'a, 'f> {
    type Item = &'a IdeaRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.inner.by_ref().find(|r| filter.matches(r))
    }
}
