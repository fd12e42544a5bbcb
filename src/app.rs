//! Application state: account, current draft and journal, kept in sync
//! with the state store.
//!
//! Every accepted change is written back to its slot before the call
//! returns. Rejected changes (validation failures, declined clears,
//! unknown ids) leave both memory and storage untouched.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::JournalConfig;
use crate::db::{KeyValueStore, Slot, StateStore};
use crate::journal::{Confirmation, JournalError, JournalFilter, JournalStore};
use crate::models::{AccountProfile, IdeaDraft, IdeaRecord};
use crate::sizing::IdeaMetrics;

/// In-memory snapshot of everything the journal tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub account: AccountProfile,
    pub draft: IdeaDraft,
    pub journal: JournalStore,
}

/// Outcome of committing the current draft.
#[derive(Debug)]
pub enum CommitOutcome {
    Committed(IdeaRecord),
    Rejected(JournalError),
}

/// State plus the store it is persisted to.
pub struct App<S> {
    config: JournalConfig,
    store: StateStore<S>,
    state: AppState,
}

impl<S: KeyValueStore> App<S> {
    /// Restore state from the store. Unusable slots fall back to the
    /// configured defaults, with the draft dated `today`.
    pub async fn load(config: JournalConfig, backend: S, today: NaiveDate) -> Self {
        let store = StateStore::new(backend);

        let account = store
            .load_or(Slot::Account, || config.account.clone())
            .await;
        let draft = store
            .load_or(Slot::Draft, || config.draft_template(today))
            .await;
        let rows: Vec<IdeaRecord> = store.load_or(Slot::Journal, Vec::new).await;

        let state = AppState {
            account,
            draft,
            journal: JournalStore::from_records(rows),
        };

        Self {
            config,
            store,
            state,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// Metrics for the current draft under the current account.
    pub fn metrics(&self) -> IdeaMetrics {
        IdeaMetrics::compute(&self.state.account, &self.state.draft)
    }

    /// Apply an edit to the account profile and persist it.
    pub async fn update_account<F>(&mut self, edit: F) -> Result<&AccountProfile>
    where
        F: FnOnce(&mut AccountProfile),
    {
        edit(&mut self.state.account);
        self.store.save(Slot::Account, &self.state.account).await?;
        Ok(&self.state.account)
    }

    /// Apply an edit to the draft and persist it.
    pub async fn update_draft<F>(&mut self, edit: F) -> Result<&IdeaDraft>
    where
        F: FnOnce(&mut IdeaDraft),
    {
        edit(&mut self.state.draft);
        self.store.save(Slot::Draft, &self.state.draft).await?;
        Ok(&self.state.draft)
    }

    /// Replace the draft with the template for `today`.
    pub async fn reset_draft(&mut self, today: NaiveDate) -> Result<&IdeaDraft> {
        let template = self.config.draft_template(today);
        self.update_draft(|draft| *draft = template).await
    }

    /// Commit the current draft with a fresh id and timestamp.
    pub async fn commit_idea(&mut self) -> Result<CommitOutcome> {
        self.commit_idea_with(Uuid::new_v4(), Utc::now()).await
    }

    /// Commit the current draft with the given id and timestamp.
    pub async fn commit_idea_with(
        &mut self,
        id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<CommitOutcome> {
        let metrics = self.metrics();

        let record = match self
            .state
            .journal
            .commit(&self.state.draft, &metrics, id, created_at)
        {
            Ok(record) => record.clone(),
            Err(e) => return Ok(CommitOutcome::Rejected(e)),
        };

        self.persist_journal().await?;
        info!(id = %record.id, pair = %record.idea.pair, "Idea added to journal");

        Ok(CommitOutcome::Committed(record))
    }

    /// Delete a record by id. Returns the removed record, if there was one.
    pub async fn remove_idea(&mut self, id: Uuid) -> Result<Option<IdeaRecord>> {
        let removed = self.state.journal.remove(id);
        if removed.is_some() {
            self.persist_journal().await?;
            info!(id = %id, "Idea removed");
        }
        Ok(removed)
    }

    /// Delete every record if confirmed. Returns the number removed.
    pub async fn clear_ideas(&mut self, confirmation: Confirmation) -> Result<usize> {
        if confirmation == Confirmation::Declined {
            return Ok(0);
        }

        let removed = self.state.journal.clear(confirmation);
        self.persist_journal().await?;
        info!(removed, "Journal cleared");

        Ok(removed)
    }

    /// Records matching `query`; see [`JournalStore::filter`].
    pub fn filter(&self, query: &str) -> JournalFilter<'_> {
        self.state.journal.filter(query)
    }

    async fn persist_journal(&self) -> Result<()> {
        self.store
            .save(Slot::Journal, &self.state.journal.records())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::db::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    async fn fresh() -> App<MemoryStore> {
        App::load(JournalConfig::default(), MemoryStore::new(), today()).await
    }

    async fn reload(app: App<MemoryStore>) -> App<MemoryStore> {
        let App { config, store, .. } = app;
        App::load(config, store.into_backend(), today()).await
    }

    async fn fill_prices(app: &mut App<MemoryStore>) {
        app.update_draft(|d| {
            d.entry = "2400".to_string();
            d.stop_loss = "2390".to_string();
            d.take_profit = "2420".to_string();
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_fresh_state_uses_defaults() {
        tokio_test::block_on(async {
            let app = fresh().await;
            let state = app.state();

            assert_eq!(state.account, AccountProfile::default());
            assert_eq!(state.draft, JournalConfig::default().draft_template(today()));
            assert!(state.journal.is_empty());
        });
    }

    #[test]
    fn test_commit_persists() {
        tokio_test::block_on(async {
            let mut app = fresh().await;
            fill_prices(&mut app).await;

            let record = match app.commit_idea().await.unwrap() {
                CommitOutcome::Committed(r) => r,
                CommitOutcome::Rejected(e) => panic!("rejected: {}", e),
            };
            assert_eq!(record.reward_risk_ratio, Some(dec!(2)));
            assert_eq!(record.lot_size, Some(dec!(1)));

            let app = reload(app).await;
            assert_eq!(app.state().journal.records(), &[record]);
            assert_eq!(app.state().draft.entry, "2400");
        });
    }

    #[test]
    fn test_rejected_commit_changes_nothing() {
        tokio_test::block_on(async {
            let mut app = fresh().await;
            app.update_draft(|d| d.entry = "2400".to_string())
                .await
                .unwrap();

            match app.commit_idea().await.unwrap() {
                CommitOutcome::Rejected(JournalError::MissingFields(fields)) => {
                    assert_eq!(fields, vec!["stopLoss", "takeProfit"]);
                }
                other => panic!("unexpected: {:?}", other),
            }

            assert!(app.state().journal.is_empty());
            let stored = app.store.backend().get(Slot::Journal.key()).await.unwrap();
            assert!(stored.is_none());
        });
    }

    #[test]
    fn test_account_edit_feeds_sizing() {
        tokio_test::block_on(async {
            let mut app = fresh().await;
            fill_prices(&mut app).await;

            app.update_account(|a| a.balance = dec!(20000)).await.unwrap();
            assert_eq!(app.metrics().sizing.lot_size, dec!(2));

            let app = reload(app).await;
            assert_eq!(app.state().account.balance, dec!(20000));
        });
    }

    #[test]
    fn test_remove_and_clear() {
        tokio_test::block_on(async {
            let mut app = fresh().await;
            fill_prices(&mut app).await;
            app.commit_idea().await.unwrap();
            app.commit_idea().await.unwrap();
            let first = app.state().journal.records()[0].id;

            assert!(app.remove_idea(Uuid::new_v4()).await.unwrap().is_none());
            assert_eq!(app.state().journal.len(), 2);

            assert!(app.remove_idea(first).await.unwrap().is_some());
            assert_eq!(app.clear_ideas(Confirmation::Declined).await.unwrap(), 0);

            let mut app = reload(app).await;
            assert_eq!(app.state().journal.len(), 1);

            assert_eq!(app.clear_ideas(Confirmation::Granted).await.unwrap(), 1);
            let app = reload(app).await;
            assert!(app.state().journal.is_empty());
        });
    }

    #[test]
    fn test_reset_draft() {
        tokio_test::block_on(async {
            let mut app = fresh().await;
            fill_prices(&mut app).await;

            let later = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
            let draft = app.reset_draft(later).await.unwrap().clone();
            assert_eq!(draft.date, later);
            assert!(draft.entry.is_empty());
        });
    }

    #[test]
    fn test_corrupt_rows_fall_back_to_empty_journal() {
        tokio_test::block_on(async {
            let backend = MemoryStore::new();
            backend.put("itp_rows", "{\"oops\":").await.unwrap();
            backend.put("itp_account", r#"{"balance":5000,"riskPercent":2,"pair":"GBPUSD","tickValue":1,"pointSize":0.0001}"#).await.unwrap();

            let app = App::load(JournalConfig::default(), backend, today()).await;
            assert!(app.state().journal.is_empty());
            assert_eq!(app.state().account.pair, "GBPUSD");
        });
    }
}
