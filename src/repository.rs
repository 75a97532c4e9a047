use crate::models::{
    BackupDocument, ChatMessage, DailyEntry, RestoreSummary, SettingsField, UserSettings,
    WeightEntry,
};
use crate::storage::{
    CHAT_HISTORY_KEY, DAILY_LOGS_KEY, KeyValueStore, SETTINGS_KEY, StorageError, WEIGHT_LOGS_KEY,
};
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Typed access to the four persisted collections.
///
/// Every mutation is a read-modify-write of the whole collection, serialized
/// by one lock so concurrent requests cannot lose each other's writes.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl Repository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn daily_logs(&self) -> Vec<DailyEntry> {
        self.load_collection(DAILY_LOGS_KEY).await
    }

    pub async fn daily_log(&self, date: NaiveDate) -> Option<DailyEntry> {
        self.daily_logs()
            .await
            .into_iter()
            .find(|entry| entry.date == date)
    }

    pub async fn save_daily_log(&self, entry: DailyEntry) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut logs = self.daily_logs().await;
        match logs.iter_mut().find(|existing| existing.date == entry.date) {
            Some(existing) => *existing = entry,
            None => logs.push(entry),
        }
        self.put_collection(DAILY_LOGS_KEY, &logs).await
    }

    /// Builds the entry for `date` from whatever is stored for it, under the write lock.
    pub async fn update_daily_log(
        &self,
        date: NaiveDate,
        build: impl FnOnce(Option<DailyEntry>) -> DailyEntry + Send,
    ) -> Result<DailyEntry, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut logs = self.daily_logs().await;
        let position = logs.iter().position(|existing| existing.date == date);
        let entry = build(position.map(|index| logs[index].clone()));
        match position {
            Some(index) => logs[index] = entry.clone(),
            None => logs.push(entry.clone()),
        }
        self.put_collection(DAILY_LOGS_KEY, &logs).await?;
        Ok(entry)
    }

    /// Returns whether an entry was removed. Nothing is written when the date is absent.
    pub async fn delete_daily_log(&self, date: NaiveDate) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut logs = self.daily_logs().await;
        let before = logs.len();
        logs.retain(|entry| entry.date != date);
        if logs.len() == before {
            return Ok(false);
        }
        self.put_collection(DAILY_LOGS_KEY, &logs).await?;
        Ok(true)
    }

    /// Sorted ascending by date.
    pub async fn weight_logs(&self) -> Vec<WeightEntry> {
        self.load_collection(WEIGHT_LOGS_KEY).await
    }

    pub async fn save_weight_log(&self, entry: WeightEntry) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut logs = self.weight_logs().await;
        logs.retain(|existing| existing.date != entry.date);
        logs.push(entry);
        logs.sort_by_key(|existing| existing.date);
        self.put_collection(WEIGHT_LOGS_KEY, &logs).await
    }

    pub async fn delete_weight_log(&self, date: NaiveDate) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut logs = self.weight_logs().await;
        let before = logs.len();
        logs.retain(|entry| entry.date != date);
        if logs.len() == before {
            return Ok(false);
        }
        self.put_collection(WEIGHT_LOGS_KEY, &logs).await?;
        Ok(true)
    }

    pub async fn settings(&self) -> UserSettings {
        self.load_record(SETTINGS_KEY).await.unwrap_or_default()
    }

    pub async fn save_settings(&self, settings: &UserSettings) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.put_record(SETTINGS_KEY, settings).await
    }

    /// Last write wins; the value is not range-checked here.
    pub async fn update_setting(&self, field: SettingsField) -> Result<UserSettings, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.settings().await;
        field.apply(&mut settings);
        self.put_record(SETTINGS_KEY, &settings).await?;
        Ok(settings)
    }

    /// Oldest first.
    pub async fn chat_history(&self) -> Vec<ChatMessage> {
        self.load_collection(CHAT_HISTORY_KEY).await
    }

    pub async fn save_chat_history(&self, history: &[ChatMessage]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.put_collection(CHAT_HISTORY_KEY, history).await
    }

    /// Applies `edit` to the freshly read history and persists the result.
    pub async fn update_chat_history<R: Send>(
        &self,
        edit: impl FnOnce(&mut Vec<ChatMessage>) -> R + Send,
    ) -> Result<R, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut history = self.chat_history().await;
        let result = edit(&mut history);
        self.put_collection(CHAT_HISTORY_KEY, &history).await?;
        Ok(result)
    }

    pub async fn export(&self) -> BackupDocument {
        BackupDocument {
            daily_logs: Some(self.daily_logs().await),
            weight_logs: Some(self.weight_logs().await),
            settings: Some(self.settings().await),
            chat_history: Some(self.chat_history().await),
        }
    }

    /// Writes only the sections present in `backup`.
    pub async fn restore(&self, backup: BackupDocument) -> Result<RestoreSummary, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut summary = RestoreSummary::default();

        if let Some(logs) = backup.daily_logs {
            let logs = dedupe_by_date(logs, |entry| entry.date);
            self.put_collection(DAILY_LOGS_KEY, &logs).await?;
            summary.daily_logs = Some(logs.len());
        }
        if let Some(logs) = backup.weight_logs {
            let mut logs = dedupe_by_date(logs, |entry| entry.date);
            logs.sort_by_key(|entry| entry.date);
            self.put_collection(WEIGHT_LOGS_KEY, &logs).await?;
            summary.weight_logs = Some(logs.len());
        }
        if let Some(settings) = backup.settings {
            self.put_record(SETTINGS_KEY, &settings).await?;
            summary.settings = true;
        }
        if let Some(history) = backup.chat_history {
            self.put_collection(CHAT_HISTORY_KEY, &history).await?;
            summary.chat_history = Some(history.len());
        }

        Ok(summary)
    }

    async fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.load_record(key).await.unwrap_or_default()
    }

    async fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                error!("{err}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %key, "ignoring malformed stored data: {err}");
                None
            }
        }
    }

    async fn put_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        self.put_record(key, items).await
    }

    async fn put_record<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let payload = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set_item(key, &payload).await?;
        debug!(key = %key, bytes = payload.len(), "persisted");
        Ok(())
    }
}

/// Keeps the last entry for each date, in order of each date's first appearance.
fn dedupe_by_date<T>(items: Vec<T>, date_of: impl Fn(&T) -> NaiveDate) -> Vec<T> {
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match kept.iter_mut().find(|existing| date_of(&**existing) == date_of(&item)) {
            Some(existing) => *existing = item,
            None => kept.push(item),
        }
    }
    kept
}
