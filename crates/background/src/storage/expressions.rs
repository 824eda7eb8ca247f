use super::{SAVED_EXPRESSIONS_KEY, Storage, StorageError};

/// Expressions the user pinned, most recently added first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavedExpressions {
    list: Vec<String>,
}

impl SavedExpressions {
    pub fn load(storage: &dyn Storage) -> Self {
        let list = storage
            .get(SAVED_EXPRESSIONS_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        Self { list }
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        storage.set(SAVED_EXPRESSIONS_KEY, serde_json::to_value(&self.list)?)
    }

    /// Adding an expression that is already saved moves it to the front.
    pub fn add(&mut self, expression: &str) {
        self.list.retain(|e| e != expression);
        self.list.insert(0, expression.to_string());
    }

    pub fn remove(&mut self, expression: &str) -> bool {
        let before = self.list.len();
        self.list.retain(|e| e != expression);
        self.list.len() != before
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    pub fn list(&self) -> &[String] {
        &self.list
    }
}
