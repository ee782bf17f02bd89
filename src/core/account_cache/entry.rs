use serde::Serialize;

use crate::core::errors::{TxFlowError, TxResult};

/// One independently fetched fact: last good value, whether a fetch is in
/// flight, and the error of the latest fetch if it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry<T> {
    pub value: Option<T>,
    pub is_loading: bool,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<TxFlowError>,
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<TxFlowError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self { value: None, is_loading: false, error: None }
    }
}

impl<T> CacheEntry<T> {
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// The shown value is older than the latest failed fetch.
    pub fn is_stale(&self) -> bool {
        self.value.is_some() && self.error.is_some()
    }

    pub(crate) fn begin_load(&mut self) {
        self.is_loading = true;
    }

    /// Failures keep the previous value around.
    pub(crate) fn resolve(&mut self, result: TxResult<T>) {
        self.is_loading = false;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
    }
}
