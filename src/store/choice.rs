use crate::error::{PrismError, PrismResult};
use crate::reactive::Cell;
use crate::store::{Snapshot, StoreCore};

/// Segmented choice store
///
/// Holds a locally-computed option list behind the same lifecycle as the
/// remote-backed stores, so consumers read one uniform snapshot shape.
/// There is no remote I/O: `load` commits synchronously, but still runs
/// through the epoch guard so a concurrent `reset` wins.
#[derive(Clone, Default)]
pub struct SegmentedChoiceStore {
    core: StoreCore<Vec<String>>,
    selection: Cell<Option<String>>,
}

impl SegmentedChoiceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the option list
    ///
    /// An empty list short-circuits to `reset()`. A previous selection
    /// survives only if it is still among the new options.
    pub fn load(&self, options: Vec<String>) {
        if options.is_empty() {
            self.reset();
            return;
        }

        let epoch = self.core.begin_load();
        if let Some(selected) = self.selection.get() {
            if !options.contains(&selected) {
                self.selection.set(None);
            }
        }
        self.core.commit(epoch, options);
    }

    /// Select one of the ready options
    ///
    /// Rejects values outside the current option list with a validation
    /// error; the store's lifecycle state is untouched either way.
    pub fn select(&self, value: &str) -> PrismResult<()> {
        let options = self.core.snapshot().data.unwrap_or_default();
        if !options.iter().any(|option| option == value) {
            return Err(PrismError::validation(format!(
                "'{value}' is not one of the available options"
            )));
        }
        self.selection.set(Some(value.to_string()));
        Ok(())
    }

    /// Currently selected option, if any
    pub fn selection(&self) -> Option<String> {
        self.selection.get()
    }

    /// Restore defaults and clear the selection
    pub fn reset(&self) {
        self.selection.set(None);
        self.core.reset();
    }

    /// One consistent read of the store's state
    pub fn snapshot(&self) -> Snapshot<Vec<String>> {
        self.core.snapshot()
    }
}
