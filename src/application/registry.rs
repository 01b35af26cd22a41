//! Playback registry use case
//!
//! Holds the ordered list of sent takes and mediates their per-entry playback
//! controls: speed cycling, binding live players, and re-asserting the
//! entry's speed every time its player starts.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::playback::{PlaybackSpeed, RecordingEntry};

use super::ports::{PlaybackElement, PlaybackError};

pub use crate::domain::recording::format_duration;

/// Errors from the playback registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No message #{} (there are {len})", .index + 1)]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Message #{} has no player attached", .0 + 1)]
    NotBound(usize),

    #[error("Playback failed: {0}")]
    Playback(#[from] PlaybackError),
}

/// Registry shared between the session controller and the composer
pub type SharedRegistry = Arc<Mutex<PlaybackRegistry>>;

/// Append-only list of recording entries plus their bound players.
#[derive(Default)]
pub struct PlaybackRegistry {
    entries: Vec<RecordingEntry>,
    elements: HashMap<usize, Box<dyn PlaybackElement>>,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry wrapped for sharing
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RecordingEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Result<&RecordingEntry, RegistryError> {
        let len = self.entries.len();
        self.entries
            .get(index)
            .ok_or(RegistryError::IndexOutOfRange { index, len })
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut RecordingEntry, RegistryError> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(RegistryError::IndexOutOfRange { index, len })
    }

    pub fn is_bound(&self, index: usize) -> bool {
        self.elements.contains_key(&index)
    }

    /// Append a committed take, returning its index
    pub fn append(&mut self, entry: RecordingEntry) -> usize {
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        log::debug!(
            "Appended message #{} ({}s)",
            index + 1,
            self.entries[index].duration_seconds()
        );
        index
    }

    /// Remove the most recently appended entry, detaching its player
    pub fn remove_last(&mut self) -> Option<RecordingEntry> {
        let entry = self.entries.pop()?;
        let index = self.entries.len();
        if let Some(element) = self.elements.remove(&index) {
            element.stop();
        }
        log::debug!("Removed message #{}", index + 1);
        Some(entry)
    }

    /// Advance the entry to the next speed and push it to its player
    pub fn cycle_speed(&mut self, index: usize) -> Result<PlaybackSpeed, RegistryError> {
        let entry = self.get_mut(index)?;
        let speed = entry.speed().next();
        entry.set_speed(speed);

        if let Some(element) = self.elements.get(&index) {
            element.set_rate(speed.rate());
        }
        Ok(speed)
    }

    /// Attach a player to an entry, loading its source at the entry's speed.
    ///
    /// Returns the player previously bound to the entry, if any.
    pub fn bind(
        &mut self,
        index: usize,
        element: Box<dyn PlaybackElement>,
    ) -> Result<Option<Box<dyn PlaybackElement>>, RegistryError> {
        let entry = self.get(index)?;
        element.load(entry.source())?;
        element.set_rate(entry.speed().rate());

        let previous = self.elements.insert(index, element);
        if let Some(ref old) = previous {
            old.stop();
        }
        Ok(previous)
    }

    /// Detach the player bound to an entry
    pub fn unbind(&mut self, index: usize) -> Option<Box<dyn PlaybackElement>> {
        let element = self.elements.remove(&index)?;
        element.stop();
        Some(element)
    }

    /// Play-start notification: players may reset their rate when playback
    /// begins, so the entry's speed is applied again.
    pub fn play_started(&mut self, index: usize) -> Result<(), RegistryError> {
        let speed = self.get(index)?.speed();
        let element = self
            .elements
            .get(&index)
            .ok_or(RegistryError::NotBound(index))?;
        element.set_rate(speed.rate());
        Ok(())
    }

    /// Start the entry's player, then deliver the play-start notification
    pub fn play(&mut self, index: usize) -> Result<(), RegistryError> {
        self.get(index)?;
        let element = self
            .elements
            .get(&index)
            .ok_or(RegistryError::NotBound(index))?;
        element.play()?;
        self.play_started(index)
    }

    /// Stop every bound player
    pub fn stop_all(&self) {
        for element in self.elements.values() {
            element.stop();
        }
    }

    /// Copy the player's position into the entry's `current_time`
    pub fn sync_position(&mut self, index: usize) -> Result<f64, RegistryError> {
        let position = self
            .elements
            .get(&index)
            .map(|element| element.position_secs());
        let entry = self.get_mut(index)?;
        if let Some(position) = position {
            entry.set_current_time(position);
        }
        Ok(entry.current_time())
    }
}
