//! Per-subscriber-group delivery state.
//!
//! Each group records where its alerts go and which message is currently
//! "live" in that channel. The live message is replaced, never appended:
//! the engine deletes the previous reference (best effort) before sending
//! a new composite alert. Mutations persist write-through so a crash
//! mid-tick never leaves the stored reference pointing at a message that
//! was already replaced.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::{read_json_or_default, write_json_atomic};

/// One subscriber group's configuration and live-message state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberGroup {
    pub group_id: String,
    /// Delivery target channel. Groups without one are skipped per tick.
    pub channel_id: Option<String>,
    /// Per-group override of the process-wide lead-time set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_minutes: Option<Vec<u32>>,
    /// Subject name -> mention string to use in alert text (e.g. a role
    /// mention). Subjects not listed fall back to their plain name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub mentions: HashMap<String, String>,
    /// Reference to the most recently delivered alert message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_message_id: Option<String>,
}

impl SubscriberGroup {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            channel_id: None,
            lead_minutes: None,
            mentions: HashMap::new(),
            live_message_id: None,
        }
    }
}

/// Durable keyed table of subscriber groups.
pub struct SubscriberStore {
    path: PathBuf,
    groups: BTreeMap<String, SubscriberGroup>,
}

impl SubscriberStore {
    /// Load from disk; a missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let groups = read_json_or_default(&path)?;
        Ok(Self { path, groups })
    }

    /// All groups in stable id order.
    pub fn list_groups(&self) -> Vec<SubscriberGroup> {
        self.groups.values().cloned().collect()
    }

    pub fn get(&self, group_id: &str) -> Option<&SubscriberGroup> {
        self.groups.get(group_id)
    }

    /// Insert or replace a group and persist immediately.
    pub fn upsert(&mut self, group: SubscriberGroup) -> anyhow::Result<()> {
        self.groups.insert(group.group_id.clone(), group);
        self.persist()
    }

    pub fn get_live_message(&self, group_id: &str) -> Option<&str> {
        self.groups
            .get(group_id)?
            .live_message_id
            .as_deref()
    }

    /// Overwrite the live message reference for a group and persist.
    ///
    /// Unknown group ids are a no-op: the group may have been removed by
    /// an operator between evaluate and delivery.
    pub fn set_live_message(
        &mut self,
        group_id: &str,
        message_id: Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(group) = self.groups.get_mut(group_id) {
            group.live_message_id = message_id;
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&self) -> anyhow::Result<()> {
        write_json_atomic(&self.path, &self.groups)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with_channel(id: &str, channel: &str) -> SubscriberGroup {
        let mut group = SubscriberGroup::new(id);
        group.channel_id = Some(channel.to_string());
        group
    }

    #[test]
    fn empty_store_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubscriberStore::load(dir.path().join("subscribers.json")).unwrap();
        assert!(store.is_empty());
        assert!(store.list_groups().is_empty());
    }

    #[test]
    fn upsert_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscribers.json");

        let mut store = SubscriberStore::load(&path).unwrap();
        store.upsert(group_with_channel("guild-1", "chan-9")).unwrap();

        let reloaded = SubscriberStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.get("guild-1").unwrap().channel_id.as_deref(),
            Some("chan-9")
        );
    }

    #[test]
    fn live_message_is_overwritten_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscribers.json");

        let mut store = SubscriberStore::load(&path).unwrap();
        store.upsert(group_with_channel("guild-1", "chan-9")).unwrap();

        store
            .set_live_message("guild-1", Some("msg-100".to_string()))
            .unwrap();
        store
            .set_live_message("guild-1", Some("msg-200".to_string()))
            .unwrap();

        // Only the most recent reference survives, on disk too.
        assert_eq!(store.get_live_message("guild-1"), Some("msg-200"));
        let reloaded = SubscriberStore::load(&path).unwrap();
        assert_eq!(reloaded.get_live_message("guild-1"), Some("msg-200"));
    }

    #[test]
    fn set_live_message_for_unknown_group_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SubscriberStore::load(dir.path().join("subscribers.json")).unwrap();
        store
            .set_live_message("ghost", Some("msg-1".to_string()))
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn groups_list_in_stable_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SubscriberStore::load(dir.path().join("subscribers.json")).unwrap();
        store.upsert(group_with_channel("b", "c2")).unwrap();
        store.upsert(group_with_channel("a", "c1")).unwrap();

        let ids: Vec<_> = store.list_groups().into_iter().map(|g| g.group_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
