//! Live counters for the ticket and service categories.
//!
//! Two voice channels act as display labels ("Open Tickets: 4"). On every
//! relevant channel event the tracker re-fetches the guild's channel list,
//! recounts both categories and renames the counter channels if the name
//! changed. Nothing is cached locally and no incremental count is kept; each
//! refresh re-derives the truth from a fresh snapshot, so a missed or
//! duplicated event cannot make the display drift permanently.

use std::sync::Arc;

use log::{error, info, warn};
use serenity::model::prelude::*;
use serenity::prelude::*;

use crate::config::{BotConfig, TrackedCategory};

/// The slice of a `GuildChannel` the tracker actually looks at.
pub struct ChannelInfo {
    pub id: ChannelId,
    pub parent_id: Option<ChannelId>,
    pub kind: ChannelType,
}

impl From<&GuildChannel> for ChannelInfo {
    fn from(channel: &GuildChannel) -> Self {
        ChannelInfo {
            id: channel.id,
            parent_id: channel.parent_id,
            kind: channel.kind,
        }
    }
}

/// Counts the channels parented under `category_id`, or `None` when the
/// category itself is absent from the snapshot (orphan channels still
/// pointing at a deleted category must not be counted). The category itself
/// and any category-type channel are excluded; a category can never be its
/// own child, but the id check also guards against a malformed snapshot.
pub fn count_in_category(channels: &[ChannelInfo], category_id: ChannelId) -> Option<usize> {
    if !channels.iter().any(|channel| channel.id == category_id) {
        return None;
    }

    let count = channels
        .iter()
        .filter(|channel| {
            channel.parent_id == Some(category_id)
                && channel.id != category_id
                && channel.kind != ChannelType::Category
        })
        .count();
    Some(count)
}

pub fn desired_name(label: &str, count: usize) -> String {
    format!("{}: {}", label, count)
}

/// Renames are rate-limited harshly by Discord, so they are only issued when
/// the current name actually differs.
pub fn needs_rename(current: &str, desired: &str) -> bool {
    current != desired
}

pub struct CategoryTracker {
    config: Arc<BotConfig>,
}

impl CategoryTracker {
    pub fn new(config: Arc<BotConfig>) -> Self {
        CategoryTracker { config }
    }

    fn tracked(&self) -> &[TrackedCategory; 2] {
        &self.config.tracked
    }

    pub fn is_tracked_parent(&self, parent_id: Option<ChannelId>) -> bool {
        match parent_id {
            Some(id) => self.tracked().iter().any(|t| t.category_id == id),
            None => false,
        }
    }

    /// A parent change matters only if the channel actually moved and one
    /// side of the move is a tracked category. A move between two untracked
    /// categories must not trigger any API traffic.
    pub fn parent_change_is_relevant(
        &self,
        old_parent: Option<ChannelId>,
        new_parent: Option<ChannelId>,
    ) -> bool {
        old_parent != new_parent
            && (self.is_tracked_parent(old_parent) || self.is_tracked_parent(new_parent))
    }

    /// Fetches a fresh channel list and counts the children of `category_id`.
    /// Returns 0 on any failure; this runs inside event handlers where no
    /// caller can recover, so it must never propagate.
    async fn count_channels(&self, ctx: &Context, category_id: ChannelId) -> usize {
        let channels = match self.config.guild_id.channels(&ctx.http).await {
            Ok(channels) => channels,
            Err(error) => {
                warn!(
                    "Failed to fetch channel list for guild {}: {}",
                    self.config.guild_id, error
                );
                return 0;
            }
        };

        let snapshot: Vec<ChannelInfo> = channels.values().map(ChannelInfo::from).collect();
        match count_in_category(&snapshot, category_id) {
            Some(count) => count,
            None => {
                warn!(
                    "Category {} not found in guild {}",
                    category_id, self.config.guild_id
                );
                0
            }
        }
    }

    /// Renames the counter voice channel to `"{label}: {count}"` if needed.
    /// Best-effort: a missing channel or a failed rename is logged and
    /// swallowed.
    async fn sync_counter(&self, ctx: &Context, vc_id: ChannelId, label: &str, count: usize) {
        let desired = desired_name(label, count);

        let current = match ctx.http.get_channel(vc_id.0).await {
            Ok(Channel::Guild(channel)) => channel,
            Ok(_) => {
                warn!("Counter channel {} is not a guild channel", vc_id);
                return;
            }
            Err(error) => {
                warn!("Counter channel {} not found: {}", vc_id, error);
                return;
            }
        };

        if !needs_rename(&current.name, &desired) {
            return;
        }

        match vc_id.edit(&ctx.http, |channel| channel.name(&desired)).await {
            Ok(_) => info!(
                "Updated {} counter to \"{}\" ({} channels found)",
                label, desired, count
            ),
            Err(error) => error!(
                "Failed to rename counter channel {} to \"{}\": {}",
                vc_id, desired, error
            ),
        }
    }

    /// Recounts both tracked categories and syncs both counter channels,
    /// tickets then services. No-op for any guild other than the configured
    /// one.
    pub async fn refresh_all(&self, ctx: &Context, guild_id: GuildId) {
        if guild_id != self.config.guild_id {
            return;
        }

        let mut counts = [0usize; 2];
        for (i, tracked) in self.tracked().iter().enumerate() {
            counts[i] = self.count_channels(ctx, tracked.category_id).await;
        }

        for (tracked, count) in self.tracked().iter().zip(counts) {
            self.sync_counter(ctx, tracked.counter_vc_id, &tracked.label, count)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKETS_CATEGORY: ChannelId = ChannelId(100);
    const SERVICES_CATEGORY: ChannelId = ChannelId(200);
    const OTHER_CATEGORY: ChannelId = ChannelId(300);

    fn channel(id: u64, parent: Option<ChannelId>, kind: ChannelType) -> ChannelInfo {
        ChannelInfo {
            id: ChannelId(id),
            parent_id: parent,
            kind,
        }
    }

    fn tracker() -> CategoryTracker {
        CategoryTracker::new(Arc::new(BotConfig {
            guild_id: GuildId(1),
            tracked: [
                crate::config::TrackedCategory {
                    category_id: TICKETS_CATEGORY,
                    counter_vc_id: ChannelId(101),
                    label: "Open Tickets".to_string(),
                },
                crate::config::TrackedCategory {
                    category_id: SERVICES_CATEGORY,
                    counter_vc_id: ChannelId(201),
                    label: "Open Service Requests".to_string(),
                },
            ],
            welcome_category_id: SERVICES_CATEGORY,
            startup_log_channel_id: ChannelId(400),
            paid_client_role_id: RoleId(500),
            free_client_role_id: RoleId(501),
        }))
    }

    #[test]
    fn counts_only_children_of_the_category() {
        let channels = vec![
            channel(100, None, ChannelType::Category),
            channel(200, None, ChannelType::Category),
            channel(1, Some(TICKETS_CATEGORY), ChannelType::Text),
            channel(2, Some(TICKETS_CATEGORY), ChannelType::Voice),
            channel(3, Some(SERVICES_CATEGORY), ChannelType::Text),
            channel(4, None, ChannelType::Text),
        ];
        assert_eq!(count_in_category(&channels, TICKETS_CATEGORY), Some(2));
        assert_eq!(count_in_category(&channels, SERVICES_CATEGORY), Some(1));
        assert_eq!(count_in_category(&channels, OTHER_CATEGORY), None);
    }

    #[test]
    fn count_is_independent_of_list_order() {
        let mut channels = vec![
            channel(100, None, ChannelType::Category),
            channel(1, Some(TICKETS_CATEGORY), ChannelType::Text),
            channel(2, None, ChannelType::Text),
            channel(3, Some(TICKETS_CATEGORY), ChannelType::Text),
            channel(4, Some(SERVICES_CATEGORY), ChannelType::Voice),
        ];
        let forward = count_in_category(&channels, TICKETS_CATEGORY);
        channels.reverse();
        assert_eq!(count_in_category(&channels, TICKETS_CATEGORY), forward);
        assert_eq!(forward, Some(2));
    }

    #[test]
    fn count_excludes_the_category_itself_and_category_channels() {
        let channels = vec![
            // Malformed snapshot: the category listed as its own child.
            channel(100, Some(TICKETS_CATEGORY), ChannelType::Category),
            // A nested category should not count either.
            channel(5, Some(TICKETS_CATEGORY), ChannelType::Category),
            channel(6, Some(TICKETS_CATEGORY), ChannelType::Text),
        ];
        assert_eq!(count_in_category(&channels, TICKETS_CATEGORY), Some(1));
    }

    #[test]
    fn orphans_of_a_missing_category_are_not_counted() {
        // A channel still pointing at a category that no longer exists.
        let channels = vec![channel(1, Some(TICKETS_CATEGORY), ChannelType::Text)];
        assert_eq!(count_in_category(&channels, TICKETS_CATEGORY), None);
    }

    #[test]
    fn empty_category_formats_to_zero() {
        assert_eq!(
            desired_name("Open Service Requests", 0),
            "Open Service Requests: 0"
        );
    }

    #[test]
    fn new_ticket_channel_bumps_the_count() {
        let mut channels = vec![
            channel(100, None, ChannelType::Category),
            channel(1, Some(TICKETS_CATEGORY), ChannelType::Text),
            channel(2, Some(TICKETS_CATEGORY), ChannelType::Text),
            channel(3, Some(TICKETS_CATEGORY), ChannelType::Text),
        ];
        channels.push(channel(4, Some(TICKETS_CATEGORY), ChannelType::Text));
        let count = count_in_category(&channels, TICKETS_CATEGORY).unwrap();
        assert_eq!(desired_name("Open Tickets", count), "Open Tickets: 4");
    }

    #[test]
    fn rename_is_skipped_when_name_already_matches() {
        let desired = desired_name("Open Tickets", 4);
        assert!(!needs_rename("Open Tickets: 4", &desired));
        assert!(needs_rename("Open Tickets: 3", &desired));
    }

    #[test]
    fn create_and_delete_fire_only_for_tracked_parents() {
        let tracker = tracker();
        assert!(tracker.is_tracked_parent(Some(TICKETS_CATEGORY)));
        assert!(tracker.is_tracked_parent(Some(SERVICES_CATEGORY)));
        assert!(!tracker.is_tracked_parent(Some(OTHER_CATEGORY)));
        assert!(!tracker.is_tracked_parent(None));
    }

    #[test]
    fn move_out_of_a_tracked_category_is_relevant() {
        let tracker = tracker();
        assert!(tracker.parent_change_is_relevant(Some(TICKETS_CATEGORY), Some(OTHER_CATEGORY)));
        assert!(tracker.parent_change_is_relevant(Some(TICKETS_CATEGORY), None));
    }

    #[test]
    fn move_into_a_tracked_category_is_relevant() {
        let tracker = tracker();
        assert!(tracker.parent_change_is_relevant(Some(OTHER_CATEGORY), Some(SERVICES_CATEGORY)));
        assert!(tracker.parent_change_is_relevant(None, Some(TICKETS_CATEGORY)));
    }

    #[test]
    fn move_between_untracked_categories_is_ignored() {
        let tracker = tracker();
        assert!(!tracker.parent_change_is_relevant(Some(OTHER_CATEGORY), Some(ChannelId(301))));
        assert!(!tracker.parent_change_is_relevant(None, Some(OTHER_CATEGORY)));
    }

    #[test]
    fn unchanged_parent_is_ignored() {
        let tracker = tracker();
        assert!(!tracker.parent_change_is_relevant(
            Some(TICKETS_CATEGORY),
            Some(TICKETS_CATEGORY)
        ));
        assert!(!tracker.parent_change_is_relevant(None, None));
    }
}
