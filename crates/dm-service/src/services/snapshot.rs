//! Online snapshot
//!
//! Projects every known identity into an [`OnlineUser`] row as seen by one
//! viewer. Nothing is cached: each call reads the identity list and the
//! viewer's unread counters fresh.

use std::collections::HashSet;

use dm_core::entities::OnlineUser;
use dm_core::Snowflake;
use tracing::instrument;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::identity::IdentityService;

/// Snapshot service
pub struct SnapshotService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SnapshotService<'a> {
    /// Create a new SnapshotService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Build the snapshot for `viewer_id`, online users first
    ///
    /// `online` is the set of usernames present in the directory at call time.
    #[instrument(skip(self, online), fields(online = online.len()))]
    pub async fn online_snapshot(
        &self,
        viewer_id: Snowflake,
        online: &HashSet<String>,
    ) -> ServiceResult<Vec<OnlineUser>> {
        let users = IdentityService::new(self.ctx).list_all().await?;
        let unread = self.ctx.message_repo().unread_counts(viewer_id).await?;

        let mut entries: Vec<OnlineUser> = users
            .into_iter()
            .map(|user| {
                let is_online = online.contains(&user.username);
                let unread_count = unread.get(&user.id).copied().unwrap_or(0);
                OnlineUser::new(user, is_online, unread_count)
            })
            .collect();

        OnlineUser::sort_online_first(&mut entries);
        Ok(entries)
    }
}
