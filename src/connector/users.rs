//! User enumeration
//!
//! Users are reachable two ways: through the user search listing, and
//! through the members of every group. Both feed the same stream. The page
//! token is a frame stack: the first call seeds a "user" frame (the outer
//! walk over groups) and a "search" frame on top of it, so the search
//! listing drains first. Each outer groups page then fans out into one
//! "group" frame per group, and those member listings drain innermost-first
//! before the next outer page is fetched.
//!
//! A user belonging to several groups appears once per group. The stream is
//! not deduplicated here; see the module docs on [`crate::connector`].

use crate::client::models::ApiUser;
use crate::client::ConfluenceClient;
use crate::error::{Error, Result};
use crate::pagination::{PageState, TokenBag};
use crate::types::{EntityRecord, JsonObject, ResourceId, ResourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{ListPage, PageToken, ResourceSyncer, GROUP_PAGE_SIZE_MAXIMUM};

/// Frame kind for the merged search listing
const SEARCH_FRAME_KIND: &str = "search";

/// Enumerates human users
pub struct UserSyncer {
    client: Arc<ConfluenceClient>,
}

impl UserSyncer {
    pub fn new(client: Arc<ConfluenceClient>) -> Self {
        Self { client }
    }
}

/// Outer groups pages stay small because each one fans out into a token
/// frame per group
fn limit_page_size_for_groups(requested: u32) -> u32 {
    requested.min(GROUP_PAGE_SIZE_MAXIMUM)
}

/// Map an API user to an enumeration record, carrying its account fields in
/// the profile bag
pub(super) fn user_record(user: &ApiUser) -> EntityRecord {
    let mut profile = JsonObject::new();
    profile.insert("account_id".into(), user.account_id.clone().into());
    profile.insert("account_type".into(), user.account_type.clone().into());
    if let Some(email) = &user.email {
        profile.insert("email".into(), email.clone().into());
    }
    EntityRecord::with_profile(
        ResourceId::new(ResourceKind::User, user.account_id.clone()),
        user.display_name.clone(),
        profile,
    )
}

fn human_records(users: Vec<ApiUser>) -> Vec<EntityRecord> {
    users
        .iter()
        .filter(|user| user.is_human())
        .map(user_record)
        .collect()
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> Result<ListPage<EntityRecord>> {
        let mut bag = TokenBag::unmarshal(&token.token)?;
        if bag.is_empty() {
            bag.push(PageState::new(ResourceKind::User.as_str()));
            bag.push(PageState::new(SEARCH_FRAME_KIND));
        }

        let kind = bag.resource_kind().to_string();
        let size = token.effective_size();

        let (records, verdict) = match kind.as_str() {
            SEARCH_FRAME_KIND => {
                let (users, next, verdict) =
                    self.client.search_users(bag.page_token(), size).await?;
                bag.next(&next);
                (human_records(users), verdict)
            }
            "user" => {
                // Outer walk: fetch one page of groups and queue a member
                // scan frame for each, innermost-last.
                let outer_size = limit_page_size_for_groups(size);
                let (groups, next, verdict) =
                    self.client.get_groups(bag.page_token(), outer_size).await?;
                bag.next(&next);
                for group in &groups {
                    bag.push(PageState::nested(
                        ResourceKind::Group.as_str(),
                        group.id.as_str(),
                    ));
                }
                debug!(queued = groups.len(), "queued group member scans");
                (Vec::new(), verdict)
            }
            "group" => {
                let group_id = bag
                    .current()
                    .and_then(|state| state.resource_id.clone())
                    .ok_or_else(|| {
                        Error::invalid_page_token("group frame is missing its group id")
                    })?;
                let (members, next, verdict) = self
                    .client
                    .get_group_members(&group_id, bag.page_token(), size)
                    .await?;
                bag.next(&next);
                (human_records(members), verdict)
            }
            other => {
                return Err(Error::UnexpectedResourceKind {
                    kind: other.to_string(),
                })
            }
        };

        Ok(ListPage {
            records,
            next_token: bag.marshal()?,
            rate_limit: Some(verdict),
        })
    }
}
