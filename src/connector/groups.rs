//! Group enumeration, the membership entitlement, and membership writes

use crate::client::ConfluenceClient;
use crate::error::Result;
use crate::http::RateLimitVerdict;
use crate::pagination::{PageState, TokenBag};
use crate::types::{EntitlementRecord, EntityRecord, GrantRecord, ResourceId, ResourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::users::user_record;
use super::{ListPage, PageToken, ResourceSyncer, GROUP_MEMBER_ENTITLEMENT};

/// Enumerates groups and their membership grants
pub struct GroupSyncer {
    client: Arc<ConfluenceClient>,
}

impl GroupSyncer {
    pub fn new(client: Arc<ConfluenceClient>) -> Self {
        Self { client }
    }

    /// Add a user to a group. One upstream call; a failure leaves nothing to
    /// roll back.
    pub async fn grant(&self, group_id: &str, account_id: &str) -> Result<RateLimitVerdict> {
        let verdict = self.client.add_group_member(group_id, account_id).await?;
        info!(group_id, account_id, "added group member");
        Ok(verdict)
    }

    /// Remove a user from a group
    pub async fn revoke(&self, group_id: &str, account_id: &str) -> Result<RateLimitVerdict> {
        let verdict = self
            .client
            .remove_group_member(group_id, account_id)
            .await?;
        info!(group_id, account_id, "removed group member");
        Ok(verdict)
    }
}

#[async_trait]
impl ResourceSyncer for GroupSyncer {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Group
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> Result<ListPage<EntityRecord>> {
        let mut bag = TokenBag::unmarshal(&token.token)?;
        if bag.is_empty() {
            bag.push(PageState::new(ResourceKind::Group.as_str()));
        }

        let (groups, next, verdict) = self
            .client
            .get_groups(bag.page_token(), token.effective_size())
            .await?;
        bag.next(&next);

        let records = groups
            .into_iter()
            .map(|group| {
                let mut record = EntityRecord::new(
                    ResourceId::new(ResourceKind::Group, group.id),
                    group.name.clone(),
                );
                record.profile.insert("name".into(), group.name.into());
                record
                    .profile
                    .insert("type".into(), group.group_type.into());
                record
            })
            .collect();

        Ok(ListPage {
            records,
            next_token: bag.marshal()?,
            rate_limit: Some(verdict),
        })
    }

    async fn entitlements(
        &self,
        resource: &ResourceId,
        _token: &PageToken,
    ) -> Result<ListPage<EntitlementRecord>> {
        // Groups offer exactly one entitlement.
        let record = EntitlementRecord {
            resource: resource.clone(),
            slug: GROUP_MEMBER_ENTITLEMENT.to_string(),
            display_name: format!("{} group member", resource.id),
            description: format!("Member of the {} group", resource.id),
        };
        Ok(ListPage {
            records: vec![record],
            next_token: String::new(),
            rate_limit: None,
        })
    }

    async fn grants(
        &self,
        resource: &ResourceId,
        token: &PageToken,
    ) -> Result<ListPage<GrantRecord>> {
        let (members, next, verdict) = self
            .client
            .get_group_members(&resource.id, &token.token, token.effective_size())
            .await?;

        let records = members
            .iter()
            .filter(|member| member.is_human())
            .map(|member| GrantRecord {
                resource: resource.clone(),
                entitlement: GROUP_MEMBER_ENTITLEMENT.to_string(),
                principal: user_record(member).id,
            })
            .collect();

        Ok(ListPage {
            records,
            next_token: next,
            rate_limit: Some(verdict),
        })
    }
}
