//! Space enumeration, permission entitlements, and permission writes
//!
//! Space entitlements are not fetched from upstream: they are the
//! cross-product of the configured permission verbs and target nouns, which
//! is the full set of grants the provider can express against a space.
//! Grants come from the v2 permission listing.

use crate::client::models::SpacePermission;
use crate::client::ConfluenceClient;
use crate::error::Result;
use crate::http::RateLimitVerdict;
use crate::types::{EntitlementRecord, EntityRecord, GrantRecord, ResourceId, ResourceKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::{entitlement_slug, split_entitlement_slug, ListPage, PageToken, ResourceSyncer};

/// Enumerates spaces and their permission grants
pub struct SpaceSyncer {
    client: Arc<ConfluenceClient>,
    skip_personal_spaces: bool,
    nouns: Vec<String>,
    verbs: Vec<String>,
}

impl SpaceSyncer {
    pub fn new(
        client: Arc<ConfluenceClient>,
        skip_personal_spaces: bool,
        nouns: Vec<String>,
        verbs: Vec<String>,
    ) -> Self {
        Self {
            client,
            skip_personal_spaces,
            nouns,
            verbs,
        }
    }

    /// Grant a space permission to a user or group
    pub async fn grant(
        &self,
        space_key: &str,
        slug: &str,
        principal: &ResourceId,
    ) -> Result<RateLimitVerdict> {
        let (verb, noun) = split_entitlement_slug(slug)?;
        let verdict = self
            .client
            .add_space_permission(space_key, verb, noun, &principal.id, principal.kind.as_str())
            .await?;
        info!(space_key, slug, principal = %principal, "granted space permission");
        Ok(verdict)
    }

    /// Revoke a space permission from a user or group
    pub async fn revoke(
        &self,
        space_key: &str,
        slug: &str,
        principal: &ResourceId,
    ) -> Result<RateLimitVerdict> {
        let (verb, noun) = split_entitlement_slug(slug)?;
        let verdict = self
            .client
            .remove_space_permission(
                space_key,
                verb,
                noun,
                &principal.id,
                principal.kind.as_str(),
            )
            .await?;
        info!(space_key, slug, principal = %principal, "revoked space permission");
        Ok(verdict)
    }
}

/// Map a permission row to a grant. Rows held by principals that are not
/// users or groups (e.g. roles) are skipped.
fn permission_grant(space: &ResourceId, permission: &SpacePermission) -> Option<GrantRecord> {
    let kind = match permission.principal.principal_type.as_str() {
        "user" => ResourceKind::User,
        "group" => ResourceKind::Group,
        other => {
            warn!(
                principal_type = other,
                space = %space,
                "skipping permission held by unsupported principal type"
            );
            return None;
        }
    };
    Some(GrantRecord {
        resource: space.clone(),
        entitlement: entitlement_slug(
            &permission.operation.key,
            &permission.operation.target_type,
        ),
        principal: ResourceId::new(kind, permission.principal.id.clone()),
    })
}

#[async_trait]
impl ResourceSyncer for SpaceSyncer {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Space
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> Result<ListPage<EntityRecord>> {
        let (spaces, next, verdict) = self
            .client
            .get_spaces(&token.token, token.effective_size())
            .await?;

        let records = spaces
            .into_iter()
            .filter(|space| !(self.skip_personal_spaces && space.is_personal()))
            .map(|space| {
                let mut record = EntityRecord::new(
                    ResourceId::new(ResourceKind::Space, space.id),
                    space.name.clone(),
                );
                record.profile.insert("key".into(), space.key.into());
                record.profile.insert("name".into(), space.name.into());
                record
                    .profile
                    .insert("type".into(), space.space_type.into());
                record
            })
            .collect();

        Ok(ListPage {
            records,
            next_token: next,
            rate_limit: Some(verdict),
        })
    }

    async fn entitlements(
        &self,
        resource: &ResourceId,
        _token: &PageToken,
    ) -> Result<ListPage<EntitlementRecord>> {
        let mut records = Vec::with_capacity(self.verbs.len() * self.nouns.len());
        for verb in &self.verbs {
            for noun in &self.nouns {
                records.push(EntitlementRecord {
                    resource: resource.clone(),
                    slug: entitlement_slug(verb, noun),
                    display_name: format!("{verb} {noun}"),
                    description: format!("Can {verb} {noun} in the space"),
                });
            }
        }
        Ok(ListPage {
            records,
            next_token: String::new(),
            rate_limit: None,
        })
    }

    async fn grants(
        &self,
        resource: &ResourceId,
        token: &PageToken,
    ) -> Result<ListPage<GrantRecord>> {
        let (permissions, next, verdict) = self
            .client
            .get_space_permissions(&resource.id, &token.token, token.effective_size())
            .await?;

        let records = permissions
            .iter()
            .filter_map(|permission| permission_grant(resource, permission))
            .collect();

        Ok(ListPage {
            records,
            next_token: next,
            rate_limit: Some(verdict),
        })
    }
}
