//! Module collector

use super::{empty_if_not_found, EntityCollector};
use crate::adapters::canvas::models::{ApiModule, ApiModuleItem};
use crate::adapters::canvas::{CanvasGateway, QueryParams};
use crate::core::profile::CollectionProfile;
use crate::domain::{CourseId, Result};
use async_trait::async_trait;

/// `GET /courses/:id/modules?include[]=items`
///
/// Canvas leaves `items` out for large modules; those are completed with a
/// paginated `modules/:id/items` call each. Every returned module has
/// `items` set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleCollector;

impl ModuleCollector {
    pub fn params(profile: &CollectionProfile) -> QueryParams {
        let mut params = QueryParams::new();
        if profile.processing.enrich_with_timestamps {
            params.push_many("include", ["items", "content_details"]);
        } else {
            params.push_many("include", ["items"]);
        }
        params
    }

    pub fn item_params(profile: &CollectionProfile) -> QueryParams {
        let mut params = QueryParams::new();
        if profile.processing.enrich_with_timestamps {
            params.push_many("include", ["content_details"]);
        }
        params
    }
}

#[async_trait]
impl EntityCollector for ModuleCollector {
    type Output = Vec<ApiModule>;

    fn category(&self) -> &'static str {
        "modules"
    }

    fn is_enabled(&self, profile: &CollectionProfile) -> bool {
        profile.collects_modules()
    }

    async fn fetch(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
        profile: &CollectionProfile,
    ) -> Result<Self::Output> {
        let endpoint = format!("courses/{course_id}/modules");
        let mut modules: Vec<ApiModule> = empty_if_not_found(
            gateway.collect_all_as(&endpoint, &Self::params(profile)).await,
            course_id,
            &endpoint,
        )?;

        let mut item_calls = 0;
        for module in &mut modules {
            if module.needs_item_fetch() {
                let items_endpoint = format!("{endpoint}/{}/items", module.id);
                let items: Vec<ApiModuleItem> = empty_if_not_found(
                    gateway
                        .collect_all_as(&items_endpoint, &Self::item_params(profile))
                        .await,
                    course_id,
                    &items_endpoint,
                )?;
                item_calls += 1;
                module.items = Some(items);
            } else if module.items.is_none() {
                module.items = Some(Vec::new());
            }
        }

        modules.sort_by_key(|m| (m.position.unwrap_or(u32::MAX), m.id));

        tracing::debug!(
            course_id = %course_id,
            modules = modules.len(),
            item_listings = item_calls,
            "Fetched modules"
        );
        Ok(modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::ProfilePreset;

    #[test]
    fn test_content_details_only_when_enriching() {
        let full = ProfilePreset::Full.profile();
        assert_eq!(
            ModuleCollector::params(&full).get_all("include"),
            vec!["items", "content_details"]
        );

        let light = ProfilePreset::Lightweight.profile();
        assert_eq!(ModuleCollector::params(&light).get_all("include"), vec!["items"]);
        assert!(ModuleCollector::item_params(&light).is_empty());
    }
}
