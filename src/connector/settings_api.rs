// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index settings for Connector
//!
//! Attribute lists are synced rather than blindly overwritten: the current
//! value is fetched first and an update task is only enqueued on a
//! difference. Filterable, searchable and sortable attributes compare as
//! sets; ranking rules compare in order.

use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

use crate::error::ConnectorError;
use crate::settings::IndexSettings;
use crate::tasks::{PollConfig, Task};
use crate::transport::Method;

use super::Connector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListSetting {
    Filterable,
    Searchable,
    Sortable,
    RankingRules,
}

impl ListSetting {
    fn path(self) -> &'static str {
        match self {
            Self::Filterable => "filterable-attributes",
            Self::Searchable => "searchable-attributes",
            Self::Sortable => "sortable-attributes",
            Self::RankingRules => "ranking-rules",
        }
    }

    /// An empty searchable list means every attribute, which the engine
    /// reports as `["*"]`.
    fn normalize(self, values: &[String]) -> Vec<String> {
        if self == Self::Searchable && values.is_empty() {
            return vec!["*".to_string()];
        }
        values.to_vec()
    }

    fn same(self, current: &[String], desired: &[String]) -> bool {
        if self == Self::RankingRules {
            return current == desired;
        }
        let current: BTreeSet<&str> = current.iter().map(String::as_str).collect();
        let desired: BTreeSet<&str> = desired.iter().map(String::as_str).collect();
        current == desired
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginationSettings {
    max_total_hits: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacetingSettings {
    max_values_per_facet: u64,
}

impl Connector {
    // ═══════════════════════════════════════════════════════════════════════════
    // Settings API
    // ═══════════════════════════════════════════════════════════════════════════

    pub async fn get_filterable_attributes(&self, index: &str) -> Result<Vec<String>, ConnectorError> {
        self.get_list_setting(index, ListSetting::Filterable).await
    }

    pub async fn update_filterable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<Task, ConnectorError> {
        self.update_list_setting(index, ListSetting::Filterable, attributes)
            .await
    }

    /// `None` when the index already has exactly these attributes.
    pub async fn sync_filterable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<Option<Task>, ConnectorError> {
        self.sync_list_setting(index, ListSetting::Filterable, attributes)
            .await
    }

    pub async fn get_searchable_attributes(&self, index: &str) -> Result<Vec<String>, ConnectorError> {
        self.get_list_setting(index, ListSetting::Searchable).await
    }

    pub async fn update_searchable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<Task, ConnectorError> {
        self.update_list_setting(index, ListSetting::Searchable, attributes)
            .await
    }

    pub async fn sync_searchable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<Option<Task>, ConnectorError> {
        self.sync_list_setting(index, ListSetting::Searchable, attributes)
            .await
    }

    pub async fn get_sortable_attributes(&self, index: &str) -> Result<Vec<String>, ConnectorError> {
        self.get_list_setting(index, ListSetting::Sortable).await
    }

    pub async fn update_sortable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<Task, ConnectorError> {
        self.update_list_setting(index, ListSetting::Sortable, attributes)
            .await
    }

    pub async fn sync_sortable_attributes(
        &self,
        index: &str,
        attributes: &[String],
    ) -> Result<Option<Task>, ConnectorError> {
        self.sync_list_setting(index, ListSetting::Sortable, attributes)
            .await
    }

    pub async fn get_ranking_rules(&self, index: &str) -> Result<Vec<String>, ConnectorError> {
        self.get_list_setting(index, ListSetting::RankingRules).await
    }

    pub async fn update_ranking_rules(
        &self,
        index: &str,
        rules: &[String],
    ) -> Result<Task, ConnectorError> {
        self.update_list_setting(index, ListSetting::RankingRules, rules)
            .await
    }

    /// Order matters: `["sort", "words"]` differs from `["words", "sort"]`.
    pub async fn sync_ranking_rules(
        &self,
        index: &str,
        rules: &[String],
    ) -> Result<Option<Task>, ConnectorError> {
        self.sync_list_setting(index, ListSetting::RankingRules, rules)
            .await
    }

    pub async fn get_max_total_hits(&self, index: &str) -> Result<u64, ConnectorError> {
        let settings: PaginationSettings = self
            .get_json("get_settings", format!("indexes/{}/settings/pagination", index))
            .await?;
        Ok(settings.max_total_hits)
    }

    pub async fn set_max_total_hits(&self, index: &str, max_total_hits: u64) -> Result<Task, ConnectorError> {
        self.enqueue(
            "update_settings",
            Method::Patch,
            format!("indexes/{}/settings/pagination", index),
            Some(json!({ "maxTotalHits": max_total_hits })),
        )
        .await
    }

    pub async fn get_max_values_per_facet(&self, index: &str) -> Result<u64, ConnectorError> {
        let settings: FacetingSettings = self
            .get_json("get_settings", format!("indexes/{}/settings/faceting", index))
            .await?;
        Ok(settings.max_values_per_facet)
    }

    pub async fn set_max_values_per_facet(
        &self,
        index: &str,
        max_values_per_facet: u64,
    ) -> Result<Task, ConnectorError> {
        self.enqueue(
            "update_settings",
            Method::Patch,
            format!("indexes/{}/settings/faceting", index),
            Some(json!({ "maxValuesPerFacet": max_values_per_facet })),
        )
        .await
    }

    /// Bring `index` in line with `settings`, creating it when missing.
    ///
    /// Only differing settings are written. Each enqueued task is awaited
    /// with `poll` before the next one is sent; the finished tasks are
    /// returned in order. An index that already matches yields no tasks.
    #[instrument(skip(self, settings, poll))]
    pub async fn apply_index_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
        poll: &PollConfig,
    ) -> Result<Vec<Task>, ConnectorError> {
        let mut tasks = Vec::new();

        if !self.index_exists(index).await? {
            let created = self.create_index(index, &settings.primary_key).await?;
            tasks.push(self.wait_for_task_with(created, poll).await?);
        }

        let lists = [
            (ListSetting::Filterable, &settings.filters),
            (ListSetting::Searchable, &settings.search),
            (ListSetting::Sortable, &settings.sortable),
            (ListSetting::RankingRules, &settings.ranking),
        ];
        for (setting, desired) in lists {
            if let Some(task) = self.sync_list_setting(index, setting, desired).await? {
                tasks.push(self.wait_for_task_with(task, poll).await?);
            }
        }

        if self.get_max_total_hits(index).await? != settings.max_total_hits {
            let task = self.set_max_total_hits(index, settings.max_total_hits).await?;
            tasks.push(self.wait_for_task_with(task, poll).await?);
        }
        if self.get_max_values_per_facet(index).await? != settings.max_values_per_facet {
            let task = self
                .set_max_values_per_facet(index, settings.max_values_per_facet)
                .await?;
            tasks.push(self.wait_for_task_with(task, poll).await?);
        }

        info!(changes = tasks.len(), "Index settings applied");
        Ok(tasks)
    }

    async fn get_list_setting(
        &self,
        index: &str,
        setting: ListSetting,
    ) -> Result<Vec<String>, ConnectorError> {
        self.get_json("get_settings", format!("indexes/{}/settings/{}", index, setting.path()))
            .await
    }

    async fn update_list_setting(
        &self,
        index: &str,
        setting: ListSetting,
        values: &[String],
    ) -> Result<Task, ConnectorError> {
        self.enqueue(
            "update_settings",
            Method::Put,
            format!("indexes/{}/settings/{}", index, setting.path()),
            Some(json!(setting.normalize(values))),
        )
        .await
    }

    async fn sync_list_setting(
        &self,
        index: &str,
        setting: ListSetting,
        desired: &[String],
    ) -> Result<Option<Task>, ConnectorError> {
        let desired = setting.normalize(desired);
        let current = self.get_list_setting(index, setting).await?;
        if setting.same(&current, &desired) {
            debug!(setting = setting.path(), "Setting already up to date");
            return Ok(None);
        }
        info!(setting = setting.path(), ?current, ?desired, "Updating setting");
        self.update_list_setting(index, setting, &desired).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::ListSetting;
    use crate::config::ConnectorConfig;
    use crate::connector::tests::scripted;
    use crate::settings::IndexSettings;
    use crate::tasks::PollConfig;
    use crate::transport::Method;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn enqueued(uid: u64) -> serde_json::Value {
        json!({"taskUid": uid, "indexUid": "products", "status": "enqueued", "type": "settingsUpdate"})
    }

    fn succeeded(uid: u64) -> serde_json::Value {
        json!({"uid": uid, "indexUid": "products", "status": "succeeded", "type": "settingsUpdate"})
    }

    #[test]
    fn test_set_and_sequence_comparison() {
        assert!(ListSetting::Filterable.same(&strings(&["a", "b"]), &strings(&["b", "a"])));
        assert!(ListSetting::Sortable.same(&strings(&["a", "a"]), &strings(&["a"])));
        assert!(!ListSetting::Searchable.same(&strings(&["a"]), &strings(&["a", "b"])));
        assert!(!ListSetting::RankingRules.same(
            &strings(&["words", "sort"]),
            &strings(&["sort", "words"])
        ));
        assert!(ListSetting::RankingRules.same(&strings(&["words"]), &strings(&["words"])));
    }

    #[test]
    fn test_empty_searchable_means_all() {
        assert_eq!(ListSetting::Searchable.normalize(&[]), strings(&["*"]));
        assert!(ListSetting::Filterable.normalize(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_sync_is_noop_when_equal_as_sets() {
        let (connector, transport) = scripted(ConnectorConfig::default());
        transport.respond_ok(json!(["color", "brand"]));

        let task = connector
            .sync_filterable_attributes("products", &strings(&["brand", "color"]))
            .await
            .unwrap();

        assert!(task.is_none());
        assert_eq!(transport.request_count(), 1);
        assert_eq!(
            transport.requests()[0].path,
            "indexes/products/settings/filterable-attributes"
        );
    }

    #[tokio::test]
    async fn test_sync_updates_on_difference() {
        let (connector, transport) = scripted(ConnectorConfig::default());
        transport
            .respond_ok(json!(["brand"]))
            .respond(202, enqueued(11));

        let task = connector
            .sync_sortable_attributes("products", &strings(&["brand", "price"]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(task.uid, 11);
        let update = &transport.requests()[1];
        assert_eq!(update.method, Method::Put);
        assert_eq!(update.path, "indexes/products/settings/sortable-attributes");
        assert_eq!(update.body, Some(json!(["brand", "price"])));
    }

    #[tokio::test]
    async fn test_ranking_rules_reordered_triggers_update() {
        let (connector, transport) = scripted(ConnectorConfig::default());
        transport
            .respond_ok(json!(["words", "sort"]))
            .respond(202, enqueued(12));

        let task = connector
            .sync_ranking_rules("products", &strings(&["sort", "words"]))
            .await
            .unwrap();
        assert!(task.is_some());
    }

    #[tokio::test]
    async fn test_max_values_per_facet_patch() {
        let (connector, transport) = scripted(ConnectorConfig::default());
        transport.respond(202, enqueued(13));

        connector.set_max_values_per_facet("products", 250).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.path, "indexes/products/settings/faceting");
        assert_eq!(request.body, Some(json!({"maxValuesPerFacet": 250})));
    }

    #[tokio::test]
    async fn test_apply_settings_to_matching_index_writes_nothing() {
        let (connector, transport) = scripted(ConnectorConfig::default());
        let settings = IndexSettings::default().with_filters(["brand"]);
        transport
            .respond_ok(json!({"uid": "products", "primaryKey": "id"}))
            .respond_ok(json!(["brand"]))
            .respond_ok(json!(["*"]))
            .respond_ok(json!([]))
            .respond_ok(json!(settings.ranking))
            .respond_ok(json!({"maxTotalHits": 10000}))
            .respond_ok(json!({"maxValuesPerFacet": 1000}));

        let tasks = connector
            .apply_index_settings("products", &settings, &PollConfig::test())
            .await
            .unwrap();

        assert!(tasks.is_empty());
        assert!(transport.requests().iter().all(|r| r.method == Method::Get));
    }

    #[tokio::test]
    async fn test_apply_settings_creates_missing_index() {
        let (connector, transport) = scripted(ConnectorConfig::default());
        let settings = IndexSettings::default()
            .with_primary_key("sku")
            .with_sortable(["price"]);
        transport
            .respond(404, json!({"code": "index_not_found", "message": "Index `products` not found."}))
            .respond(202, enqueued(1))
            .respond_ok(succeeded(1))
            .respond_ok(json!([]))
            .respond_ok(json!(["*"]))
            .respond_ok(json!([]))
            .respond(202, enqueued(2))
            .respond_ok(succeeded(2))
            .respond_ok(json!(settings.ranking))
            .respond_ok(json!({"maxTotalHits": 1000}))
            .respond(202, enqueued(3))
            .respond_ok(succeeded(3))
            .respond_ok(json!({"maxValuesPerFacet": 1000}));

        let tasks = connector
            .apply_index_settings("products", &settings, &PollConfig::test())
            .await
            .unwrap();

        let uids: Vec<u64> = tasks.iter().map(|t| t.uid).collect();
        assert_eq!(uids, vec![1, 2, 3]);
        assert_eq!(transport.remaining(), 0);

        let requests = transport.requests();
        assert_eq!(requests[1].body, Some(json!({"uid": "products", "primaryKey": "sku"})));
        assert_eq!(requests[6].body, Some(json!(["price"])));
        assert_eq!(requests[10].body, Some(json!({"maxTotalHits": 10000})));
    }
}
