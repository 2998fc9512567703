//! Environment resource helpers
//!
//! Convenience layer over [`ResourceClient`] for the Environment kind:
//! listing in promotion order and the default environments created by
//! `jx install`.

use kube::Client;

use super::KubeError;
use super::api::ResourceClient;
use super::names::to_valid_name;
use super::resources::{EnvironmentSpec, PromotionStrategy};

/// Environment CRUD scoped to the team namespace
pub struct Environments {
    client: ResourceClient<EnvironmentSpec>,
}

impl Environments {
    /// Creates a helper scoped to the team namespace
    #[must_use]
    pub fn new(client: Client, team_namespace: &str) -> Self {
        Self {
            client: ResourceClient::new(client, team_namespace),
        }
    }

    /// Applies an environment under its sanitized name
    ///
    /// # Errors
    ///
    /// Returns an error when the API call fails.
    pub async fn ensure(&self, name: &str, spec: &EnvironmentSpec) -> Result<String, KubeError> {
        let name = to_valid_name(name);
        self.client.apply(&name, spec).await?;
        Ok(name)
    }

    /// Fetches one environment by name
    ///
    /// # Errors
    ///
    /// Returns [`KubeError::NotFound`] when no such environment exists.
    pub async fn get(&self, name: &str) -> Result<EnvironmentSpec, KubeError> {
        self.client.get(&to_valid_name(name)).await
    }

    /// Lists environments sorted by promotion order, then name
    ///
    /// # Errors
    ///
    /// Returns an error when the API call fails.
    pub async fn list(&self) -> Result<Vec<(String, EnvironmentSpec)>, KubeError> {
        let mut envs = self.client.list().await?;
        envs.sort_by(|(a_name, a), (b_name, b)| {
            a.order.cmp(&b.order).then_with(|| a_name.cmp(b_name))
        });
        Ok(envs)
    }

    /// Deletes one environment by name
    ///
    /// # Errors
    ///
    /// Returns [`KubeError::NotFound`] when no such environment exists.
    pub async fn delete(&self, name: &str) -> Result<(), KubeError> {
        self.client.delete(&to_valid_name(name)).await
    }
}

/// The environments `jx install` creates in a fresh cluster
#[must_use]
pub fn default_environments(namespace_prefix: &str) -> Vec<(String, EnvironmentSpec)> {
    vec![
        (
            "dev".to_string(),
            EnvironmentSpec {
                label: "Development".to_string(),
                namespace: namespace_prefix.to_string(),
                order: 0,
                promotion_strategy: PromotionStrategy::Never,
                source: None,
            },
        ),
        (
            "staging".to_string(),
            EnvironmentSpec {
                label: "Staging".to_string(),
                namespace: format!("{namespace_prefix}-staging"),
                order: 100,
                promotion_strategy: PromotionStrategy::Auto,
                source: None,
            },
        ),
        (
            "production".to_string(),
            EnvironmentSpec {
                label: "Production".to_string(),
                namespace: format!("{namespace_prefix}-production"),
                order: 200,
                promotion_strategy: PromotionStrategy::Manual,
                source: None,
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_environments() {
        let envs = default_environments("jx");
        assert_eq!(envs.len(), 3);
        assert_eq!(envs[0].0, "dev");
        assert_eq!(envs[0].1.promotion_strategy, PromotionStrategy::Never);
        assert_eq!(envs[1].1.namespace, "jx-staging");
        assert_eq!(envs[2].1.order, 200);
        assert_eq!(envs[2].1.promotion_strategy, PromotionStrategy::Manual);
    }

    #[test]
    fn test_default_environments_are_ordered() {
        let envs = default_environments("jx");
        let orders: Vec<i32> = envs.iter().map(|(_, e)| e.order).collect();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        assert_eq!(orders, sorted);
    }
}
