//! Kubernetes API plumbing
//!
//! Client construction, a transient-error retry policy and a small
//! typed layer over the dynamic API for the platform's custom
//! resources. Objects are written with server-side apply under the
//! `jx` field manager, so repeated invocations converge instead of
//! conflicting.

use std::future::Future;
use std::marker::PhantomData;
use std::path::Path;
use std::time::Duration;

use kube::api::{Api, DeleteParams, DynamicObject, ListParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use super::KubeError;
use super::resources::{JxResource, spec_of, to_object};

/// Field manager used for server-side apply
const FIELD_MANAGER: &str = "jx";

/// Maximum attempts for a transient-failure retry
const MAX_ATTEMPTS: u32 = 5;
/// First backoff wait; doubles per attempt
const INITIAL_BACKOFF: Duration = Duration::from_millis(200);
/// Upper bound for the backoff wait
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Creates a Kubernetes client
///
/// An explicit kubeconfig path wins; otherwise the ambient
/// configuration is used (`KUBECONFIG`, `~/.kube/config`, or in-cluster
/// service account).
///
/// # Errors
///
/// Returns an error when no configuration can be loaded or the client
/// cannot be constructed from it.
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, KubeError> {
    match kubeconfig {
        Some(path) => {
            tracing::debug!("Using kubeconfig: {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path)?;
            let config =
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
            Ok(Client::try_from(config)?)
        }
        None => Ok(Client::try_default().await?),
    }
}

/// Determines if a Kubernetes error is retryable
fn is_retryable(error: &kube::Error) -> bool {
    match error {
        kube::Error::Api(api_err) => {
            matches!(api_err.code, 408 | 429 | 500 | 502 | 503 | 504)
        }
        kube::Error::HyperError(_) | kube::Error::Service(_) => true,
        _ => false,
    }
}

/// Runs an operation with capped exponential backoff on transient errors
async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, kube::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, kube::Error>>,
{
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < MAX_ATTEMPTS && is_retryable(&e) => {
                tracing::debug!("Retrying Kubernetes call after attempt {attempt}: {e}");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Typed CRUD over one custom resource kind in one namespace
pub struct ResourceClient<S> {
    api: Api<DynamicObject>,
    namespace: String,
    _spec: PhantomData<fn() -> S>,
}

impl<S: JxResource> ResourceClient<S> {
    /// Creates a client scoped to the given namespace
    #[must_use]
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced_with(client, namespace, &S::api_resource()),
            namespace: namespace.to_string(),
            _spec: PhantomData,
        }
    }

    /// Applies the spec under the given name, creating or updating it
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the API call fails.
    pub async fn apply(&self, name: &str, spec: &S) -> Result<(), KubeError> {
        let obj = to_object(name, &self.namespace, spec)?;
        let api = self.api.clone();
        let name = name.to_string();
        with_retry(move || {
            let api = api.clone();
            let name = name.clone();
            let obj = obj.clone();
            async move {
                let params = PatchParams::apply(FIELD_MANAGER).force();
                api.patch(&name, &params, &Patch::Apply(&obj)).await
            }
        })
        .await?;
        Ok(())
    }

    /// Fetches the spec stored under the given name
    ///
    /// # Errors
    ///
    /// Returns [`KubeError::NotFound`] when the object does not exist.
    pub async fn get(&self, name: &str) -> Result<S, KubeError> {
        let api = self.api.clone();
        let owned = name.to_string();
        let obj = with_retry(move || {
            let api = api.clone();
            let name = owned.clone();
            async move { api.get(&name).await }
        })
        .await
        .map_err(|e| match &e {
            kube::Error::Api(api_err) if api_err.code == 404 => {
                KubeError::NotFound(format!("{} {name}", S::KIND))
            }
            _ => KubeError::from(e),
        })?;
        Ok(spec_of(&obj)?)
    }

    /// Lists all objects of this kind as `(name, spec)` pairs
    ///
    /// Objects whose spec does not decode are skipped with a warning;
    /// one malformed resource must not hide the rest.
    ///
    /// # Errors
    ///
    /// Returns an error when the API call fails.
    pub async fn list(&self) -> Result<Vec<(String, S)>, KubeError> {
        let api = self.api.clone();
        let objects = with_retry(move || {
            let api = api.clone();
            async move { api.list(&ListParams::default()).await }
        })
        .await?;

        let mut result = Vec::with_capacity(objects.items.len());
        for obj in objects.items {
            let name = obj.metadata.name.clone().unwrap_or_default();
            match spec_of::<S>(&obj) {
                Ok(spec) => result.push((name, spec)),
                Err(e) => {
                    tracing::warn!("Skipping malformed {} '{name}': {e}", S::KIND);
                }
            }
        }
        Ok(result)
    }

    /// Deletes the object with the given name
    ///
    /// # Errors
    ///
    /// Returns [`KubeError::NotFound`] when the object does not exist.
    pub async fn delete(&self, name: &str) -> Result<(), KubeError> {
        let api = self.api.clone();
        let owned = name.to_string();
        with_retry(move || {
            let api = api.clone();
            let name = owned.clone();
            async move { api.delete(&name, &DeleteParams::default()).await }
        })
        .await
        .map_err(|e| match &e {
            kube::Error::Api(api_err) if api_err.code == 404 => {
                KubeError::NotFound(format!("{} {name}", S::KIND))
            }
            _ => KubeError::from(e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "test".to_string(),
            reason: "test".to_string(),
            code,
        })
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable(&api_error(429)));
        assert!(is_retryable(&api_error(503)));
        assert!(!is_retryable(&api_error(404)));
        assert!(!is_retryable(&api_error(409)));
        assert!(!is_retryable(&api_error(401)));
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_on_permanent_error() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry(|| {
            calls += 1;
            async { Err(api_error(404)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_with_retry_retries_transient_errors() {
        let mut calls = 0;
        let result = with_retry(|| {
            calls += 1;
            let outcome = if calls < 3 { Err(api_error(503)) } else { Ok(calls) };
            async move { outcome }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }
}
