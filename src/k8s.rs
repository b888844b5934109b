use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::api::{ListParams, LogParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

use crate::config::DisplayConfig;

/// Read-only view of the cluster used to populate the four tables. Results are
/// plain display names in the order they should be listed.
#[allow(async_fn_in_trait)]
pub trait ResourceProvider {
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<String>>;

    /// Empty when `pod` is empty.
    async fn list_containers(&self, namespace: &str, pod: &str) -> Result<Vec<String>>;

    /// Empty when `container` is empty.
    async fn list_log_lines(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
    ) -> Result<Vec<String>>;
}

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    context: String,
    cluster: String,
    default_namespace: String,
    tail_lines: Option<i64>,
    timestamps: bool,
}

impl KubeGateway {
    pub async fn new(context: Option<String>, config: &DisplayConfig) -> Result<Self> {
        let kubeconfig = Kubeconfig::read().ok();

        let kube_config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .context("failed to infer Kubernetes configuration")?
        } else {
            if context.is_some() {
                anyhow::bail!("kubeconfig not found; --context is unavailable in this environment");
            }
            Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?
        };

        let cluster = kube_config.cluster_url.to_string();
        let default_namespace = kube_config.default_namespace.clone();
        let client =
            Client::try_from(kube_config).context("failed to initialize Kubernetes client")?;

        let active_context = context
            .or_else(|| {
                kubeconfig
                    .as_ref()
                    .and_then(|cfg| cfg.current_context.clone())
            })
            .unwrap_or_else(|| "in-cluster".to_string());

        Ok(Self {
            client,
            context: active_context,
            cluster,
            default_namespace,
            tail_lines: config.tail_lines,
            timestamps: config.timestamps,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }
}

impl ResourceProvider for KubeGateway {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let names = list_all_names(&namespaces)
            .await
            .context("failed to list namespaces")?;
        debug!("listed {} namespaces", names.len());
        Ok(names)
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<String>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let names = list_all_names(&pods)
            .await
            .with_context(|| format!("failed to list pods in namespace {namespace}"))?;
        debug!("listed {} pods in {namespace}", names.len());
        Ok(names)
    }

    async fn list_containers(&self, namespace: &str, pod_name: &str) -> Result<Vec<String>> {
        if pod_name.is_empty() {
            return Ok(Vec::new());
        }

        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod = pods
            .get(pod_name)
            .await
            .with_context(|| format!("failed to fetch pod {namespace}/{pod_name}"))?;

        Ok(pod_container_names(&pod))
    }

    async fn list_log_lines(
        &self,
        namespace: &str,
        pod_name: &str,
        container: &str,
    ) -> Result<Vec<String>> {
        if container.is_empty() {
            return Ok(Vec::new());
        }

        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container: Some(container.to_string()),
            tail_lines: self.tail_lines,
            timestamps: self.timestamps,
            ..LogParams::default()
        };

        let logs = pods.logs(pod_name, &params).await.with_context(|| {
            format!("failed to load logs for {namespace}/{pod_name}:{container}")
        })?;

        Ok(split_log_lines(&logs))
    }
}

/// Regular containers in declared order, then init containers.
fn pod_container_names(pod: &Pod) -> Vec<String> {
    let Some(spec) = pod.spec.as_ref() else {
        return Vec::new();
    };

    spec.containers
        .iter()
        .map(|container| container.name.clone())
        .chain(
            spec.init_containers
                .as_ref()
                .into_iter()
                .flatten()
                .map(|container| container.name.clone()),
        )
        .collect()
}

fn split_log_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// Lists every object behind `api`, following continue tokens page by page,
/// and returns the names sorted.
async fn list_all_names<K>(api: &Api<K>) -> kube::Result<Vec<String>>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    let mut names = Vec::new();
    let mut params = list_params(None);
    loop {
        let page = api.list(&params).await?;
        names.extend(page.items.iter().map(|item| item.name_any()));
        match next_page_token(&page.metadata) {
            Some(token) => params = list_params(Some(&token)),
            None => break,
        }
    }
    names.sort();
    Ok(names)
}

/// The server marks the last page with a missing or empty continue token.
fn next_page_token(metadata: &ListMeta) -> Option<String> {
    metadata
        .continue_
        .as_deref()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn list_params(continue_token: Option<&str>) -> ListParams {
    let params = ListParams::default().limit(500);
    match continue_token {
        Some(token) => params.continue_token(token),
        None => params,
    }
}
