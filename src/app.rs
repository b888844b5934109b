use anyhow::Result;
use tracing::{debug, info};

use crate::config::DisplayConfig;
use crate::input::Action;
use crate::k8s::ResourceProvider;
use crate::model::{NavLevel, ResourceTable};
use crate::wrap::wrap_text;

/// Navigation session: which level is focused, what was picked at each level,
/// and the four tables backing the panes.
pub struct App {
    running: bool,
    level: NavLevel,
    selected_namespace: String,
    selected_pod: String,
    selected_container: String,
    selected_log_line: String,
    namespace_table: ResourceTable,
    pods_table: ResourceTable,
    containers_table: ResourceTable,
    logs_table: ResourceTable,
    status: String,
    config: DisplayConfig,
}

impl App {
    /// Builds the session with every table fetched up front. Pods are listed for
    /// `namespace`; containers and logs start as placeholders because nothing
    /// has been picked yet.
    pub async fn bootstrap<P: ResourceProvider>(
        provider: &P,
        namespace: impl Into<String>,
        config: &DisplayConfig,
    ) -> Result<Self> {
        let mut app = Self {
            running: true,
            level: NavLevel::Namespaces,
            selected_namespace: namespace.into(),
            selected_pod: String::new(),
            selected_container: String::new(),
            selected_log_line: String::new(),
            namespace_table: ResourceTable::placeholder(
                NavLevel::Namespaces.title(),
                config.namespace_width,
            ),
            pods_table: ResourceTable::placeholder(NavLevel::Pods.title(), config.pod_width),
            containers_table: ResourceTable::placeholder(
                NavLevel::Containers.title(),
                config.container_width,
            ),
            logs_table: ResourceTable::placeholder(NavLevel::Logs.title(), config.log_width),
            status: "Ready".to_string(),
            config: config.clone(),
        };

        app.reload_namespaces(provider).await?;
        app.reload_pods(provider).await?;
        app.reload_containers(provider).await?;
        app.reload_logs(provider).await?;
        app.status = format!(
            "{} namespaces, {} pods in {}",
            app.namespace_table.item_count(),
            app.pods_table.item_count(),
            app.selected_namespace
        );
        Ok(app)
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn level(&self) -> NavLevel {
        self.level
    }

    pub fn selected_namespace(&self) -> &str {
        &self.selected_namespace
    }

    pub fn selected_pod(&self) -> &str {
        &self.selected_pod
    }

    pub fn selected_container(&self) -> &str {
        &self.selected_container
    }

    pub fn selected_log_line(&self) -> &str {
        &self.selected_log_line
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn table(&self, level: NavLevel) -> &ResourceTable {
        match level {
            NavLevel::Namespaces => &self.namespace_table,
            NavLevel::Pods => &self.pods_table,
            NavLevel::Containers => &self.containers_table,
            NavLevel::Logs => &self.logs_table,
        }
    }

    pub fn table_mut(&mut self, level: NavLevel) -> &mut ResourceTable {
        match level {
            NavLevel::Namespaces => &mut self.namespace_table,
            NavLevel::Pods => &mut self.pods_table,
            NavLevel::Containers => &mut self.containers_table,
            NavLevel::Logs => &mut self.logs_table,
        }
    }

    /// Applies one key action to completion. Any fetch it triggers is awaited
    /// here, and the action is then forwarded to the table focused afterwards
    /// for cursor movement. A provider error ends the session.
    pub async fn apply_action<P: ResourceProvider>(
        &mut self,
        action: Action,
        provider: &P,
    ) -> Result<()> {
        debug!("level={} action={action:?}", self.level);
        match action {
            Action::Back => self.step_back(),
            Action::CycleFocus => self.level = self.level.paired(),
            Action::Reload => self.reload_current(provider).await?,
            Action::Select => self.select(provider).await?,
            _ => {}
        }

        if self.running {
            let level = self.level;
            self.table_mut(level).handle_action(action);
        }
        Ok(())
    }

    fn step_back(&mut self) {
        if self.level.is_drilled() {
            self.selected_log_line.clear();
            self.selected_container.clear();
            self.logs_table = ResourceTable::placeholder("Logs: ", self.config.log_width);
            self.level = NavLevel::Pods;
            self.status = format!("Back to pods in {}", self.selected_namespace);
        } else {
            info!("exit requested");
            self.running = false;
            self.status = "Exit requested".to_string();
        }
    }

    async fn select<P: ResourceProvider>(&mut self, provider: &P) -> Result<()> {
        match self.level {
            NavLevel::Namespaces => {
                if !self.namespace_table.has_selection() {
                    self.status = "No namespace selected".to_string();
                    return Ok(());
                }
                let namespace = self.namespace_table.selected_row().to_string();
                let rows = provider.list_pods(&namespace).await?;
                self.selected_namespace = namespace;
                self.pods_table = self.build_pods_table(rows);

                // Nothing below the new namespace has been picked yet.
                self.selected_pod.clear();
                self.selected_container.clear();
                self.selected_log_line.clear();
                self.containers_table = self.build_containers_table(Vec::new());
                self.logs_table = self.build_logs_table(Vec::new());
                self.level = NavLevel::Pods;
                self.status = format!(
                    "Loaded {} pods in {}",
                    self.pods_table.item_count(),
                    self.selected_namespace
                );
            }
            NavLevel::Pods => {
                if !self.pods_table.has_selection() {
                    self.status = "No pod selected".to_string();
                    return Ok(());
                }
                self.selected_pod = self.pods_table.selected_row().to_string();
                self.reload_containers(provider).await?;

                // Preload the first container so single-container pods need
                // no second keystroke.
                self.selected_container = self.containers_table.selected_row().to_string();
                self.reload_logs(provider).await?;
                self.logs_table.scroll_to_bottom();

                if !self.selected_pod.is_empty() {
                    self.level = NavLevel::Containers;
                }
                self.status = format!(
                    "Loaded {} containers for {}/{}",
                    self.containers_table.item_count(),
                    self.selected_namespace,
                    self.selected_pod
                );
            }
            NavLevel::Containers => {
                self.selected_container = self.containers_table.selected_row().to_string();
                self.reload_logs(provider).await?;
                self.logs_table.scroll_to_bottom();
                if self.selected_container.is_empty() {
                    self.status = "No container selected".to_string();
                } else {
                    self.level = NavLevel::Logs;
                    self.status = format!(
                        "Loaded {} log lines for {}",
                        self.logs_table.item_count(),
                        self.selected_container
                    );
                }
            }
            NavLevel::Logs => {
                self.selected_log_line =
                    wrap_text(self.logs_table.selected_row(), self.config.detail_width);
            }
        }
        Ok(())
    }

    async fn reload_current<P: ResourceProvider>(&mut self, provider: &P) -> Result<()> {
        match self.level {
            NavLevel::Namespaces => self.reload_namespaces(provider).await?,
            NavLevel::Pods => self.reload_pods(provider).await?,
            NavLevel::Containers => self.reload_containers(provider).await?,
            NavLevel::Logs => {
                self.reload_logs(provider).await?;
                self.logs_table.scroll_to_bottom();
            }
        }
        self.status = format!(
            "Reloaded {} ({})",
            self.level,
            self.table(self.level).item_count()
        );
        Ok(())
    }

    async fn reload_namespaces<P: ResourceProvider>(&mut self, provider: &P) -> Result<()> {
        let rows = provider.list_namespaces().await?;
        self.namespace_table = ResourceTable::new(
            NavLevel::Namespaces.title(),
            self.config.namespace_width,
            rows,
        );
        Ok(())
    }

    async fn reload_pods<P: ResourceProvider>(&mut self, provider: &P) -> Result<()> {
        let rows = provider.list_pods(&self.selected_namespace).await?;
        self.pods_table = self.build_pods_table(rows);
        Ok(())
    }

    fn build_pods_table(&self, rows: Vec<String>) -> ResourceTable {
        ResourceTable::new(
            format!("Pods: {}", self.selected_namespace),
            self.config.pod_width,
            rows,
        )
    }

    async fn reload_containers<P: ResourceProvider>(&mut self, provider: &P) -> Result<()> {
        let rows = provider
            .list_containers(&self.selected_namespace, &self.selected_pod)
            .await?;
        self.containers_table = self.build_containers_table(rows);
        Ok(())
    }

    fn build_containers_table(&self, rows: Vec<String>) -> ResourceTable {
        ResourceTable::new(
            format!("Containers: {}/{}", self.selected_namespace, self.selected_pod),
            self.config.container_width,
            rows,
        )
    }

    async fn reload_logs<P: ResourceProvider>(&mut self, provider: &P) -> Result<()> {
        let rows = provider
            .list_log_lines(
                &self.selected_namespace,
                &self.selected_pod,
                &self.selected_container,
            )
            .await?;
        self.logs_table = self.build_logs_table(rows);
        Ok(())
    }

    fn build_logs_table(&self, rows: Vec<String>) -> ResourceTable {
        ResourceTable::new(
            format!("Logs: {} - {}", self.selected_pod, self.selected_container),
            self.config.log_width,
            rows,
        )
    }
}
