// src/generator/facade.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{ApiClient, InvocationType, InvokeResponse, LambdaInvoker};
use crate::config::FunctionConfig;
use crate::errors::{Result, SamLocalError};
use crate::events::{EventBus, SubscriptionId, Topic};
use crate::exec::{spawn_process, OutputSink, ProcessHandle, SamCliOptions, SpawnRequest};
use crate::generator::names::NameTable;
use crate::generator::{free_port, GenerateOptions, GeneratorMode, SamInstance, DEFAULT_HOST, DEFAULT_REGION};
use crate::template::{FunctionArgs, RouteEvent, SamTemplate};
use crate::workspace::Workspace;

/// Just below the API gateway integration timeout.
const FUNCTION_TIMEOUT_SECONDS: u32 = 29;

/// One `sam local` instance with its own workspace and template.
///
/// Lifecycle: `generate_functions` → `start` → (requests) → `stop`. After
/// `stop` the workspace is gone and the generator cannot be started again.
#[derive(Debug)]
pub struct SamGenerator {
    mode: GeneratorMode,
    sam_binary: String,
    workspace: Option<Workspace>,
    template: SamTemplate,
    names: NameTable,
    events: Arc<EventBus>,
    process: Option<ProcessHandle>,
    instance: Option<SamInstance>,
    api: Option<ApiClient>,
    lambda: Option<LambdaInvoker>,
}

impl SamGenerator {
    pub fn new(mode: GeneratorMode) -> Result<Self> {
        let workspace = Workspace::new()?;
        info!(%mode, workspace = %workspace.path().display(), "generator created");

        Ok(Self {
            mode,
            sam_binary: "sam".to_string(),
            workspace: Some(workspace),
            template: SamTemplate::new(),
            names: NameTable::new(),
            events: Arc::new(EventBus::new()),
            process: None,
            instance: None,
            api: None,
            lambda: None,
        })
    }

    /// Use `binary` instead of `sam` from `PATH`.
    pub fn with_sam_binary(mut self, binary: impl Into<String>) -> Self {
        self.sam_binary = binary.into();
        self
    }

    pub fn mode(&self) -> GeneratorMode {
        self.mode
    }

    pub fn template(&self) -> &SamTemplate {
        &self.template
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Internal (template) name of the function called `external`.
    pub fn function_name(&self, external: &str) -> Option<&str> {
        self.names.internal(external)
    }

    /// `None` once the generator has been stopped.
    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace.as_ref().map(Workspace::path)
    }

    pub fn instance(&self) -> Option<&SamInstance> {
        self.instance.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.process.as_ref().is_some_and(|p| !p.has_exited())
    }

    fn workspace(&self) -> Result<&Workspace> {
        self.workspace.as_ref().ok_or(SamLocalError::Stopped)
    }

    /// Unpack every function, add it to the template and write `template.yml`.
    pub fn generate_functions(
        &mut self,
        functions: &BTreeMap<String, FunctionConfig>,
        options: &GenerateOptions,
    ) -> Result<PathBuf> {
        crate::config::validate_functions(functions)?;

        let base = match &options.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir()?,
        };

        for (external, function) in functions {
            let archive = if function.filename.is_absolute() {
                function.filename.clone()
            } else {
                base.join(&function.filename)
            };

            let args = FunctionArgs {
                runtime: Some(function.runtime.clone()),
                memory_size: function.memory_size,
                timeout: Some(FUNCTION_TIMEOUT_SECONDS),
                environment: (!function.environment.is_empty())
                    .then(|| function.environment.clone()),
                ..FunctionArgs::new(function.handler.clone())
            };

            let internal = self.add_function_package(
                external,
                &archive,
                options.randomize_function_names,
                args,
            )?;

            if self.mode == GeneratorMode::Sdk && function.has_routes() {
                warn!(function = %external, "routes are only served by start-api; invoke through send_event");
            }

            if function.route.is_some() && function.routes.is_some() {
                warn!(function = %external, "both `route` and `routes` set; using `route`");
            }

            for (route_key, path) in function.route_bindings() {
                let event = RouteEvent::http_api(path, function.effective_method());
                self.template.add_route(&internal, &route_key, event)?;
            }
        }

        self.write_template()
    }

    /// Unpack `archive` for `external` and add its resource.
    ///
    /// `args.handler` is relative to the unpacked directory; it is prefixed
    /// with the internal name. The description defaults to the internal name.
    /// Returns the internal name. The template is not written.
    pub fn add_function_package(
        &mut self,
        external: &str,
        archive: &Path,
        randomize: bool,
        mut args: FunctionArgs,
    ) -> Result<String> {
        self.workspace()?;

        let internal = self.names.assign(external, randomize)?;
        self.workspace()?.unpack(archive, &internal)?;

        args.handler = format!("{internal}/{}", args.handler);
        if args.description.is_none() {
            args.description = Some(internal.clone());
        }
        self.template.add_function(&internal, args);

        debug!(function = %external, internal = %internal, "function package added");
        Ok(internal)
    }

    /// Write the current template into the workspace.
    pub fn write_template(&self) -> Result<PathBuf> {
        let path = self.template.write_to_dir(self.workspace()?.path())?;
        info!(path = %path.display(), functions = self.template.len(), "template written");
        Ok(path)
    }

    /// Spawn `sam local start-api|start-lambda` and wait until it is ready.
    pub async fn start(&mut self, options: SamCliOptions) -> Result<SamInstance> {
        let cwd = self.workspace()?.path().to_path_buf();

        if let Some(process) = &self.process {
            if !process.has_exited() {
                return Err(SamLocalError::AlreadyRunning);
            }
            debug!("previous process has exited; starting a new one");
            self.process = None;
        }

        let port = match options.port {
            Some(port) => port,
            None => free_port()?,
        };
        let host = options.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string());
        let region = options
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let options = SamCliOptions {
            host: Some(host.clone()),
            port: Some(port),
            region: Some(region.clone()),
            ..options
        };

        let mut args = vec!["local".to_string(), self.mode.verb().to_string()];
        args.extend(options.to_args(self.mode));

        let sink: Arc<dyn OutputSink> = self.events.clone();
        let process = spawn_process(SpawnRequest::new(&self.sam_binary, args, cwd), sink).await?;

        let instance = SamInstance {
            endpoint: format!("http://{host}:{port}"),
            host,
            port,
            region,
        };

        match self.mode {
            GeneratorMode::Api => self.api = Some(ApiClient::new(&instance.endpoint)),
            GeneratorMode::Sdk => {
                self.lambda = Some(LambdaInvoker::connect(&instance.endpoint, &instance.region).await)
            }
        }

        info!(mode = %self.mode, endpoint = %instance.endpoint, "sam local is ready");
        self.process = Some(process);
        self.instance = Some(instance.clone());
        Ok(instance)
    }

    /// Kill the process (if any) and remove the workspace.
    ///
    /// The workspace is removed even when killing fails; the first error
    /// encountered is returned.
    pub async fn stop(&mut self) -> Result<()> {
        let mut first_error = None;

        if let Some(process) = self.process.take() {
            match process.kill().await {
                Ok(status) => debug!(?status, "sam local stopped"),
                Err(e) => {
                    warn!(error = %e, "failed to stop sam local");
                    first_error = Some(e);
                }
            }
        }

        self.instance = None;
        self.api = None;
        self.lambda = None;

        if let Some(workspace) = self.workspace.take() {
            if let Err(e) = workspace.destroy() {
                warn!(error = %e, "failed to remove workspace");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Wait for the process to exit by itself. `None` when not running.
    pub async fn wait_for_exit(&self) -> Option<ExitStatus> {
        match &self.process {
            Some(process) => process.wait().await,
            None => None,
        }
    }

    pub fn on<F>(&self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.events.subscribe(topic, callback)
    }

    pub fn off(&self, topic: Topic, id: SubscriptionId) -> bool {
        self.events.unsubscribe(topic, id)
    }

    /// GET `{endpoint}{path}`. API mode only.
    pub async fn send_api_request(
        &self,
        path: &str,
        headers: &[(&str, &str)],
    ) -> Result<reqwest::Response> {
        if self.mode != GeneratorMode::Api {
            return Err(SamLocalError::WrongMode { expected: "api" });
        }
        let client = self.api.as_ref().ok_or(SamLocalError::NotStarted)?;
        client.get(path, headers).await
    }

    /// Invoke the function known externally as `function`. SDK mode only.
    pub async fn send_event(
        &self,
        function: &str,
        invocation_type: InvocationType,
        payload: Vec<u8>,
    ) -> Result<InvokeResponse> {
        if self.mode != GeneratorMode::Sdk {
            return Err(SamLocalError::WrongMode { expected: "sdk" });
        }
        let invoker = self.lambda.as_ref().ok_or(SamLocalError::NotStarted)?;
        let internal = self.names.internal(function).ok_or_else(|| {
            SamLocalError::Config(format!("no function named '{function}' was generated"))
        })?;
        invoker.invoke(internal, invocation_type, payload).await
    }
}
