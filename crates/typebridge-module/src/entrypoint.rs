use std::{path::PathBuf, process::ExitCode};

use tracing::instrument;
use typebridge_client::{query, DynGraphqlClient, HttpClient, SessionConfig};
use typebridge_codec::{Codec, RemoteLoader};
use typebridge_model::{introspection, TypeModel, WireValue};
use typebridge_registrar::Registrar;
use typebridge_scanner::ScanOptions;

use crate::{logging, Dispatcher, EntrypointError, Invocation, ModuleConfig, Registry, MODULE_ROOT_ENV};

/// Serves the single call the engine started this process for, then reports how it went.
///
/// Meant to be the body of the module's `main`:
///
/// ```no_run
/// # use typebridge_module::Registry;
/// #[tokio::main]
/// async fn main() -> std::process::ExitCode {
///     typebridge_module::run(Registry::builder().build()).await
/// }
/// ```
pub async fn run(registry: Registry) -> ExitCode {
    logging::init();

    match serve(&registry).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let exec = match &error {
                EntrypointError::Dispatch(dispatch) => dispatch.remote_exec(),
                _ => None,
            };

            match exec {
                Some(exec) => tracing::error!(
                    exit_code = exec.exit_code,
                    stdout = exec.stdout.as_str(),
                    stderr = exec.stderr.as_str(),
                    "{error}"
                ),
                None => tracing::error!("{error}"),
            }

            ExitCode::from(error.exit_code())
        }
    }
}

/// Reads the configuration and session from the environment and serves the current call.
pub async fn serve(registry: &Registry) -> Result<WireValue, EntrypointError> {
    let root = std::env::var_os(MODULE_ROOT_ENV).map_or_else(|| PathBuf::from("."), PathBuf::from);
    let config = ModuleConfig::load(&root)?.resolve_paths(&root);

    let session = SessionConfig::from_env()?;
    let client = HttpClient::for_session(&session).into_dyn();

    Entrypoint::new(registry, config, client).serve().await
}

/// One module process: registration when the engine asks for the module definition, a
/// dispatch otherwise.
pub struct Entrypoint<'a> {
    registry: &'a Registry,
    config: ModuleConfig,
    client: DynGraphqlClient,
}

impl<'a> Entrypoint<'a> {
    pub fn new(registry: &'a Registry, config: ModuleConfig, client: DynGraphqlClient) -> Self {
        Self {
            registry,
            config,
            client,
        }
    }

    /// Answers the current function call and returns the value sent back.
    #[instrument(skip_all, fields(module = %self.config.name))]
    pub async fn serve(&self) -> Result<WireValue, EntrypointError> {
        let remote = self.remote_catalog().await?;
        let model = self.scan(&remote)?;
        let invocation = self.current_call().await?;

        let value = if invocation.parent_name.is_empty() {
            tracing::debug!("registering the module");
            let id = Registrar::new(&model).with_remote(&remote).register(&self.client).await?;
            WireValue::String(id)
        } else {
            let loader = RemoteLoader::new(self.client.clone());
            let codec = Codec::new(&model, &remote, &loader);
            Dispatcher::new(self.registry, codec).dispatch(invocation).await?
        };

        query()
            .select("currentFunctionCall")
            .select("returnValue")
            .arg("value", value.to_json_string())
            .execute_raw(&self.client)
            .await?;

        Ok(value)
    }

    async fn remote_catalog(&self) -> Result<TypeModel, EntrypointError> {
        let json = match &self.config.introspection {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| EntrypointError::Io {
                    path: path.clone(),
                    source,
                })?,
            None => self.client.query(introspection::INTROSPECTION_QUERY).await?.to_string(),
        };

        Ok(introspection::parse(&json)?)
    }

    fn scan(&self, remote: &TypeModel) -> Result<TypeModel, EntrypointError> {
        let options = ScanOptions::new(&self.config.name).with_remote(remote.clone());
        let mut model = typebridge_scanner::scan_dir(&self.config.source, &options)?;

        if let Some(description) = &self.config.description {
            model.description = Some(description.clone());
        }

        Ok(model)
    }

    async fn current_call(&self) -> Result<Invocation, EntrypointError> {
        let call = query().select("currentFunctionCall");

        let parent_name: String = call.select("parentName").execute(&self.client).await?;
        let fn_name: String = call.select("name").execute(&self.client).await?;
        let parent: String = call.select("parent").execute(&self.client).await?;

        let inputs = call.select("inputArgs");
        let names: Vec<String> = inputs.select("name").execute(&self.client).await?;
        let values: Vec<String> = inputs.select("value").execute(&self.client).await?;

        // The parent is empty or null for constructors and registration.
        let parent_state = match parent.trim() {
            "" => Default::default(),
            json => match WireValue::from_json_str(json)? {
                WireValue::Object(fields) => fields,
                _ => Default::default(),
            },
        };

        let args = names
            .into_iter()
            .zip(values)
            .map(|(name, value)| Ok((name, WireValue::from_json_str(&value)?)))
            .collect::<Result<_, serde_json::Error>>()?;

        Ok(Invocation {
            parent_name,
            fn_name,
            parent_state,
            args,
        })
    }
}
