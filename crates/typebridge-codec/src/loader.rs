use typebridge_client::{query, DynGraphqlClient, RemoteObjectHandle};

use crate::CodecError;

pub const DIRECTORY: &str = "Directory";
pub const FILE: &str = "File";

/// Builds handles for objects the codec cannot construct by itself.
pub trait ObjectLoader: Send + Sync {
    /// A deferred handle for the object with the given ID.
    fn load_from_id(&self, type_name: &str, id: &str) -> RemoteObjectHandle;

    /// A deferred handle for a path of the host, used when a contextual argument is omitted.
    fn load_contextual(
        &self,
        type_name: &str,
        path: &str,
        ignore_patterns: &[String],
    ) -> Result<RemoteObjectHandle, CodecError>;
}

/// Loads objects through the remote API.
#[derive(Clone)]
pub struct RemoteLoader {
    client: DynGraphqlClient,
}

impl RemoteLoader {
    pub fn new(client: DynGraphqlClient) -> Self {
        Self { client }
    }
}

impl ObjectLoader for RemoteLoader {
    fn load_from_id(&self, type_name: &str, id: &str) -> RemoteObjectHandle {
        RemoteObjectHandle::from_id(type_name, id, self.client.clone())
    }

    fn load_contextual(
        &self,
        type_name: &str,
        path: &str,
        ignore_patterns: &[String],
    ) -> Result<RemoteObjectHandle, CodecError> {
        let host = query().select("host");

        let selection = match type_name {
            DIRECTORY => {
                let directory = host.select("directory").arg("path", path);
                if ignore_patterns.is_empty() {
                    directory
                } else {
                    directory.arg("exclude", ignore_patterns.to_vec())
                }
            }
            FILE => host.select("file").arg("path", path),
            _ => {
                return Err(CodecError::InvalidContextualPath {
                    type_name: type_name.to_string(),
                })
            }
        };

        Ok(RemoteObjectHandle::new(type_name, selection, self.client.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use typebridge_client::test_utils::ScriptedClient;

    use super::*;

    #[tokio::test]
    async fn contextual_directories_honour_ignore_patterns() {
        let loader = RemoteLoader::new(Arc::new(ScriptedClient::default()));

        let handle = loader
            .load_contextual(DIRECTORY, ".", &["target".to_string(), "*.log".to_string()])
            .unwrap();

        assert_eq!(
            handle.selection().build().await.unwrap(),
            r#"query{host{directory(path:".",exclude:["target","*.log"])}}"#
        );
    }

    #[test]
    fn contextual_paths_only_load_directories_and_files() {
        let loader = RemoteLoader::new(Arc::new(ScriptedClient::default()));

        assert!(loader.load_contextual("Container", ".", &[]).is_err());
        assert!(loader.load_contextual(FILE, "go.mod", &[]).is_ok());
    }
}
