use std::{fmt, sync::Arc};

use tokio::sync::OnceCell;

use crate::{query, DynGraphqlClient, QueryError, Selection};

/// A reference to an object living in the remote engine.
///
/// The handle holds the deferred selection producing the object and resolves its ID at most
/// once. Selecting from a handle never mutates it.
#[derive(Clone)]
pub struct RemoteObjectHandle {
    type_name: Arc<str>,
    selection: Selection,
    client: DynGraphqlClient,
    id: Arc<OnceCell<String>>,
}

impl RemoteObjectHandle {
    pub fn new(type_name: impl Into<Arc<str>>, selection: Selection, client: DynGraphqlClient) -> Self {
        Self {
            type_name: type_name.into(),
            selection,
            client,
            id: Arc::new(OnceCell::new()),
        }
    }

    /// A handle loading the object back from a known ID with `load{Type}FromID`.
    pub fn from_id(type_name: &str, id: impl Into<String>, client: DynGraphqlClient) -> Self {
        let id = id.into();
        let selection = query().select(format!("load{type_name}FromID")).arg("id", id.clone());

        Self {
            type_name: type_name.into(),
            selection,
            client,
            id: Arc::new(OnceCell::new_with(Some(id))),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn client(&self) -> &DynGraphqlClient {
        &self.client
    }

    /// Extends the selection of this handle without touching it.
    pub fn select(&self, field: &str) -> Selection {
        self.selection.select(field)
    }

    /// A new handle for another object reached from this one.
    pub fn derive(&self, type_name: &str, selection: Selection) -> RemoteObjectHandle {
        RemoteObjectHandle::new(type_name, selection, self.client.clone())
    }

    /// The ID if it was already resolved.
    pub fn known_id(&self) -> Option<&str> {
        self.id.get().map(String::as_str)
    }

    /// Resolves the ID of the object, costing one round trip the first time.
    pub async fn id(&self) -> Result<String, QueryError> {
        let id = self
            .id
            .get_or_try_init(|| async { self.selection.select("id").execute::<String>(&self.client).await })
            .await?;

        Ok(id.clone())
    }

    /// Two handles are the same object when their IDs are equal.
    pub async fn is_same_as(&self, other: &RemoteObjectHandle) -> Result<bool, QueryError> {
        Ok(self.id().await? == other.id().await?)
    }
}

impl fmt::Debug for RemoteObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteObjectHandle")
            .field("type_name", &self.type_name)
            .field("selection", &self.selection)
            .field("id", &self.id.get())
            .finish()
    }
}

/// Generated client types wrapping a remote object.
pub trait ObjectProxy: Clone + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    fn new(selection: Selection, client: DynGraphqlClient) -> Self;

    fn selection(&self) -> &Selection;

    fn client(&self) -> &DynGraphqlClient;

    fn to_handle(&self) -> RemoteObjectHandle {
        RemoteObjectHandle::new(Self::TYPE_NAME, self.selection().clone(), self.client().clone())
    }

    fn from_handle(handle: RemoteObjectHandle) -> Self {
        Self::new(handle.selection().clone(), handle.client().clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_utils::ScriptedClient;

    #[tokio::test]
    async fn id_is_resolved_once() {
        let scripted = ScriptedClient::default();
        scripted.respond(json!({"container": {"id": "ctr-1"}}));
        let handle = RemoteObjectHandle::new("Container", query().select("container"), Arc::new(scripted.clone()));

        assert_eq!(handle.id().await.unwrap(), "ctr-1");
        assert_eq!(handle.id().await.unwrap(), "ctr-1");
        assert_eq!(scripted.queries(), ["query{container{id}}"]);
    }

    #[tokio::test]
    async fn handles_loaded_from_an_id_know_it() {
        let scripted = ScriptedClient::default();
        let client: DynGraphqlClient = Arc::new(scripted.clone());
        let handle = RemoteObjectHandle::from_id("Container", "ctr-1", client.clone());

        assert_eq!(handle.known_id(), Some("ctr-1"));
        assert_eq!(
            handle.select("stdout").build().await.unwrap(),
            r#"query{loadContainerFromID(id:"ctr-1"){stdout}}"#
        );

        let original = RemoteObjectHandle::new("Container", query().select("container"), client);
        scripted.respond(json!({"container": {"id": "ctr-1"}}));
        assert!(handle.is_same_as(&original).await.unwrap());
        assert_eq!(scripted.queries().len(), 1);
    }

    #[tokio::test]
    async fn selecting_does_not_mutate_the_handle() {
        let scripted = ScriptedClient::default();
        let handle = RemoteObjectHandle::new("Container", query().select("container"), Arc::new(scripted));

        let derived = handle.derive("Container", handle.select("withExec").arg("args", vec!["ls"]));

        assert_eq!(handle.selection().build().await.unwrap(), "query{container}");
        assert_eq!(
            derived.selection().build().await.unwrap(),
            r#"query{container{withExec(args:["ls"])}}"#
        );
    }
}
