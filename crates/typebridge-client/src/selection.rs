use std::{fmt, sync::Arc};

use futures::{future::BoxFuture, Future, FutureExt};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use typebridge_model::{Number, WireValue};

use crate::{DynGraphqlClient, QueryError};

type LazyResolve = Arc<dyn Fn() -> BoxFuture<'static, Result<WireValue, QueryError>> + Send + Sync>;

#[derive(Clone)]
enum ArgValue {
    Literal(WireValue),
    /// Enum members are rendered as bare identifiers.
    Enum(String),
    EnumList(Vec<String>),
    /// Resolved when the query is built, typically to the ID of another object.
    Lazy(LazyResolve),
}

/// Starts a new query tree at the root type.
pub fn query() -> Selection {
    Selection::default()
}

/// One step of a query tree.
///
/// Selections are immutable: every builder method returns a new selection sharing its
/// ancestors, so a selection can be extended in several directions.
#[derive(Clone, Default)]
pub struct Selection {
    name: Option<String>,
    alias: Option<String>,
    args: IndexMap<String, ArgValue>,
    prev: Option<Arc<Selection>>,
}

impl Selection {
    pub fn select(&self, name: impl Into<String>) -> Selection {
        Selection {
            name: Some(name.into()),
            alias: None,
            args: IndexMap::new(),
            prev: Some(Arc::new(self.clone())),
        }
    }

    pub fn select_with_alias(&self, alias: impl Into<String>, name: impl Into<String>) -> Selection {
        Selection {
            alias: Some(alias.into()),
            ..self.select(name)
        }
    }

    /// Adds an argument to the last selected field.
    pub fn arg(&self, name: impl Into<String>, value: impl Into<WireValue>) -> Selection {
        self.with_arg(name.into(), ArgValue::Literal(value.into()))
    }

    /// Adds an argument only when a value is present.
    pub fn arg_opt<T: Into<WireValue>>(&self, name: impl Into<String>, value: Option<T>) -> Selection {
        match value {
            Some(value) => self.arg(name, value),
            None => self.clone(),
        }
    }

    pub fn arg_enum(&self, name: impl Into<String>, api_name: impl Into<String>) -> Selection {
        self.with_arg(name.into(), ArgValue::Enum(api_name.into()))
    }

    pub fn arg_enums<I, S>(&self, name: impl Into<String>, api_names: I) -> Selection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let api_names = api_names.into_iter().map(Into::into).collect();
        self.with_arg(name.into(), ArgValue::EnumList(api_names))
    }

    pub fn arg_lazy<F, Fut>(&self, name: impl Into<String>, resolve: F) -> Selection
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<WireValue, QueryError>> + Send + 'static,
    {
        let resolve: LazyResolve = Arc::new(move || resolve().boxed());
        self.with_arg(name.into(), ArgValue::Lazy(resolve))
    }

    /// Adds the ID of a remote object, resolved when the query is built.
    pub fn arg_id(&self, name: impl Into<String>, handle: crate::RemoteObjectHandle) -> Selection {
        self.arg_lazy(name, move || {
            let handle = handle.clone();
            async move { handle.id().await.map(WireValue::String) }
        })
    }

    /// Adds the IDs of several remote objects, resolved in order when the query is built.
    pub fn arg_ids(&self, name: impl Into<String>, handles: Vec<crate::RemoteObjectHandle>) -> Selection {
        let handles: Arc<[crate::RemoteObjectHandle]> = handles.into();

        self.arg_lazy(name, move || {
            let handles = handles.clone();
            async move {
                let mut ids = Vec::with_capacity(handles.len());
                for handle in handles.iter() {
                    ids.push(WireValue::String(handle.id().await?));
                }
                Ok(WireValue::List(ids))
            }
        })
    }

    fn with_arg(&self, name: String, value: ArgValue) -> Selection {
        let mut selection = self.clone();
        selection.args.insert(name, value);
        selection
    }

    /// Name of the last selected field.
    pub fn field_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Renders the query document, resolving lazy arguments one at a time.
    pub async fn build(&self) -> Result<String, QueryError> {
        let path = self.path();
        let mut fields = Vec::with_capacity(path.len());

        for selection in path {
            let Some(name) = &selection.name else {
                continue;
            };

            let mut field = String::new();
            if let Some(alias) = &selection.alias {
                field.push_str(alias);
                field.push(':');
            }
            field.push_str(name);

            if !selection.args.is_empty() {
                let mut rendered = Vec::with_capacity(selection.args.len());

                for (arg_name, value) in &selection.args {
                    let literal = match value {
                        ArgValue::Literal(value) => render_literal(value),
                        ArgValue::Enum(api_name) => api_name.clone(),
                        ArgValue::EnumList(api_names) => format!("[{}]", api_names.join(",")),
                        ArgValue::Lazy(resolve) => {
                            let value = resolve().await.map_err(|source| QueryError::LazyArgument {
                                name: arg_name.clone(),
                                source: Box::new(source),
                            })?;
                            render_literal(&value)
                        }
                    };
                    rendered.push(format!("{arg_name}:{literal}"));
                }

                field.push('(');
                field.push_str(&rendered.join(","));
                field.push(')');
            }

            fields.push(field);
        }

        let mut query = String::from("query");
        for field in &fields {
            query.push('{');
            query.push_str(field);
        }
        query.push_str(&"}".repeat(fields.len()));

        Ok(query)
    }

    /// Builds and sends the query, then extracts the value of the last selected field.
    pub async fn execute<D: DeserializeOwned>(&self, client: &DynGraphqlClient) -> Result<D, QueryError> {
        let value = self.execute_raw(client).await?;
        serde_json::from_value(value).map_err(QueryError::Deserialize)
    }

    pub async fn execute_raw(&self, client: &DynGraphqlClient) -> Result<serde_json::Value, QueryError> {
        let query = self.build().await?;
        tracing::trace!(query = query.as_str(), "sending query");

        let data = client.query(&query).await?;
        self.unpack(data)
    }

    /// Walks the response along the selected path, following aliases. Lists are walked
    /// element by element.
    pub(crate) fn unpack(&self, data: serde_json::Value) -> Result<serde_json::Value, QueryError> {
        let keys = self
            .path()
            .into_iter()
            .filter_map(|selection| selection.alias.as_ref().or(selection.name.as_ref()))
            .map(String::as_str)
            .collect::<Vec<_>>();

        unpack_path(data, &keys, 0)
    }

    fn path(&self) -> Vec<&Selection> {
        let mut selections = Vec::new();
        let mut current = Some(self);

        while let Some(selection) = current {
            selections.push(selection);
            current = selection.prev.as_deref();
        }

        selections.reverse();
        selections
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path()
            .into_iter()
            .filter_map(|selection| selection.name.as_deref())
            .collect::<Vec<_>>();

        f.debug_struct("Selection").field("path", &path).finish()
    }
}

fn unpack_path(value: serde_json::Value, keys: &[&str], walked: usize) -> Result<serde_json::Value, QueryError> {
    let Some((key, rest)) = keys[walked..].split_first() else {
        return Ok(value);
    };
    let missing = || QueryError::Unpack {
        path: keys[..=walked].join("."),
    };

    match value {
        serde_json::Value::Object(mut fields) => {
            let value = fields.remove(*key).ok_or_else(missing)?;
            if rest.is_empty() {
                Ok(value)
            } else {
                unpack_path(value, keys, walked + 1)
            }
        }
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| unpack_path(item, keys, walked))
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        serde_json::Value::Null => Ok(serde_json::Value::Null),
        _ => Err(missing()),
    }
}

/// Renders a value as a GraphQL literal.
pub fn render_literal(value: &WireValue) -> String {
    let mut out = String::new();
    write_literal(value, &mut out);
    out
}

fn write_literal(value: &WireValue, out: &mut String) {
    match value {
        WireValue::Null => out.push_str("null"),
        WireValue::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
        WireValue::Number(Number::Int(value)) => out.push_str(&value.to_string()),
        WireValue::Number(Number::Float(value)) => out.push_str(&value.to_string()),
        WireValue::String(value) => write_string(value, out),
        WireValue::List(values) => {
            out.push('[');
            for (index, value) in values.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_literal(value, out);
            }
            out.push(']');
        }
        WireValue::Object(fields) => {
            out.push('{');
            for (index, (key, value)) in fields.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                out.push_str(key);
                out.push(':');
                write_literal(value, out);
            }
            out.push('}');
        }
    }
}

fn write_string(value: &str, out: &mut String) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch => out.push(ch),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;
    use serde_json::json;

    use super::*;
    use crate::test_utils::ScriptedClient;

    #[tokio::test]
    async fn renders_nested_fields_with_arguments() {
        let query = query()
            .select("container")
            .select("from")
            .arg("address", "alpine:3.16.2")
            .select("withExec")
            .arg("args", vec!["apk", "add", "curl"]);

        assert_eq!(
            query.build().await.unwrap(),
            r#"query{container{from(address:"alpine:3.16.2"){withExec(args:["apk","add","curl"])}}}"#
        );
    }

    #[tokio::test]
    async fn renders_aliases() {
        let query = query()
            .select("core")
            .select("image")
            .arg("ref", "alpine")
            .select_with_alias("foo", "file")
            .arg("path", "/etc/alpine-release");

        assert_eq!(
            query.build().await.unwrap(),
            r#"query{core{image(ref:"alpine"){foo:file(path:"/etc/alpine-release")}}}"#
        );
    }

    #[tokio::test]
    async fn same_argument_name_on_different_fields() {
        let query = query().select("a").arg("arg", "one").select("b").arg("arg", "two");

        assert_eq!(query.build().await.unwrap(), r#"query{a(arg:"one"){b(arg:"two")}}"#);
    }

    #[tokio::test]
    async fn selections_are_immutable() {
        let root = query().select("test");

        assert_eq!(root.select("a").build().await.unwrap(), "query{test{a}}");
        assert_eq!(root.select("b").build().await.unwrap(), "query{test{b}}");
        assert_eq!(root.build().await.unwrap(), "query{test}");
    }

    #[tokio::test]
    async fn escapes_strings() {
        let query = query().select("echo").arg("text", "say \"hi\"\n\tpath\\to\r");

        assert_eq!(
            query.build().await.unwrap(),
            r#"query{echo(text:"say \"hi\"\n\tpath\\to\r")}"#
        );
    }

    #[tokio::test]
    async fn renders_objects_enums_and_scalars() {
        let mut fields = IndexMap::new();
        fields.insert("name".to_string(), WireValue::from("x"));
        fields.insert("count".to_string(), WireValue::from(2_i64));
        fields.insert("nested".to_string(), WireValue::Null);

        let query = query()
            .select("a")
            .arg("input", WireValue::Object(fields))
            .arg_enum("protocol", "UDP")
            .arg("ratio", 0.5)
            .arg("force", true);

        assert_eq!(
            query.build().await.unwrap(),
            r#"query{a(input:{name:"x",count:2,nested:null},protocol:UDP,ratio:0.5,force:true)}"#
        );
    }

    #[tokio::test]
    async fn lazy_arguments_are_resolved_when_building() {
        let query = query()
            .select("container")
            .arg_lazy("id", || async { Ok(WireValue::from("sha256:abc")) });

        assert_eq!(query.build().await.unwrap(), r#"query{container(id:"sha256:abc")}"#);
    }

    #[tokio::test]
    async fn execute_unpacks_the_selected_path() {
        let scripted = ScriptedClient::default();
        scripted.respond(json!({"container": {"from": {"out": "hello"}}}));
        let client: DynGraphqlClient = Arc::new(scripted.clone());

        let stdout: String = query()
            .select("container")
            .select("from")
            .arg("address", "alpine")
            .select_with_alias("out", "stdout")
            .execute(&client)
            .await
            .unwrap();

        assert_eq!(stdout, "hello");
        assert_eq!(
            scripted.queries(),
            [r#"query{container{from(address:"alpine"){out:stdout}}}"#]
        );
    }

    #[tokio::test]
    async fn lists_are_unpacked_element_by_element() {
        let scripted = ScriptedClient::default();
        scripted.respond(json!({"host": {"directory": {"entries": [{"id": "a"}, {"id": "b"}]}}}));
        let client: DynGraphqlClient = Arc::new(scripted);

        let ids: Vec<String> = query()
            .select("host")
            .select("directory")
            .select("entries")
            .select("id")
            .execute(&client)
            .await
            .unwrap();

        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn enum_lists_are_bare_identifiers() {
        let query = query().select("build").arg_enums("modes", ["FAST", "SLOW"]);

        assert_eq!(query.build().await.unwrap(), "query{build(modes:[FAST,SLOW])}");
    }

    #[tokio::test]
    async fn missing_keys_are_reported_with_their_path() {
        let scripted = ScriptedClient::default();
        scripted.respond(json!({"container": {}}));
        let client: DynGraphqlClient = Arc::new(scripted);

        let error = query()
            .select("container")
            .select("stdout")
            .execute::<String>(&client)
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "response has no value at `container.stdout`");
    }
}
