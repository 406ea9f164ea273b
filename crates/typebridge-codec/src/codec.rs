use futures::{future::BoxFuture, FutureExt};
use indexmap::IndexMap;
use typebridge_model::{builtin, Argument, EnumDef, Number, ObjectDef, TypeModel, TypeRef, WireValue};

use crate::{CodecError, ObjectLoader, ObjectValue, Value};

/// Converts values between their wire and native representation.
///
/// `local` is the model of the module being served, `remote` the catalog of the engine it
/// talks to.
pub struct Codec<'a> {
    local: &'a TypeModel,
    remote: &'a TypeModel,
    loader: &'a dyn ObjectLoader,
}

impl<'a> Codec<'a> {
    pub fn new(local: &'a TypeModel, remote: &'a TypeModel, loader: &'a dyn ObjectLoader) -> Self {
        Self { local, remote, loader }
    }

    pub fn local(&self) -> &'a TypeModel {
        self.local
    }

    /// Decodes an argument of a call, applying its default when the caller omitted it.
    ///
    /// Defaults are decoded again on every call, never shared between calls.
    pub fn decode_argument(&self, argument: &Argument, wire: Option<WireValue>) -> Result<Value, CodecError> {
        let has_fallback = argument.default_value.is_some() || argument.contextual_path.is_some();

        match wire {
            Some(wire) if !(wire.is_null() && has_fallback) => self.decode(&argument.type_ref, argument.optional, wire),
            _ => {
                if let Some(path) = &argument.contextual_path {
                    let type_name = argument.type_ref.name().unwrap_or_default();
                    let ignore_patterns = argument.ignore_patterns.as_deref().unwrap_or_default();
                    let handle = self.loader.load_contextual(type_name, path, ignore_patterns)?;
                    return Ok(Value::Handle(handle));
                }

                match &argument.default_value {
                    Some(default) => self.decode(&argument.type_ref, true, default.clone()),
                    None if argument.optional => Ok(Value::Null),
                    None => Err(CodecError::MissingArgument {
                        name: argument.name.clone(),
                    }),
                }
            }
        }
    }

    pub fn decode(&self, type_ref: &TypeRef, optional: bool, wire: WireValue) -> Result<Value, CodecError> {
        if optional && is_empty(&wire) {
            return Ok(Value::Null);
        }

        match (type_ref, wire) {
            (TypeRef::Void, _) => Ok(Value::Null),
            (_, WireValue::Null) => Err(CodecError::marshalling(type_ref, "null")),
            (TypeRef::Scalar { name }, wire) => decode_scalar(name, wire),
            (TypeRef::Enum { name, .. }, WireValue::String(api_name)) => {
                let enumeration = self.enumeration(name)?;
                enumeration
                    .api_to_native(&api_name)
                    .map(|native| Value::Enum(native.to_string()))
                    .ok_or_else(|| CodecError::UnknownEnumValue {
                        enum_name: name.clone(),
                        value: api_name,
                    })
            }
            (TypeRef::List { element }, WireValue::List(values)) => values
                .into_iter()
                .map(|value| self.decode(element, false, value))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (TypeRef::Object { name }, wire) => self.decode_object(name, wire),
            (TypeRef::Interface { name }, WireValue::String(id)) => Ok(Value::Handle(self.loader.load_from_id(name, &id))),
            (TypeRef::InputObject { .. }, wire @ WireValue::Object(_)) => Ok(Value::Json(wire)),
            (type_ref, wire) => Err(CodecError::marshalling(type_ref, wire.kind())),
        }
    }

    fn decode_object(&self, name: &str, wire: WireValue) -> Result<Value, CodecError> {
        if let Some(object) = self.local.object(name) {
            return match wire {
                WireValue::Object(fields) => self.restore(object, fields).map(Value::Object),
                other => Err(CodecError::marshalling(name, other.kind())),
            };
        }

        if self.remote.provides_identity(name) {
            return match wire {
                WireValue::String(id) => Ok(Value::Handle(self.loader.load_from_id(name, &id))),
                other => Err(CodecError::marshalling(format!("{name} ID"), other.kind())),
            };
        }

        Err(CodecError::UnsupportedDecode {
            type_name: name.to_string(),
        })
    }

    /// Restores the state of a module object, nested module objects included.
    pub fn restore(&self, object: &ObjectDef, fields: IndexMap<String, WireValue>) -> Result<ObjectValue, CodecError> {
        let mut state = ObjectValue::new(&object.name);

        for (key, wire) in fields {
            let field = object
                .fields
                .get(&key)
                .or_else(|| object.field_by_native_name(&key));

            let Some(field) = field else {
                tracing::debug!(object = %object.name, field = %key, "ignoring unknown state field");
                continue;
            };

            let value = self.decode(&field.type_ref, field.optional, wire)?;
            state.fields.insert(field.native_name.clone(), value);
        }

        Ok(state)
    }

    /// Encodes a native value, resolving the ID of remote objects.
    pub fn encode<'b>(&'b self, type_ref: &'b TypeRef, value: Value) -> BoxFuture<'b, Result<WireValue, CodecError>> {
        async move {
            let wire = match value {
                Value::Null => WireValue::Null,
                Value::Boolean(value) => WireValue::Boolean(value),
                Value::Int(value) => WireValue::Number(Number::Int(value)),
                Value::Float(value) => WireValue::Number(Number::Float(value)),
                Value::String(value) => WireValue::String(value),
                Value::Json(value) => value,
                Value::Enum(native) => {
                    let api_name = match type_ref.innermost() {
                        TypeRef::Enum { name, .. } => self
                            .enumeration(name)
                            .ok()
                            .and_then(|enumeration| enumeration.native_to_api(&native))
                            .map(str::to_string),
                        _ => None,
                    };
                    WireValue::String(api_name.unwrap_or(native))
                }
                Value::List(values) => {
                    let element = match type_ref {
                        TypeRef::List { element } => element.as_ref(),
                        other => other,
                    };

                    let mut encoded = Vec::with_capacity(values.len());
                    for value in values {
                        encoded.push(self.encode(element, value).await?);
                    }
                    WireValue::List(encoded)
                }
                Value::Handle(handle) => WireValue::String(handle.id().await?),
                Value::Object(object) => WireValue::Object(self.encode_object(object).await?),
            };

            Ok(wire)
        }
        .boxed()
    }

    /// Every state field is encoded, exposed or not, keyed by its wire name.
    async fn encode_object(&self, object: ObjectValue) -> Result<IndexMap<String, WireValue>, CodecError> {
        let definition = self.local.object(&object.type_name);
        let untyped = TypeRef::Void;
        let mut encoded = IndexMap::with_capacity(object.fields.len());

        for (native_name, value) in object.fields {
            let field = definition.and_then(|definition| definition.field_by_native_name(&native_name));

            let wire = match field {
                Some(field) => self.encode(&field.type_ref, value).await?,
                None => self.encode(&untyped, value).await?,
            };

            let key = field.map_or(native_name, |field| field.name.clone());
            encoded.insert(key, wire);
        }

        Ok(encoded)
    }

    fn enumeration(&self, name: &str) -> Result<&'a EnumDef, CodecError> {
        self.local
            .enumeration(name)
            .or_else(|| self.remote.enumeration(name))
            .ok_or_else(|| CodecError::UnknownType(name.to_string()))
    }
}

fn is_empty(wire: &WireValue) -> bool {
    match wire {
        WireValue::Null => true,
        WireValue::String(value) => value.is_empty(),
        _ => false,
    }
}

fn decode_scalar(name: &str, wire: WireValue) -> Result<Value, CodecError> {
    let value = match (name, wire) {
        (builtin::JSON, wire) => Value::Json(wire),
        (builtin::INT, WireValue::Number(Number::Int(value))) => Value::Int(value),
        (builtin::FLOAT, WireValue::Number(number)) => Value::Float(number.as_f64()),
        (builtin::BOOLEAN, WireValue::Boolean(value)) => Value::Boolean(value),
        (builtin::INT | builtin::FLOAT | builtin::BOOLEAN, wire) => {
            return Err(CodecError::marshalling(name, wire.kind()));
        }
        // String, ID and custom scalars travel as strings.
        (_, WireValue::String(value)) => Value::String(value),
        (_, wire) => return Err(CodecError::marshalling(name, wire.kind())),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;
    use serde_json::json;
    use typebridge_client::{test_utils::ScriptedClient, DynGraphqlClient};
    use typebridge_model::{EnumValueDef, FieldDef, FunctionDef};

    use super::*;
    use crate::RemoteLoader;

    fn local() -> TypeModel {
        let mut model = TypeModel::new("greeter");
        model.insert_enum(EnumDef::new(
            "Language",
            vec![
                EnumValueDef::new("ENGLISH", "English"),
                EnumValueDef::new("FRENCH", "French"),
            ],
        ));
        model.insert_object(
            ObjectDef::new("Greeter")
                .with_field(FieldDef::new("prefix", TypeRef::string()))
                .with_field(FieldDef::new("inner", TypeRef::object("Inner")).private())
                .with_field(FieldDef::new("language", TypeRef::enumeration("Language", ["ENGLISH", "FRENCH"]))),
        );
        model.insert_object(
            ObjectDef::new("Inner").with_field(FieldDef::new("maxCount", TypeRef::int()).with_native_name("max_count")),
        );
        model
    }

    fn remote() -> TypeModel {
        let mut model = TypeModel::default();
        let mut container =
            ObjectDef::new("Container").with_function(FunctionDef::new("id", TypeRef::scalar("ContainerID")));
        container.provides_identity = true;
        model.insert_object(container);
        model.insert_object(ObjectDef::new("Port").with_function(FunctionDef::new("port", TypeRef::int())));
        let mut token = ObjectDef::new("Token").with_function(FunctionDef::new("uuid", TypeRef::scalar("UUID")));
        token.provides_identity = token.detect_identity();
        model.insert_object(token);
        model
    }

    struct Fixture {
        local: TypeModel,
        remote: TypeModel,
        loader: RemoteLoader,
        scripted: ScriptedClient,
    }

    impl Fixture {
        fn new() -> Self {
            let scripted = ScriptedClient::default();
            let client: DynGraphqlClient = Arc::new(scripted.clone());

            Self {
                local: local(),
                remote: remote(),
                loader: RemoteLoader::new(client),
                scripted,
            }
        }

        fn codec(&self) -> Codec<'_> {
            Codec::new(&self.local, &self.remote, &self.loader)
        }
    }

    #[rstest]
    #[case(TypeRef::string(), WireValue::from("hello"))]
    #[case(TypeRef::int(), WireValue::from(42_i64))]
    #[case(TypeRef::float(), WireValue::from(1.5))]
    #[case(TypeRef::boolean(), WireValue::from(true))]
    #[case(TypeRef::list(TypeRef::string()), WireValue::from(vec!["a", "b"]))]
    #[case(TypeRef::enumeration("Language", ["ENGLISH", "FRENCH"]), WireValue::from("FRENCH"))]
    #[tokio::test]
    async fn decoding_an_encoded_value_is_identity(#[case] type_ref: TypeRef, #[case] wire: WireValue) {
        let fixture = Fixture::new();
        let codec = fixture.codec();

        let decoded = codec.decode(&type_ref, false, wire.clone()).unwrap();
        let encoded = codec.encode(&type_ref, decoded.clone()).await.unwrap();

        assert_eq!(encoded, wire);
        assert_eq!(codec.decode(&type_ref, false, encoded).unwrap(), decoded);
    }

    #[test]
    fn null_and_empty_strings_decode_to_null_when_optional() {
        let fixture = Fixture::new();
        let codec = fixture.codec();

        assert_eq!(codec.decode(&TypeRef::string(), true, WireValue::Null).unwrap(), Value::Null);
        assert_eq!(codec.decode(&TypeRef::string(), true, WireValue::from("")).unwrap(), Value::Null);
        assert!(codec.decode(&TypeRef::string(), false, WireValue::Null).is_err());
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let fixture = Fixture::new();
        let language = TypeRef::enumeration("Language", ["ENGLISH", "FRENCH"]);

        let error = fixture.codec().decode(&language, false, WireValue::from("GERMAN")).unwrap_err();

        assert_eq!(error.to_string(), "'GERMAN' is not a member of enum Language");
    }

    #[tokio::test]
    async fn unknown_native_enum_names_pass_through() {
        let fixture = Fixture::new();
        let language = TypeRef::enumeration("Language", ["ENGLISH", "FRENCH"]);

        let encoded = fixture.codec().encode(&language, Value::Enum("Klingon".into())).await.unwrap();

        assert_eq!(encoded, WireValue::from("Klingon"));
    }

    #[tokio::test]
    async fn module_objects_are_restored_and_encoded_structurally() {
        let fixture = Fixture::new();
        let codec = fixture.codec();
        let wire = WireValue::from(json!({
            "prefix": "Hey",
            "inner": {"maxCount": 3},
            "language": "FRENCH",
            "stale": true
        }));

        let decoded = codec.decode(&TypeRef::object("Greeter"), false, wire).unwrap();
        let expected = ObjectValue::new("Greeter")
            .with("prefix", "Hey")
            .with("inner", ObjectValue::new("Inner").with("max_count", 3_i64))
            .with("language", Value::Enum("French".into()));
        assert_eq!(decoded, Value::Object(expected));

        let encoded = codec.encode(&TypeRef::object("Greeter"), decoded).await.unwrap();
        assert_eq!(
            encoded,
            WireValue::from(json!({"prefix": "Hey", "inner": {"maxCount": 3}, "language": "FRENCH"}))
        );
        assert!(fixture.scripted.queries().is_empty());
    }

    #[tokio::test]
    async fn identity_objects_round_trip_through_their_id() {
        let fixture = Fixture::new();
        let codec = fixture.codec();

        let decoded = codec
            .decode(&TypeRef::object("Container"), false, WireValue::from("ctr-1"))
            .unwrap();
        let Value::Handle(handle) = &decoded else {
            unreachable!()
        };
        assert_eq!(
            handle.select("stdout").build().await.unwrap(),
            r#"query{loadContainerFromID(id:"ctr-1"){stdout}}"#
        );

        let encoded = codec.encode(&TypeRef::object("Container"), decoded).await.unwrap();
        assert_eq!(encoded, WireValue::from("ctr-1"));
        assert!(fixture.scripted.queries().is_empty());
    }

    #[tokio::test]
    async fn encoding_a_fresh_handle_resolves_its_id() {
        let fixture = Fixture::new();
        fixture.scripted.respond(json!({"container": {"id": "ctr-2"}}));
        let handle = typebridge_client::RemoteObjectHandle::new(
            "Container",
            typebridge_client::query().select("container"),
            Arc::new(fixture.scripted.clone()),
        );

        let encoded = fixture
            .codec()
            .encode(&TypeRef::object("Container"), Value::Handle(handle))
            .await
            .unwrap();

        assert_eq!(encoded, WireValue::from("ctr-2"));
        assert_eq!(fixture.scripted.queries(), ["query{container{id}}"]);
    }

    #[rstest]
    #[case::no_id("Port")]
    #[case::uuid_is_not_an_id("Token")]
    fn objects_without_identity_cannot_be_decoded(#[case] name: &str) {
        let fixture = Fixture::new();

        let error = fixture
            .codec()
            .decode(&TypeRef::object(name), false, WireValue::from("whatever"))
            .unwrap_err();

        assert!(matches!(error, CodecError::UnsupportedDecode { type_name } if type_name == name));
    }

    #[test]
    fn omitted_arguments_get_a_fresh_default() {
        let fixture = Fixture::new();
        let codec = fixture.codec();
        let argument = Argument::new("name", TypeRef::string()).with_default(WireValue::from("test"));

        assert_eq!(codec.decode_argument(&argument, None).unwrap(), Value::String("test".into()));
        assert_eq!(
            codec.decode_argument(&argument, Some(WireValue::from("world"))).unwrap(),
            Value::String("world".into())
        );
        assert_eq!(codec.decode_argument(&argument, None).unwrap(), Value::String("test".into()));
    }

    #[test]
    fn omitted_required_arguments_fail() {
        let fixture = Fixture::new();
        let argument = Argument::new("name", TypeRef::string());

        let error = fixture.codec().decode_argument(&argument, None).unwrap_err();

        assert_eq!(error.to_string(), "missing required argument `name`");
        assert_eq!(
            fixture
                .codec()
                .decode_argument(&argument.clone().optional(), None)
                .unwrap(),
            Value::Null
        );
    }

    #[tokio::test]
    async fn omitted_contextual_arguments_load_from_the_host() {
        let fixture = Fixture::new();
        let mut argument = Argument::new("source", TypeRef::object("Directory")).optional();
        argument.contextual_path = Some("..".into());

        let Value::Handle(handle) = fixture.codec().decode_argument(&argument, None).unwrap() else {
            unreachable!()
        };

        assert_eq!(
            handle.selection().build().await.unwrap(),
            r#"query{host{directory(path:"..")}}"#
        );
    }
}
