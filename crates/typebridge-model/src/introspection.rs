//! Reading a remote schema from its introspection result.

use serde::Deserialize;

use crate::{
    builtin, names, Argument, EnumDef, EnumValueDef, FieldDef, FunctionDef, InputObjectDef, InterfaceDef, ObjectDef,
    ScalarDef, TypeModel, TypeRef, WireValue,
};

pub const INTROSPECTION_QUERY: &str = r"query IntrospectionQuery {
  __schema {
    queryType { name }
    types {
      kind
      name
      description
      fields(includeDeprecated: true) {
        name
        description
        args { ...InputValue }
        type { ...TypeRef }
        isDeprecated
        deprecationReason
        directives { name args { name value } }
      }
      inputFields { ...InputValue }
      interfaces { ...TypeRef }
      enumValues(includeDeprecated: true) {
        name
        description
        isDeprecated
        deprecationReason
      }
    }
  }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
          }
        }
      }
    }
  }
}";

#[derive(Debug, thiserror::Error)]
pub enum IntrospectionError {
    #[error("invalid introspection document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("type reference without a name in {location}")]
    MissingTypeName { location: String },
    #[error("type reference to {name} in {location} is not a known type")]
    UnknownType { name: String, location: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Response { data: SchemaContainer },
    Bare(SchemaContainer),
}

#[derive(Debug, Deserialize)]
struct SchemaContainer {
    #[serde(rename = "__schema")]
    schema: Schema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Schema {
    types: Vec<FullType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullType {
    kind: TypeKind,
    name: String,
    description: Option<String>,
    fields: Option<Vec<Field>>,
    input_fields: Option<Vec<InputValue>>,
    interfaces: Option<Vec<IntrospectedTypeRef>>,
    enum_values: Option<Vec<EnumValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Field {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<InputValue>,
    #[serde(rename = "type")]
    type_ref: IntrospectedTypeRef,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
    #[serde(default)]
    directives: Vec<Directive>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    type_ref: IntrospectedTypeRef,
    default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnumValue {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Directive {
    name: String,
    #[serde(default)]
    args: Vec<DirectiveArgument>,
}

#[derive(Debug, Deserialize)]
struct DirectiveArgument {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectedTypeRef {
    kind: TypeKind,
    name: Option<String>,
    of_type: Option<Box<IntrospectedTypeRef>>,
}

/// Builds a [`TypeModel`] from an introspection result.
///
/// Accepts both the full GraphQL response (`{"data": {"__schema": ...}}`) and the bare
/// `{"__schema": ...}` document. Types starting with `__` are skipped, unions are not supported.
pub fn parse(json: &str) -> Result<TypeModel, IntrospectionError> {
    let schema = match serde_json::from_str::<Document>(json)? {
        Document::Response { data } | Document::Bare(data) => data.schema,
    };

    let mut model = TypeModel::default();
    let kinds: std::collections::HashMap<&str, TypeKind> = schema
        .types
        .iter()
        .map(|full_type| (full_type.name.as_str(), full_type.kind))
        .collect();

    for full_type in &schema.types {
        if full_type.name.starts_with("__") {
            continue;
        }

        let resolver = Resolver {
            kinds: &kinds,
            types: &schema.types,
            location: &full_type.name,
        };

        match full_type.kind {
            TypeKind::Object => {
                let mut object = ObjectDef::new(&full_type.name);
                object.description = full_type.description.clone();
                object.interfaces = full_type
                    .interfaces
                    .iter()
                    .flatten()
                    .filter_map(|interface| interface.name.clone())
                    .collect();

                for field in full_type.fields.iter().flatten() {
                    let function = resolver.function(field)?;
                    object.functions.insert(function.name.clone(), function);
                }

                object.provides_identity = object.detect_identity();
                model.insert_object(object);
            }
            TypeKind::Interface => {
                let mut interface = InterfaceDef::new(&full_type.name);
                interface.description = full_type.description.clone();

                for field in full_type.fields.iter().flatten() {
                    let function = resolver.function(field)?;
                    interface.functions.insert(function.name.clone(), function);
                }

                model.insert_interface(interface);
            }
            TypeKind::Enum => {
                let values = full_type
                    .enum_values
                    .iter()
                    .flatten()
                    .map(|value| EnumValueDef {
                        api_name: value.name.clone(),
                        native_name: names::enum_variant_name(&value.name),
                        description: value.description.clone(),
                        deprecated: deprecation(value.is_deprecated, value.deprecation_reason.as_deref()),
                    })
                    .collect();

                let mut enumeration = EnumDef::new(&full_type.name, values);
                enumeration.description = full_type.description.clone();
                model.insert_enum(enumeration);
            }
            TypeKind::Scalar => {
                if !builtin::is_builtin(&full_type.name) {
                    model.insert_scalar(ScalarDef {
                        name: full_type.name.clone(),
                        description: full_type.description.clone(),
                    });
                }
            }
            TypeKind::InputObject => {
                let fields = full_type
                    .input_fields
                    .iter()
                    .flatten()
                    .map(|input| resolver.argument(input))
                    .collect::<Result<Vec<_>, _>>()?;

                model.insert_input_object(InputObjectDef {
                    name: full_type.name.clone(),
                    description: full_type.description.clone(),
                    fields,
                });
            }
            TypeKind::Union => {
                tracing::warn!(name = %full_type.name, "skipping union type, unions are not supported");
            }
            TypeKind::List | TypeKind::NonNull | TypeKind::Other => {
                tracing::debug!(name = %full_type.name, "skipping type of unexpected kind");
            }
        }
    }

    tracing::debug!(
        objects = model.objects.len(),
        interfaces = model.interfaces.len(),
        enums = model.enums.len(),
        "parsed introspection result"
    );

    Ok(model)
}

struct Resolver<'a> {
    kinds: &'a std::collections::HashMap<&'a str, TypeKind>,
    types: &'a [FullType],
    location: &'a str,
}

impl Resolver<'_> {
    fn function(&self, field: &Field) -> Result<FunctionDef, IntrospectionError> {
        let (return_type, return_optional) = self.type_ref(&field.type_ref, &field.name)?;

        let arguments = field
            .args
            .iter()
            .map(|input| self.argument(input))
            .collect::<Result<Vec<_>, _>>()?;

        let experimental = field
            .directives
            .iter()
            .find(|directive| directive.name == "experimental")
            .map(|directive| {
                directive
                    .args
                    .iter()
                    .find(|argument| argument.name == "reason")
                    .and_then(|argument| argument.value.as_deref())
                    .map(|reason| reason.trim_matches('"').to_string())
                    .unwrap_or_default()
            });

        Ok(FunctionDef {
            name: field.name.clone(),
            native_name: field.name.clone(),
            description: field.description.clone(),
            deprecated: deprecation(field.is_deprecated, field.deprecation_reason.as_deref()),
            experimental,
            arguments,
            return_type,
            return_optional,
            cache_policy: Default::default(),
        })
    }

    fn argument(&self, input: &InputValue) -> Result<Argument, IntrospectionError> {
        let (type_ref, optional) = self.type_ref(&input.type_ref, &input.name)?;

        Ok(Argument {
            name: input.name.clone(),
            native_name: input.name.clone(),
            description: input.description.clone(),
            type_ref,
            optional,
            default_value: input.default_value.as_deref().map(parse_default_value),
            contextual_path: None,
            ignore_patterns: None,
        })
    }

    /// Returns the type reference and whether it is nullable.
    fn type_ref(&self, introspected: &IntrospectedTypeRef, member: &str) -> Result<(TypeRef, bool), IntrospectionError> {
        let location = || format!("{}.{member}", self.location);

        match introspected.kind {
            TypeKind::NonNull => {
                let inner = introspected
                    .of_type
                    .as_deref()
                    .ok_or_else(|| IntrospectionError::MissingTypeName { location: location() })?;
                let (type_ref, _) = self.type_ref(inner, member)?;
                Ok((type_ref, false))
            }
            TypeKind::List => {
                let inner = introspected
                    .of_type
                    .as_deref()
                    .ok_or_else(|| IntrospectionError::MissingTypeName { location: location() })?;
                let (element, _) = self.type_ref(inner, member)?;
                Ok((TypeRef::list(element), true))
            }
            _ => {
                let name = introspected
                    .name
                    .as_deref()
                    .ok_or_else(|| IntrospectionError::MissingTypeName { location: location() })?;

                let kind = match self.kinds.get(name) {
                    Some(kind) => *kind,
                    None if builtin::is_builtin(name) => TypeKind::Scalar,
                    None => {
                        return Err(IntrospectionError::UnknownType {
                            name: name.to_string(),
                            location: location(),
                        })
                    }
                };

                let type_ref = match kind {
                    TypeKind::Object => TypeRef::object(name),
                    TypeKind::Interface => TypeRef::interface(name),
                    TypeKind::InputObject => TypeRef::input_object(name),
                    TypeKind::Enum => TypeRef::enumeration(name, self.enum_values(name)),
                    _ if name == builtin::VOID => TypeRef::Void,
                    _ => TypeRef::scalar(name),
                };

                Ok((type_ref, true))
            }
        }
    }

    fn enum_values(&self, name: &str) -> Vec<String> {
        self.types
            .iter()
            .find(|full_type| full_type.name == name)
            .and_then(|full_type| full_type.enum_values.as_ref())
            .map(|values| values.iter().map(|value| value.name.clone()).collect())
            .unwrap_or_default()
    }
}

fn deprecation(is_deprecated: bool, reason: Option<&str>) -> Option<String> {
    is_deprecated.then(|| reason.unwrap_or_default().to_string())
}

/// Default values are GraphQL literals. JSON compatible literals are kept as is, bare
/// identifiers (enum values) become strings.
fn parse_default_value(literal: &str) -> WireValue {
    WireValue::from_json_str(literal).unwrap_or_else(|_| WireValue::String(literal.to_string()))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    const SCHEMA: &str = indoc! {r#"
        {
          "data": {
            "__schema": {
              "queryType": { "name": "Query" },
              "types": [
                {
                  "kind": "OBJECT",
                  "name": "Query",
                  "fields": [
                    {
                      "name": "container",
                      "args": [
                        { "name": "platform", "type": { "kind": "SCALAR", "name": "Platform" }, "defaultValue": null }
                      ],
                      "type": { "kind": "NON_NULL", "ofType": { "kind": "OBJECT", "name": "Container" } },
                      "isDeprecated": false
                    }
                  ]
                },
                {
                  "kind": "OBJECT",
                  "name": "Container",
                  "fields": [
                    {
                      "name": "id",
                      "args": [],
                      "type": { "kind": "NON_NULL", "ofType": { "kind": "SCALAR", "name": "ContainerID" } }
                    },
                    {
                      "name": "withExec",
                      "args": [
                        {
                          "name": "args",
                          "type": {
                            "kind": "NON_NULL",
                            "ofType": { "kind": "LIST", "ofType": { "kind": "NON_NULL", "ofType": { "kind": "SCALAR", "name": "String" } } }
                          }
                        },
                        { "name": "insecure", "type": { "kind": "SCALAR", "name": "Boolean" }, "defaultValue": "false" },
                        { "name": "protocol", "type": { "kind": "ENUM", "name": "NetworkProtocol" }, "defaultValue": "TCP" }
                      ],
                      "type": { "kind": "NON_NULL", "ofType": { "kind": "OBJECT", "name": "Container" } }
                    },
                    {
                      "name": "stdout",
                      "args": [],
                      "type": { "kind": "NON_NULL", "ofType": { "kind": "SCALAR", "name": "String" } },
                      "isDeprecated": true,
                      "deprecationReason": "Use `combinedOutput` instead."
                    }
                  ]
                },
                { "kind": "SCALAR", "name": "ContainerID" },
                { "kind": "SCALAR", "name": "Platform" },
                { "kind": "SCALAR", "name": "String" },
                { "kind": "SCALAR", "name": "Boolean" },
                {
                  "kind": "ENUM",
                  "name": "NetworkProtocol",
                  "enumValues": [ { "name": "TCP" }, { "name": "UDP" } ]
                },
                { "kind": "UNION", "name": "Anything" },
                { "kind": "OBJECT", "name": "__Type", "fields": [] }
              ]
            }
          }
        }
    "#};

    #[test]
    fn parses_objects_with_their_functions() {
        let model = parse(SCHEMA).unwrap();

        let container = model.object("Container").unwrap();
        assert!(container.provides_identity);
        assert!(!model.object("Query").unwrap().provides_identity);
        assert!(model.object("__Type").is_none());

        let with_exec = &container.functions["withExec"];
        assert_eq!(with_exec.return_type, TypeRef::object("Container"));
        assert!(!with_exec.return_optional);

        let args = &with_exec.arguments[0];
        assert_eq!(args.type_ref, TypeRef::list(TypeRef::string()));
        assert!(!args.optional);

        let insecure = &with_exec.arguments[1];
        assert!(insecure.optional);
        assert_eq!(insecure.default_value, Some(WireValue::Boolean(false)));

        let protocol = &with_exec.arguments[2];
        assert_eq!(protocol.type_ref, TypeRef::enumeration("NetworkProtocol", ["TCP", "UDP"]));
        assert_eq!(protocol.default_value, Some(WireValue::String("TCP".into())));
    }

    #[test]
    fn keeps_deprecation_reasons() {
        let model = parse(SCHEMA).unwrap();
        let stdout = &model.object("Container").unwrap().functions["stdout"];

        assert_eq!(stdout.deprecated.as_deref(), Some("Use `combinedOutput` instead."));
    }

    #[test]
    fn enum_members_get_native_names() {
        let model = parse(SCHEMA).unwrap();
        let protocol = model.enumeration("NetworkProtocol").unwrap();

        assert_eq!(protocol.api_to_native("UDP"), Some("Udp"));
        assert!(model.scalars.contains_key("Platform"));
        assert!(!model.scalars.contains_key("String"));
        assert!(model.definition("Anything").is_none());
    }

    #[test]
    fn accepts_a_bare_schema_document() {
        let model = parse(r#"{"__schema":{"types":[{"kind":"SCALAR","name":"Void"}]}}"#).unwrap();
        assert!(model.scalars.contains_key("Void"));
    }

    #[test]
    fn unknown_references_are_rejected() {
        let json = r#"{"__schema":{"types":[{"kind":"OBJECT","name":"Query","fields":[
            {"name":"missing","args":[],"type":{"kind":"OBJECT","name":"Missing"}}
        ]}]}}"#;

        let error = parse(json).unwrap_err();
        assert_eq!(error.to_string(), "type reference to Missing in Query.missing is not a known type");
    }
}
