use tracing::instrument;
use typebridge_client::{query, DynGraphqlClient, Selection};
use typebridge_model::{builtin, CachePolicy, TypeRef, WireValue};

use crate::{ArgumentDecl, Declaration, FieldDecl, FunctionDecl, RegistrationError, RegistrationPlan, TypeUse};

#[derive(Clone, Copy)]
enum Container {
    Object,
    Interface,
    Enum,
}

#[derive(Clone, Copy)]
enum Slot {
    Function,
    Constructor,
}

/// Folds the declarations into query trees. Nested definitions are passed by ID, resolved
/// lazily when the enclosing tree is built.
struct Fold<'a> {
    client: &'a DynGraphqlClient,
    module: Selection,
    container: Option<(Container, Selection)>,
    function: Option<(Slot, Selection)>,
}

#[instrument(skip_all, fields(declarations = plan.len()))]
pub(crate) async fn commit(plan: &RegistrationPlan, client: &DynGraphqlClient) -> Result<String, RegistrationError> {
    let mut fold = Fold {
        client,
        module: query().select("module"),
        container: None,
        function: None,
    };

    for declaration in plan.declarations() {
        tracing::debug!(%declaration, "declaring");
        fold.apply(declaration)?;
    }

    let module = fold.finish()?;
    let id: String = module.select("id").execute(client).await?;

    tracing::debug!(module_id = id.as_str(), "module registered");
    Ok(id)
}

impl Fold<'_> {
    fn apply(&mut self, declaration: &Declaration) -> Result<(), RegistrationError> {
        match declaration {
            Declaration::ModuleDescription(description) => {
                self.module = self.module.select("withDescription").arg("description", description.as_str());
            }
            Declaration::DeclareObject {
                name,
                description,
                deprecated,
            } => {
                self.flush_container()?;
                let object = query()
                    .select("typeDef")
                    .select("withObject")
                    .arg("name", name.as_str())
                    .arg_opt("description", description.as_deref())
                    .arg_opt("deprecated", deprecated.as_deref());
                self.container = Some((Container::Object, object));
            }
            Declaration::DeclareInterface { name, description } => {
                self.flush_container()?;
                let interface = query()
                    .select("typeDef")
                    .select("withInterface")
                    .arg("name", name.as_str())
                    .arg_opt("description", description.as_deref());
                self.container = Some((Container::Interface, interface));
            }
            Declaration::DeclareEnum { name, description } => {
                self.flush_container()?;
                let enumeration = query()
                    .select("typeDef")
                    .select("withEnum")
                    .arg("name", name.as_str())
                    .arg_opt("description", description.as_deref());
                self.container = Some((Container::Enum, enumeration));
            }
            Declaration::DeclareFunction(function) => {
                self.flush_function()?;
                self.function = Some((Slot::Function, self.function_def(function)));
            }
            Declaration::AttachConstructor { object } => {
                self.flush_function()?;
                let returns = query().select("typeDef").select("withObject").arg("name", object.as_str());
                let constructor = self.with_id(query().select("function").arg("name", ""), "returnType", returns);
                self.function = Some((Slot::Constructor, constructor));
            }
            Declaration::AttachArgument(argument) => {
                let Some((slot, function)) = self.function.take() else {
                    return Err(misplaced(declaration, "function"));
                };
                self.function = Some((slot, self.with_argument(&function, argument)));
            }
            Declaration::AttachField(field) => {
                self.flush_function()?;
                let Some((kind, container)) = self.container.take() else {
                    return Err(misplaced(declaration, "object"));
                };
                self.container = Some((kind, self.with_field(&container, field)));
            }
            Declaration::AttachEnumMember {
                name,
                description,
                deprecated,
            } => {
                let Some((kind, container)) = self.container.take() else {
                    return Err(misplaced(declaration, "enum"));
                };
                let container = container
                    .select("withEnumMember")
                    .arg("name", name.as_str())
                    .arg_opt("description", description.as_deref())
                    .arg_opt("deprecated", deprecated.as_deref());
                self.container = Some((kind, container));
            }
        }

        Ok(())
    }

    fn finish(mut self) -> Result<Selection, RegistrationError> {
        self.flush_container()?;
        Ok(self.module)
    }

    fn flush_function(&mut self) -> Result<(), RegistrationError> {
        let Some((slot, function)) = self.function.take() else {
            return Ok(());
        };

        let Some((kind, container)) = self.container.take() else {
            return Err(RegistrationError::Misplaced {
                declaration: "function".to_string(),
                expected: "object or interface",
            });
        };

        let field = match slot {
            Slot::Function => "withFunction",
            Slot::Constructor => "withConstructor",
        };

        self.container = Some((kind, self.with_id(container.select(field), "function", function)));
        Ok(())
    }

    fn flush_container(&mut self) -> Result<(), RegistrationError> {
        self.flush_function()?;

        if let Some((kind, container)) = self.container.take() {
            let (field, argument) = match kind {
                Container::Object => ("withObject", "object"),
                Container::Interface => ("withInterface", "iface"),
                Container::Enum => ("withEnum", "enum"),
            };
            self.module = self.with_id(self.module.select(field), argument, container);
        }

        Ok(())
    }

    fn function_def(&self, function: &FunctionDecl) -> Selection {
        let mut def = self.with_id(
            query().select("function").arg("name", function.name.as_str()),
            "returnType",
            self.type_def(&function.return_type),
        );

        if let Some(description) = &function.description {
            def = def.select("withDescription").arg("description", description.as_str());
        }

        if let Some(reason) = &function.deprecated {
            def = def.select("withDeprecated").arg("reason", reason.as_str());
        }

        match function.cache_policy {
            CachePolicy::Default => def,
            CachePolicy::Never => def.select("withCachePolicy").arg_enum("policy", "Never"),
            CachePolicy::Session => def.select("withCachePolicy").arg_enum("policy", "PerSession"),
            CachePolicy::Ttl(_) => def
                .select("withCachePolicy")
                .arg_enum("policy", "Default")
                .arg_opt("timeToLive", function.cache_policy.time_to_live()),
        }
    }

    fn with_argument(&self, function: &Selection, argument: &ArgumentDecl) -> Selection {
        let def = self.with_id(
            function.select("withArg").arg("name", argument.name.as_str()),
            "typeDef",
            self.type_def(&argument.type_use),
        );

        def.arg_opt("description", argument.description.as_deref())
            .arg_opt(
                "defaultValue",
                argument.default_value.as_ref().map(WireValue::to_json_string),
            )
            .arg_opt("defaultPath", argument.contextual_path.as_deref())
            .arg_opt("ignore", argument.ignore_patterns.clone())
    }

    fn with_field(&self, container: &Selection, field: &FieldDecl) -> Selection {
        let def = self.with_id(
            container.select("withField").arg("name", field.name.as_str()),
            "typeDef",
            self.type_def(&field.type_use),
        );

        def.arg_opt("description", field.description.as_deref())
            .arg_opt("deprecated", field.deprecated.as_deref())
    }

    /// The type definition of a value. List element types are passed by ID.
    fn type_def(&self, type_use: &TypeUse) -> Selection {
        let root = query().select("typeDef");

        let def = match &type_use.type_ref {
            TypeRef::Scalar { name } => match name.as_str() {
                builtin::STRING => root.select("withKind").arg_enum("kind", "STRING_KIND"),
                builtin::INT => root.select("withKind").arg_enum("kind", "INTEGER_KIND"),
                builtin::FLOAT => root.select("withKind").arg_enum("kind", "FLOAT_KIND"),
                builtin::BOOLEAN => root.select("withKind").arg_enum("kind", "BOOLEAN_KIND"),
                name => root.select("withScalar").arg("name", name),
            },
            TypeRef::Object { name } | TypeRef::InputObject { name } => {
                root.select("withObject").arg("name", name.as_str())
            }
            TypeRef::Interface { name } => root.select("withInterface").arg("name", name.as_str()),
            TypeRef::Enum { name, .. } => root.select("withEnum").arg("name", name.as_str()),
            TypeRef::List { element } => {
                let element = self.type_def(&TypeUse::new(element.as_ref().clone(), false));
                self.with_id(root.select("withListOf"), "elementType", element)
            }
            TypeRef::Void => root.select("withKind").arg_enum("kind", "VOID_KIND"),
        };

        if type_use.optional || type_use.type_ref.is_void() {
            def.select("withOptional").arg("value", true)
        } else {
            def
        }
    }

    /// Passes `target` to `selection` by its ID, fetched in its own request when the
    /// enclosing query is built.
    fn with_id(&self, selection: Selection, argument: &str, target: Selection) -> Selection {
        with_id(self.client, &selection, argument, target)
    }
}

fn with_id(client: &DynGraphqlClient, selection: &Selection, argument: &str, target: Selection) -> Selection {
    let client = client.clone();

    selection.arg_lazy(argument, move || {
        let target = target.select("id");
        let client = client.clone();
        async move { target.execute::<String>(&client).await.map(WireValue::String) }
    })
}

fn misplaced(declaration: &Declaration, expected: &'static str) -> RegistrationError {
    RegistrationError::Misplaced {
        declaration: declaration.to_string(),
        expected,
    }
}
