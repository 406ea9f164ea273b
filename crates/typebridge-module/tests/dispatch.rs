use std::sync::{Arc, Mutex};

use serde_json::json;
use typebridge_client::{test_utils::ScriptedClient, DynGraphqlClient};
use typebridge_codec::{Codec, RemoteLoader};
use typebridge_model::{Argument, FieldDef, FunctionDef, ObjectDef, TypeModel, TypeRef, WireValue};
use typebridge_module::{
    CodecError, DispatchError, DispatchState, Dispatcher, FromValue, IntoValue, Invocation, ModuleObject, ObjectValue,
    Registry, Value,
};

#[derive(Debug)]
struct Greeter {
    prefix: String,
}

impl ModuleObject for Greeter {
    const NAME: &'static str = "Greeter";

    fn allocate() -> Self {
        Self {
            prefix: "placeholder".into(),
        }
    }

    fn assign(&mut self, mut state: ObjectValue) -> Result<(), CodecError> {
        if let Some(prefix) = state.take("prefix")? {
            self.prefix = prefix;
        }
        Ok(())
    }
}

impl FromValue for Greeter {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        Self::restore(ObjectValue::from_value(value)?)
    }
}

impl IntoValue for Greeter {
    fn into_value(self) -> Value {
        ObjectValue::new(Self::NAME).with("prefix", self.prefix).into_value()
    }
}

fn model() -> TypeModel {
    let name = || Argument::new("name", TypeRef::string());

    let mut model = TypeModel::new("greeter");
    model.insert_object(
        ObjectDef::new("Greeter")
            .with_field(FieldDef::new("prefix", TypeRef::string()))
            .with_constructor(
                FunctionDef::constructor("Greeter")
                    .with_argument(Argument::new("prefix", TypeRef::string()).with_default(WireValue::from("Hello"))),
            )
            .with_function(FunctionDef::new("hello", TypeRef::string()).with_argument(name()))
            .with_function(FunctionDef::new("greeting", TypeRef::string()).with_argument(name()))
            .with_function(
                FunctionDef::new("join", TypeRef::string())
                    .with_argument(Argument::new("first", TypeRef::string()))
                    .with_argument(Argument::new("second", TypeRef::int()))
                    .with_argument(Argument::new("third", TypeRef::boolean())),
            )
            .with_function(
                FunctionDef::new("echo", TypeRef::string())
                    .with_argument(Argument::new("word", TypeRef::string()).with_default(WireValue::from("test"))),
            )
            .with_function(FunctionDef::new("info", TypeRef::object("Info")))
            .with_function(FunctionDef::new("fail", TypeRef::Void))
            .with_function(FunctionDef::new("undeclaredNative", TypeRef::Void).with_native_name("undeclared_native")),
    );
    model.insert_object(
        ObjectDef::new("Info")
            .with_field(FieldDef::new("version", TypeRef::string()))
            .with_field(FieldDef::new("details", TypeRef::object("Details"))),
    );
    model.insert_object(
        ObjectDef::new("Details").with_field(FieldDef::new("maxCount", TypeRef::int()).with_native_name("max_count")),
    );
    model
}

fn registry(echoed: Arc<Mutex<Vec<String>>>) -> Registry {
    Registry::builder()
        .object::<Greeter>(|object| {
            object
                .constructor(|mut args| async move {
                    Ok(Greeter {
                        prefix: args.take("prefix")?,
                    })
                })
                .function("hello", |_, mut args| async move {
                    let name: String = args.take("name")?;
                    Ok(format!("Hello {name}"))
                })
                .function("greeting", |this: Greeter, mut args| async move {
                    let name: String = args.take("name")?;
                    Ok(format!("{} {name}", this.prefix))
                })
                .function("join", |_, args| async move {
                    Ok(args.names().collect::<Vec<_>>().join(","))
                })
                .function("echo", move |_, mut args| {
                    let echoed = echoed.clone();
                    async move {
                        let word: String = args.take("word")?;
                        echoed.lock().unwrap().push(word.clone());
                        Ok(word)
                    }
                })
                .function("info", |_, _| async {
                    Ok(ObjectValue::new("Info")
                        .with("version", "1.0")
                        .with("details", ObjectValue::new("Details").with("max_count", 3_i64)))
                })
                .function("fail", |_, _| async { Err::<(), _>(anyhow::anyhow!("boom")) })
        })
        .build()
}

struct Fixture {
    model: TypeModel,
    remote: TypeModel,
    loader: RemoteLoader,
    registry: Registry,
    echoed: Arc<Mutex<Vec<String>>>,
}

impl Fixture {
    fn new() -> Self {
        let client: DynGraphqlClient = Arc::new(ScriptedClient::default());
        let echoed = Arc::new(Mutex::new(Vec::new()));

        Self {
            model: model(),
            remote: TypeModel::default(),
            loader: RemoteLoader::new(client),
            registry: registry(echoed.clone()),
            echoed,
        }
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.registry, Codec::new(&self.model, &self.remote, &self.loader))
    }

    async fn dispatch(&self, invocation: Invocation) -> Result<WireValue, DispatchError> {
        self.dispatcher().dispatch(invocation).await
    }
}

#[tokio::test]
async fn calls_a_function() {
    let fixture = Fixture::new();

    let result = fixture
        .dispatch(Invocation::new("Greeter", "hello").with_arg("name", "world"))
        .await
        .unwrap();

    assert_eq!(result, WireValue::from("Hello world"));
}

#[tokio::test]
async fn restores_the_parent_state_over_an_allocated_instance() {
    let fixture = Fixture::new();

    let invocation = Invocation::new("Greeter", "greeting")
        .with_state("prefix", "Hey")
        .with_arg("name", "world");
    assert_eq!(fixture.dispatch(invocation).await.unwrap(), WireValue::from("Hey world"));

    // Without state the allocated value shows through, the constructor is not run.
    let invocation = Invocation::new("Greeter", "greeting").with_arg("name", "world");
    assert_eq!(
        fixture.dispatch(invocation).await.unwrap(),
        WireValue::from("placeholder world")
    );
}

#[tokio::test]
async fn constructors_apply_their_defaults() {
    let fixture = Fixture::new();

    let state = fixture.dispatch(Invocation::new("Greeter", "")).await.unwrap();
    assert_eq!(state, WireValue::from(json!({ "prefix": "Hello" })));

    let state = fixture
        .dispatch(Invocation::new("Greeter", "").with_arg("prefix", "Hi"))
        .await
        .unwrap();
    assert_eq!(state, WireValue::from(json!({ "prefix": "Hi" })));
}

#[tokio::test]
async fn arguments_follow_the_declared_order() {
    let fixture = Fixture::new();

    let invocation = Invocation::new("Greeter", "join")
        .with_arg("third", true)
        .with_arg("first", "a")
        .with_arg("second", 2_i64);

    assert_eq!(
        fixture.dispatch(invocation).await.unwrap(),
        WireValue::from("first,second,third")
    );
}

#[tokio::test]
async fn defaults_are_applied_per_call() {
    let fixture = Fixture::new();

    fixture.dispatch(Invocation::new("Greeter", "echo")).await.unwrap();
    fixture
        .dispatch(Invocation::new("Greeter", "echo").with_arg("word", "other"))
        .await
        .unwrap();
    fixture.dispatch(Invocation::new("Greeter", "echo")).await.unwrap();

    assert_eq!(*fixture.echoed.lock().unwrap(), ["test", "other", "test"]);
}

#[tokio::test]
async fn objects_without_identity_are_serialized_field_by_field() {
    let fixture = Fixture::new();

    let result = fixture.dispatch(Invocation::new("Greeter", "info")).await.unwrap();

    assert_eq!(
        result,
        WireValue::from(json!({ "version": "1.0", "details": { "maxCount": 3 } }))
    );
}

#[tokio::test]
async fn unknown_objects_and_functions_are_rejected() {
    let fixture = Fixture::new();

    let error = fixture.dispatch(Invocation::new("Missing", "run")).await.unwrap_err();
    assert!(matches!(error, DispatchError::UnknownObject(name) if name == "Missing"));

    let error = fixture.dispatch(Invocation::new("Greeter", "nope")).await.unwrap_err();
    assert_eq!(error.to_string(), "object Greeter has no function nope");

    // Declared in the model but never registered.
    let error = fixture
        .dispatch(Invocation::new("Greeter", "undeclaredNative"))
        .await
        .unwrap_err();
    assert!(matches!(error, DispatchError::UnknownMethod { .. }));

    // Objects of the model without a native implementation are unknown as well.
    let error = fixture.dispatch(Invocation::new("Info", "")).await.unwrap_err();
    assert!(matches!(error, DispatchError::UnknownObject(_)));
}

#[tokio::test]
async fn missing_arguments_are_codec_errors() {
    let fixture = Fixture::new();

    let error = fixture.dispatch(Invocation::new("Greeter", "hello")).await.unwrap_err();

    assert!(matches!(error, DispatchError::Codec(CodecError::MissingArgument { ref name }) if name == "name"));
    assert!(!error.is_function_error());
}

#[tokio::test]
async fn a_failed_call_poisons_the_dispatcher() {
    let fixture = Fixture::new();
    let mut dispatcher = fixture.dispatcher();
    assert_eq!(dispatcher.state(), DispatchState::Idle);

    dispatcher
        .dispatch(Invocation::new("Greeter", "hello").with_arg("name", "world"))
        .await
        .unwrap();
    assert_eq!(dispatcher.state(), DispatchState::Idle);

    let error = dispatcher.dispatch(Invocation::new("Greeter", "fail")).await.unwrap_err();
    assert!(error.is_function_error());
    assert_eq!(error.to_string(), "boom");
    assert_eq!(dispatcher.state(), DispatchState::Failed);

    let error = dispatcher
        .dispatch(Invocation::new("Greeter", "hello").with_arg("name", "world"))
        .await
        .unwrap_err();
    assert!(matches!(error, DispatchError::Poisoned));
}

#[test]
fn invocations_deserialize_from_the_engine_payload() {
    let invocation: Invocation = serde_json::from_value(json!({
        "parentName": "Greeter",
        "fnName": "greeting",
        "parentState": { "prefix": "Hey" },
        "args": { "name": "world" }
    }))
    .unwrap();

    assert_eq!(
        invocation,
        Invocation::new("Greeter", "greeting")
            .with_state("prefix", "Hey")
            .with_arg("name", "world")
    );
    assert!(!invocation.is_constructor());
}
