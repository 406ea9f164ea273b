use std::sync::Arc;

use indoc::indoc;
use serde_json::json;
use typebridge_client::{test_utils::ScriptedClient, DynGraphqlClient};
use typebridge_codec::{Codec, RemoteLoader};
use typebridge_model::{TypeModel, WireValue};
use typebridge_module::{
    enumeration, interface, object, CodecError, DispatchError, Dispatcher, FromValue, IntoValue, Invocation,
    ModuleObject, ObjectValue, Registry, RemoteObjectHandle, Value,
};
use typebridge_scanner::{scan, ScanOptions, SourceUnit};

/// The module below, as the scanner reads it.
const SOURCE: &str = indoc! {r#"
    #[enumeration]
    pub enum Language {
        English,
        #[value(name = "FR")]
        French,
    }

    #[interface]
    pub trait Named {
        fn name(&self) -> String;
    }

    #[object]
    pub struct Greeter {
        #[field]
        prefix: String,
        #[field(name = "lang")]
        language: Language,
        calls: u32,
    }

    #[object]
    impl Greeter {
        #[constructor]
        pub fn new(#[arg(default = "Hello")] prefix: String, language: Option<Language>) -> Self {
            todo!()
        }

        #[function]
        pub fn greeting(&self, name: &str) -> String {
            todo!()
        }

        #[function]
        pub async fn shout(&mut self, words: &[String]) -> anyhow::Result<String> {
            todo!()
        }

        #[function]
        pub fn with_language(self, language: Language) -> Self {
            todo!()
        }

        #[function]
        pub fn count(&self, items: Vec<NamedRef>) -> u32 {
            todo!()
        }
    }
"#};

#[enumeration]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    #[default]
    English,
    #[value(name = "FR")]
    French,
}

#[interface]
pub trait Named {
    fn name(&self) -> String;
}

#[object]
#[derive(Debug, Default)]
pub struct Greeter {
    #[field]
    prefix: String,
    #[field(name = "lang")]
    language: Language,
    calls: u32,
}

#[object]
impl Greeter {
    #[constructor]
    pub fn new(#[arg(default = "Hello")] prefix: String, language: Option<Language>) -> Self {
        Self {
            prefix,
            language: language.unwrap_or_default(),
            calls: 0,
        }
    }

    #[function]
    pub fn greeting(&self, name: &str) -> String {
        format!("{} {name}", self.prefix)
    }

    #[function]
    pub async fn shout(&mut self, words: &[String]) -> anyhow::Result<String> {
        self.calls += 1;
        if words.is_empty() {
            anyhow::bail!("nothing to shout");
        }
        Ok(words.join(" ").to_uppercase())
    }

    #[function]
    pub fn with_language(self, language: Language) -> Self {
        Self { language, ..self }
    }

    #[function]
    pub fn count(&self, items: Vec<NamedRef>) -> u32 {
        items.iter().filter(|item| item.handle().type_name() == NamedRef::INTERFACE).count() as u32
    }
}

struct Module {
    model: TypeModel,
    remote: TypeModel,
    loader: RemoteLoader,
    registry: Registry,
}

impl Module {
    fn new() -> Self {
        let client: DynGraphqlClient = Arc::new(ScriptedClient::default());
        let model = scan(&[SourceUnit::new("src/lib.rs", SOURCE)], &ScanOptions::new("greeter")).unwrap();

        Self {
            model,
            remote: TypeModel::default(),
            loader: RemoteLoader::new(client),
            registry: Registry::builder().register::<Greeter>().build(),
        }
    }

    async fn dispatch(&self, invocation: Invocation) -> Result<WireValue, DispatchError> {
        let codec = Codec::new(&self.model, &self.remote, &self.loader);
        Dispatcher::new(&self.registry, codec).dispatch(invocation).await
    }
}

#[test]
fn objects_convert_from_and_into_their_state() {
    let greeter = Greeter::restore(ObjectValue::new("Greeter").with("prefix", "Hey")).unwrap();

    assert_eq!(greeter.prefix, "Hey");
    assert_eq!(greeter.language, Language::English);
    assert_eq!(Greeter::NAME, "Greeter");

    let state = ObjectValue::from_value(greeter.into_value()).unwrap();
    assert_eq!(
        state,
        ObjectValue::new("Greeter")
            .with("prefix", "Hey")
            .with("language", Value::Enum("English".into()))
            .with("calls", 0_u32)
    );
}

#[test]
fn enums_convert_by_native_name() {
    assert_eq!(Language::from_value(Value::Enum("French".into())).unwrap(), Language::French);
    assert_eq!(Language::French.into_value(), Value::Enum("French".into()));

    let error = Language::from_value(Value::Enum("Klingon".into())).unwrap_err();
    assert!(matches!(error, CodecError::UnknownEnumValue { enum_name, value } if enum_name == "Language" && value == "Klingon"));
}

#[test]
fn interface_values_are_handles() {
    let client: DynGraphqlClient = Arc::new(ScriptedClient::default());
    let handle = RemoteObjectHandle::from_id("Named", "named:1", client);

    let named = NamedRef::from_value(Value::Handle(handle)).unwrap();
    assert_eq!(named.handle().known_id(), Some("named:1"));

    assert!(NamedRef::from_value(Value::String("named:1".into())).is_err());
}

#[tokio::test]
async fn constructs_with_declared_defaults() {
    let module = Module::new();

    let state = module.dispatch(Invocation::new("Greeter", "")).await.unwrap();

    assert_eq!(
        state,
        WireValue::from(json!({ "prefix": "Hello", "lang": "ENGLISH", "calls": 0 }))
    );
}

#[tokio::test]
async fn calls_functions_on_restored_instances() {
    let module = Module::new();

    let greeting = module
        .dispatch(
            Invocation::new("Greeter", "greeting")
                .with_state("prefix", "Hey")
                .with_state("lang", "FR")
                .with_arg("name", "world"),
        )
        .await
        .unwrap();
    assert_eq!(greeting, WireValue::from("Hey world"));

    let shouted = module
        .dispatch(Invocation::new("Greeter", "shout").with_arg("words", vec!["hello", "there"]))
        .await
        .unwrap();
    assert_eq!(shouted, WireValue::from("HELLO THERE"));

    let state = module
        .dispatch(
            Invocation::new("Greeter", "withLanguage")
                .with_state("prefix", "Hey")
                .with_arg("language", "FR"),
        )
        .await
        .unwrap();
    assert_eq!(
        state,
        WireValue::from(json!({ "prefix": "Hey", "lang": "FR", "calls": 0 }))
    );
}

#[tokio::test]
async fn interface_arguments_are_loaded_by_id() {
    let module = Module::new();

    let count = module
        .dispatch(Invocation::new("Greeter", "count").with_arg("items", vec!["named:1", "named:2"]))
        .await
        .unwrap();

    assert_eq!(count, WireValue::from(2_i64));
}

#[tokio::test]
async fn handler_errors_are_function_errors() {
    let module = Module::new();

    let error = module
        .dispatch(Invocation::new("Greeter", "shout").with_arg("words", Vec::<String>::new()))
        .await
        .unwrap_err();

    assert!(error.is_function_error());
    assert_eq!(error.to_string(), "nothing to shout");
}
