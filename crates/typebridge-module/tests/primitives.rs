use std::{collections::VecDeque, sync::Arc};

use indoc::indoc;
use rstest::rstest;
use serde_json::json;
use typebridge_client::{test_utils::ScriptedClient, DynGraphqlClient};
use typebridge_codec::{Codec, RemoteLoader};
use typebridge_model::{TypeModel, WireValue};
use typebridge_module::{object, DispatchError, Dispatcher, Invocation, Registry};
use typebridge_scanner::{scan, ScanOptions, SourceUnit};

const SOURCE: &str = indoc! {r#"
    #[object]
    pub struct Echo {}

    #[object]
    impl Echo {
        #[function]
        pub fn echo_i8(&self, value: i8) -> i8 { value }
        #[function]
        pub fn echo_i16(&self, value: i16) -> i16 { value }
        #[function]
        pub fn echo_i32(&self, value: i32) -> i32 { value }
        #[function]
        pub fn echo_i64(&self, value: i64) -> i64 { value }
        #[function]
        pub fn echo_u8(&self, value: u8) -> u8 { value }
        #[function]
        pub fn echo_u16(&self, value: u16) -> u16 { value }
        #[function]
        pub fn echo_u32(&self, value: u32) -> u32 { value }
        #[function]
        pub fn echo_f32(&self, value: f32) -> f32 { value }
        #[function]
        pub fn echo_f64(&self, value: f64) -> f64 { value }
        #[function]
        pub fn echo_bool(&self, value: bool) -> bool { value }
        #[function]
        pub fn echo_deque(&self, value: VecDeque<u32>) -> VecDeque<u32> { value }
    }
"#};

#[object]
#[derive(Debug, Default)]
pub struct Echo {}

#[object]
impl Echo {
    #[function]
    pub fn echo_i8(&self, value: i8) -> i8 {
        value
    }

    #[function]
    pub fn echo_i16(&self, value: i16) -> i16 {
        value
    }

    #[function]
    pub fn echo_i32(&self, value: i32) -> i32 {
        value
    }

    #[function]
    pub fn echo_i64(&self, value: i64) -> i64 {
        value
    }

    #[function]
    pub fn echo_u8(&self, value: u8) -> u8 {
        value
    }

    #[function]
    pub fn echo_u16(&self, value: u16) -> u16 {
        value
    }

    #[function]
    pub fn echo_u32(&self, value: u32) -> u32 {
        value
    }

    #[function]
    pub fn echo_f32(&self, value: f32) -> f32 {
        value
    }

    #[function]
    pub fn echo_f64(&self, value: f64) -> f64 {
        value
    }

    #[function]
    pub fn echo_bool(&self, value: bool) -> bool {
        value
    }

    #[function]
    pub fn echo_deque(&self, value: VecDeque<u32>) -> VecDeque<u32> {
        value
    }
}

async fn dispatch(function: &str, value: WireValue) -> Result<WireValue, DispatchError> {
    let client: DynGraphqlClient = Arc::new(ScriptedClient::default());
    let model = scan(&[SourceUnit::new("src/lib.rs", SOURCE)], &ScanOptions::new("echo")).unwrap();
    let remote = TypeModel::default();
    let loader = RemoteLoader::new(client);
    let registry = Registry::builder().register::<Echo>().build();

    let codec = Codec::new(&model, &remote, &loader);
    Dispatcher::new(&registry, codec)
        .dispatch(Invocation::new("Echo", function).with_arg("value", value))
        .await
}

#[rstest]
#[case::i8("echoI8", json!(-8))]
#[case::i16("echoI16", json!(-1600))]
#[case::i32("echoI32", json!(-320_000))]
#[case::i64("echoI64", json!(i64::MIN))]
#[case::u8("echoU8", json!(255))]
#[case::u16("echoU16", json!(65_535))]
#[case::u32("echoU32", json!(4_294_967_295_u32))]
#[case::f32("echoF32", json!(1.5))]
#[case::f64("echoF64", json!(-0.25))]
#[case::bool("echoBool", json!(true))]
#[case::deque("echoDeque", json!([1, 2, 3]))]
#[tokio::test]
async fn scanned_primitives_dispatch(#[case] function: &str, #[case] value: serde_json::Value) {
    let echoed = dispatch(function, WireValue::from(value.clone())).await.unwrap();

    assert_eq!(echoed, WireValue::from(value));
}

#[rstest]
#[case::u8("echoU8", json!(256), "expected u8, found 256")]
#[case::u32("echoU32", json!(-1), "expected u32, found -1")]
#[case::deque("echoDeque", json!([1, -2]), "expected u32, found -2")]
#[tokio::test]
async fn out_of_range_integers_fail_to_marshal(
    #[case] function: &str,
    #[case] value: serde_json::Value,
    #[case] message: &str,
) {
    let error = dispatch(function, WireValue::from(value)).await.unwrap_err();

    assert!(matches!(error, DispatchError::Codec(_)), "{error}");
    assert_eq!(error.to_string(), message);
}
