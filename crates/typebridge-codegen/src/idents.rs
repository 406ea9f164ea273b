use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, TokenStreamExt};
use typebridge_model::names;

/// Rust type of a schema type: `GitRepository`, `ContainerId`.
#[derive(Clone, Copy)]
pub(crate) struct TypeIdent<'a>(pub &'a str);

impl ToTokens for TypeIdent<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.append(ident(&names::rust_type_name(self.0)));
    }
}

/// Method, field and module names: `with_exec`, `r#type`.
#[derive(Clone, Copy)]
pub(crate) struct FieldIdent<'a>(pub &'a str);

impl ToTokens for FieldIdent<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.append(ident(&names::rust_field_name(self.0)));
    }
}

/// A method parameter. Never shadows the locals of generated methods.
#[derive(Clone, Copy)]
pub(crate) struct ParamIdent<'a>(pub &'a str);

impl ToTokens for ParamIdent<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = names::rust_field_name(self.0);
        match name.as_str() {
            "query" | "opts" => tokens.append(ident(&format!("{name}_"))),
            _ => tokens.append(ident(&name)),
        }
    }
}

/// `{Parent}{Field}Opts`, the optional arguments of a function.
#[derive(Clone, Copy)]
pub(crate) struct OptsIdent<'a> {
    pub parent: &'a str,
    pub function: &'a str,
}

impl ToTokens for OptsIdent<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = format!(
            "{}{}Opts",
            names::rust_type_name(self.parent).trim_start_matches("r#"),
            names::type_name(self.function)
        );
        tokens.append(ident(&name));
    }
}

/// `{field}_opts`, the method variant taking the optional arguments.
#[derive(Clone, Copy)]
pub(crate) struct OptsMethodIdent<'a>(pub &'a str);

impl ToTokens for OptsMethodIdent<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = names::rust_field_name(self.0);
        let name = name.trim_start_matches("r#").trim_end_matches('_');
        tokens.append(ident(&format!("{name}_opts")));
    }
}

/// Name of the file and module holding a definition.
pub(crate) fn module_name(type_name: &str) -> String {
    names::rust_field_name(type_name).trim_start_matches("r#").to_string()
}

pub(crate) fn ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}
