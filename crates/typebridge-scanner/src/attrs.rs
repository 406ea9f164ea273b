use syn::{spanned::Spanned, Attribute, Expr, Lit, LitStr, Meta, UnOp};
use typebridge_model::{Number, WireValue};

pub(crate) const OBJECT: &str = "object";
pub(crate) const INTERFACE: &str = "interface";
pub(crate) const ENUMERATION: &str = "enumeration";
pub(crate) const FUNCTION: &str = "function";
pub(crate) const CONSTRUCTOR: &str = "constructor";
pub(crate) const FIELD: &str = "field";
pub(crate) const ARG: &str = "arg";
pub(crate) const VALUE: &str = "value";

/// Finds a marker by the last segment of its path, so that `#[object]` and
/// `#[typebridge_module::object]` are both recognized.
pub(crate) fn find<'a>(attrs: &'a [Attribute], marker: &str) -> Option<&'a Attribute> {
    attrs
        .iter()
        .find(|attr| attr.path().segments.last().is_some_and(|segment| segment.ident == marker))
}

pub(crate) fn has(attrs: &[Attribute], marker: &str) -> bool {
    find(attrs, marker).is_some()
}

/// Joins `///` comments, stripping the single space rustdoc conventionally adds.
pub(crate) fn docs(attrs: &[Attribute]) -> Option<String> {
    let lines = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(syn::ExprLit { lit: Lit::Str(text), .. }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').map(str::to_string).unwrap_or(line))
        .collect::<Vec<_>>();

    let joined = lines.join("\n");
    let trimmed = joined.trim();

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `#[deprecated]`, `#[deprecated = "..."]` and `#[deprecated(note = "...")]`.
pub(crate) fn deprecated(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("deprecated")) else {
        return Ok(None);
    };

    match &attr.meta {
        Meta::Path(_) => Ok(Some(String::new())),
        Meta::NameValue(name_value) => match &name_value.value {
            Expr::Lit(syn::ExprLit { lit: Lit::Str(note), .. }) => Ok(Some(note.value())),
            other => Err(syn::Error::new(other.span(), "expected a string literal")),
        },
        Meta::List(_) => {
            let mut note = String::new();
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("note") {
                    note = meta.value()?.parse::<LitStr>()?.value();
                } else {
                    let _ = meta.value()?.parse::<Expr>()?;
                }
                Ok(())
            })?;
            Ok(Some(note))
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FunctionArgs {
    pub(crate) name: Option<String>,
    pub(crate) cache: Option<String>,
    pub(crate) experimental: Option<String>,
}

/// `#[function(name = "...", cache = "...", experimental = "...")]`.
pub(crate) fn function_args(attr: &Attribute) -> syn::Result<FunctionArgs> {
    let mut args = FunctionArgs::default();
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(args);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            args.name = Some(meta.value()?.parse::<LitStr>()?.value());
        } else if meta.path.is_ident("cache") {
            args.cache = Some(meta.value()?.parse::<LitStr>()?.value());
        } else if meta.path.is_ident("experimental") {
            args.experimental = Some(meta.value()?.parse::<LitStr>()?.value());
        } else {
            return Err(meta.error("expected `name`, `cache` or `experimental`"));
        }
        Ok(())
    })?;

    Ok(args)
}

/// `#[field(name = "...")]` and `#[value(name = "...")]`.
pub(crate) fn rename(attr: &Attribute) -> syn::Result<Option<String>> {
    let mut name = None;
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(name);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?.value());
            Ok(())
        } else {
            Err(meta.error("expected `name`"))
        }
    })?;

    Ok(name)
}

#[derive(Debug, Default)]
pub(crate) struct ArgArgs {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) default: Option<WireValue>,
    pub(crate) default_path: Option<String>,
    pub(crate) ignore: Option<Vec<String>>,
}

/// `#[arg(name = "...", description = "...", default = <literal>, default_path = "...", ignore = [...])]`.
pub(crate) fn arg_args(attr: &Attribute) -> syn::Result<ArgArgs> {
    let mut args = ArgArgs::default();
    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(args);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            args.name = Some(meta.value()?.parse::<LitStr>()?.value());
        } else if meta.path.is_ident("description") {
            args.description = Some(meta.value()?.parse::<LitStr>()?.value());
        } else if meta.path.is_ident("default") {
            let expr = meta.value()?.parse::<Expr>()?;
            args.default = Some(literal(&expr)?);
        } else if meta.path.is_ident("default_path") {
            args.default_path = Some(meta.value()?.parse::<LitStr>()?.value());
        } else if meta.path.is_ident("ignore") {
            let expr = meta.value()?.parse::<Expr>()?;
            let patterns = match literal(&expr)? {
                WireValue::List(values) => values
                    .into_iter()
                    .map(|value| match value {
                        WireValue::String(pattern) => Ok(pattern),
                        _ => Err(syn::Error::new(expr.span(), "ignore patterns must be strings")),
                    })
                    .collect::<syn::Result<Vec<_>>>()?,
                _ => return Err(syn::Error::new(expr.span(), "expected a list of patterns")),
            };
            args.ignore = Some(patterns);
        } else {
            return Err(meta.error("expected `name`, `description`, `default`, `default_path` or `ignore`"));
        }
        Ok(())
    })?;

    Ok(args)
}

/// Converts a literal expression into its JSON value.
///
/// Paths such as `Language::French` keep their last segment, the native name of an enum member.
pub(crate) fn literal(expr: &Expr) -> syn::Result<WireValue> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(text) => Ok(WireValue::String(text.value())),
            Lit::Bool(value) => Ok(WireValue::Boolean(value.value)),
            Lit::Int(value) => Ok(WireValue::Number(Number::Int(value.base10_parse()?))),
            Lit::Float(value) => Ok(WireValue::Number(Number::Float(value.base10_parse()?))),
            other => Err(syn::Error::new(other.span(), "unsupported default value literal")),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match literal(&unary.expr)? {
            WireValue::Number(Number::Int(value)) => Ok(WireValue::Number(Number::Int(-value))),
            WireValue::Number(Number::Float(value)) => Ok(WireValue::Number(Number::Float(-value))),
            _ => Err(syn::Error::new(unary.span(), "only numbers can be negated")),
        },
        Expr::Array(array) => array
            .elems
            .iter()
            .map(literal)
            .collect::<syn::Result<Vec<_>>>()
            .map(WireValue::List),
        Expr::Path(path) if path.path.is_ident("None") => Ok(WireValue::Null),
        Expr::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| WireValue::String(segment.ident.to_string()))
            .ok_or_else(|| syn::Error::new(path.span(), "empty path")),
        Expr::Group(group) => literal(&group.expr),
        Expr::Paren(paren) => literal(&paren.expr),
        other => Err(syn::Error::new(other.span(), "default values must be literals")),
    }
}
