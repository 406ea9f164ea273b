use syn::Attribute;

pub(crate) const FUNCTION: &str = "function";
pub(crate) const CONSTRUCTOR: &str = "constructor";
pub(crate) const FIELD: &str = "field";
pub(crate) const ARG: &str = "arg";
pub(crate) const VALUE: &str = "value";

/// Markers are matched by the last segment of their path, like the scanner does.
pub(crate) fn is_marker(attr: &Attribute, marker: &str) -> bool {
    attr.path().segments.last().is_some_and(|segment| segment.ident == marker)
}

/// Removes the markers and reports whether any was present.
pub(crate) fn strip(attrs: &mut Vec<Attribute>, marker: &str) -> bool {
    let before = attrs.len();
    attrs.retain(|attr| !is_marker(attr, marker));
    attrs.len() != before
}
