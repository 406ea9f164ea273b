use proc_macro2::TokenStream;
use quote::{quote, ToTokens, TokenStreamExt};

/// Doc attributes of a definition. Deprecation and experimental markers only ever end up here.
#[derive(Default, Clone, Copy)]
pub(crate) struct Docs<'a> {
    pub description: Option<&'a str>,
    pub deprecated: Option<&'a str>,
    pub experimental: Option<&'a str>,
}

impl<'a> Docs<'a> {
    pub(crate) fn new(description: Option<&'a str>) -> Self {
        Self {
            description,
            ..Default::default()
        }
    }

    fn paragraphs(&self) -> Vec<String> {
        let marker = |label: &str, reason: &str| match reason.trim() {
            "" => format!("{label}."),
            reason => format!("{label}: {reason}"),
        };

        self.description
            .map(|description| description.trim().to_string())
            .into_iter()
            .chain(self.deprecated.map(|reason| marker("Deprecated", reason)))
            .chain(self.experimental.map(|reason| marker("Experimental", reason)))
            .filter(|paragraph| !paragraph.is_empty())
            .collect()
    }
}

impl ToTokens for Docs<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        for (index, paragraph) in self.paragraphs().iter().enumerate() {
            if index > 0 {
                tokens.append_all(quote! { #[doc = ""] });
            }
            for line in paragraph.lines() {
                let line = line.trim_end();
                tokens.append_all(quote! { #[doc = #line] });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_follow_the_description() {
        let docs = Docs {
            description: Some("Runs a command.\nReturns the container."),
            deprecated: Some(""),
            experimental: Some("Subject to change"),
        };

        assert_eq!(
            docs.to_token_stream().to_string(),
            concat!(
                r#"# [doc = "Runs a command."] # [doc = "Returns the container."] "#,
                r#"# [doc = ""] # [doc = "Deprecated."] "#,
                r#"# [doc = ""] # [doc = "Experimental: Subject to change"]"#
            )
        );
    }

    #[test]
    fn nothing_to_document() {
        assert!(Docs::new(Some("  ")).to_token_stream().is_empty());
    }
}
