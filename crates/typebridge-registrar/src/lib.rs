//! Declares the types of a scanned module to the remote schema builder.
//!
//! Registration is split in two: a [`RegistrationPlan`] is built from the [`TypeModel`] and
//! validated without any I/O, then committed as a single lazy query tree whose module ID is
//! resolved in one final request.

mod commit;
mod error;
mod plan;
mod validate;

use tracing::instrument;
use typebridge_client::DynGraphqlClient;
use typebridge_model::TypeModel;

pub use error::RegistrationError;
pub use plan::{ArgumentDecl, Declaration, FieldDecl, FunctionDecl, RegistrationPlan, TypeUse};

pub struct Registrar<'a> {
    model: &'a TypeModel,
    remote: Option<&'a TypeModel>,
}

impl<'a> Registrar<'a> {
    pub fn new(model: &'a TypeModel) -> Self {
        Self { model, remote: None }
    }

    /// Catalog of the remote engine. Without it only module types and builtin scalars can be
    /// referenced.
    #[must_use]
    pub fn with_remote(mut self, remote: &'a TypeModel) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Builds and validates the plan without sending anything.
    #[instrument(skip_all, fields(module = %self.model.name))]
    pub fn plan(&self) -> Result<RegistrationPlan, RegistrationError> {
        let plan = RegistrationPlan::from_model(self.model);
        validate::validate(&plan, self.remote)?;

        tracing::debug!(declarations = plan.len(), "registration plan ready");
        Ok(plan)
    }

    /// Registers the module and returns its ID.
    pub async fn register(&self, client: &DynGraphqlClient) -> Result<String, RegistrationError> {
        let plan = self.plan()?;
        commit::commit(&plan, client).await
    }
}
