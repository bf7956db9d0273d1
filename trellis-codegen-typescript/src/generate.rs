use std::path::PathBuf;

use trellis_core::{
    codegen::{CodegenError, write_to_disk},
    error::LoadError,
    ir::IrSpec,
    load::{DocumentLoader, SchemaLocator},
};

use super::router::CodegenRouterModule;

/// What to generate, and where to write it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratorConfig {
    /// The OpenAPI document, as a URL or a local path.
    pub path: SchemaLocator,
    /// The generated declaration file. Overwritten on every change.
    pub destination: PathBuf,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GenerateOutcome {
    /// The document changed, and the destination was rewritten.
    Written,
    /// The document matched the last generated one; nothing was written.
    Unchanged,
}

#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Codegen(#[from] CodegenError),
}

/// Turns OpenAPI documents into router declarations.
///
/// A generator remembers the last document it wrote, and skips
/// unchanged documents. Taking `&mut self` for each cycle keeps
/// cycles from overlapping.
#[derive(Debug, Default)]
pub struct Generator {
    loader: DocumentLoader,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(loader: DocumentLoader) -> Self {
        Self { loader }
    }

    /// Runs one generation cycle.
    pub async fn generate(
        &mut self,
        config: &GeneratorConfig,
    ) -> Result<GenerateOutcome, GenerateError> {
        let loaded = self.loader.load(&config.path).await?;
        if self.loader.is_unchanged(&loaded) {
            tracing::debug!(schema = %config.path, "schema unchanged; skipping");
            return Ok(GenerateOutcome::Unchanged);
        }

        {
            let spec = IrSpec::from_doc(&loaded.doc);
            tracing::debug!(
                declarations = spec.declarations.len(),
                paths = loaded.doc.paths.len(),
                "resolved schema"
            );
            write_to_disk(&config.destination, CodegenRouterModule::new(&spec)).await?;
        }
        tracing::info!(
            schema = %config.path,
            destination = %config.destination.display(),
            "wrote router types"
        );

        // Only a written cycle replaces the snapshot, so a failed cycle
        // is retried on the next trigger.
        self.loader.remember(loaded.raw);
        Ok(GenerateOutcome::Written)
    }
}
