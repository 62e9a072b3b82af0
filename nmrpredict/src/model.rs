use std::collections::HashMap;
use std::sync::Arc;

use nmrcore::data::association::AssociationRecord;

use crate::error::PredictError;

/// Inference collaborator: turns a molecule into predicted peak groups.
///
/// Structure parsing, descriptor extraction and the regression models behind
/// this call are opaque to the synthesis engine; implementations only have to
/// hand back one `AssociationRecord` per predicted group.
pub trait AssociationModel: Send + Sync {
    fn predict_associations(&self, smiles: &str) -> Result<Vec<AssociationRecord>, PredictError>;
}

/// Immutable, shareable handle to a loaded association model.
///
/// The model is read-only after construction, so the handle can be cloned
/// across concurrent requests without locking. Passing the handle explicitly
/// through the pipeline keeps the chain testable with substitute models.
#[derive(Clone)]
pub struct ModelHandle {
    model: Arc<dyn AssociationModel>,
}

impl ModelHandle {
    pub fn new(model: Arc<dyn AssociationModel>) -> Self {
        ModelHandle { model }
    }

    pub fn predict_associations(
        &self,
        smiles: &str,
    ) -> Result<Vec<AssociationRecord>, PredictError> {
        self.model.predict_associations(smiles)
    }
}

/// Deterministic substitute model backed by a fixed SMILES → records table.
///
/// Used by tests and the command-line driver; lookup misses surface as a
/// model failure.
pub struct TabulatedModel {
    table: HashMap<String, Vec<AssociationRecord>>,
}

impl TabulatedModel {
    pub fn new(table: HashMap<String, Vec<AssociationRecord>>) -> Self {
        TabulatedModel { table }
    }

    /// Table with a single entry, for driving the pipeline from a prepared
    /// record list.
    pub fn single(smiles: &str, records: Vec<AssociationRecord>) -> Self {
        let mut table = HashMap::new();
        table.insert(smiles.to_string(), records);
        TabulatedModel { table }
    }
}

impl AssociationModel for TabulatedModel {
    fn predict_associations(&self, smiles: &str) -> Result<Vec<AssociationRecord>, PredictError> {
        self.table.get(smiles).cloned().ok_or_else(|| {
            PredictError::Model(format!("no associations tabulated for {:?}", smiles))
        })
    }
}
