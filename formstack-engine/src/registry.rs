//! The per-form-type field lists every other component reads.

use formstack_model::{FieldConfig, FieldPatch, FormType, InputType, ValidationError, validate_field_list};
use formstack_storage::SchemaStore;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::{DefaultFields, EngineError, EngineResult, FileSlotRouter};

type Lists = BTreeMap<FormType, Vec<FieldConfig>>;

/// Field configuration service.
///
/// Loaded once from a [`SchemaStore`]; writes go to the store first and only
/// replace the in-memory copy once they are persisted. Form types that were
/// never configured read their list from the [`DefaultFields`].
pub struct FieldRegistry {
    store: Arc<dyn SchemaStore>,
    defaults: DefaultFields,
    router: Arc<FileSlotRouter>,
    configured: RwLock<Lists>,
}

impl FieldRegistry {
    /// Reads every persisted list and checks the defaults against `router`.
    pub fn load(
        store: Arc<dyn SchemaStore>,
        defaults: DefaultFields,
        router: Arc<FileSlotRouter>,
    ) -> EngineResult<Self> {
        for (form_type, fields) in defaults.iter() {
            check_fields(fields, &router).map_err(|e| {
                EngineError::Config(format!("default fields for {form_type}: {e}"))
            })?;
        }

        let configured = store.load_all()?;
        info!(
            "Loaded field configuration for {} form type(s), {} default list(s)",
            configured.len(),
            defaults.iter().count()
        );

        Ok(Self {
            store,
            defaults,
            router,
            configured: RwLock::new(configured),
        })
    }

    /// The upload slots file fields are checked against.
    #[must_use]
    pub fn router(&self) -> &Arc<FileSlotRouter> {
        &self.router
    }

    /// Ordered field list for `form_type`. Empty when the type was never
    /// configured and has no defaults.
    #[must_use]
    pub fn get_fields(&self, form_type: &FormType) -> Vec<FieldConfig> {
        let configured = self.read();
        current(&configured, &self.defaults, form_type).to_vec()
    }

    /// True once a list for `form_type` has been set.
    #[must_use]
    pub fn is_configured(&self, form_type: &FormType) -> bool {
        self.read().contains_key(form_type)
    }

    /// Form types with a configured or default list.
    #[must_use]
    pub fn known_types(&self) -> Vec<FormType> {
        let configured = self.read();
        let mut types: Vec<FormType> = configured.keys().cloned().collect();
        for (form_type, _) in self.defaults.iter() {
            if !configured.contains_key(form_type) {
                types.push(form_type.clone());
            }
        }
        types.sort();
        types
    }

    /// Replaces the whole list for `form_type`.
    pub fn set_fields(&self, form_type: &FormType, fields: Vec<FieldConfig>) -> EngineResult<()> {
        check_fields(&fields, &self.router)?;

        let mut configured = self.write();
        self.store.save(form_type, &fields)?;
        info!("Set {} field(s) for {}", fields.len(), form_type);
        configured.insert(form_type.clone(), fields);
        Ok(())
    }

    /// Merges `patch` onto the field whose id is `field_id` and returns the
    /// updated field.
    pub fn update_field(
        &self,
        form_type: &FormType,
        field_id: &str,
        patch: &FieldPatch,
    ) -> EngineResult<FieldConfig> {
        let mut configured = self.write();
        let mut fields = current(&configured, &self.defaults, form_type).to_vec();

        let field = fields
            .iter_mut()
            .find(|field| field.id == field_id)
            .ok_or_else(|| EngineError::FieldNotFound {
                form_type: form_type.clone(),
                field_id: field_id.to_string(),
            })?;
        field.apply(patch);
        let updated = field.clone();

        check_fields(&fields, &self.router)?;
        self.store.save(form_type, &fields)?;
        debug!("Updated field {} ({}) of {}", updated.id, updated.name, form_type);
        configured.insert(form_type.clone(), fields);
        Ok(updated)
    }

    fn read(&self) -> RwLockReadGuard<'_, Lists> {
        self.configured.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Lists> {
        self.configured.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn current<'a>(configured: &'a Lists, defaults: &'a DefaultFields, form_type: &FormType) -> &'a [FieldConfig] {
    configured
        .get(form_type)
        .map(Vec::as_slice)
        .or_else(|| defaults.get(form_type))
        .unwrap_or_default()
}

/// List-wide invariants plus the rule that every file field names a
/// registered upload slot.
fn check_fields(fields: &[FieldConfig], router: &FileSlotRouter) -> Result<(), ValidationError> {
    validate_field_list(fields)?;
    for field in fields {
        match field.input_type {
            InputType::File if !router.is_registered(&field.name) => {
                return Err(ValidationError::field(
                    &field.name,
                    "file fields must be named after a registered upload slot",
                ));
            }
            InputType::File
            | InputType::Text
            | InputType::Number
            | InputType::Date
            | InputType::Select => {}
        }
    }
    Ok(())
}
