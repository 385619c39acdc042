//! Record Store
//!
//! Read-only holder of every specification record. Built once from a
//! [`RecordBundle`] and then shared (by reference or `Arc`) with the
//! resolver, schema builder and search scorer. Nothing mutates it after
//! construction, so concurrent readers need no coordination.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::info;

use crate::error::{Result, SpecError};
use crate::record::{
    ApplicationModuleJoin, ApplicationSubType, ApplicationType, Component, ExampleData, Field,
    PlanningModule, PlanningRequirement, RecordBundle,
};

/// Reference-keyed index over a record collection, preserving load order
#[derive(Debug, Clone)]
struct Keyed<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Self { items: Vec::new(), index: HashMap::new() }
    }
}

impl<T> Keyed<T> {
    fn build(items: Vec<T>, kind: &'static str, key: impl Fn(&T) -> &str) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let reference = key(item).to_string();
            if index.insert(reference.clone(), position).is_some() {
                return Err(SpecError::DuplicateReference { kind, reference });
            }
        }
        Ok(Self { items, index })
    }

    fn get(&self, reference: &str) -> Option<&T> {
        self.index.get(reference).map(|&i| &self.items[i])
    }
}

/// Application type with everything linked to it
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedApplication<'a> {
    #[serde(rename = "type")]
    pub application_type: &'a ApplicationType,
    pub sub_types: Vec<&'a ApplicationSubType>,
    pub modules: Vec<&'a PlanningModule>,
    /// Requirement linkage is not present in the record data
    pub requirements: Vec<&'a PlanningRequirement>,
    pub examples: Vec<&'a ExampleData>,
}

/// Module with the application types that currently use it
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedModule<'a> {
    pub module: &'a PlanningModule,
    /// Module to field linkage is not present in the record data
    pub fields: Vec<&'a Field>,
    /// Module to component linkage is not present in the record data
    pub components: Vec<&'a Component>,
    pub application_types: Vec<&'a str>,
    pub examples: Vec<&'a ExampleData>,
}

/// A reference that points at nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    /// Record holding the reference, e.g. `component:address`
    pub source: String,
    /// What kind of record was expected
    pub expected: &'static str,
    pub reference: String,
}

/// The main record store
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    application_types: Keyed<ApplicationType>,
    sub_types: Keyed<ApplicationSubType>,
    modules: Keyed<PlanningModule>,
    joins: Vec<ApplicationModuleJoin>,
    requirements: Keyed<PlanningRequirement>,
    fields: Keyed<Field>,
    components: Keyed<Component>,
    examples: Vec<ExampleData>,
}

impl RecordStore {
    /// Freeze a bundle into a store, rejecting duplicate references
    pub fn from_bundle(bundle: RecordBundle) -> Result<Self> {
        let store = Self {
            application_types: Keyed::build(bundle.application_types, "application type", |r| r.reference.as_str())?,
            sub_types: Keyed::build(bundle.application_sub_types, "application sub-type", |r| r.reference.as_str())?,
            modules: Keyed::build(bundle.modules, "module", |r| r.reference.as_str())?,
            joins: bundle.module_joins,
            requirements: Keyed::build(bundle.requirements, "requirement", |r| r.reference.as_str())?,
            fields: Keyed::build(bundle.fields, "field", |r| r.reference.as_str())?,
            components: Keyed::build(bundle.components, "component", |r| r.reference.as_str())?,
            examples: bundle.examples,
        };

        info!(
            application_types = store.application_types.items.len(),
            modules = store.modules.items.len(),
            joins = store.joins.len(),
            fields = store.fields.items.len(),
            components = store.components.items.len(),
            "Loaded specification records"
        );

        Ok(store)
    }

    pub fn application_types(&self) -> &[ApplicationType] {
        &self.application_types.items
    }

    pub fn application_sub_types(&self) -> &[ApplicationSubType] {
        &self.sub_types.items
    }

    pub fn modules(&self) -> &[PlanningModule] {
        &self.modules.items
    }

    /// Join records in load order
    pub fn module_joins(&self) -> &[ApplicationModuleJoin] {
        &self.joins
    }

    pub fn requirements(&self) -> &[PlanningRequirement] {
        &self.requirements.items
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields.items
    }

    pub fn components(&self) -> &[Component] {
        &self.components.items
    }

    pub fn examples(&self) -> &[ExampleData] {
        &self.examples
    }

    pub fn application_type(&self, reference: &str) -> Option<&ApplicationType> {
        self.application_types.get(reference)
    }

    pub fn application_sub_type(&self, reference: &str) -> Option<&ApplicationSubType> {
        self.sub_types.get(reference)
    }

    pub fn module(&self, reference: &str) -> Option<&PlanningModule> {
        self.modules.get(reference)
    }

    pub fn requirement(&self, reference: &str) -> Option<&PlanningRequirement> {
        self.requirements.get(reference)
    }

    pub fn field(&self, reference: &str) -> Option<&Field> {
        self.fields.get(reference)
    }

    pub fn component(&self, reference: &str) -> Option<&Component> {
        self.components.get(reference)
    }

    /// Sub-types declared for an application type
    pub fn sub_types_of(&self, application_type: &str) -> Vec<&ApplicationSubType> {
        self.sub_types
            .items
            .iter()
            .filter(|s| s.application_type == application_type)
            .collect()
    }

    /// Examples tagged with an application type
    pub fn examples_for(&self, application_type: &str) -> Vec<&ExampleData> {
        self.examples
            .iter()
            .filter(|e| e.application_type == application_type)
            .collect()
    }

    /// Follow `replaced-by` links from a module to its final successor.
    ///
    /// The returned chain starts with the module itself. It stops at the first
    /// unresolvable successor or at a repeat.
    pub fn replacement_chain(&self, reference: &str) -> Vec<&PlanningModule> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = self.module(reference);

        while let Some(module) = next {
            if !seen.insert(module.reference.as_str()) {
                break;
            }
            chain.push(module);
            next = module.replaced_by.as_deref().and_then(|r| self.module(r));
        }

        chain
    }

    /// Application type view with its current modules
    pub fn processed_application(&self, reference: &str) -> Option<ProcessedApplication<'_>> {
        let application_type = self.application_type(reference)?;
        Some(ProcessedApplication {
            application_type,
            sub_types: self.sub_types_of(reference),
            modules: self.resolve_modules(reference),
            requirements: Vec::new(),
            examples: self.examples_for(reference),
        })
    }

    /// Module view with the application types that currently use it
    pub fn processed_module(&self, reference: &str) -> Option<ProcessedModule<'_>> {
        let module = self.module(reference)?;
        let application_types = self.applications_for_module(reference);
        let examples = self
            .examples
            .iter()
            .filter(|e| application_types.contains(&e.application_type.as_str()))
            .collect();

        Some(ProcessedModule {
            module,
            fields: Vec::new(),
            components: Vec::new(),
            application_types,
            examples,
        })
    }

    /// List references that do not resolve. Purely informational: schema
    /// generation skips these silently.
    pub fn integrity_report(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        let mut push = |source: String, expected: &'static str, reference: &str| {
            dangling.push(DanglingReference {
                source,
                expected,
                reference: reference.to_string(),
            });
        };

        for sub_type in &self.sub_types.items {
            if self.application_type(&sub_type.application_type).is_none() {
                push(format!("sub-type:{}", sub_type.reference), "application type", &sub_type.application_type);
            }
        }

        for (position, join) in self.joins.iter().enumerate() {
            let source = format!("join:{}", position);
            if self.application_type(&join.application_type).is_none() {
                push(source.clone(), "application type", &join.application_type);
            }
            if let Some(sub_type) = &join.application_sub_type {
                if self.application_sub_type(sub_type).is_none() {
                    push(source.clone(), "application sub-type", sub_type);
                }
            }
            if self.module(&join.application_module).is_none() {
                push(source, "module", &join.application_module);
            }
        }

        for module in &self.modules.items {
            if let Some(successor) = &module.replaced_by {
                if self.module(successor).is_none() {
                    push(format!("module:{}", module.reference), "module", successor);
                }
            }
        }

        for component in &self.components.items {
            for slot in &component.fields {
                if self.field(&slot.field).is_none() {
                    push(format!("component:{}", component.reference), "field", &slot.field);
                }
            }
        }

        dangling
    }
}
