//! Temporal join resolution
//!
//! Works out which modules an application type uses by walking the join
//! records. A join counts while its own end date is unset; the validity of
//! the application type or module it points at is not consulted.

use chrono::NaiveDate;
use tracing::debug;

use crate::record::{ApplicationModuleJoin, PlanningModule, Temporal};
use crate::store::RecordStore;

impl RecordStore {
    /// Modules currently linked to an application type, in join order.
    ///
    /// Joins scoped to a sub-type are included whenever the parent type
    /// matches. Joins naming an unknown module are skipped.
    pub fn resolve_modules(&self, application_type: &str) -> Vec<&PlanningModule> {
        self.modules_through(application_type, |join| join.is_current())
    }

    /// Modules linked to an application type on a given day
    pub fn resolve_modules_on(&self, application_type: &str, date: NaiveDate) -> Vec<&PlanningModule> {
        self.modules_through(application_type, |join| join.is_effective_on(date))
    }

    /// References of the modules returned by [`RecordStore::resolve_modules`]
    pub fn resolve_module_refs(&self, application_type: &str) -> Vec<String> {
        self.resolve_modules(application_type)
            .into_iter()
            .map(|m| m.reference.clone())
            .collect()
    }

    /// Application types currently linked to a module, first occurrence order
    pub fn applications_for_module(&self, module: &str) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for join in self.module_joins() {
            if join.application_module == module
                && join.is_current()
                && !types.contains(&join.application_type.as_str())
            {
                types.push(&join.application_type);
            }
        }
        types
    }

    fn modules_through(
        &self,
        application_type: &str,
        active: impl Fn(&ApplicationModuleJoin) -> bool,
    ) -> Vec<&PlanningModule> {
        let mut modules: Vec<&PlanningModule> = Vec::new();

        for join in self.module_joins() {
            if join.application_type != application_type || !active(join) {
                continue;
            }

            match self.module(&join.application_module) {
                // The same module can be joined more than once, e.g. per sub-type
                Some(module) if modules.iter().any(|m| m.reference == module.reference) => {}
                Some(module) => modules.push(module),
                None => debug!(
                    application_type,
                    module = %join.application_module,
                    "Skipping join to unknown module"
                ),
            }
        }

        modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ApplicationType, RecordBundle};

    fn store() -> RecordStore {
        let mut retired = PlanningModule::new("ownership-cert", "Ownership certificate");
        retired.end_date = Some("2020-01-01".to_string());

        RecordStore::from_bundle(RecordBundle {
            application_types: vec![
                ApplicationType::new("hh", "Householder"),
                ApplicationType::new("ldc", "Lawful development certificate"),
            ],
            modules: vec![
                PlanningModule::new("site-details", "Site details"),
                PlanningModule::new("applicant", "Applicant"),
                PlanningModule::new("fee", "Fee"),
                retired,
            ],
            module_joins: vec![
                ApplicationModuleJoin::new("hh", "site-details").starting("2024-01-01"),
                ApplicationModuleJoin::new("hh", "fee").starting("2023-01-01").ended("2024-01-01"),
                ApplicationModuleJoin::new("hh", "applicant").starting("2024-03-01"),
                ApplicationModuleJoin::new("hh", "ownership-cert"),
                ApplicationModuleJoin::new("hh", "retired-long-ago"),
                ApplicationModuleJoin::new("hh", "applicant").for_sub_type("hh-listed"),
                ApplicationModuleJoin::new("ldc", "fee"),
            ],
            ..Default::default()
        })
        .unwrap()
    }

    fn refs(modules: Vec<&PlanningModule>) -> Vec<&str> {
        modules.into_iter().map(|m| m.reference.as_str()).collect()
    }

    #[test]
    fn test_resolves_active_joins_in_order() {
        let store = store();
        assert_eq!(
            refs(store.resolve_modules("hh")),
            vec!["site-details", "applicant", "ownership-cert"]
        );
    }

    #[test]
    fn test_ended_join_excluded() {
        let store = store();
        assert!(!refs(store.resolve_modules("hh")).contains(&"fee"));
        assert_eq!(refs(store.resolve_modules("ldc")), vec!["fee"]);
    }

    #[test]
    fn test_ended_module_still_resolves_through_active_join() {
        let store = store();
        assert!(refs(store.resolve_modules("hh")).contains(&"ownership-cert"));
    }

    #[test]
    fn test_unknown_type_resolves_nothing() {
        assert!(store().resolve_modules("nope").is_empty());
    }

    #[test]
    fn test_resolve_on_date() {
        let store = store();
        let day = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert_eq!(refs(store.resolve_modules_on("hh", day)), vec!["fee", "ownership-cert", "applicant"]);

        let later = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(
            refs(store.resolve_modules_on("hh", later)),
            vec!["site-details", "ownership-cert", "applicant"]
        );
    }

    #[test]
    fn test_applications_for_module() {
        let store = store();
        assert_eq!(store.applications_for_module("applicant"), vec!["hh"]);
        assert_eq!(store.applications_for_module("fee"), vec!["ldc"]);
    }
}
