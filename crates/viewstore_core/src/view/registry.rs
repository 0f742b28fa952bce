//! Design-document registry of named map functions.
//!
//! # Responsibility
//! - Group views into named design documents addressed as `design/view`.
//! - Resolve a `(design, view)` pair to its map function at index time.
//!
//! # Invariants
//! - Names are trimmed, non-empty and contain no `/`.
//! - A `(design, view)` pair is registered at most once.

use crate::view::map::MapFn;
use crate::view::project_task::project_task_list;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Registration/lookup errors for the view registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidName(String),
    DuplicateView { design: String, view: String },
    ViewNotFound { design: String, view: String },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "view name is invalid: `{value}`"),
            Self::DuplicateView { design, view } => {
                write!(f, "view already registered: {design}/{view}")
            }
            Self::ViewNotFound { design, view } => write!(f, "view not found: {design}/{view}"),
        }
    }
}

impl Error for RegistryError {}

/// Named group of views sharing one design document.
pub struct DesignDoc {
    name: String,
    views: BTreeMap<String, Arc<dyn MapFn>>,
}

impl DesignDoc {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns sorted view names in this design document.
    pub fn view_names(&self) -> Vec<String> {
        self.views.keys().cloned().collect()
    }
}

/// Registry mapping `(design, view)` names to map functions.
///
/// Mirrors a `views/<design>/<view>` on-disk layout: each design document
/// directory holds one or more named views.
#[derive(Default)]
pub struct ViewRegistry {
    designs: BTreeMap<String, DesignDoc>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one map function under `design/view`.
    pub fn register(
        &mut self,
        design: &str,
        view: &str,
        map_fn: Arc<dyn MapFn>,
    ) -> Result<(), RegistryError> {
        let design = validate_name(design)?;
        let view = validate_name(view)?;

        let doc = self
            .designs
            .entry(design.clone())
            .or_insert_with(|| DesignDoc {
                name: design.clone(),
                views: BTreeMap::new(),
            });

        if doc.views.contains_key(&view) {
            return Err(RegistryError::DuplicateView { design, view });
        }

        doc.views.insert(view, map_fn);
        Ok(())
    }

    /// Resolves one registered map function.
    pub fn get(&self, design: &str, view: &str) -> Result<&Arc<dyn MapFn>, RegistryError> {
        self.designs
            .get(design.trim())
            .and_then(|doc| doc.views.get(view.trim()))
            .ok_or_else(|| RegistryError::ViewNotFound {
                design: design.to_string(),
                view: view.to_string(),
            })
    }

    /// Returns sorted design document names.
    pub fn design_names(&self) -> Vec<String> {
        self.designs.keys().cloned().collect()
    }

    /// Returns one design document by name.
    pub fn design(&self, name: &str) -> Option<&DesignDoc> {
        self.designs.get(name.trim())
    }

    /// Returns every registered `(design, view)` pair, sorted.
    pub fn view_ids(&self) -> Vec<(String, String)> {
        self.designs
            .values()
            .flat_map(|doc| {
                doc.views
                    .keys()
                    .map(|view| (doc.name.clone(), view.clone()))
            })
            .collect()
    }
}

/// Builds the registry of builtin views.
///
/// Registers design `project-task` with its `list` view.
pub fn builtin_registry() -> ViewRegistry {
    let mut registry = ViewRegistry::new();
    registry
        .register("project-task", "list", Arc::new(project_task_list()))
        .expect("builtin view names are valid and unique");
    registry
}

fn validate_name(name: &str) -> Result<String, RegistryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{builtin_registry, RegistryError, ViewRegistry};
    use crate::view::project_task::project_task_list;
    use std::sync::Arc;

    #[test]
    fn builtin_registry_exposes_project_task_list() {
        let registry = builtin_registry();
        assert_eq!(registry.design_names(), vec!["project-task".to_string()]);
        assert!(registry.get("project-task", "list").is_ok());
        assert_eq!(
            registry
                .design("project-task")
                .expect("builtin design should exist")
                .view_names(),
            vec!["list".to_string()]
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = builtin_registry();
        let err = registry
            .register("project-task", "list", Arc::new(project_task_list()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateView { .. }));
    }

    #[test]
    fn names_are_validated() {
        let mut registry = ViewRegistry::new();
        let err = registry
            .register("", "list", Arc::new(project_task_list()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));

        let err = registry
            .register("a/b", "list", Arc::new(project_task_list()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
    }

    #[test]
    fn missing_view_reports_not_found() {
        let registry = builtin_registry();
        let err = registry.get("project-task", "by-owner").unwrap_err();
        assert_eq!(
            err,
            RegistryError::ViewNotFound {
                design: "project-task".to_string(),
                view: "by-owner".to_string(),
            }
        );
    }
}
