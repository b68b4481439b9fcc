//! API model: receiver types and the methods exported on them.
//!
//! The distiller builds an [`ApiModel`] incrementally, one source at a time;
//! the dispatcher generator and the reference dispatcher only read it.

use serde::{Deserialize, Serialize};

use crate::rules::{Conversion, TypeRule};
use crate::wire::WireKind;

/// One formal parameter of an exported method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Zero-based ordinal within the method.
    pub position: usize,
    /// Declared name, `_` when the parameter is unnamed.
    pub name: String,
    /// Declared type as written, without the pointer marker for aggregates.
    pub type_name: String,
    #[serde(flatten)]
    pub rule: TypeRule,
    /// Token kinds accepted on the wire, in table order.
    pub accepted: Vec<WireKind>,
}

impl ParameterSpec {
    /// Build a parameter from its resolved rule.
    pub fn new(position: usize, name: impl Into<String>, type_name: impl Into<String>, rule: TypeRule) -> Self {
        Self {
            position,
            name: name.into(),
            type_name: type_name.into(),
            rule,
            accepted: rule.accepted_kinds().to_vec(),
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.rule.is_aggregate()
    }

    pub fn conversion(&self) -> Option<Conversion> {
        self.rule.conversion()
    }
}

/// How a method reports its outcome, derived from its result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// `func (r *T) M()`
    None,
    /// `func (r *T) M() V`
    Value,
    /// `func (r *T) M() error`
    Error,
    /// `func (r *T) M() (V, error)`
    ValueAndError,
}

/// One exported method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Export name used for runtime dispatch.
    pub name: String,
    /// Parameters in call-argument order.
    pub parameters: Vec<ParameterSpec>,
    pub results: ResultShape,
    /// Source the method was distilled from.
    pub source: String,
}

impl MethodSpec {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// One receiver type and its exported methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEntry {
    pub receiver: String,
    /// Methods in discovery order.
    pub methods: Vec<MethodSpec>,
}

impl ApiEntry {
    pub fn new(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Add a method, replacing an earlier one with the same name in place.
    ///
    /// Returns the shadowed method, if any. The replacement keeps the
    /// position of the first declaration so case order stays stable.
    pub fn upsert(&mut self, method: MethodSpec) -> Option<MethodSpec> {
        match self.methods.iter_mut().find(|m| m.name == method.name) {
            Some(slot) => Some(std::mem::replace(slot, method)),
            None => {
                self.methods.push(method);
                None
            }
        }
    }
}

/// An import the generated file needs for a qualified aggregate type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageImport {
    pub path: String,
    /// Explicit local name, when the source imported the package under one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl PackageImport {
    /// The import spec as it appears in an `import ( ... )` block.
    pub fn spec(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{alias} \"{}\"", self.path),
            None => format!("\"{}\"", self.path),
        }
    }
}

/// All receivers of one Go package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiModel {
    /// Package clause of the generated file.
    pub package: String,
    /// Receivers in discovery order.
    pub entries: Vec<ApiEntry>,
    /// Packages referenced by qualified aggregate parameters, sorted by path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<PackageImport>,
}

impl ApiModel {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            entries: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Record an import, keeping the list sorted and free of duplicates.
    pub fn add_import(&mut self, import: PackageImport) {
        if let Err(idx) = self.imports.binary_search(&import) {
            self.imports.insert(idx, import);
        }
    }

    pub fn entry(&self, receiver: &str) -> Option<&ApiEntry> {
        self.entries.iter().find(|e| e.receiver == receiver)
    }

    /// Fetch the entry for `receiver`, creating it on first sighting.
    pub fn entry_mut(&mut self, receiver: &str) -> &mut ApiEntry {
        let idx = match self.entries.iter().position(|e| e.receiver == receiver) {
            Some(idx) => idx,
            None => {
                self.entries.push(ApiEntry::new(receiver));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    pub fn method(&self, receiver: &str, method: &str) -> Option<&MethodSpec> {
        self.entry(receiver)?.method(method)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.methods.is_empty())
    }

    /// Total number of exported methods across all receivers.
    pub fn method_count(&self) -> usize {
        self.entries.iter().map(|e| e.methods.len()).sum()
    }

    /// Whether any parameter goes through a string conversion.
    pub fn needs_conversion(&self) -> bool {
        self.entries
            .iter()
            .flat_map(|e| &e.methods)
            .flat_map(|m| &m.parameters)
            .any(|p| p.conversion().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, params: &[(&str, &str)], source: &str) -> MethodSpec {
        MethodSpec {
            name: name.to_string(),
            parameters: params
                .iter()
                .enumerate()
                .map(|(i, (n, t))| {
                    ParameterSpec::new(i, *n, *t, TypeRule::resolve(t).unwrap_or(TypeRule::Aggregate))
                })
                .collect(),
            results: ResultShape::None,
            source: source.to_string(),
        }
    }

    #[test]
    fn test_entry_created_on_first_sighting() {
        let mut model = ApiModel::new("widgets");
        model.entry_mut("Widget").upsert(method("SetName", &[("n", "string")], "a.go"));
        model.entry_mut("Gadget").upsert(method("Ping", &[], "a.go"));
        model.entry_mut("Widget").upsert(method("Resize", &[("w", "uint16"), ("h", "uint16")], "b.go"));

        let receivers: Vec<_> = model.entries.iter().map(|e| e.receiver.as_str()).collect();
        assert_eq!(receivers, ["Widget", "Gadget"]);
        assert_eq!(model.method_count(), 3);
        assert_eq!(model.method("Widget", "Resize").map(MethodSpec::arity), Some(2));
    }

    #[test]
    fn test_duplicate_method_last_wins_in_place() {
        let mut entry = ApiEntry::new("Widget");
        assert!(entry.upsert(method("A", &[], "a.go")).is_none());
        assert!(entry.upsert(method("B", &[], "a.go")).is_none());
        let shadowed = entry.upsert(method("A", &[("x", "int")], "b.go"));

        assert_eq!(shadowed.map(|m| m.source), Some("a.go".to_string()));
        let names: Vec<_> = entry.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(entry.methods[0].source, "b.go");
        assert_eq!(entry.methods[0].arity(), 1);
    }

    #[test]
    fn test_parameter_copies_accepted_kinds() {
        let p = ParameterSpec::new(0, "on", "bool", TypeRule::Bool);
        assert_eq!(p.accepted, vec![WireKind::True, WireKind::False]);
        assert!(!p.is_aggregate());
        assert!(p.conversion().is_none());

        let agg = ParameterSpec::new(1, "at", "Point", TypeRule::Aggregate);
        assert!(agg.accepted.is_empty());
        assert!(agg.is_aggregate());
    }

    #[test]
    fn test_needs_conversion() {
        let mut model = ApiModel::new("widgets");
        model.entry_mut("Widget").upsert(method("SetName", &[("n", "string")], "a.go"));
        assert!(!model.needs_conversion());
        model.entry_mut("Widget").upsert(method("SetSize", &[("n", "int")], "a.go"));
        assert!(model.needs_conversion());
    }

    #[test]
    fn test_imports_sorted_and_deduplicated() {
        let mut model = ApiModel::new("widgets");
        let geo = PackageImport { alias: None, path: "example.com/geo".into() };
        let color = PackageImport { alias: Some("col".into()), path: "example.com/color".into() };
        model.add_import(geo.clone());
        model.add_import(color.clone());
        model.add_import(geo.clone());
        assert_eq!(model.imports, vec![color.clone(), geo.clone()]);
        assert_eq!(color.spec(), r#"col "example.com/color""#);
        assert_eq!(geo.spec(), r#""example.com/geo""#);
    }

    #[test]
    fn test_model_json_dump() {
        let mut model = ApiModel::new("widgets");
        model
            .entry_mut("Widget")
            .upsert(method("Resize", &[("w", "uint16")], "widget.go"));
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains(r#""package":"widgets""#));
        assert!(json.contains(r#""rule":"unsigned","bits":16"#));
        assert!(json.contains(r#""accepted":["INTEGER"]"#));
        assert!(json.contains(r#""results":"none""#));
        assert!(!json.contains("imports"));
    }
}
