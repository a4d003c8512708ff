//! Registry of user-declared algebraic data types (`variant` and `type`
//! union-bodied declarations), keyed by type name and by constructor name.

use rustc_hash::FxHashMap;

use crate::ty::{Ty, TyVar};

/// One declared ADT: its type parameters and the ordered argument types of
/// each constructor, expressed in terms of those parameters.
#[derive(Clone, Debug)]
pub struct AdtInfo {
    pub type_params: Vec<TyVar>,
    /// Constructor name -> ordered argument types, insertion order
    /// preserved for deterministic error messages.
    pub constructors: Vec<(String, Vec<Ty>)>,
}

impl AdtInfo {
    pub fn arity_of(&self, ctor: &str) -> Option<usize> {
        self.constructors.iter().find(|(name, _)| name == ctor).map(|(_, args)| args.len())
    }

    pub fn args_of(&self, ctor: &str) -> Option<&[Ty]> {
        self.constructors
            .iter()
            .find(|(name, _)| name == ctor)
            .map(|(_, args)| args.as_slice())
    }

    /// The ADT's own type, applying its type parameters: `Variant { name,
    /// args: type_params as vars }`.
    pub fn head_type(&self, name: &str) -> Ty {
        Ty::Variant {
            name: name.to_string(),
            args: self.type_params.iter().map(|v| Ty::Var(*v)).collect(),
        }
    }
}

#[derive(Default)]
pub struct AdtRegistry {
    adts: FxHashMap<String, AdtInfo>,
    constructor_to_adt: FxHashMap<String, String>,
}

impl AdtRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: String, info: AdtInfo) {
        for (ctor, _) in &info.constructors {
            self.constructor_to_adt.insert(ctor.clone(), name.clone());
        }
        self.adts.insert(name, info);
    }

    pub fn get(&self, name: &str) -> Option<&AdtInfo> {
        self.adts.get(name)
    }

    /// Find the ADT a constructor belongs to.
    pub fn adt_for_constructor(&self, ctor: &str) -> Option<(&str, &AdtInfo)> {
        let adt_name = self.constructor_to_adt.get(ctor)?;
        let info = self.adts.get(adt_name)?;
        Some((adt_name.as_str(), info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_constructor_arity() {
        let mut registry = AdtRegistry::new();
        registry.register(
            "Option".to_string(),
            AdtInfo {
                type_params: vec![TyVar(0)],
                constructors: vec![
                    ("None".to_string(), vec![]),
                    ("Some".to_string(), vec![Ty::Var(TyVar(0))]),
                ],
            },
        );
        assert_eq!(registry.get("Option").unwrap().arity_of("Some"), Some(1));
        assert_eq!(registry.get("Option").unwrap().arity_of("None"), Some(0));
        assert_eq!(registry.adt_for_constructor("Some").unwrap().0, "Option");
        assert!(registry.adt_for_constructor("Nope").is_none());
    }
}
