//! Execution context
//!
//! The `Context` carries cross-cutting policy for one execution unit: the
//! target SWF version, the property-name case-sensitivity rule derived from
//! it, the prototype-chain traversal limit, and the class registry the
//! boxing/allocation paths consult for builtin prototypes.
//!
//! A context is created once per execution unit and outlives every object
//! associated with it; objects do not hold a reference back to it — every
//! protocol and coercion operation takes `&Context` explicitly.

use std::collections::HashMap;

use crate::error::RuntimeError;
use crate::runtime::ObjectRef;
use crate::runtime::property::normalize_name;

/// Builtin class names the coercion and allocation paths rely on.
/// [`Context::builtin`] must never fail for these once bootstrap completed.
pub const BUILTIN_OBJECT: &str = "Object";
pub const BUILTIN_FUNCTION: &str = "Function";
pub const BUILTIN_BOOLEAN: &str = "Boolean";
pub const BUILTIN_NUMBER: &str = "Number";
pub const BUILTIN_STRING: &str = "String";
pub const BUILTIN_ARRAY: &str = "Array";
pub const BUILTIN_DATE: &str = "Date";
pub const BUILTIN_MATH: &str = "Math";

/// All registry entries required at runtime.
pub const REQUIRED_BUILTINS: [&str; 8] = [
    BUILTIN_OBJECT,
    BUILTIN_FUNCTION,
    BUILTIN_BOOLEAN,
    BUILTIN_NUMBER,
    BUILTIN_STRING,
    BUILTIN_ARRAY,
    BUILTIN_DATE,
    BUILTIN_MATH,
];

/// Default bound on prototype-chain traversal. Chains are acyclic by
/// construction but may still be pathologically long.
pub const DEFAULT_MAX_PROTOTYPE_DEPTH: usize = 256;

/// Per-execution-unit configuration and builtin class registry.
pub struct Context {
    /// Registered classes, keyed by normalized class name.
    classes: HashMap<Box<str>, ObjectRef>,
    /// Declared format version of the running content.
    swf_version: u8,
    /// Property names compare case-sensitively (SWF 7 and later).
    case_sensitive: bool,
    /// Maximum prototype links any traversal may follow.
    max_prototype_depth: usize,
}

impl Context {
    /// Create a context for the given SWF version.
    ///
    /// Property-name case sensitivity follows the version: SWF 7 and later
    /// content compares names case-sensitively, older content does not.
    pub fn new(swf_version: u8) -> Self {
        Self::with_case_sensitivity(swf_version, swf_version >= 7)
    }

    /// Create a context with an explicit case-sensitivity override.
    pub fn with_case_sensitivity(swf_version: u8, case_sensitive: bool) -> Self {
        Context {
            classes: HashMap::new(),
            swf_version,
            case_sensitive,
            max_prototype_depth: DEFAULT_MAX_PROTOTYPE_DEPTH,
        }
    }

    /// Declared format version of the running content.
    #[inline]
    pub fn swf_version(&self) -> u8 {
        self.swf_version
    }

    /// Whether property names compare case-sensitively.
    #[inline]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Maximum prototype links any traversal may follow.
    #[inline]
    pub fn max_prototype_depth(&self) -> usize {
        self.max_prototype_depth
    }

    /// Override the prototype traversal limit.
    pub fn set_max_prototype_depth(&mut self, depth: usize) {
        self.max_prototype_depth = depth;
    }

    /// Register or replace a class in the registry.
    ///
    /// Class names follow the same case-folding policy as property names.
    pub fn register_class(&mut self, name: &str, class: ObjectRef) {
        tracing::trace!(name, "registering class");
        self.classes.insert(normalize_name(self, name), class);
    }

    /// Look up a registered class by name.
    pub fn lookup_class(&self, name: &str) -> Option<ObjectRef> {
        self.classes.get(&normalize_name(self, name)).cloned()
    }

    /// Look up a builtin class, failing with [`RuntimeError::MissingBuiltin`]
    /// if it was never registered. Absence of one of [`REQUIRED_BUILTINS`]
    /// is a fatal configuration error, not a per-call condition.
    pub fn builtin(&self, name: &str) -> Result<ObjectRef, RuntimeError> {
        self.lookup_class(name).ok_or_else(|| {
            tracing::error!(name, "required builtin class missing from registry");
            RuntimeError::MissingBuiltin(name.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_sensitivity_follows_version() {
        assert!(!Context::new(5).is_case_sensitive());
        assert!(!Context::new(6).is_case_sensitive());
        assert!(Context::new(7).is_case_sensitive());
        assert!(Context::new(10).is_case_sensitive());
    }

    #[test]
    fn test_case_sensitivity_override() {
        let ctx = Context::with_case_sensitivity(8, false);
        assert_eq!(ctx.swf_version(), 8);
        assert!(!ctx.is_case_sensitive());
    }

    #[test]
    fn test_register_and_lookup() {
        let mut ctx = Context::new(6);
        let cls = ObjectRef::new(&ctx);
        ctx.register_class("Color", cls.clone());

        // case-insensitive context folds the lookup name
        let found = ctx.lookup_class("color").unwrap();
        assert!(found.ptr_eq(&cls));
    }

    #[test]
    fn test_lookup_respects_case_sensitivity() {
        let mut ctx = Context::new(7);
        let cls = ObjectRef::new(&ctx);
        ctx.register_class("Color", cls);
        assert!(ctx.lookup_class("color").is_none());
        assert!(ctx.lookup_class("Color").is_some());
    }

    #[test]
    fn test_register_replaces() {
        let mut ctx = Context::new(6);
        let a = ObjectRef::new(&ctx);
        let b = ObjectRef::new(&ctx);
        ctx.register_class("Sound", a);
        ctx.register_class("Sound", b.clone());
        assert!(ctx.lookup_class("Sound").unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_missing_builtin_is_an_error() {
        let ctx = Context::new(6);
        let err = ctx.builtin(BUILTIN_ARRAY).unwrap_err();
        assert_eq!(err, RuntimeError::MissingBuiltin("Array".to_string()));
    }
}
