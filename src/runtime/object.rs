//! ActionScript object representation and metaobject protocol
//!
//! Implements the ECMAScript-3-style property protocol AVM1 scripts observe:
//! own/inherited descriptor lookup, get/put with accessor and read-only
//! precedence, delete, enumeration, `[[DefaultValue]]`, and prototype
//! mutation with silent cycle rejection.
//!
//! Objects live behind shared [`ObjectRef`] handles. The runtime is
//! single-threaded and re-entrant: a getter or setter invoked mid-traversal
//! may mutate the very object being traversed, so no operation holds a
//! borrow across a nested call boundary — every step re-reads state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::context::{BUILTIN_OBJECT, Context};
use crate::error::RuntimeError;
use crate::runtime::function::{Callable, FunctionData};
use crate::runtime::property::{
    PropertyDescriptor, PropertyFlags, PropertyTable, normalize_name,
};
use crate::value::Value;

/// Property holding the constructor back-link of an instance.
pub const CONSTRUCTOR_PROPERTY: &str = "__constructor__";
/// Accessor property mirroring the prototype link.
pub const PROTO_PROPERTY: &str = "__proto__";
/// Data property functions expose for use by `construct`.
pub const PROTOTYPE_PROPERTY: &str = "prototype";

/// Hint for `[[DefaultValue]]`: which conversion candidate to try first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultValueHint {
    /// Try `valueOf` before `toString` (the unconditional default).
    #[default]
    Number,
    /// Try `toString` before `valueOf`.
    String,
}

/// Object state: property table, prototype link, optional function data and
/// the primitive payload of boxed objects.
pub struct Object {
    table: PropertyTable,
    prototype: Option<ObjectRef>,
    function: Option<FunctionData>,
    boxed: Option<Value>,
}

/// Shared handle to an [`Object`]. Identity is pointer identity.
#[derive(Clone)]
pub struct ObjectRef(pub(crate) Rc<RefCell<Object>>);

impl ObjectRef {
    /// Create a bare object with no prototype.
    ///
    /// Every object carries a native `__proto__` accessor mirroring its
    /// prototype link, installed here.
    pub fn new(ctx: &Context) -> ObjectRef {
        Self::with_function_opt(ctx, None)
    }

    /// Create a bare object carrying function data.
    pub fn with_function(ctx: &Context, function: FunctionData) -> ObjectRef {
        Self::with_function_opt(ctx, Some(function))
    }

    fn with_function_opt(ctx: &Context, function: Option<FunctionData>) -> ObjectRef {
        let obj = ObjectRef(Rc::new(RefCell::new(Object {
            table: PropertyTable::new(),
            prototype: None,
            function,
            boxed: None,
        })));
        obj.install_proto_accessor(ctx);
        obj
    }

    /// Install the `__proto__` native accessor. The entry points are bare
    /// callables holding a weak handle, so they carry no object identity of
    /// their own and cannot recurse into object construction.
    fn install_proto_accessor(&self, ctx: &Context) {
        let weak = Rc::downgrade(&self.0);
        let getter = {
            let weak = weak.clone();
            Callable::from_fn(move |_ctx, _this, _args| {
                let proto = weak.upgrade().and_then(|rc| rc.borrow().prototype.clone());
                Ok(match proto {
                    Some(p) => Value::Object(p),
                    None => Value::Undefined,
                })
            })
        };
        let setter = Callable::from_fn(move |_ctx, _this, args| {
            if let Some(rc) = weak.upgrade() {
                let receiver = ObjectRef(rc);
                match args.first() {
                    Some(Value::Object(p)) => receiver.set_prototype(Some(p.clone())),
                    Some(Value::Null) | Some(Value::Undefined) => receiver.set_prototype(None),
                    // other primitives are ignored, the link is unchanged
                    _ => {}
                }
            }
            Ok(Value::Undefined)
        });
        self.set_own_property(
            ctx,
            PROTO_PROPERTY,
            PropertyDescriptor::native_accessor(Some(getter), Some(setter)),
        );
    }

    /// Check handle identity.
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Check if this object carries function data.
    pub fn is_function(&self) -> bool {
        self.0.borrow().function.is_some()
    }

    /// Get a clone of this object's function data, if any.
    pub fn function_data(&self) -> Option<FunctionData> {
        self.0.borrow().function.clone()
    }

    /// Primitive payload of a boxed Boolean/Number/String object.
    pub fn boxed_value(&self) -> Option<Value> {
        self.0.borrow().boxed.clone()
    }

    /// Store the primitive payload of a boxed object.
    pub fn set_boxed_value(&self, value: Value) {
        self.0.borrow_mut().boxed = Some(value);
    }

    // -- prototype link -----------------------------------------------------

    /// Current prototype link.
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.0.borrow().prototype.clone()
    }

    /// Assign the prototype link.
    ///
    /// An assignment that would introduce a cycle (including
    /// self-assignment) is silently discarded, leaving the previous
    /// prototype unchanged. The check walks the candidate's chain before
    /// committing anything.
    pub fn set_prototype(&self, candidate: Option<ObjectRef>) {
        if let Some(start) = &candidate {
            let mut cursor = Some(start.clone());
            while let Some(obj) = cursor {
                if obj.ptr_eq(self) {
                    tracing::debug!("prototype assignment rejected: would create a cycle");
                    return;
                }
                cursor = obj.0.borrow().prototype.clone();
            }
        }
        self.0.borrow_mut().prototype = candidate;
    }

    // -- own-property layer -------------------------------------------------

    /// Look up an own descriptor.
    pub fn own_property(&self, ctx: &Context, name: &str) -> Option<PropertyDescriptor> {
        let key = normalize_name(ctx, name);
        self.0.borrow().table.get_own(&key).cloned()
    }

    /// Insert or overwrite an own descriptor, preserving insertion order on
    /// overwrite.
    pub fn set_own_property(&self, ctx: &Context, name: &str, desc: PropertyDescriptor) {
        let key = normalize_name(ctx, name);
        self.0.borrow_mut().table.set_own(key, desc);
    }

    /// Check for an own descriptor.
    pub fn has_own_property(&self, ctx: &Context, name: &str) -> bool {
        let key = normalize_name(ctx, name);
        self.0.borrow().table.has_own(&key)
    }

    /// Remove an own descriptor unconditionally, ignoring flags.
    pub fn delete_own_property(&self, ctx: &Context, name: &str) -> bool {
        let key = normalize_name(ctx, name);
        self.0.borrow_mut().table.delete_own(&key)
    }

    /// Own enumerable keys in insertion order.
    pub fn own_keys(&self) -> Vec<String> {
        self.0
            .borrow()
            .table
            .enumerable_keys()
            .map(str::to_string)
            .collect()
    }

    /// Set or clear user-settable flag bits on an existing own property.
    ///
    /// Only bits inside [`PropertyFlags::SET_PROP_FLAGS_MASK`] take effect.
    /// Returns false if there is no such own property.
    pub fn set_property_flags(
        &self,
        ctx: &Context,
        name: &str,
        set: PropertyFlags,
        clear: PropertyFlags,
    ) -> bool {
        let key = normalize_name(ctx, name);
        let mut inner = self.0.borrow_mut();
        match inner.table.get_own_mut(&key) {
            Some(desc) => {
                let set = set.masked(PropertyFlags::SET_PROP_FLAGS_MASK);
                let clear = clear.masked(PropertyFlags::SET_PROP_FLAGS_MASK);
                desc.flags = desc.flags.with(set).without(clear);
                true
            }
            None => false,
        }
    }

    // -- prototype-chain layer ----------------------------------------------

    /// Look up a descriptor on this object or its prototype chain.
    ///
    /// Traversal is bounded by [`Context::max_prototype_depth`]; exceeding
    /// it is a fatal error, since a chain that long indicates a wiring
    /// defect even when acyclic.
    pub fn property(
        &self,
        ctx: &Context,
        name: &str,
    ) -> Result<Option<PropertyDescriptor>, RuntimeError> {
        let key = normalize_name(ctx, name);
        let mut cursor = self.clone();
        let mut depth = 0;
        loop {
            let next = {
                let inner = cursor.0.borrow();
                if let Some(desc) = inner.table.get_own(&key) {
                    return Ok(Some(desc.clone()));
                }
                inner.prototype.clone()
            };
            match next {
                None => return Ok(None),
                Some(proto) => {
                    depth += 1;
                    if depth > ctx.max_prototype_depth() {
                        return Err(RuntimeError::PrototypeChainTooDeep {
                            limit: ctx.max_prototype_depth(),
                        });
                    }
                    cursor = proto;
                }
            }
        }
    }

    /// Read a property value.
    ///
    /// Data descriptors yield their stored value; accessor descriptors
    /// invoke the getter with `this` bound to this object, or yield
    /// undefined when no getter is set. An absent property is undefined.
    pub fn get(&self, ctx: &Context, name: &str) -> Result<Value, RuntimeError> {
        let desc = match self.property(ctx, name)? {
            Some(desc) => desc,
            None => return Ok(Value::Undefined),
        };
        if desc.is_data() {
            return Ok(desc.value.unwrap_or(Value::Undefined));
        }
        match desc.get {
            Some(getter) => getter.call(ctx, &Value::Object(self.clone()), &[]),
            None => Ok(Value::Undefined),
        }
    }

    /// Check whether `put` would be allowed to take effect.
    ///
    /// The first descriptor found on the chain decides: accessors are
    /// writable iff they carry a setter, data slots iff not read-only. An
    /// empty chain defaults to writable.
    pub fn can_put(&self, ctx: &Context, name: &str) -> Result<bool, RuntimeError> {
        let key = normalize_name(ctx, name);
        let mut cursor = self.clone();
        let mut depth = 0;
        loop {
            let next = {
                let inner = cursor.0.borrow();
                if let Some(desc) = inner.table.get_own(&key) {
                    return Ok(if desc.is_accessor() {
                        desc.set.is_some()
                    } else {
                        !desc.flags.contains(PropertyFlags::READ_ONLY)
                    });
                }
                inner.prototype.clone()
            };
            match next {
                None => return Ok(true),
                Some(proto) => {
                    depth += 1;
                    if depth > ctx.max_prototype_depth() {
                        return Err(RuntimeError::PrototypeChainTooDeep {
                            limit: ctx.max_prototype_depth(),
                        });
                    }
                    cursor = proto;
                }
            }
        }
    }

    /// Write a property value.
    ///
    /// Silently does nothing when `can_put` is false. An existing own data
    /// slot is updated in place, keeping its flags. Otherwise an inherited
    /// (or own) accessor's setter is invoked with `this` bound to this
    /// object; failing that a fresh own data slot with default flags
    /// shadows whatever the chain held.
    pub fn put(&self, ctx: &Context, name: &str, value: Value) -> Result<(), RuntimeError> {
        if !self.can_put(ctx, name)? {
            return Ok(());
        }
        {
            let key = normalize_name(ctx, name);
            let mut inner = self.0.borrow_mut();
            if let Some(desc) = inner.table.get_own_mut(&key) {
                if desc.is_data() {
                    desc.value = Some(value);
                    return Ok(());
                }
            }
        }
        if let Some(desc) = self.property(ctx, name)? {
            if desc.is_accessor() {
                if let Some(setter) = desc.set {
                    setter.call(ctx, &Value::Object(self.clone()), &[value])?;
                }
                return Ok(());
            }
        }
        self.set_own_property(
            ctx,
            name,
            PropertyDescriptor::data(value, PropertyFlags::EMPTY),
        );
        Ok(())
    }

    /// Check whether any descriptor exists on the chain.
    pub fn has_property(&self, ctx: &Context, name: &str) -> Result<bool, RuntimeError> {
        Ok(self.property(ctx, name)?.is_some())
    }

    /// Delete an own property.
    ///
    /// Returns true when there is nothing to delete (no-op success), false
    /// without mutation when the own descriptor is flagged `DONT_DELETE`.
    /// Inherited descriptors are never touched.
    pub fn delete_property(&self, ctx: &Context, name: &str) -> bool {
        let key = normalize_name(ctx, name);
        let mut inner = self.0.borrow_mut();
        let locked = match inner.table.get_own(&key) {
            None => return true,
            Some(desc) => desc.flags.contains(PropertyFlags::DONT_DELETE),
        };
        if locked {
            return false;
        }
        inner.table.delete_own(&key)
    }

    /// `[[DefaultValue]]`: reduce this object to a primitive.
    ///
    /// Tries `valueOf` then `toString` (reversed for the string hint); the
    /// first candidate that resolves to a callable is invoked with `this`
    /// bound to this object and its result returned. When neither is
    /// callable the object itself is returned unchanged — callers must
    /// treat that as "no primitive conversion available".
    pub fn default_value(
        &self,
        ctx: &Context,
        hint: DefaultValueHint,
    ) -> Result<Value, RuntimeError> {
        let candidates = match hint {
            DefaultValueHint::String => ["toString", "valueOf"],
            DefaultValueHint::Number => ["valueOf", "toString"],
        };
        for name in candidates {
            let candidate = self.get(ctx, name)?;
            if let Value::Object(func) = &candidate {
                if func.is_function() {
                    return func.call(ctx, &Value::Object(self.clone()), &[]);
                }
            }
        }
        Ok(Value::Object(self.clone()))
    }

    /// Enumerable keys of this object and its chain: own keys first, in
    /// insertion order, then inherited ones, each normalized name exactly
    /// once.
    pub fn keys(&self, ctx: &Context) -> Result<Vec<String>, RuntimeError> {
        let mut seen: indexmap::IndexSet<String> = indexmap::IndexSet::new();
        let mut cursor = Some(self.clone());
        let mut depth = 0;
        while let Some(obj) = cursor {
            if depth > ctx.max_prototype_depth() {
                return Err(RuntimeError::PrototypeChainTooDeep {
                    limit: ctx.max_prototype_depth(),
                });
            }
            let next = {
                let inner = obj.0.borrow();
                for key in inner.table.enumerable_keys() {
                    seen.insert(key.to_string());
                }
                inner.prototype.clone()
            };
            cursor = next;
            depth += 1;
        }
        Ok(seen.into_iter().collect())
    }

    // -- bookkeeping properties ---------------------------------------------

    /// Read this object's `prototype` property (not the prototype link).
    pub fn prototype_property(&self, ctx: &Context) -> Result<Value, RuntimeError> {
        self.get(ctx, PROTOTYPE_PROPERTY)
    }

    /// Install the `prototype` data property used by `construct`.
    pub fn set_own_prototype_property(&self, ctx: &Context, value: Value) {
        self.set_own_property(
            ctx,
            PROTOTYPE_PROPERTY,
            PropertyDescriptor::data(value, PropertyFlags::DATA | PropertyFlags::DONT_ENUM),
        );
    }

    /// Read this object's constructor back-link.
    pub fn constructor_property(&self, ctx: &Context) -> Result<Value, RuntimeError> {
        self.get(ctx, CONSTRUCTOR_PROPERTY)
    }

    /// Install the constructor back-link.
    pub fn set_own_constructor_property(&self, ctx: &Context, value: Value) {
        self.set_own_property(
            ctx,
            CONSTRUCTOR_PROPERTY,
            PropertyDescriptor::data(value, PropertyFlags::DATA | PropertyFlags::DONT_ENUM),
        );
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_function() {
            write!(f, "Function({:p})", Rc::as_ptr(&self.0))
        } else {
            write!(f, "Object({:p})", Rc::as_ptr(&self.0))
        }
    }
}

/// Allocate a plain object wired to the base Object builtin: prototype
/// link from its `prototype` property, constructor back-link to it.
pub fn new_object(ctx: &Context) -> Result<ObjectRef, RuntimeError> {
    let obj = ObjectRef::new(ctx);
    let base = ctx.builtin(BUILTIN_OBJECT)?;
    if let Value::Object(proto) = base.prototype_property(ctx)? {
        obj.set_prototype(Some(proto));
    }
    obj.set_own_constructor_property(ctx, Value::Object(base));
    Ok(obj)
}
