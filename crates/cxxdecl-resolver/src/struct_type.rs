//! Struct-type analysis: derivation, virtual functions, special members.
//!
//! Everything here reads the member scope a struct owns. The virtual-function
//! analysis works bottom-up from the base classes, matching inherited
//! virtuals to derived methods by signature (destructors match any
//! destructor) and stamping the matches with the inherited-virtual flag; the
//! special-member queries drive the POD/triviality rules from the storage and
//! role flags the grammar recorded.

use cxxdecl_core::{
    Decl, DeclId, FunctionFlags, FunctionType, StorageFlags, StructKind, TemplateParameterList,
    Visibility,
};

use crate::session::Session;

impl Session {
    // ==========================================================================
    // Derivation
    // ==========================================================================

    /// Add a base class to a struct's derivation list.
    ///
    /// Typedefs are unwrapped first: derivation is from what a name names,
    /// not the name. An unstated access level defaults by the base's
    /// class-key: private for `class` bases, public otherwise.
    pub fn append_derivation(
        &mut self,
        decl: DeclId,
        base: DeclId,
        vis: Visibility,
        is_virtual: bool,
    ) {
        let base = self.unwrap_typedefs(base);
        let vis = if vis == Visibility::Unknown {
            match self.decl(base) {
                Decl::Struct(st) if st.kind == StructKind::Class => Visibility::Private,
                _ => Visibility::Public,
            }
        } else {
            vis
        };
        if let Some(st) = self.decl_mut(decl).as_struct_mut() {
            st.derivation.push(cxxdecl_core::BaseClass {
                base,
                vis,
                is_virtual,
            });
        }
    }

    /// Whether `ancestor` is a base class of `descendant`, or the same class.
    pub fn is_base_of(&self, ancestor: DeclId, descendant: DeclId) -> bool {
        let ancestor = self.deref_proxy(ancestor);
        let descendant = self.deref_proxy(descendant);
        if ancestor == descendant {
            return true;
        }
        let Some(st) = self.decl(descendant).as_struct() else {
            return false;
        };
        st.derivation
            .iter()
            .any(|b| self.is_base_of(ancestor, b.base))
    }

    // ==========================================================================
    // Template plumbing
    // ==========================================================================

    /// Whether this struct is a class template (its scope hangs under a
    /// template-parameter scope).
    pub fn struct_is_template(&self, decl: DeclId) -> bool {
        self.struct_template_params(decl).is_some()
    }

    /// The formal parameters of a class template.
    pub fn struct_template_params(&self, decl: DeclId) -> Option<TemplateParameterList> {
        let st = self.decl(decl).as_struct()?;
        let parent = self.scope(st.scope).parent?;
        self.scope(parent).kind.template_params().cloned()
    }

    /// Whether the struct contains no remaining dependency on an
    /// uninstantiated template parameter.
    pub fn struct_fully_specified(&mut self, decl: DeclId) -> bool {
        self.decl_fully_specified(decl)
    }

    // ==========================================================================
    // Special members
    // ==========================================================================

    /// The constructor overload instances: functions sharing the class name.
    pub fn get_constructor(&self, decl: DeclId) -> Vec<DeclId> {
        let Some(st) = self.decl(decl).as_struct() else {
            return Vec::new();
        };
        self.scope(st.scope)
            .functions
            .get(st.simple_name())
            .map(|group| group.instances.clone())
            .unwrap_or_default()
    }

    /// The user-declared constructor callable with zero arguments, if any.
    pub fn get_default_constructor(&self, decl: DeclId) -> Option<DeclId> {
        for ctor in self.get_constructor(decl) {
            let Some(func) = self.instance_function(ctor) else {
                continue;
            };
            let zero_args = func.parameters.parameters.is_empty()
                || func
                    .parameters
                    .parameters
                    .first()
                    .and_then(|&p| self.decl(p).as_instance())
                    .is_some_and(|p| p.has_initializer);
            if zero_args {
                return Some(ctor);
            }
        }
        None
    }

    /// The user-declared copy constructor, if any.
    pub fn get_copy_constructor(&self, decl: DeclId) -> Option<DeclId> {
        self.find_in_group(self.get_constructor(decl), FunctionFlags::COPY_CONSTRUCTOR)
    }

    /// The user-declared move constructor, if any.
    pub fn get_move_constructor(&self, decl: DeclId) -> Option<DeclId> {
        self.find_in_group(self.get_constructor(decl), FunctionFlags::MOVE_CONSTRUCTOR)
    }

    /// The `operator =` overload instances.
    pub fn get_assignment_operator(&self, decl: DeclId) -> Vec<DeclId> {
        let Some(st) = self.decl(decl).as_struct() else {
            return Vec::new();
        };
        self.scope(st.scope)
            .functions
            .get("operator =")
            .map(|group| group.instances.clone())
            .unwrap_or_default()
    }

    /// The user-declared copy assignment operator, if any.
    pub fn get_copy_assignment_operator(&self, decl: DeclId) -> Option<DeclId> {
        self.find_in_group(
            self.get_assignment_operator(decl),
            FunctionFlags::COPY_ASSIGNMENT,
        )
    }

    /// The user-declared move assignment operator, if any.
    pub fn get_move_assignment_operator(&self, decl: DeclId) -> Option<DeclId> {
        self.find_in_group(
            self.get_assignment_operator(decl),
            FunctionFlags::MOVE_ASSIGNMENT,
        )
    }

    /// The user-declared destructor, if any.
    pub fn get_destructor(&self, decl: DeclId) -> Option<DeclId> {
        let Some(st) = self.decl(decl).as_struct() else {
            return None;
        };
        for (name, group) in &self.scope(st.scope).functions {
            if !name.starts_with('~') {
                continue;
            }
            for &inst in &group.instances {
                if self
                    .instance_function(inst)
                    .is_some_and(|f| f.is_destructor())
                {
                    return Some(inst);
                }
            }
        }
        None
    }

    fn find_in_group(&self, instances: Vec<DeclId>, flag: FunctionFlags) -> Option<DeclId> {
        instances.into_iter().find(|&inst| {
            self.instance_function(inst)
                .is_some_and(|f| f.flags.contains(flag))
        })
    }

    fn instance_function(&self, inst: DeclId) -> Option<&FunctionType> {
        let instance = self.decl(inst).as_instance()?;
        self.decl(self.deref_proxy(instance.ty)).as_function()
    }

    // ==========================================================================
    // Virtual-function analysis
    // ==========================================================================

    /// Whether the class defines or inherits any virtual method, i.e. needs a
    /// vtable. As a side effect, derived methods overriding an inherited
    /// virtual are stamped virtual and inherited-virtual.
    pub fn check_virtual(&mut self, decl: DeclId) -> bool {
        let mut funcs = Vec::new();
        self.get_virtual_funcs(decl, &mut funcs);
        !funcs.is_empty()
    }

    /// Whether the class has at least one pure virtual method without an
    /// override.
    pub fn is_abstract(&mut self, decl: DeclId) -> bool {
        let mut funcs = Vec::new();
        self.get_pure_virtual_funcs(decl, &mut funcs);
        !funcs.is_empty()
    }

    /// Whether this class or any base has virtual methods; unions never do.
    pub fn is_polymorphic(&mut self, decl: DeclId) -> bool {
        if let Some(st) = self.decl(decl).as_struct() {
            if st.kind == StructKind::Union {
                return false;
            }
        }
        self.check_virtual(decl)
    }

    /// Whether this class or any of its bases declares a virtual destructor.
    pub fn has_virtual_destructor(&self, decl: DeclId) -> bool {
        if let Some(dtor) = self.get_destructor(decl) {
            if let Some(inst) = self.decl(dtor).as_instance() {
                if inst.storage.contains(StorageFlags::VIRTUAL) {
                    return true;
                }
            }
        }
        let Some(st) = self.decl(decl).as_struct() else {
            return false;
        };
        st.derivation
            .iter()
            .map(|b| self.deref_proxy(b.base))
            .any(|base| {
                self.decl(base).as_struct().is_some() && self.has_virtual_destructor(base)
            })
    }

    /// Collect every virtual method declared at or above this class that is
    /// not overridden below the point it was declared.
    ///
    /// A method is virtual if a base class holds a virtual method with the
    /// same signature, whether or not it repeats the keyword; destructors
    /// match destructor-for-destructor regardless of name. Matches are
    /// stamped virtual and inherited-virtual.
    pub fn get_virtual_funcs(&mut self, decl: DeclId, funcs: &mut Vec<DeclId>) {
        let decl = self.deref_proxy(decl);
        let Some(st) = self.decl(decl).as_struct() else {
            return;
        };
        let bases: Vec<DeclId> = st.derivation.iter().map(|b| b.base).collect();
        let scope = st.scope;

        for base in bases {
            self.get_virtual_funcs(base, funcs);
        }

        // Match inherited virtuals against this class's own methods.
        let mut index = 0;
        while index < funcs.len() {
            let inherited = funcs[index];
            let (storage, signature, name) = {
                let Some(inst) = self.decl(inherited).as_instance() else {
                    index += 1;
                    continue;
                };
                let Some(func) = self.decl(self.deref_proxy(inst.ty)).as_function() else {
                    index += 1;
                    continue;
                };
                (inst.storage, func.clone(), inst.simple_name().to_owned())
            };

            if storage.contains(StorageFlags::DELETED) {
                index += 1;
                continue;
            }

            if signature.is_destructor() {
                if let Some(dtor) = self.get_destructor(decl) {
                    funcs.remove(index);
                    self.mark_inherited_virtual(dtor);
                    continue;
                }
                index += 1;
                continue;
            }

            let candidates = self
                .scope(scope)
                .functions
                .get(&name)
                .map(|group| group.instances.clone())
                .unwrap_or_default();
            let mut matched = false;
            for candidate in candidates {
                let Some(candidate_sig) = self.instance_function(candidate).cloned() else {
                    continue;
                };
                if self.signatures_match(&candidate_sig, &signature) {
                    funcs.remove(index);
                    self.mark_inherited_virtual(candidate);
                    matched = true;
                    break;
                }
            }
            if !matched {
                index += 1;
            }
        }

        // Then pick up the virtuals this class declares itself.
        let own: Vec<Vec<DeclId>> = self
            .scope(scope)
            .functions
            .values()
            .map(|group| group.instances.clone())
            .collect();
        for group in own {
            for inst in group {
                if let Some(instance) = self.decl(inst).as_instance() {
                    if instance.storage.contains(StorageFlags::VIRTUAL)
                        && !instance.storage.contains(StorageFlags::DELETED)
                        && !funcs.contains(&inst)
                    {
                        funcs.push(inst);
                    }
                }
            }
        }
    }

    /// Collect the pure virtual methods at or above this class that have no
    /// override.
    pub fn get_pure_virtual_funcs(&mut self, decl: DeclId, funcs: &mut Vec<DeclId>) {
        let mut all = Vec::new();
        self.get_virtual_funcs(decl, &mut all);
        for inst in all {
            if self
                .decl(inst)
                .as_instance()
                .is_some_and(|i| i.storage.contains(StorageFlags::PURE_VIRTUAL))
            {
                funcs.push(inst);
            }
        }
    }

    fn mark_inherited_virtual(&mut self, inst: DeclId) {
        if let Some(instance) = self.decl_mut(inst).as_instance_mut() {
            instance.storage |= StorageFlags::VIRTUAL | StorageFlags::INHERITED_VIRTUAL;
        }
    }

    /// Whether two member-function signatures declare the same interface:
    /// same constness, same arity, pairwise-equivalent parameter types.
    fn signatures_match(&self, a: &FunctionType, b: &FunctionType) -> bool {
        a.is_const_method == b.is_const_method
            && a.parameters.includes_ellipsis == b.parameters.includes_ellipsis
            && a.parameters.parameters.len() == b.parameters.parameters.len()
            && a.parameters
                .parameters
                .iter()
                .zip(b.parameters.parameters.iter())
                .all(|(&p, &q)| {
                    match (
                        self.decl(p).as_instance(),
                        self.decl(q).as_instance(),
                    ) {
                        (Some(x), Some(y)) => {
                            self.decl_structural_eq(
                                self.unwrap_typedefs(x.ty),
                                self.unwrap_typedefs(y.ty),
                            )
                        }
                        _ => false,
                    }
                })
    }

    // ==========================================================================
    // Triviality and constructibility
    // ==========================================================================

    /// The POD check: trivial, non-virtual bases and members, no user special
    /// members, and default-constructible.
    pub fn is_trivial(&mut self, decl: DeclId) -> bool {
        let decl = self.deref_proxy(decl);
        let Some(st) = self.decl(decl).as_struct() else {
            return false;
        };
        let bases = st.derivation.clone();
        let scope = st.scope;

        for base in bases {
            if base.is_virtual {
                return false;
            }
            let base_ty = self.deref_proxy(base.base);
            if self.decl(base_ty).as_struct().is_some() && !self.is_trivial(base_ty) {
                return false;
            }
        }

        for member in self.nonstatic_members(scope) {
            let (has_initializer, ty) = {
                let inst = self.decl(member).as_instance().expect("member");
                (inst.has_initializer, inst.ty)
            };
            if has_initializer {
                // The default constructor would assign a value.
                return false;
            }
            if !self.type_is_trivial(ty) {
                return false;
            }
        }

        let groups: Vec<(String, Vec<DeclId>)> = self
            .scope(scope)
            .functions
            .iter()
            .map(|(name, group)| (name.clone(), group.instances.clone()))
            .collect();
        for (name, instances) in groups {
            for inst in instances {
                let Some(instance) = self.decl(inst).as_instance() else {
                    continue;
                };
                let storage = instance.storage;
                if storage.contains(StorageFlags::VIRTUAL) {
                    return false;
                }
                if storage.contains(StorageFlags::DEFAULTED) {
                    continue;
                }
                let Some(func) = self.instance_function(inst) else {
                    continue;
                };
                if func.flags.intersects(
                    FunctionFlags::DESTRUCTOR
                        | FunctionFlags::COPY_CONSTRUCTOR
                        | FunctionFlags::MOVE_CONSTRUCTOR,
                ) {
                    return false;
                }
                if func.flags.contains(FunctionFlags::CONSTRUCTOR)
                    && func.parameters.is_empty()
                {
                    return false;
                }
                if name == "operator =" {
                    return false;
                }
            }
        }

        self.is_default_constructible(decl, Visibility::Public)
    }

    /// Whether the class can be constructed with no arguments, requiring at
    /// least `min_vis` accessibility.
    pub fn is_default_constructible(&mut self, decl: DeclId, min_vis: Visibility) -> bool {
        if self.is_abstract(decl) {
            return false;
        }
        if let Some(ctor) = self.get_default_constructor(decl) {
            let instance = self.decl(ctor).as_instance().expect("constructor");
            return instance.vis <= min_vis && !instance.storage.contains(StorageFlags::DELETED);
        }
        if !self.get_constructor(decl).is_empty() {
            // Some other constructor suppresses the implicit one.
            return false;
        }

        let Some(st) = self.decl(decl).as_struct() else {
            return false;
        };
        let bases: Vec<DeclId> = st.derivation.iter().map(|b| b.base).collect();
        let scope = st.scope;
        for base in bases {
            let base = self.deref_proxy(base);
            if self.decl(base).as_struct().is_some()
                && !self.is_default_constructible(base, Visibility::Protected)
            {
                return false;
            }
        }
        for member in self.nonstatic_members(scope) {
            let (has_initializer, ty) = {
                let inst = self.decl(member).as_instance().expect("member");
                (inst.has_initializer, inst.ty)
            };
            if has_initializer {
                continue;
            }
            if !self.type_is_default_constructible(ty) {
                return false;
            }
        }
        true
    }

    /// Whether the class can be copy-constructed, requiring at least
    /// `min_vis` accessibility.
    pub fn is_copy_constructible(&mut self, decl: DeclId, min_vis: Visibility) -> bool {
        if self.is_abstract(decl) {
            return false;
        }
        if let Some(ctor) = self.get_copy_constructor(decl) {
            let instance = self.decl(ctor).as_instance().expect("constructor");
            return instance.vis <= min_vis && !instance.storage.contains(StorageFlags::DELETED);
        }
        if self.get_move_constructor(decl).is_some()
            || self.get_move_assignment_operator(decl).is_some()
        {
            // A user-declared move operation deletes the implicit copy
            // constructor.
            return false;
        }
        if let Some(dtor) = self.get_destructor(decl) {
            let instance = self.decl(dtor).as_instance().expect("destructor");
            if instance.vis > min_vis || instance.storage.contains(StorageFlags::DELETED) {
                return false;
            }
        }

        let Some(st) = self.decl(decl).as_struct() else {
            return false;
        };
        let bases: Vec<DeclId> = st.derivation.iter().map(|b| b.base).collect();
        let scope = st.scope;
        for base in bases {
            let base = self.deref_proxy(base);
            if self.decl(base).as_struct().is_some()
                && !self.is_copy_constructible(base, Visibility::Protected)
            {
                return false;
            }
        }
        for member in self.nonstatic_members(scope) {
            let ty = self.decl(member).as_instance().expect("member").ty;
            if !self.type_is_copy_constructible(ty) {
                return false;
            }
        }
        true
    }

    /// Whether the class can be move-constructed; falls back to copy when no
    /// move constructor is declared.
    pub fn is_move_constructible(&mut self, decl: DeclId, min_vis: Visibility) -> bool {
        if let Some(ctor) = self.get_move_constructor(decl) {
            let instance = self.decl(ctor).as_instance().expect("constructor");
            if instance.vis > min_vis || instance.storage.contains(StorageFlags::DELETED) {
                return false;
            }
            return !self.is_abstract(decl);
        }
        self.is_copy_constructible(decl, min_vis)
    }

    /// Whether the class can be copy-assigned, requiring at least `min_vis`
    /// accessibility.
    pub fn is_copy_assignable(&mut self, decl: DeclId, min_vis: Visibility) -> bool {
        let assignment = self.get_copy_assignment_operator(decl);
        if let Some(op) = assignment {
            let instance = self.decl(op).as_instance().expect("operator");
            if instance.vis > min_vis || instance.storage.contains(StorageFlags::DELETED) {
                return false;
            }
            // A defaulted one may still end up deleted; keep checking.
            if !instance.storage.contains(StorageFlags::DEFAULTED) {
                return true;
            }
        }
        if assignment.is_none()
            && (self.get_move_constructor(decl).is_some()
                || self.get_move_assignment_operator(decl).is_some())
        {
            return false;
        }

        let Some(st) = self.decl(decl).as_struct() else {
            return false;
        };
        let bases: Vec<DeclId> = st.derivation.iter().map(|b| b.base).collect();
        let scope = st.scope;
        for base in bases {
            let base = self.deref_proxy(base);
            if self.decl(base).as_struct().is_some()
                && !self.is_copy_assignable(base, Visibility::Protected)
            {
                return false;
            }
        }
        for member in self.nonstatic_members(scope) {
            let ty = self.decl(member).as_instance().expect("member").ty;
            if !self.type_is_copy_assignable(ty) {
                return false;
            }
        }
        true
    }

    /// Whether the class can be destroyed, requiring at least `min_vis`
    /// accessibility.
    pub fn is_destructible(&mut self, decl: DeclId, min_vis: Visibility) -> bool {
        if let Some(dtor) = self.get_destructor(decl) {
            let instance = self.decl(dtor).as_instance().expect("destructor");
            return instance.vis <= min_vis && !instance.storage.contains(StorageFlags::DELETED);
        }
        let Some(st) = self.decl(decl).as_struct() else {
            return false;
        };
        let bases: Vec<DeclId> = st.derivation.iter().map(|b| b.base).collect();
        let scope = st.scope;
        for base in bases {
            let base = self.deref_proxy(base);
            if self.decl(base).as_struct().is_some()
                && !self.is_destructible(base, Visibility::Protected)
            {
                return false;
            }
        }
        for member in self.nonstatic_members(scope) {
            let ty = self.decl(member).as_instance().expect("member").ty;
            if !self.type_is_destructible(ty) {
                return false;
            }
        }
        true
    }

    /// Whether the class has no non-static data members (zero-width
    /// bit-fields aside), no virtual functions or bases, and only empty
    /// non-virtual bases; unions are never empty.
    pub fn is_empty_class(&mut self, decl: DeclId) -> bool {
        let Some(st) = self.decl(decl).as_struct() else {
            return false;
        };
        if st.kind == StructKind::Union {
            return false;
        }
        let bases = st.derivation.clone();
        let scope = st.scope;

        if self.check_virtual(decl) {
            return false;
        }
        for base in bases {
            let base_ty = self.deref_proxy(base.base);
            if base.is_virtual {
                return false;
            }
            if self.decl(base_ty).as_struct().is_some() && !self.is_empty_class(base_ty) {
                return false;
            }
        }
        for member in self.nonstatic_members(scope) {
            let bit_width = self.decl(member).as_instance().expect("member").bit_width;
            if bit_width != Some(0) {
                return false;
            }
        }
        true
    }

    // ==========================================================================
    // Type-level helpers
    // ==========================================================================

    fn nonstatic_members(&self, scope: cxxdecl_core::ScopeId) -> Vec<DeclId> {
        self.scope(scope)
            .variables
            .values()
            .copied()
            .filter(|&member| {
                self.decl(member)
                    .as_instance()
                    .is_some_and(|i| !i.storage.contains(StorageFlags::STATIC))
            })
            .collect()
    }

    fn type_is_trivial(&mut self, ty: DeclId) -> bool {
        let ty = self.deref_proxy(ty);
        match self.decl(ty) {
            Decl::Simple(_) | Decl::Enum(_) => true,
            Decl::Typedef(td) => {
                let inner = td.ty;
                self.type_is_trivial(inner)
            }
            Decl::Struct(_) => self.is_trivial(ty),
            _ => false,
        }
    }

    fn type_is_default_constructible(&mut self, ty: DeclId) -> bool {
        let ty = self.deref_proxy(ty);
        match self.decl(ty) {
            Decl::Struct(_) => self.is_default_constructible(ty, Visibility::Public),
            Decl::Typedef(td) => {
                let inner = td.ty;
                self.type_is_default_constructible(inner)
            }
            _ => true,
        }
    }

    fn type_is_copy_constructible(&mut self, ty: DeclId) -> bool {
        let ty = self.deref_proxy(ty);
        match self.decl(ty) {
            Decl::Struct(_) => self.is_copy_constructible(ty, Visibility::Public),
            Decl::Typedef(td) => {
                let inner = td.ty;
                self.type_is_copy_constructible(inner)
            }
            _ => true,
        }
    }

    fn type_is_copy_assignable(&mut self, ty: DeclId) -> bool {
        let ty = self.deref_proxy(ty);
        match self.decl(ty) {
            Decl::Struct(_) => {
                if self.is_abstract(ty) {
                    return false;
                }
                self.is_copy_assignable(ty, Visibility::Public)
            }
            Decl::Typedef(td) => {
                let inner = td.ty;
                self.type_is_copy_assignable(inner)
            }
            _ => true,
        }
    }

    fn type_is_destructible(&mut self, ty: DeclId) -> bool {
        let ty = self.deref_proxy(ty);
        match self.decl(ty) {
            Decl::Struct(_) => self.is_destructible(ty, Visibility::Public),
            Decl::Typedef(td) => {
                let inner = td.ty;
                self.type_is_destructible(inner)
            }
            _ => true,
        }
    }
}
