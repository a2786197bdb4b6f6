//! Arena allocation for the flat AST.
//!
//! All nodes of one parse live in contiguous vectors addressed by id
//! newtypes; child lists are flattened ranges. The parser owns no nodes
//! beyond construction — ownership transfers with the returned arena.

use crate::ast::{
    ArrayInitEntry, ArrayInitRange, AsmInst, AsmInstRange, CatchClause, CatchRange, Decl, DeclId,
    DeclRange, Ensure, EnsureRange, EnumMember, EnumMemberRange, Expr, ExprId, ExprRange,
    FieldInit, FieldInitRange, ImportSelect, ImportSelectRange, InitId, Initializer, NameRange,
    Param, ParamId, ParamRange, PathSeg, PathSegRange, Stmt, StmtId, StmtRange, TemplateParam,
    TemplateParamRange, TiArg, TiArgRange, Type, TypeId, TypeRange,
};
use crate::Name;

/// Panic helper for capacity overflow (cold path, never inlined).
#[cold]
#[inline(never)]
fn panic_capacity_exceeded(value: usize, context: &str) -> ! {
    panic!("arena capacity exceeded: {context} has {value} elements, max is {}", u32::MAX)
}

/// Convert usize to u32, panicking with a clear message on overflow.
#[inline]
fn to_u32(value: usize, context: &str) -> u32 {
    u32::try_from(value).unwrap_or_else(|_| panic_capacity_exceeded(value, context))
}

macro_rules! bulk_alloc {
    ($fn_name:ident, $get_name:ident, $field:ident, $ty:ty, $range:ty, $ctx:literal) => {
        #[doc = concat!("Append a run of ", $ctx, " and return its range.")]
        pub fn $fn_name(&mut self, items: Vec<$ty>) -> $range {
            let start = to_u32(self.$field.len(), $ctx);
            let len = to_u32(items.len(), $ctx);
            self.$field.extend(items);
            <$range>::new(start, len)
        }

        #[doc = concat!("The ", $ctx, " of a range.")]
        #[inline]
        pub fn $get_name(&self, range: $range) -> &[$ty] {
            &self.$field[range.to_range()]
        }
    };
}

/// Contiguous storage for all AST nodes of one parse.
#[derive(Clone, Default)]
pub struct AstArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    decls: Vec<Decl>,
    types: Vec<Type>,
    inits: Vec<Initializer>,
    params: Vec<Param>,

    /// Flattened id lists.
    expr_lists: Vec<ExprId>,
    stmt_lists: Vec<StmtId>,
    decl_lists: Vec<DeclId>,
    type_lists: Vec<TypeId>,

    /// Contiguously allocated child runs.
    tparams: Vec<TemplateParam>,
    enum_members: Vec<EnumMember>,
    segments: Vec<PathSeg>,
    tiargs: Vec<TiArg>,
    field_inits: Vec<FieldInit>,
    array_inits: Vec<ArrayInitEntry>,
    catches: Vec<CatchClause>,
    ensures: Vec<Ensure>,
    names: Vec<Name>,
    import_selects: Vec<ImportSelect>,
    asm_insts: Vec<AsmInst>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with estimated capacity based on source size.
    /// Heuristic: ~1 expression per 20 bytes of source.
    pub fn with_capacity(source_len: usize) -> Self {
        let estimated = source_len / 20;
        AstArena {
            exprs: Vec::with_capacity(estimated),
            stmts: Vec::with_capacity(estimated / 4),
            decls: Vec::with_capacity(estimated / 8),
            types: Vec::with_capacity(estimated / 8),
            ..AstArena::default()
        }
    }

    // --- Single node allocation ---

    #[inline]
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(to_u32(self.stmts.len(), "statements"));
        self.stmts.push(stmt);
        id
    }

    #[inline]
    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(to_u32(self.decls.len(), "declarations"));
        self.decls.push(decl);
        id
    }

    #[inline]
    pub fn alloc_type(&mut self, ty: Type) -> TypeId {
        let id = TypeId::new(to_u32(self.types.len(), "types"));
        self.types.push(ty);
        id
    }

    #[inline]
    pub fn alloc_init(&mut self, init: Initializer) -> InitId {
        let id = InitId::new(to_u32(self.inits.len(), "initializers"));
        self.inits.push(init);
        id
    }

    #[inline]
    pub fn alloc_param(&mut self, param: Param) -> ParamId {
        let id = ParamId::new(to_u32(self.params.len(), "parameters"));
        self.params.push(param);
        id
    }

    // --- Node access ---

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    #[inline]
    pub fn init(&self, id: InitId) -> &Initializer {
        &self.inits[id.index()]
    }

    #[inline]
    pub fn param(&self, id: ParamId) -> &Param {
        &self.params[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    // --- Flattened id lists ---

    pub fn alloc_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expression lists");
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, to_u32(ids.len(), "expression lists"))
    }

    #[inline]
    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.to_range()]
    }

    pub fn alloc_stmt_list(&mut self, ids: &[StmtId]) -> StmtRange {
        let start = to_u32(self.stmt_lists.len(), "statement lists");
        self.stmt_lists.extend_from_slice(ids);
        StmtRange::new(start, to_u32(ids.len(), "statement lists"))
    }

    #[inline]
    pub fn stmt_list(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_lists[range.to_range()]
    }

    pub fn alloc_decl_list(&mut self, ids: &[DeclId]) -> DeclRange {
        let start = to_u32(self.decl_lists.len(), "declaration lists");
        self.decl_lists.extend_from_slice(ids);
        DeclRange::new(start, to_u32(ids.len(), "declaration lists"))
    }

    #[inline]
    pub fn decl_list(&self, range: DeclRange) -> &[DeclId] {
        &self.decl_lists[range.to_range()]
    }

    pub fn alloc_type_list(&mut self, ids: &[TypeId]) -> TypeRange {
        let start = to_u32(self.type_lists.len(), "type lists");
        self.type_lists.extend_from_slice(ids);
        TypeRange::new(start, to_u32(ids.len(), "type lists"))
    }

    #[inline]
    pub fn type_list(&self, range: TypeRange) -> &[TypeId] {
        &self.type_lists[range.to_range()]
    }

    // --- Contiguous child runs ---

    bulk_alloc!(alloc_params, params, params, Param, ParamRange, "parameters");
    bulk_alloc!(
        alloc_tparams,
        tparams,
        tparams,
        TemplateParam,
        TemplateParamRange,
        "template parameters"
    );
    bulk_alloc!(
        alloc_enum_members,
        enum_members,
        enum_members,
        EnumMember,
        EnumMemberRange,
        "enum members"
    );
    bulk_alloc!(alloc_segments, segments, segments, PathSeg, PathSegRange, "path segments");
    bulk_alloc!(alloc_tiargs, tiargs, tiargs, TiArg, TiArgRange, "template arguments");
    bulk_alloc!(
        alloc_field_inits,
        field_inits,
        field_inits,
        FieldInit,
        FieldInitRange,
        "field initializers"
    );
    bulk_alloc!(
        alloc_array_inits,
        array_inits,
        array_inits,
        ArrayInitEntry,
        ArrayInitRange,
        "array initializers"
    );
    bulk_alloc!(alloc_catches, catches, catches, CatchClause, CatchRange, "catch clauses");
    bulk_alloc!(alloc_ensures, ensures, ensures, Ensure, EnsureRange, "out contracts");
    bulk_alloc!(alloc_names, names, names, Name, NameRange, "names");
    bulk_alloc!(
        alloc_import_selects,
        import_selects,
        import_selects,
        ImportSelect,
        ImportSelectRange,
        "selective imports"
    );
    bulk_alloc!(alloc_asm_insts, asm_insts, asm_insts, AsmInst, AsmInstRange, "asm instructions");
}
