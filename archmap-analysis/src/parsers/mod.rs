//! Structured (tier-1) parsing: tree-sitter per language, one shared
//! cache, and the `SourceUnit` shape every AST analyzer consumes.

pub mod extract;
pub mod manager;
pub mod source_unit;

pub use manager::ParserManager;
pub use source_unit::{
    Annotation, AnnotationArg, CallSite, ClassDecl, FieldDecl, FunctionDecl, Import, Param,
    SourceUnit,
};
