//! Schema analyzers: GraphQL SDL and Avro schemas → DataEntities and
//! (for GraphQL) ApiEndpoints.

pub mod avro;
pub mod graphql;

use archmap_core::scan::ScanContext;

use crate::kernel::AnalyzerKernel;

/// Schema files get tighter caps than source files: at most this many
/// lines per schema and 1 MiB per file. Oversized schemas are skipped
/// with a warning, never streamed.
pub const MAX_SCHEMA_LINES: usize = 50_000;
pub const MAX_SCHEMA_BYTES: u64 = 1024 * 1024;

/// Kernel with the schema-family limits applied, honoring the
/// per-analyzer `max_schema_lines` / `max_schema_bytes` config keys.
pub(crate) fn schema_kernel(kernel: &AnalyzerKernel, ctx: &ScanContext) -> AnalyzerKernel {
    let max_lines = ctx
        .config_u64("max_schema_lines")
        .map(|v| v as usize)
        .unwrap_or(MAX_SCHEMA_LINES);
    let max_bytes = ctx
        .config_u64("max_schema_bytes")
        .unwrap_or(MAX_SCHEMA_BYTES);
    kernel.limited(max_bytes, max_lines)
}
