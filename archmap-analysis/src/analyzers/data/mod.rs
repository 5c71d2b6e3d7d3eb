//! ORM / data analyzers: entity classes and migrations → DataEntities +
//! Relationships.

pub mod django_orm;
pub mod efcore;
pub mod jpa;
pub mod sql;
pub mod sqlalchemy;

/// Collection-typed navigation properties (`List<Order>`,
/// `java.util.Set<Order>`, `ICollection<Order>`) point at the element
/// type, with package/namespace qualifiers dropped.
pub(crate) fn collection_element(type_annotation: &str) -> Option<String> {
    let trimmed = type_annotation.trim();
    let open = trimmed.find('<')?;
    let wrapper = simple_type_name(&trimmed[..open]);
    if !matches!(
        wrapper.as_str(),
        "List" | "Set" | "Collection" | "ICollection" | "IEnumerable" | "IList" | "HashSet"
    ) {
        return None;
    }
    let inner = trimmed[open + 1..].trim_end_matches('>').trim();
    let inner = simple_type_name(inner);
    (!inner.is_empty()).then_some(inner)
}

/// `com.example.Order` → `Order`; `Order` stays as-is.
pub(crate) fn simple_type_name(qualified: &str) -> String {
    qualified
        .trim()
        .rsplit('.')
        .next()
        .unwrap_or(qualified)
        .to_string()
}
