use crate::collector::{Order, SortSpec};
use crate::errors::GateError;
use crate::registry::PropertyLookup;

pub(crate) const DEFAULT_MAX_SORT_FIELDS: usize = 8;

/// Parses a sort string such as `-created_at;filename`.
///
/// Items are `;`-separated; a `-` prefix sorts descending. Each item must be an
/// exposed property and is rewritten to its canonical name.
///
/// # Errors
/// Returns `UnsortableProperty` for names the registry does not expose, and
/// `InvalidRequest` when more than `max_fields` items are given.
pub fn parse_sort<R: PropertyLookup + ?Sized>(
    spec: &str,
    props: &R,
    max_fields: usize,
) -> Result<Vec<SortSpec>, GateError> {
    let items: Vec<&str> = spec.split(';').map(str::trim).filter(|s| !s.is_empty()).collect();
    if items.len() > max_fields {
        return Err(GateError::InvalidRequest(format!(
            "sort accepts at most {max_fields} fields, got {}",
            items.len()
        )));
    }
    items
        .into_iter()
        .map(|item| {
            let (name, order) = match item.strip_prefix('-') {
                Some(rest) => (rest, Order::Desc),
                None => (item.strip_prefix('+').unwrap_or(item), Order::Asc),
            };
            let prop =
                props.lookup(name).ok_or_else(|| GateError::UnsortableProperty(name.to_string()))?;
            Ok(SortSpec { field: prop.canonical_name.clone(), order })
        })
        .collect()
}
