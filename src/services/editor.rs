use tracing::debug;

use crate::{
    error::AppError,
    models::packing::{PackingItem, PackingList},
};

/// Turns a client-supplied replacement list into a [`PackingList`].
///
/// The list must be non-empty. Only `weight` is read, and it must be a
/// non-negative number when present; every other key is stored as sent.
pub fn prepare_replacement(items: Option<Vec<PackingItem>>) -> Result<PackingList, AppError> {
    let items = items
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::validation("items are required"))?;

    let list = PackingList::from_items(items).map_err(|err| AppError::validation(err.to_string()))?;
    debug!(items = list.len(), total_weight = list.total_weight(), "prepared replacement list");
    Ok(list)
}
