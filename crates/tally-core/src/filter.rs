//! Free-text narrowing of a built model.

use crate::model::ClientView;

/// Keep the client views matching `query`.
///
/// A blank query is the identity. Otherwise a view is retained when its
/// client name, or any of its entries' comments, contains the lowercased
/// query as a substring. No tokenization, no fuzzy matching.
pub fn filter_clients(items: Vec<ClientView>, query: &str) -> Vec<ClientView> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|view| {
            view.client.name.to_lowercase().contains(&needle)
                || view
                    .entries
                    .iter()
                    .any(|entry| entry.comment.to_lowercase().contains(&needle))
        })
        .collect()
}
