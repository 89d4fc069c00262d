//! Command handlers. Each handler consumes the core's operations; none of
//! them contain data-model logic of their own.

pub mod clients;
pub mod entries;
pub mod list;
pub mod transfer;

use anyhow::{anyhow, bail};

use tally_core::storage::{Client, StoreGateway};

/// Resolve a client by id or (case-insensitive) name.
///
/// Includes archived clients, so `archive --restore` and `rm` can reach
/// them.
pub fn resolve_client<S: StoreGateway + ?Sized>(
    store: &S,
    needle: &str,
) -> anyhow::Result<Client> {
    let clients = store.read_clients()?;

    if let Some(client) = clients.iter().find(|c| c.id == needle) {
        return Ok(client.clone());
    }

    let lowered = needle.trim().to_lowercase();
    let matches: Vec<&Client> = clients
        .iter()
        .filter(|c| c.name.trim().to_lowercase() == lowered)
        .collect();

    match matches.as_slice() {
        [client] => Ok((*client).clone()),
        [] => Err(anyhow!("No client named '{needle}'")),
        many => {
            let ids: Vec<&str> = many.iter().map(|c| c.id.as_str()).collect();
            bail!(
                "'{needle}' matches {} clients; use an id instead: {}",
                many.len(),
                ids.join(", ")
            )
        }
    }
}
