use iwdrs::{IwdBackend, NetworkEntry, bars_from_strength};

/// Formats one network as a table row, marking the connected one with `*`.
pub fn network_row(net: &NetworkEntry, connected: bool) -> String {
    format!(
        "{} {} {:<32} {:<6} {}",
        if connected { "*" } else { " " },
        bars_from_strength(net.strength),
        net.essid,
        net.encryption,
        net.id
    )
}

pub fn print_networks(backend: &IwdBackend) {
    let current = backend.get_current_network_id();
    let networks = backend.networks();
    if networks.is_empty() {
        println!("No networks visible");
        return;
    }
    for net in networks.iter() {
        println!("{}", network_row(net, current.as_deref() == Some(net.id.as_str())));
    }
}

pub fn print_status(backend: &IwdBackend) {
    let state = backend.connection_state();
    let network = state
        .current_network_id
        .as_deref()
        .map(|id| match backend.get_network_properties(id) {
            Ok(net) => format!("{} ({id})", net.essid),
            Err(_) => id.to_string(),
        })
        .unwrap_or_else(|| "none".to_string());

    println!("Network:    {network}");
    println!("Connecting: {}", if state.is_connecting { "yes" } else { "no" });
}
