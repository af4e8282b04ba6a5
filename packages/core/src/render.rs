//! Plain-text rendering of network cards.
//!
//! The output mirrors the dashboard card: a header with the network name and
//! a sensor-count badge, followed by the identifier. It is meant for
//! terminals and logs; only the JSON shapes in [`crate::types`] are stable.

use crate::types::Network;

/// Sensor count shown on every card.
///
/// Sensor counts are not fetched from the API yet, so every card shows this
/// fixed value.
pub const PLACEHOLDER_SENSOR_COUNT: u32 = 17;

/// Render one network card.
///
/// ```text
/// Lab A                                   [17 sensors]
///   identifier: n1
/// ```
pub fn render_network_card(network: &Network, sensor_count: u32) -> String {
    let badge = format!("[{} {}]", sensor_count, sensor_label(sensor_count));
    let pad = 48usize.saturating_sub(network.name.chars().count() + badge.len());
    format!(
        "{}{}{}\n  identifier: {}\n",
        network.name,
        " ".repeat(pad.max(1)),
        badge,
        network.identifier
    )
}

/// Render every network in response order, separated by blank lines.
pub fn render_networks(networks: &[Network]) -> String {
    if networks.is_empty() {
        return "no networks\n".to_string();
    }
    networks
        .iter()
        .map(|n| render_network_card(n, PLACEHOLDER_SENSOR_COUNT))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sensor_label(count: u32) -> &'static str {
    if count == 1 {
        "sensor"
    } else {
        "sensors"
    }
}
