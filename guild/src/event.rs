use guild_governance::ProposalEvent;
use guild_orders::OrderEvent;
use guild_registry::RegistryEvent;
use serde::{Deserialize, Serialize};

/// Notification for off-core observers (indexers, UIs). Not trusted state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuildEvent {
    Registry(RegistryEvent),
    Order(OrderEvent),
    Proposal(ProposalEvent),
}

impl From<RegistryEvent> for GuildEvent {
    fn from(event: RegistryEvent) -> Self {
        GuildEvent::Registry(event)
    }
}

impl From<OrderEvent> for GuildEvent {
    fn from(event: OrderEvent) -> Self {
        GuildEvent::Order(event)
    }
}

impl From<ProposalEvent> for GuildEvent {
    fn from(event: ProposalEvent) -> Self {
        GuildEvent::Proposal(event)
    }
}
