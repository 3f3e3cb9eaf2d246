//! Two-buffer local broadcast.
//!
//! Messages sent in tick T land in the receiver's outbox and become its
//! inbox at the start of tick T+1. Each message is readable for exactly one
//! tick, so a receiver never sees a message sent in the same tick.

use crate::registry::{AgentRegistry, LivingSnapshot};
use sugarscape_core::types::{truncate_chars, AgentId, Message, Tick};

/// Characters of rationale carried in a broadcast.
pub const BROADCAST_RATIONALE_CHARS: usize = 50;

/// Swap buffers: this tick's inbox is whatever arrived last tick.
pub fn open_mailboxes(registry: &mut AgentRegistry, snapshot: &LivingSnapshot) {
    for id in snapshot.ids() {
        if let Some(agent) = registry.get_mut(*id) {
            agent.inbox = std::mem::take(&mut agent.outbox);
        }
    }
}

/// Broadcast text for one sender, or `None` if it has not acted yet.
pub fn broadcast_text(registry: &AgentRegistry, id: AgentId) -> Option<String> {
    let agent = registry.get(id)?;
    let decision = agent.last_decision.as_ref()?;
    let origin = agent
        .personality
        .map_or_else(|| "None".to_string(), |p| p.code().to_string());
    Some(format!(
        "{} - Thought: {} (from {})",
        decision.intent,
        truncate_chars(&decision.rationale, BROADCAST_RATIONALE_CHARS),
        origin
    ))
}

/// Deliver a broadcast from every sender to every other sender in range.
///
/// `senders` are the snapshot agents still alive after the death check.
/// Children born this tick neither send nor receive. Returns the number of
/// messages delivered.
pub fn deliver(registry: &mut AgentRegistry, senders: &[AgentId], view_range: i64, tick: Tick) -> usize {
    let outgoing: Vec<(AgentId, Message)> = senders
        .iter()
        .filter_map(|id| {
            let text = broadcast_text(registry, *id)?;
            let origin = registry.get(*id)?.position;
            Some((
                *id,
                Message {
                    from: *id,
                    text,
                    origin,
                    sent_tick: tick,
                },
            ))
        })
        .collect();

    let mut delivered = 0;
    for receiver in senders {
        let Some(position) = registry.get(*receiver).map(|a| a.position) else {
            continue;
        };
        let inbound: Vec<Message> = outgoing
            .iter()
            .filter(|(from, msg)| from != receiver && msg.origin.within(position, view_range))
            .map(|(_, msg)| msg.clone())
            .collect();
        if let Some(agent) = registry.get_mut(*receiver) {
            delivered += inbound.len();
            agent.outbox.extend(inbound);
        }
    }
    delivered
}
