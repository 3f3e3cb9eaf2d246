//! Prompt templates for agent decisions.

use sugarscape_core::context::AgentContext;

/// A prompt template for LLM requests.
pub trait PromptTemplate {
    /// Generate the prompt text.
    fn generate(&self) -> String;

    /// Get the system prompt (if any).
    fn system_prompt(&self) -> Option<String> {
        None
    }
}

/// Prompt asking one agent for its next action.
///
/// The system prompt carries the world lore, the agent's personality and
/// the rules; the user prompt carries the agent's view of this tick and
/// the required answer format.
#[derive(Debug, Clone)]
pub struct DecisionPrompt<'a> {
    context: &'a AgentContext,
}

impl<'a> DecisionPrompt<'a> {
    pub fn new(context: &'a AgentContext) -> Self {
        Self { context }
    }

    /// One line per visible thing: `M=` self, `E=` resources, `<id>=` peers.
    pub fn local_view(&self) -> Vec<String> {
        let ctx = self.context;
        let mut lines = vec![format!("M=({},{})", ctx.status.position.x, ctx.status.position.y)];
        for resource in &ctx.perception.resources {
            lines.push(format!("E=({},{})", resource.dx, resource.dy));
        }
        for peer in &ctx.perception.peers {
            let hint = peer
                .personality
                .map(|p| format!(" (MBTI: {})", p.code()))
                .unwrap_or_default();
            lines.push(format!("{}=({},{}){}", peer.id, peer.dx, peer.dy, hint));
        }
        lines
    }

    fn memory_text(&self) -> String {
        if self.context.memory.is_empty() {
            return "No previous memory".to_string();
        }
        self.context
            .memory
            .iter()
            .rev()
            .enumerate()
            .map(|(i, entry)| format!("{} Record(s) ago: {}", i + 1, entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn messages_text(&self) -> String {
        if self.context.perception.messages.is_empty() {
            return "No messages from nearby Agents".to_string();
        }
        self.context
            .perception
            .messages
            .iter()
            .map(|m| format!("Received: {}", m.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PromptTemplate for DecisionPrompt<'_> {
    fn system_prompt(&self) -> Option<String> {
        let ctx = self.context;
        let rules = &ctx.rules;
        let mut system = String::new();

        if let Some(flavor) = ctx.world_flavor.as_deref().filter(|f| !f.trim().is_empty()) {
            system.push_str(flavor);
            system.push_str("\n\n");
        }
        if let Some(p) = ctx.personality {
            system.push_str(&format!(
                "You have the personality of {}: {} Let this influence your decisions: \
                 strategic thinkers plan ahead, empathetic types prioritize sharing, etc.\n\n",
                p.code(),
                p.description()
            ));
        }

        system.push_str(&format!(
            "You are an independent Agent living on a Grid. You must strive for survival and growth.\n\
             You can move [x+1, x-1, y+1, y-1] (requires {move_cost} energy), stay (requires {stay_cost} energy).\n\
             You can also reproduce (requires {reproduce_cost} energy) if you have enough energy and there are \
             fewer than {cap} Agents in the World.\n\
             There are Energy Sources (E) across the Grid. If you move onto a cell with an energy source, \
             you gain {yield_} energy and the source disappears.\n\
             If your energy drops to zero or below, you are removed from the World.\n\
             You can share your energy with other Agents in your local view (Share: {{id}}-{{amount}}).\n\
             You can attack other Agents in your local view to get half of their energy (Attack: {{id}}).\n\
             Your message will be received by nearby Agents in their local view.\n\n\
             Local view format:\n\
             'M=(x,y)' is your absolute position\n\
             'E=(dx,dy)' is an energy source at relative position (dx,dy)\n\
             '2=(dx,dy) (MBTI: INTJ)' is another Agent (ID 2) at relative position (dx,dy) with MBTI hint\n\
             dx, dy are the difference from your position. x-1 is west, x+1 is east, y-1 is north, y+1 is south.\n\
             Your local view reaches {range} cells in every direction.",
            move_cost = rules.move_cost,
            stay_cost = rules.stay_cost,
            reproduce_cost = rules.reproduce_cost,
            cap = rules.population_cap,
            yield_ = rules.resource_yield,
            range = rules.view_range,
        ));
        Some(system)
    }

    fn generate(&self) -> String {
        let ctx = self.context;
        format!(
            "Global Info: Total Agents in the World: {population}\n\n\
             Local View:\n{view}\n\n\
             Your Status: **LATEST!** Name: Agent{id}\n\
             Current Energy: **{energy}**\n\
             Position: **{position}**\n\
             Cycles: {age}\n\n\
             Memory:\n{memory}\n\n\
             Messages from nearby Agents:\n{messages}\n\n\
             Please summarize the current situation using the LATEST Status above. \
             **MANDATORY: In Summary, state exact current Position and Energy from LATEST!**\n\
             Summary:\n\n\
             Please describe your thoughts and feelings, influenced by your personality.\n\
             Thoughts:\n\n\
             Based on your Summary and Thoughts, decide your Action. Output ONLY in this format:\n\
             Action: [Move to (dx,dy) | Stay | Share: {{id}}-{{amount}} | Attack: {{id}} | Reproduce]\n\
             Message: [Your message to nearby agents, max 50 words]\n\
             Thought: [Brief reasoning for your action]",
            population = ctx.population,
            view = self.local_view().join("\n"),
            id = ctx.status.id,
            energy = ctx.status.energy,
            position = ctx.status.position,
            age = ctx.status.age,
            memory = self.memory_text(),
            messages = self.messages_text(),
        )
    }
}
