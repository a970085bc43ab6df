use anyhow::anyhow;

use crate::kernel::body::{ActorId, Body};
use crate::kernel::collaborators::{Brain, TurnContext};

/// Per-body countdown stored in the body's AI slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grudge {
    pub remaining: u32,
}

/// Swings at the player every `cooldown` ticks while the player is still up.
///
/// Bodies are staggered at init so a roster of identical brawlers does not
/// attack in lockstep.
#[derive(Debug, Clone)]
pub struct GrudgeBrain {
    cooldown: u32,
    stagger: u32,
    initialized: u32,
}

impl GrudgeBrain {
    pub fn new(cooldown: u32) -> Self {
        let cooldown = cooldown.max(1);
        Self {
            cooldown,
            stagger: (cooldown / 4).max(1),
            initialized: 0,
        }
    }
}

impl Default for GrudgeBrain {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Brain for GrudgeBrain {
    fn begin_session(&mut self) -> anyhow::Result<()> {
        self.initialized = 0;
        Ok(())
    }

    fn init(&mut self, body: &mut Body) -> anyhow::Result<()> {
        let remaining = self.cooldown + self.stagger * self.initialized;
        self.initialized += 1;
        body.ai.set(Grudge { remaining });
        Ok(())
    }

    fn decide(&mut self, actor: &ActorId, ctx: &mut TurnContext<'_>) -> anyhow::Result<()> {
        let player = ctx.roster.player();
        let target = player.id().clone();
        let target_up = player.is_active();

        let body = ctx
            .roster
            .get_mut(actor.as_str())
            .ok_or_else(|| anyhow!("unknown body {actor}"))?;
        let idle = !body.has_pending_command();
        let grudge = body
            .ai
            .get_mut::<Grudge>()
            .ok_or_else(|| anyhow!("{actor} has no grudge state"))?;

        grudge.remaining = grudge.remaining.saturating_sub(1);
        if grudge.remaining > 0 || !target_up || !idle {
            return Ok(());
        }

        grudge.remaining = self.cooldown;
        body.enqueue_command(format!("attack {target}"));
        Ok(())
    }
}
