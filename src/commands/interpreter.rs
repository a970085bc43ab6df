use thiserror::Error;

use crate::kernel::body::ActorId;
use crate::kernel::collaborators::{CommandHandler, TurnContext};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}")]
    UnknownVerb(String),

    #[error("{verb} needs a target")]
    MissingTarget { verb: &'static str },

    #[error("no body named {0:?}")]
    UnknownTarget(String),

    #[error("{0} cannot target itself")]
    SelfTarget(ActorId),

    #[error("command issued by unknown body {0}")]
    UnknownActor(ActorId),
}

/// Parsed form of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Attack(String),
    Heal,
    Wait,
    Status,
    Quit,
}

impl Verb {
    pub fn parse(command: &str) -> Result<Self, CommandError> {
        let mut words = command.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };

        match head {
            "attack" | "hit" => words
                .next()
                .map(|target| Verb::Attack(target.to_string()))
                .ok_or(CommandError::MissingTarget { verb: "attack" }),
            "heal" => Ok(Verb::Heal),
            "wait" => Ok(Verb::Wait),
            "status" | "look" => Ok(Verb::Status),
            "quit" | "exit" => Ok(Verb::Quit),
            other => Err(CommandError::UnknownVerb(other.to_string())),
        }
    }
}

/// Stock command handler for the brawl: hit someone, patch yourself up, or
/// end the session.
#[derive(Debug, Clone)]
pub struct Interpreter {
    attack_damage: u32,
    heal_amount: u32,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(5, 3)
    }
}

impl Interpreter {
    pub fn new(attack_damage: u32, heal_amount: u32) -> Self {
        Self { attack_damage, heal_amount }
    }

    fn attack(
        &self,
        actor: &ActorId,
        target: &str,
        ctx: &mut TurnContext<'_>,
    ) -> Result<(), CommandError> {
        if actor.as_str() == target {
            return Err(CommandError::SelfTarget(actor.clone()));
        }
        let victim = ctx
            .roster
            .get_mut(target)
            .ok_or_else(|| CommandError::UnknownTarget(target.to_string()))?;
        let victim_id = victim.id().clone();

        if !victim.is_active() {
            ctx.notify(actor, format!("{victim_id} is already down."));
            return Ok(());
        }

        victim.damage(self.attack_damage);
        let downed = !victim.is_active();

        ctx.notify(actor, format!("You hit {victim_id} for {}.", self.attack_damage));
        ctx.notify(&victim_id, format!("{actor} hits you for {}.", self.attack_damage));
        if downed {
            ctx.notify(actor, format!("{victim_id} goes down!"));
        }
        Ok(())
    }
}

impl CommandHandler for Interpreter {
    fn execute(
        &mut self,
        actor: &ActorId,
        command: &str,
        ctx: &mut TurnContext<'_>,
    ) -> anyhow::Result<()> {
        match Verb::parse(command)? {
            Verb::Attack(target) => self.attack(actor, &target, ctx)?,
            Verb::Heal => {
                let body = ctx
                    .roster
                    .get_mut(actor.as_str())
                    .ok_or_else(|| CommandError::UnknownActor(actor.clone()))?;
                body.restore(self.heal_amount);
                let health = body.health();
                ctx.notify(actor, format!("You patch yourself up. HP {health}."));
            }
            Verb::Wait => {}
            Verb::Status => {
                let body = ctx
                    .roster
                    .get(actor.as_str())
                    .ok_or_else(|| CommandError::UnknownActor(actor.clone()))?;
                let line = format!("HP {}/{}.", body.health(), body.max_health());
                ctx.notify(actor, line);
            }
            Verb::Quit => {
                ctx.request_stop();
                ctx.notify(actor, "Ending session.");
            }
        }
        Ok(())
    }
}
