use crate::kernel::body::{ActorId, Body};
use crate::kernel::collaborators::{Brain, TurnContext};

/// AI that never acts. Bodies driven by it only ever run commands that
/// something else queued for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleBrain;

impl Brain for IdleBrain {
    fn init(&mut self, _body: &mut Body) -> anyhow::Result<()> {
        Ok(())
    }

    fn decide(&mut self, _actor: &ActorId, _ctx: &mut TurnContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}
