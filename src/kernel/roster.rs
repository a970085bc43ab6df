use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::body::{ActorId, Body, Role};

/// Blueprint for one body of a session roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodySpec {
    pub id: ActorId,
    pub role: Role,
    pub max_health: i32,
}

impl BodySpec {
    pub fn player(id: &str, max_health: i32) -> Self {
        Self { id: ActorId::new(id), role: Role::Player, max_health }
    }

    pub fn ai(id: &str, max_health: i32) -> Self {
        Self { id: ActorId::new(id), role: Role::AiControlled, max_health }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("roster has no bodies")]
    Empty,

    #[error("duplicate body id {0}")]
    DuplicateId(ActorId),

    #[error("roster needs exactly one player, found {0}")]
    PlayerCount(usize),

    #[error("body {id} has non-positive max health {max_health}")]
    InvalidHealth { id: ActorId, max_health: i32 },
}

/// Fixed set of bodies for one session.
///
/// Membership never changes after [`Roster::build`]. Iteration follows the
/// order of the specs it was built from; that order is stable for a roster but
/// carries no meaning beyond determinism.
#[derive(Debug)]
pub struct Roster {
    bodies: Vec<Body>,
    index: HashMap<ActorId, usize>,
    player: usize,
}

impl Roster {
    pub fn build(specs: &[BodySpec]) -> Result<Self, RosterError> {
        if specs.is_empty() {
            return Err(RosterError::Empty);
        }

        let mut bodies = Vec::with_capacity(specs.len());
        let mut index = HashMap::with_capacity(specs.len());
        let mut players = Vec::new();

        for spec in specs {
            if spec.max_health <= 0 {
                return Err(RosterError::InvalidHealth {
                    id: spec.id.clone(),
                    max_health: spec.max_health,
                });
            }
            if index.insert(spec.id.clone(), bodies.len()).is_some() {
                return Err(RosterError::DuplicateId(spec.id.clone()));
            }
            if spec.role == Role::Player {
                players.push(bodies.len());
            }
            bodies.push(Body::new(spec.id.clone(), spec.role, spec.max_health));
        }

        match players.as_slice() {
            [player] => Ok(Self { bodies, index, player: *player }),
            other => Err(RosterError::PlayerCount(other.len())),
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ActorId> {
        self.bodies.iter().map(Body::id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Body> {
        self.index.get(id).map(|&i| &self.bodies[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Body> {
        match self.index.get(id) {
            Some(&i) => self.bodies.get_mut(i),
            None => None,
        }
    }

    pub fn at(&self, idx: usize) -> Option<&Body> {
        self.bodies.get(idx)
    }

    pub fn at_mut(&mut self, idx: usize) -> Option<&mut Body> {
        self.bodies.get_mut(idx)
    }

    pub fn player(&self) -> &Body {
        &self.bodies[self.player]
    }

    pub fn player_mut(&mut self) -> &mut Body {
        &mut self.bodies[self.player]
    }

    pub fn player_id(&self) -> &ActorId {
        self.bodies[self.player].id()
    }
}
