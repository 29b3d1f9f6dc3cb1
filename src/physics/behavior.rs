//! Per-body behavior hooks and their dispatch.
//!
//! A body carries at most one [`BodyBehavior`]. During dispatch the behavior
//! is moved out of its body so the hook can borrow both the body and the
//! collision peer mutably, then put back once the hook returns.

use std::any::Any;

use crate::error::{PhysicsError, Result};

use super::body::{BodyHandle, BodySet, PhysicsBody};

/// Upcast to [`Any`] for behavior downcasting.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The other body of a contact.
pub struct Peer<'a> {
    pub handle: BodyHandle,
    pub body: &'a mut PhysicsBody,
}

/// Body-specific behavior driven by the engine.
///
/// Every hook defaults to a no-op. Hooks may mutate both bodies freely.
/// Returning an error aborts the rest of the fixed step.
pub trait BodyBehavior: AsAny + Send {
    /// Called once per fixed step on every enabled, awake body.
    fn update(&mut self, _body: &mut PhysicsBody, _dt: f32) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_collision_enter(
        &mut self,
        _body: &mut PhysicsBody,
        _other: Peer<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_collision_stay(
        &mut self,
        _body: &mut PhysicsBody,
        _other: Peer<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// `other_body` is `None` when the peer was removed from the body set.
    fn on_collision_exit(
        &mut self,
        _body: &mut PhysicsBody,
        _other: BodyHandle,
        _other_body: Option<&mut PhysicsBody>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Collision lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

impl ContactPhase {
    pub fn hook_name(&self) -> &'static str {
        match self {
            Self::Enter => "on_collision_enter",
            Self::Stay => "on_collision_stay",
            Self::Exit => "on_collision_exit",
        }
    }
}

/// Run the update hook of one body.
pub(crate) fn dispatch_update(bodies: &mut BodySet, handle: BodyHandle, dt: f32) -> Result<()> {
    let Some(body) = bodies.get_mut(handle) else {
        return Ok(());
    };
    let Some(mut behavior) = body.take_behavior() else {
        return Ok(());
    };
    let result = behavior.update(body, dt);
    body.restore_behavior(behavior);
    result.map_err(|source| hook_error(handle, "update", source))
}

/// Run the contact hooks of both bodies of a pair, `a` first.
pub(crate) fn dispatch_contact(
    bodies: &mut BodySet,
    a: BodyHandle,
    b: BodyHandle,
    phase: ContactPhase,
) -> Result<()> {
    dispatch_contact_one(bodies, a, b, phase)?;
    dispatch_contact_one(bodies, b, a, phase)
}

fn dispatch_contact_one(
    bodies: &mut BodySet,
    this: BodyHandle,
    other: BodyHandle,
    phase: ContactPhase,
) -> Result<()> {
    let Some(mut behavior) = bodies.get_mut(this).and_then(PhysicsBody::take_behavior) else {
        return Ok(());
    };

    let result = match bodies.pair_mut(this, other) {
        Some((body, peer)) => match phase {
            ContactPhase::Enter => behavior.on_collision_enter(
                body,
                Peer {
                    handle: other,
                    body: peer,
                },
            ),
            ContactPhase::Stay => behavior.on_collision_stay(
                body,
                Peer {
                    handle: other,
                    body: peer,
                },
            ),
            ContactPhase::Exit => behavior.on_collision_exit(body, other, Some(peer)),
        },
        // Peer no longer exists; only an exit can still be reported.
        None => match (phase, bodies.get_mut(this)) {
            (ContactPhase::Exit, Some(body)) => behavior.on_collision_exit(body, other, None),
            _ => Ok(()),
        },
    };

    if let Some(body) = bodies.get_mut(this) {
        body.restore_behavior(behavior);
    }
    result.map_err(|source| hook_error(this, phase.hook_name(), source))
}

fn hook_error(body: BodyHandle, hook: &'static str, source: anyhow::Error) -> PhysicsError {
    tracing::error!("{} hook failed on body {:?}: {:#}", hook, body, source);
    PhysicsError::Hook {
        body,
        hook,
        source: source.into(),
    }
}
