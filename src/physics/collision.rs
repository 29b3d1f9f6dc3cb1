//! Collision detection, contact lifecycle tracking and response.

use std::collections::{BTreeSet, HashSet};

use crate::error::{PhysicsError, Result};

use super::behavior::{dispatch_contact, ContactPhase};
use super::body::{BodyHandle, BodySet};
use super::broadphase::{SpatialGrid, DEFAULT_CELL_SIZE};
use super::contact::CollisionInfo;
use super::narrowphase::aabb_contact;
use super::solver::{resolve_contact, DEFAULT_CORRECTION_PERCENT, DEFAULT_SLOP};

type BodyPair = (BodyHandle, BodyHandle);

/// Tuning for the collision stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionConfig {
    /// Broadphase grid cell size in world units. Default: 100.
    pub cell_size: f32,
    /// Penetration tolerated before positional correction. Default: 0.05.
    pub slop: f32,
    /// Fraction of penetration corrected per step. Default: 0.4.
    pub correction_percent: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            slop: DEFAULT_SLOP,
            correction_percent: DEFAULT_CORRECTION_PERCENT,
        }
    }
}

impl CollisionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return Err(PhysicsError::invalid(
                "cell size",
                format!("must be > 0, got {}", self.cell_size),
            ));
        }
        if self.slop.is_nan() || self.slop < 0.0 {
            return Err(PhysicsError::invalid(
                "slop",
                format!("must be >= 0, got {}", self.slop),
            ));
        }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(PhysicsError::invalid(
                "correction percent",
                format!("must be in [0, 1], got {}", self.correction_percent),
            ));
        }
        Ok(())
    }
}

#[inline]
fn ordered(a: BodyHandle, b: BodyHandle) -> BodyPair {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Tracks registered bodies, finds overlapping pairs each step and fires
/// enter/stay/exit hooks.
#[derive(Debug, Clone)]
pub struct CollisionService {
    config: CollisionConfig,
    grid: SpatialGrid,
    bodies: Vec<BodyHandle>,
    /// Pairs that were colliding after the last detection pass.
    active_pairs: BTreeSet<BodyPair>,
    contacts: Vec<CollisionInfo>,
}

impl Default for CollisionService {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}

impl CollisionService {
    /// The config is expected to be validated already.
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            grid: SpatialGrid::new(config.cell_size),
            config,
            bodies: Vec::new(),
            active_pairs: BTreeSet::new(),
            contacts: Vec::new(),
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    pub fn is_registered(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(&handle)
    }

    /// Register a body and index it in the grid. Returns `false` if it was
    /// already registered.
    pub fn register(&mut self, bodies: &BodySet, handle: BodyHandle) -> bool {
        if self.is_registered(handle) {
            return false;
        }
        self.bodies.push(handle);
        if let Some(body) = bodies.get(handle) {
            self.grid.insert(handle, &body.bounds());
        }
        true
    }

    /// Drop a body from the registry and the grid.
    ///
    /// Pairs it was part of stay in the active set so the survivor still
    /// receives an exit on the next detection pass.
    pub fn unregister(&mut self, handle: BodyHandle) -> bool {
        let Some(index) = self.bodies.iter().position(|h| *h == handle) else {
            return false;
        };
        self.bodies.remove(index);
        self.grid.remove(handle);
        true
    }

    /// Forget all bodies, pairs and contacts.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.grid.clear();
        self.active_pairs.clear();
        self.contacts.clear();
    }

    /// Pairs colliding after the last detection pass.
    pub fn active_pairs(&self) -> impl Iterator<Item = BodyPair> + '_ {
        self.active_pairs.iter().copied()
    }

    pub fn is_colliding(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.active_pairs.contains(&ordered(a, b))
    }

    /// Contacts found by the last detection pass.
    pub fn contacts(&self) -> &[CollisionInfo] {
        &self.contacts
    }

    /// Rebuild the broadphase grid from current body positions.
    pub fn update_spatial_grid(&mut self, bodies: &BodySet) {
        self.grid.clear();
        for &handle in &self.bodies {
            if let Some(body) = bodies.get(handle) {
                self.grid.insert(handle, &body.bounds());
            }
        }
    }

    /// Find colliding pairs and fire lifecycle hooks.
    ///
    /// Disabled and sleeping bodies are skipped on both sides. New pairs fire
    /// enter, persisting pairs fire stay, and pairs from the previous pass
    /// that are gone fire exit. The active pair set is replaced wholesale.
    ///
    /// If a hook fails, the active set keeps the previous pairs whose exit was
    /// not sent and gains only the pairs whose enter or stay completed.
    pub fn detect_collisions(&mut self, bodies: &mut BodySet) -> Result<&[CollisionInfo]> {
        self.contacts.clear();
        let mut tested: HashSet<BodyPair> = HashSet::new();
        let mut current: BTreeSet<BodyPair> = BTreeSet::new();

        for &handle in &self.bodies {
            let Some(body) = bodies.get(handle) else {
                continue;
            };
            if !body.is_active() {
                continue;
            }

            for other in self.grid.query_nearby(handle, &body.bounds()) {
                let pair = ordered(handle, other);
                if !tested.insert(pair) {
                    continue;
                }
                let (Some(a), Some(b)) = (bodies.get(pair.0), bodies.get(pair.1)) else {
                    continue;
                };
                if !a.is_active() || !b.is_active() {
                    continue;
                }
                if !a.collider.should_collide(&b.collider) {
                    continue;
                }
                if let Some(contact) = aabb_contact(&a.bounds(), &b.bounds()) {
                    self.contacts.push(CollisionInfo {
                        body_a: pair.0,
                        body_b: pair.1,
                        contact,
                    });
                    current.insert(pair);
                }
            }
        }

        let previous = std::mem::take(&mut self.active_pairs);
        let mut committed = previous.clone();
        let result =
            dispatch_lifecycle(bodies, &self.contacts, &previous, &current, &mut committed);
        self.active_pairs = committed;
        result?;

        Ok(&self.contacts)
    }

    /// Apply impulse response to every contact of the last detection pass.
    ///
    /// Returns the number of contacts that received a response.
    pub fn resolve_collisions(&self, bodies: &mut BodySet) -> usize {
        self.contacts
            .iter()
            .filter(|info| self.resolve_collision(bodies, info))
            .count()
    }

    /// Resolve a single contact. Returns `false` if no response was applied.
    pub fn resolve_collision(&self, bodies: &mut BodySet, info: &CollisionInfo) -> bool {
        let Some((a, b)) = bodies.pair_mut(info.body_a, info.body_b) else {
            return false;
        };
        resolve_contact(
            a,
            b,
            &info.contact,
            self.config.slop,
            self.config.correction_percent,
        )
    }
}

/// Fire enter/stay for current contacts, then exit for vanished pairs.
///
/// `committed` starts as the previous pair set and tracks every completed
/// dispatch, so it equals `current` once all hooks succeed.
fn dispatch_lifecycle(
    bodies: &mut BodySet,
    contacts: &[CollisionInfo],
    previous: &BTreeSet<BodyPair>,
    current: &BTreeSet<BodyPair>,
    committed: &mut BTreeSet<BodyPair>,
) -> Result<()> {
    for info in contacts {
        let pair = (info.body_a, info.body_b);
        let phase = if previous.contains(&pair) {
            ContactPhase::Stay
        } else {
            tracing::debug!("Collision enter: {:?} <-> {:?}", pair.0, pair.1);
            ContactPhase::Enter
        };
        dispatch_contact(bodies, pair.0, pair.1, phase)?;
        committed.insert(pair);
    }

    for pair in previous.difference(current) {
        tracing::debug!("Collision exit: {:?} <-> {:?}", pair.0, pair.1);
        dispatch_contact(bodies, pair.0, pair.1, ContactPhase::Exit)?;
        committed.remove(pair);
    }
    Ok(())
}
