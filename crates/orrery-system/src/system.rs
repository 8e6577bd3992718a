//! Arena of orbiting bodies advanced in parent-before-child order.
//!
//! Bodies are appended to a flat `Vec` and referenced by index. A parent must
//! exist before a child is added, so storage order is a topological order of
//! the forest and a single forward pass resolves every barycenter from
//! positions already updated in the same step.

use glam::DVec3;
use orrery_orbit::{OrbitError, OrbitState, OrbitalElements, SolverConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::body::{Body, BodyId};
use crate::error::SystemError;
use crate::render::{Renderer, SceneChange};

/// A forest of bodies, each orbiting the origin or a parent body.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrbitalSystem {
    /// Removed bodies leave a `None` so handles are never reused.
    slots: Vec<Option<Body>>,
    solver: SolverConfig,
    /// Total simulation time stepped so far.
    elapsed: f64,
    #[serde(skip)]
    pending: Vec<SceneChange>,
}

impl OrbitalSystem {
    /// Empty system using the given Kepler solver settings.
    pub fn new(solver: SolverConfig) -> Self {
        Self {
            solver,
            ..Self::default()
        }
    }

    pub fn solver(&self) -> &SolverConfig {
        &self.solver
    }

    /// Add a body starting at periapsis. See [`add_body_at`](Self::add_body_at).
    pub fn add_body(
        &mut self,
        name: impl Into<String>,
        elements: OrbitalElements,
        parent: Option<BodyId>,
    ) -> Result<BodyId, SystemError> {
        self.add_body_at(name, elements, parent, 0.0)
    }

    /// Add a body whose orbit starts `initial_time` after periapsis.
    ///
    /// The body's position is resolved immediately from the parent's current
    /// position, so [`position_of`](Self::position_of) is valid before the
    /// first step.
    ///
    /// # Errors
    ///
    /// - [`SystemError::InvalidParent`] if `parent` is not a live body here.
    /// - [`SystemError::Orbit`] if the initial position cannot be solved.
    pub fn add_body_at(
        &mut self,
        name: impl Into<String>,
        elements: OrbitalElements,
        parent: Option<BodyId>,
        initial_time: f64,
    ) -> Result<BodyId, SystemError> {
        let barycenter = match parent {
            Some(parent_id) => self
                .position_of(parent_id)
                .map_err(|_| SystemError::InvalidParent(parent_id))?,
            None => DVec3::ZERO,
        };

        let orbit = OrbitState::with_time(elements, initial_time)?;
        let position = orbit.cartesian(barycenter, &self.solver)?;

        let id = BodyId(self.slots.len());
        let name = name.into();
        debug!("Adding body {id} '{name}' (parent: {parent:?})");

        self.slots.push(Some(Body {
            name,
            orbit,
            parent,
            position,
        }));
        self.pending.push(SceneChange::Inserted(id));
        Ok(id)
    }

    /// Remove a body together with everything orbiting it.
    ///
    /// Returns the removed handles in ascending order. All of them become
    /// stale.
    ///
    /// # Errors
    ///
    /// [`SystemError::UnknownBody`] if `id` is not live.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Vec<BodyId>, SystemError> {
        self.body(id)?;

        // Descendants always sit after their ancestors, so one forward scan
        // from `id` finds the whole subtree.
        let mut doomed = vec![false; self.slots.len()];
        doomed[id.0] = true;
        let mut removed = vec![id];
        for index in id.0 + 1..self.slots.len() {
            let Some(body) = &self.slots[index] else {
                continue;
            };
            if body.parent.is_some_and(|p| doomed[p.0]) {
                doomed[index] = true;
                removed.push(BodyId(index));
            }
        }

        for &gone in removed.iter().rev() {
            self.slots[gone.0] = None;
            self.queue_removal(gone);
        }
        debug!("Removed body {id} and {} descendant(s)", removed.len() - 1);
        Ok(removed)
    }

    fn queue_removal(&mut self, id: BodyId) {
        // A body removed before any renderer saw it needs no notice at all.
        if let Some(at) = self
            .pending
            .iter()
            .position(|c| *c == SceneChange::Inserted(id))
        {
            self.pending.remove(at);
        } else {
            self.pending.push(SceneChange::Removed(id));
        }
    }

    /// Advance every body by `dt` without a renderer.
    pub fn step(&mut self, dt: f64) -> Result<(), SystemError> {
        self.step_with(dt, &mut ())
    }

    /// Advance every body by `dt`, parents strictly before children, and hand
    /// each new position to `renderer`.
    ///
    /// Queued insertions and removals are delivered to the renderer first.
    /// New states are computed off to the side and committed together, so a
    /// failed step leaves every body and the elapsed time untouched.
    ///
    /// # Errors
    ///
    /// - [`SystemError::Orbit`] if `dt` is not finite or a position cannot be
    ///   solved.
    /// - [`SystemError::CyclicParentage`] / [`SystemError::InvalidParent`] if a
    ///   parent link does not point to an earlier live body.
    pub fn step_with<R: Renderer + ?Sized>(
        &mut self,
        dt: f64,
        renderer: &mut R,
    ) -> Result<(), SystemError> {
        if !dt.is_finite() {
            return Err(OrbitError::NonFinite { field: "time step" }.into());
        }
        self.flush_changes(renderer);

        let mut next: Vec<Option<(OrbitState, DVec3)>> = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(body) = slot else {
                next.push(None);
                continue;
            };
            let barycenter = match body.parent {
                Some(parent) => settled_position(&next, index, parent)?,
                None => DVec3::ZERO,
            };

            let mut orbit = body.orbit.clone();
            orbit.advance(dt)?;
            let position = orbit.cartesian(barycenter, &self.solver)?;
            next.push(Some((orbit, position)));
        }

        for (index, (slot, state)) in self.slots.iter_mut().zip(next).enumerate() {
            if let (Some(body), Some((orbit, position))) = (slot.as_mut(), state) {
                body.orbit = orbit;
                body.position = position;
                renderer.update_position(BodyId(index), position);
            }
        }

        self.elapsed += dt;
        trace!("Stepped {} bodies by {dt}", self.len());
        Ok(())
    }

    fn flush_changes<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        for change in std::mem::take(&mut self.pending) {
            match change {
                SceneChange::Inserted(id) => {
                    if let Some(body) = self.slots.get(id.0).and_then(Option::as_ref) {
                        renderer.insert_body(id, body);
                    }
                }
                SceneChange::Removed(id) => renderer.remove_body(id),
            }
        }
    }

    /// Most recently resolved absolute position of a body.
    pub fn position_of(&self, id: BodyId) -> Result<DVec3, SystemError> {
        self.body(id).map(Body::position)
    }

    pub fn body(&self, id: BodyId) -> Result<&Body, SystemError> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(SystemError::UnknownBody(id))
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.body(id).is_ok()
    }

    /// Live bodies in update order (parents before children).
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|b| (BodyId(i), b)))
    }

    /// Direct children of `id`.
    pub fn children(&self, id: BodyId) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies()
            .filter(move |(_, b)| b.parent == Some(id))
            .map(|(child, _)| child)
    }

    /// Parent chain of `id`, nearest first.
    ///
    /// # Errors
    ///
    /// [`SystemError::UnknownBody`] for a stale handle, [`SystemError::InvalidParent`]
    /// for a dangling link and [`SystemError::CyclicParentage`] if the chain is
    /// longer than the system, which only a corrupted snapshot can produce.
    pub fn ancestors(&self, id: BodyId) -> Result<Vec<BodyId>, SystemError> {
        let mut chain = Vec::new();
        let mut current = self.body(id)?;
        while let Some(parent) = current.parent {
            if chain.len() >= self.slots.len() {
                return Err(SystemError::CyclicParentage(id));
            }
            chain.push(parent);
            current = self
                .body(parent)
                .map_err(|_| SystemError::InvalidParent(parent))?;
        }
        Ok(chain)
    }

    /// Number of parents above `id`; roots have depth 0.
    pub fn depth(&self, id: BodyId) -> Result<usize, SystemError> {
        self.ancestors(id).map(|chain| chain.len())
    }

    /// Check every parent link, e.g. after loading a snapshot.
    ///
    /// Every parent must be live and stored before its child; that ordering
    /// alone rules out cycles.
    pub fn validate(&self) -> Result<(), SystemError> {
        for (id, body) in self.bodies() {
            if let Some(parent) = body.parent {
                if parent.0 >= id.0 {
                    return Err(SystemError::CyclicParentage(id));
                }
                if !self.contains(parent) {
                    return Err(SystemError::InvalidParent(parent));
                }
            }
        }
        Ok(())
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total simulation time stepped so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// Position of `parent` as computed earlier in the current pass.
fn settled_position(
    next: &[Option<(OrbitState, DVec3)>],
    child_index: usize,
    parent: BodyId,
) -> Result<DVec3, SystemError> {
    if parent.0 >= child_index {
        return Err(SystemError::CyclicParentage(BodyId(child_index)));
    }
    next[parent.0]
        .as_ref()
        .map(|(_, position)| *position)
        .ok_or(SystemError::InvalidParent(parent))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(period: f64, radius: f64) -> OrbitalElements {
        OrbitalElements::circular(period, radius).unwrap()
    }

    fn assert_vec_close(actual: DVec3, expected: DVec3) {
        assert!(
            (actual - expected).length() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[derive(Default)]
    struct RecordingRenderer {
        inserted: Vec<(BodyId, String)>,
        removed: Vec<BodyId>,
        updates: Vec<(BodyId, DVec3)>,
    }

    impl Renderer for RecordingRenderer {
        fn insert_body(&mut self, id: BodyId, body: &Body) {
            self.inserted.push((id, body.name().to_string()));
        }

        fn remove_body(&mut self, id: BodyId) {
            self.removed.push(id);
        }

        fn update_position(&mut self, id: BodyId, position: DVec3) {
            self.updates.push((id, position));
        }
    }

    #[test]
    fn test_root_orbits_origin() {
        let mut system = OrbitalSystem::default();
        let planet = system.add_body("planet", circle(360.0, 10.0), None).unwrap();
        assert_vec_close(system.position_of(planet).unwrap(), DVec3::new(10.0, 0.0, 0.0));

        system.step(90.0).unwrap();
        assert_vec_close(system.position_of(planet).unwrap(), DVec3::new(0.0, 0.0, 10.0));
        assert!((system.elapsed() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_level_chain_propagates_top_down() {
        let mut system = OrbitalSystem::default();
        let root = system.add_body("sun-orbiter", circle(360.0, 100.0), None).unwrap();
        let child = system.add_body("moon", circle(40.0, 10.0), Some(root)).unwrap();
        let grandchild = system.add_body("moonlet", circle(8.0, 1.0), Some(child)).unwrap();

        system.step(2.0).unwrap();

        let solver = SolverConfig::default();
        let offset = |period: f64, radius: f64| {
            orrery_orbit::cartesian_position(&circle(period, radius), 2.0, DVec3::ZERO, &solver)
                .unwrap()
        };
        let root_pos = system.position_of(root).unwrap();
        let expected = root_pos + offset(40.0, 10.0) + offset(8.0, 1.0);

        assert_vec_close(root_pos, offset(360.0, 100.0));
        assert_vec_close(system.position_of(child).unwrap(), root_pos + offset(40.0, 10.0));
        assert_vec_close(system.position_of(grandchild).unwrap(), expected);
    }

    #[test]
    fn test_children_never_lag_a_step_behind() {
        let mut system = OrbitalSystem::default();
        let planet = system.add_body("planet", circle(100.0, 50.0), None).unwrap();
        let moon = system.add_body("moon", circle(10.0, 2.0), Some(planet)).unwrap();

        for _ in 0..25 {
            system.step(1.7).unwrap();
            let planet_pos = system.position_of(planet).unwrap();
            let moon_orbit = system.body(moon).unwrap().orbit().clone();
            let local = moon_orbit.cartesian(DVec3::ZERO, system.solver()).unwrap();
            assert_vec_close(system.position_of(moon).unwrap(), planet_pos + local);
        }
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut system = OrbitalSystem::default();
        let result = system.add_body("orphan", circle(10.0, 1.0), Some(BodyId(3)));
        assert_eq!(result, Err(SystemError::InvalidParent(BodyId(3))));
        assert!(system.is_empty());
    }

    #[test]
    fn test_non_convergent_body_is_not_added() {
        let solver = SolverConfig {
            epsilon: 1e-12,
            max_iterations: 1,
        };
        let mut system = OrbitalSystem::new(solver);
        let elements = OrbitalElements::new(100.0, 5.0, 0.99, 0.0, 0.0, 0.0).unwrap();
        let result = system.add_body_at("comet", elements, None, 1.0);
        assert!(matches!(
            result,
            Err(SystemError::Orbit(OrbitError::NonConvergence { .. }))
        ));
        assert!(system.is_empty());
    }

    #[test]
    fn test_removal_cascades_and_stales_handles() {
        let mut system = OrbitalSystem::default();
        let a = system.add_body("a", circle(100.0, 10.0), None).unwrap();
        let b = system.add_body("b", circle(100.0, 20.0), None).unwrap();
        let a_moon = system.add_body("a-moon", circle(10.0, 1.0), Some(a)).unwrap();
        let b_moon = system.add_body("b-moon", circle(10.0, 1.0), Some(b)).unwrap();
        let a_moonlet = system.add_body("a-moonlet", circle(2.0, 0.1), Some(a_moon)).unwrap();

        let removed = system.remove_body(a).unwrap();
        assert_eq!(removed, vec![a, a_moon, a_moonlet]);
        assert_eq!(system.len(), 2);
        assert_eq!(system.position_of(a_moon), Err(SystemError::UnknownBody(a_moon)));
        assert_eq!(system.remove_body(a), Err(SystemError::UnknownBody(a)));

        // Survivors keep stepping and new handles are fresh.
        system.step(1.0).unwrap();
        assert!(system.position_of(b_moon).is_ok());
        let c = system.add_body("c", circle(50.0, 5.0), None).unwrap();
        assert!(c.index() > a_moonlet.index());
    }

    #[test]
    fn test_renderer_receives_lifecycle_and_positions() {
        let mut system = OrbitalSystem::default();
        let mut renderer = RecordingRenderer::default();
        let planet = system.add_body("planet", circle(100.0, 10.0), None).unwrap();
        let moon = system.add_body("moon", circle(10.0, 1.0), Some(planet)).unwrap();

        system.step_with(1.0, &mut renderer).unwrap();
        assert_eq!(
            renderer.inserted,
            vec![(planet, "planet".to_string()), (moon, "moon".to_string())]
        );
        let order: Vec<_> = renderer.updates.iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![planet, moon]);
        assert_eq!(renderer.updates[1].1, system.position_of(moon).unwrap());

        system.remove_body(moon).unwrap();
        renderer.updates.clear();
        system.step_with(1.0, &mut renderer).unwrap();
        assert_eq!(renderer.removed, vec![moon]);
        assert_eq!(renderer.updates.len(), 1);
    }

    #[test]
    fn test_body_removed_before_render_is_never_announced() {
        let mut system = OrbitalSystem::default();
        let mut renderer = RecordingRenderer::default();
        let ghost = system.add_body("ghost", circle(10.0, 1.0), None).unwrap();
        system.remove_body(ghost).unwrap();

        system.step_with(1.0, &mut renderer).unwrap();
        assert!(renderer.inserted.is_empty());
        assert!(renderer.removed.is_empty());
    }

    #[test]
    fn test_failed_step_leaves_every_body_untouched() {
        let solver = SolverConfig {
            epsilon: 1e-12,
            max_iterations: 1,
        };
        let mut system = OrbitalSystem::new(solver);
        // Circular orbits solve without iterating; the eccentric one cannot.
        let planet = system.add_body("planet", circle(10.0, 1.0), None).unwrap();
        let comet_elements = OrbitalElements::new(100.0, 5.0, 0.99, 0.0, 0.0, 0.0).unwrap();
        let comet = system.add_body("comet", comet_elements, None).unwrap();
        let moon = system
            .add_body("moon", circle(2.0, 0.1), Some(planet))
            .unwrap();
        let before = system.clone();

        let mut renderer = RecordingRenderer::default();
        let result = system.step_with(0.0616, &mut renderer);
        assert!(matches!(
            result,
            Err(SystemError::Orbit(OrbitError::NonConvergence { .. }))
        ));

        assert_eq!(system.elapsed(), 0.0);
        assert!(renderer.updates.is_empty());
        for id in [planet, comet, moon] {
            let body = system.body(id).unwrap();
            assert_eq!(body, before.body(id).unwrap());
            assert_eq!(body.orbit().time(), 0.0);
        }
        // Position still matches the stored time.
        let planet_body = system.body(planet).unwrap();
        assert_vec_close(
            planet_body.position(),
            planet_body.orbit().cartesian(DVec3::ZERO, &SolverConfig::default()).unwrap(),
        );
    }

    #[test]
    fn test_non_finite_step_rejected_without_side_effects() {
        let mut system = OrbitalSystem::default();
        let planet = system.add_body("planet", circle(10.0, 1.0), None).unwrap();
        let before = system.position_of(planet).unwrap();
        assert!(system.step(f64::NAN).is_err());
        assert_eq!(system.position_of(planet).unwrap(), before);
        assert_eq!(system.elapsed(), 0.0);
    }

    #[test]
    fn test_hierarchy_queries() {
        let mut system = OrbitalSystem::default();
        let root = system.add_body("root", circle(100.0, 10.0), None).unwrap();
        let moon_a = system.add_body("a", circle(10.0, 1.0), Some(root)).unwrap();
        let moon_b = system.add_body("b", circle(12.0, 2.0), Some(root)).unwrap();
        let moonlet = system.add_body("c", circle(1.0, 0.1), Some(moon_b)).unwrap();

        assert_eq!(system.children(root).collect::<Vec<_>>(), vec![moon_a, moon_b]);
        assert_eq!(system.ancestors(moonlet).unwrap(), vec![moon_b, root]);
        assert_eq!(system.depth(root).unwrap(), 0);
        assert_eq!(system.depth(moonlet).unwrap(), 2);
        assert_eq!(system.body(moon_a).unwrap().parent(), Some(root));
        assert_eq!(system.body(moon_b).unwrap().elements().orbital_period(), 12.0);
    }

    #[test]
    fn test_snapshot_roundtrip_and_validation() {
        let mut system = OrbitalSystem::default();
        let root = system.add_body("root", circle(100.0, 10.0), None).unwrap();
        system.add_body("moon", circle(10.0, 1.0), Some(root)).unwrap();
        system.step(3.0).unwrap();

        let json = serde_json::to_string(&system).unwrap();
        let mut restored: OrbitalSystem = serde_json::from_str(&json).unwrap();
        restored.validate().unwrap();
        assert_eq!(restored.len(), 2);

        system.step(1.0).unwrap();
        restored.step(1.0).unwrap();
        for ((_, a), (_, b)) in system.bodies().zip(restored.bodies()) {
            assert_vec_close(a.position(), b.position());
        }
    }

    #[test]
    fn test_corrupted_snapshot_fails_loudly() {
        let mut system = OrbitalSystem::default();
        let root = system.add_body("root", circle(100.0, 10.0), None).unwrap();
        let moon = system.add_body("moon", circle(10.0, 1.0), Some(root)).unwrap();

        // Point the root at its own child.
        system.slots[root.0].as_mut().unwrap().parent = Some(moon);
        assert_eq!(system.validate(), Err(SystemError::CyclicParentage(root)));
        assert_eq!(system.step(1.0), Err(SystemError::CyclicParentage(root)));
        assert_eq!(system.ancestors(moon), Err(SystemError::CyclicParentage(moon)));
    }
}
