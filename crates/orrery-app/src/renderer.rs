//! Headless renderer that mirrors the scene and reports it through tracing.

use std::collections::HashMap;

use glam::DVec3;
use orrery_system::{Body, BodyId, Renderer};
use tracing::{debug, info, trace};

/// One mirrored body.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEntry {
    pub name: String,
    pub position: DVec3,
}

/// Keeps a name and last position per body and logs a summary every
/// `report_interval` frames (0 disables reports).
#[derive(Debug, Default)]
pub struct TracingRenderer {
    scene: HashMap<BodyId, SceneEntry>,
    report_interval: u64,
    frames: u64,
}

impl TracingRenderer {
    pub fn new(report_interval: u64) -> Self {
        Self {
            scene: HashMap::new(),
            report_interval,
            frames: 0,
        }
    }

    pub fn get(&self, id: BodyId) -> Option<&SceneEntry> {
        self.scene.get(&id)
    }

    pub fn len(&self) -> usize {
        self.scene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene.is_empty()
    }

    /// Frames seen through [`end_frame`](Self::end_frame).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Mark the end of a frame. Returns whether a report was logged.
    pub fn end_frame(&mut self, sim_time: f64) -> bool {
        self.frames += 1;
        if self.report_interval == 0 || self.frames % self.report_interval != 0 {
            return false;
        }
        self.report(sim_time);
        true
    }

    fn report(&self, sim_time: f64) {
        let farthest = self
            .scene
            .values()
            .max_by(|a, b| a.position.length().total_cmp(&b.position.length()));

        match farthest {
            Some(entry) => info!(
                "frame {}: t={sim_time:.2}, {} bodies, farthest '{}' at {:.2}",
                self.frames,
                self.scene.len(),
                entry.name,
                entry.position.length()
            ),
            None => info!("frame {}: t={sim_time:.2}, empty scene", self.frames),
        }

        let mut ids: Vec<_> = self.scene.keys().copied().collect();
        ids.sort();
        for id in ids {
            let entry = &self.scene[&id];
            debug!(
                "  {id} {:<16} ({:>9.3}, {:>9.3}, {:>9.3})",
                entry.name, entry.position.x, entry.position.y, entry.position.z
            );
        }
    }
}

impl Renderer for TracingRenderer {
    fn insert_body(&mut self, id: BodyId, body: &Body) {
        let elements = body.elements();
        debug!(
            "+ {id} '{}' a={:.3} e={:.3} P={:.1}",
            body.name(),
            elements.semi_major_axis(),
            elements.eccentricity(),
            elements.orbital_period()
        );
        self.scene.insert(
            id,
            SceneEntry {
                name: body.name().to_string(),
                position: body.position(),
            },
        );
    }

    fn remove_body(&mut self, id: BodyId) {
        if let Some(entry) = self.scene.remove(&id) {
            debug!("- {id} '{}'", entry.name);
        }
    }

    fn update_position(&mut self, id: BodyId, position: DVec3) {
        match self.scene.get_mut(&id) {
            Some(entry) => entry.position = position,
            None => trace!("position for unknown body {id}"),
        }
    }
}
