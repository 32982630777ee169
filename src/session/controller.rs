use anyhow::Result;
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::db::Database;
use crate::models::ExerciseKey;
use crate::scoring::{CoverageTracker, StrokeProfile};
use crate::session::input::InputEvent;
use crate::session::state::{TracePhase, TraceState};
use crate::surface::{Surface, SurfaceGeometry};
use crate::template::{classify_with_display, ClassifierConfig, TemplateMask, TemplateResolver};

/// Opacity the template is rendered at as the faint tracing guide.
const TEMPLATE_OPACITY: f32 = 0.3;

/// One learner working one exercise: the template mask, the stroke state,
/// and the coverage accumulator. Built fresh on every exercise entry; never
/// shared between exercises.
pub struct TraceSession {
    id: String,
    key: ExerciseKey,
    profile: StrokeProfile,
    mask: TemplateMask,
    state: TraceState,
    coverage: CoverageTracker,
}

impl TraceSession {
    fn new(key: ExerciseKey, profile: StrokeProfile, mask: TemplateMask) -> Self {
        let total = mask.total_ink_pixels();
        Self {
            id: Uuid::new_v4().to_string(),
            key,
            profile,
            state: TraceState::new(total),
            coverage: CoverageTracker::new(profile.match_radius),
            mask,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> ExerciseKey {
        self.key
    }

    pub fn profile(&self) -> StrokeProfile {
        self.profile
    }

    pub fn mask(&self) -> &TemplateMask {
        &self.mask
    }

    pub fn state(&self) -> &TraceState {
        &self.state
    }
}

/// Display state handed to the host after every event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSnapshot {
    pub key: ExerciseKey,
    pub phase: TracePhase,
    pub message: String,
    pub percentage: f64,
    pub passed: bool,
}

/// The engine facade: owns the progress store, template resolver, drawing
/// surface, and the current session, and routes input events through the
/// tracker.
pub struct TraceEngine<S: Surface> {
    db: Database,
    resolver: TemplateResolver,
    classifier: ClassifierConfig,
    geometry: SurfaceGeometry,
    surface: S,
    session: Option<TraceSession>,
}

impl<S: Surface> TraceEngine<S> {
    pub fn new(db: Database, resolver: TemplateResolver, surface: S) -> Self {
        let (width, height) = surface.grid_size();
        Self {
            db,
            resolver,
            classifier: ClassifierConfig::default(),
            geometry: SurfaceGeometry::identity(width, height),
            surface,
            session: None,
        }
    }

    /// Where the surface sits on the host display; pointer events are
    /// mapped through this before tracking.
    pub fn set_geometry(&mut self, geometry: SurfaceGeometry) {
        self.geometry = geometry;
    }

    pub fn set_classifier(&mut self, classifier: ClassifierConfig) {
        self.classifier = classifier;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn session(&self) -> Option<&TraceSession> {
        self.session.as_ref()
    }

    /// Enter an exercise: classify its template, redraw the guide, and
    /// rehydrate any stored progress. An unfinished stroke on the previous
    /// exercise is discarded without being persisted.
    pub fn enter(&mut self, key: ExerciseKey, profile: StrokeProfile) {
        if let Some(session) = &self.session {
            if session.state.is_drawing() {
                info!(
                    "session {}: abandoning unfinished stroke on {}",
                    session.id, session.key
                );
            }
        }

        let mask = self.redraw_template(key);
        let mut session = TraceSession::new(key, profile, mask);
        self.rehydrate(&mut session);
        info!(
            "session {}: entered exercise {} ({} ink pixels)",
            session.id,
            key,
            session.mask.total_ink_pixels()
        );
        self.session = Some(session);
    }

    /// Feed one pointer event through the tracker. Events arriving before
    /// any exercise was entered, and Move/End outside the drawing phase,
    /// are ignored.
    pub fn handle_input(&mut self, event: InputEvent) {
        let Some(session) = self.session.as_mut() else {
            warn!("input event before any exercise was entered");
            return;
        };

        match event {
            InputEvent::Begin(at) => {
                let at = self.geometry.to_canvas(at);
                session.coverage.reset();
                session.state.begin(at);
                session.coverage.add_point(at, &session.mask);
            }
            InputEvent::Move(at) => {
                if !session.state.is_drawing() {
                    return;
                }
                let at = self.geometry.to_canvas(at);
                let previous = session.state.path.last().copied().unwrap_or(at);
                session.state.append(at);
                self.surface.draw_segment(previous, at, session.profile.thickness);
                session.coverage.add_point(at, &session.mask);
                session.state.live_update(session.coverage.result(&session.mask));
            }
            InputEvent::End => {
                if !session.state.is_drawing() {
                    return;
                }
                let result = session.coverage.result(&session.mask);
                let passed = session.state.finish(result);
                info!(
                    "session {}: stroke on {} finished at {:.1}% ({})",
                    session.id,
                    session.key,
                    result.percentage,
                    if passed { "pass" } else { "fail" }
                );
                if let Err(err) = self.db.save_progress(
                    session.key,
                    &session.id,
                    &session.state.path,
                    result.percentage,
                ) {
                    warn!("failed to persist progress for {}: {err:#}", session.key);
                }
            }
        }
    }

    /// Discard drawn and persisted progress for the current exercise and
    /// restore the initial prompt. Ignored while a stroke is active.
    pub fn clear(&mut self) {
        let (key, profile) = match &self.session {
            Some(session) if session.state.is_drawing() => {
                warn!("clear requested mid-stroke on {}; ignoring", session.key);
                return;
            }
            Some(session) => (session.key, session.profile),
            None => return,
        };

        if let Err(err) = self.db.clear_progress(key) {
            warn!("failed to clear stored progress for {key}: {err:#}");
        }
        let mask = self.redraw_template(key);
        self.session = Some(TraceSession::new(key, profile, mask));
    }

    /// Current display state for the host.
    pub fn snapshot(&self) -> Option<TraceSnapshot> {
        self.session.as_ref().map(|session| TraceSnapshot {
            key: session.key,
            phase: session.state.phase,
            message: session.state.message.clone(),
            percentage: session.state.result.percentage,
            passed: session.state.result.is_pass(),
        })
    }

    /// Encode the surface raster as PNG (the save-as-image feature).
    pub fn export_png(&self) -> Result<Vec<u8>> {
        self.surface.export_png()
    }

    /// Clear the surface, draw the template guide, and classify it into a
    /// mask. Reclassifying the same template yields the same mask.
    fn redraw_template(&mut self, key: ExerciseKey) -> TemplateMask {
        let (width, height) = self.surface.grid_size();
        self.surface.clear();
        match self.resolver.load(key) {
            Some(image) => {
                let (mask, display) =
                    classify_with_display(&image, width, height, &self.classifier);
                self.surface.draw_template(&display, TEMPLATE_OPACITY);
                mask
            }
            None => TemplateMask::empty(width, height),
        }
    }

    /// Replay stored progress: redraw the stroke at its original thickness
    /// and re-derive the score from the mask and path. The stored
    /// percentage is only a summary cache and is never trusted here.
    fn rehydrate(&mut self, session: &mut TraceSession) {
        let stored = match self.db.load_progress(session.key) {
            Ok(found) => found,
            Err(err) => {
                warn!("failed to load progress for {}: {err:#}", session.key);
                None
            }
        };
        let Some(progress) = stored else { return };

        if let [only] = progress.path.as_slice() {
            self.surface.draw_segment(*only, *only, session.profile.thickness);
        }
        for pair in progress.path.windows(2) {
            self.surface
                .draw_segment(pair[0], pair[1], session.profile.thickness);
        }

        for point in &progress.path {
            session.coverage.add_point(*point, &session.mask);
        }
        let result = session.coverage.result(&session.mask);
        session.state.restore(progress.path, result);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use image::{DynamicImage, Rgba, RgbaImage};
    use uuid::Uuid;

    use super::TraceEngine;
    use crate::db::Database;
    use crate::models::{ExerciseKey, Point};
    use crate::scoring::StrokeProfile;
    use crate::session::input::InputEvent;
    use crate::session::state::{TracePhase, PROMPT_MESSAGE};
    use crate::surface::{RasterSurface, SurfaceGeometry};
    use crate::template::TemplateResolver;

    const GRID: u32 = 16;

    /// Asset dir holding a solid-dark 1-1.png, so the whole grid is ink.
    fn asset_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tracekit-engine-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            GRID,
            GRID,
            Rgba([0, 0, 0, 255]),
        ));
        img.save(dir.join("1-1.png")).unwrap();
        dir
    }

    fn engine() -> (TraceEngine<RasterSurface>, Database) {
        let db = Database::open_in_memory().unwrap();
        let engine = TraceEngine::new(
            db.clone(),
            TemplateResolver::new(asset_dir()),
            RasterSurface::new(GRID, GRID),
        );
        (engine, db)
    }

    fn center() -> Point {
        Point::new(8.0, 8.0)
    }

    /// Radius 16 from the grid center reaches every cell of a 16x16 grid.
    fn covering_profile() -> StrokeProfile {
        StrokeProfile {
            thickness: 16.0,
            match_radius: 16.0,
        }
    }

    #[test]
    fn a_covering_stroke_passes_and_persists() {
        let (mut engine, db) = engine();
        let key = ExerciseKey::new(1, 1);
        engine.enter(key, covering_profile());

        engine.handle_input(InputEvent::Begin(center()));
        engine.handle_input(InputEvent::Move(Point::new(9.0, 8.0)));
        engine.handle_input(InputEvent::End);

        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.percentage, 100.0);
        assert!(snapshot.passed);
        assert!(snapshot.message.contains("Well done"));

        let stored = db.load_progress(key).unwrap().unwrap();
        assert_eq!(stored.percentage, 100.0);
        assert_eq!(stored.path, engine.session().unwrap().state().path);
    }

    #[test]
    fn a_missing_template_degrades_to_zero_percent() {
        let (mut engine, db) = engine();
        let key = ExerciseKey::new(7, 7); // no such template
        engine.enter(key, StrokeProfile::thin());

        engine.handle_input(InputEvent::Begin(center()));
        engine.handle_input(InputEvent::Move(Point::new(9.0, 9.0)));
        engine.handle_input(InputEvent::End);

        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.percentage, 0.0);
        assert!(!snapshot.passed);

        // The zero score is still a completed stroke and is persisted.
        assert_eq!(db.load_progress(key).unwrap().unwrap().percentage, 0.0);
    }

    #[test]
    fn moves_outside_the_drawing_phase_are_ignored() {
        let (mut engine, _db) = engine();
        engine.enter(ExerciseKey::new(1, 1), StrokeProfile::thin());

        engine.handle_input(InputEvent::Move(center()));
        engine.handle_input(InputEvent::End);

        let session = engine.session().unwrap();
        assert!(session.state().path.is_empty());
        assert_eq!(session.state().phase, TracePhase::Idle);
    }

    #[test]
    fn input_before_entering_any_exercise_is_ignored() {
        let (mut engine, _db) = engine();
        engine.handle_input(InputEvent::Begin(center()));
        assert!(engine.snapshot().is_none());
    }

    #[test]
    fn switching_exercises_discards_an_unfinished_stroke() {
        let (mut engine, db) = engine();
        let first = ExerciseKey::new(1, 1);
        engine.enter(first, covering_profile());

        engine.handle_input(InputEvent::Begin(center()));
        engine.handle_input(InputEvent::Move(Point::new(10.0, 10.0)));
        // No End: the learner navigated away mid-stroke.
        engine.enter(ExerciseKey::new(2, 1), StrokeProfile::thin());

        assert!(db.load_progress(first).unwrap().is_none());
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.key, ExerciseKey::new(2, 1));
        assert_eq!(snapshot.percentage, 0.0);
    }

    #[test]
    fn clear_wipes_progress_and_restores_the_prompt() {
        let (mut engine, db) = engine();
        let key = ExerciseKey::new(1, 1);
        engine.enter(key, covering_profile());

        engine.handle_input(InputEvent::Begin(center()));
        engine.handle_input(InputEvent::End);
        assert!(db.load_progress(key).unwrap().is_some());

        engine.clear();
        assert!(db.load_progress(key).unwrap().is_none());
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.percentage, 0.0);
        assert_eq!(snapshot.message, PROMPT_MESSAGE);
    }

    #[test]
    fn clear_is_refused_mid_stroke() {
        let (mut engine, _db) = engine();
        engine.enter(ExerciseKey::new(1, 1), covering_profile());
        engine.handle_input(InputEvent::Begin(center()));

        engine.clear();
        let session = engine.session().unwrap();
        assert_eq!(session.state().phase, TracePhase::Drawing);
        assert!(!session.state().path.is_empty());
    }

    #[test]
    fn rehydrate_recomputes_the_score_instead_of_trusting_the_cache() {
        let (mut engine, db) = engine();
        let key = ExerciseKey::new(1, 1);

        // A center point with a covering radius actually scores 100%, but
        // the stored cache claims 12.3%.
        db.save_progress(key, "earlier-session", &vec![center()], 12.3)
            .unwrap();

        engine.enter(key, covering_profile());
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.percentage, 100.0);
        assert_eq!(engine.session().unwrap().state().path, vec![center()]);
    }

    #[test]
    fn device_coordinates_are_mapped_through_the_geometry() {
        let (mut engine, _db) = engine();
        let key = ExerciseKey::new(1, 1);
        engine.enter(key, covering_profile());

        // Surface displayed at twice the grid size: device (16, 16) is the
        // grid center.
        engine.set_geometry(SurfaceGeometry {
            origin_x: 0.0,
            origin_y: 0.0,
            display_width: 32.0,
            display_height: 32.0,
            grid_width: GRID,
            grid_height: GRID,
        });

        engine.handle_input(InputEvent::Begin(Point::new(16.0, 16.0)));
        engine.handle_input(InputEvent::End);
        assert_eq!(engine.snapshot().unwrap().percentage, 100.0);
        assert_eq!(
            engine.session().unwrap().state().path,
            vec![Point::new(8.0, 8.0)]
        );
    }
}
