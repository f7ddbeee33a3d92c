use arc_swap::ArcSwap;
use crossbeam::channel::{Receiver, Sender};
use std::fs;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Result, SyncError};
use crate::project::{DirectoryStore, ProjectStore, SongProject};
use crate::score::{Score, ScoreSource};
use crate::settings::Settings;
use crate::timing::{AnchorStore, PlaybackMode, SegmentHealth, TimelineMap};
use crate::view::{Annotation, Frame, Layout, ViewState, merge_track_settings, resolve_frame};

/// Edits sent by interaction handlers, applied between frames.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    AddSyncPoint {
        symbolic_time: f64,
        performance_time: f64,
    },
    /// Sent on every drag event; only the last position before a frame matters.
    MoveSyncPoint {
        id: String,
        symbolic_time: Option<f64>,
        performance_time: Option<f64>,
    },
    RemoveSyncPoint {
        id: String,
    },
    AddAnnotation(Annotation),
    RemoveAnnotation {
        id: String,
    },
    ToggleVisible {
        track_id: usize,
    },
    ToggleMute {
        track_id: usize,
    },
    ToggleSolo {
        track_id: usize,
    },
    Zoom(f32),
    SetLayout(Layout),
    /// Switches the driving transport, keeping the displayed position.
    SetMode {
        mode: PlaybackMode,
        clock: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    SyncPointAdded { id: String },
    AnnotationAdded { id: String },
    /// The transport should seek to `clock`.
    ModeChanged { mode: PlaybackMode, clock: f64 },
    Error { message: String },
}

pub struct SessionHandle {
    pub command_tx: Sender<SessionCommand>,
    pub update_rx: Receiver<SessionUpdate>,
}

/// What one frame reads. Published after edits, never modified.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timeline: Arc<TimelineMap>,
    pub annotations: Arc<[Annotation]>,
    pub view: ViewState,
}

/// The editing surface of one song plus the frame loop that reads it.
pub struct Session {
    project: SongProject,
    score: Score,
    anchors: AnchorStore,
    annotations: Vec<Annotation>,
    view: ViewState,
    snapshot: Arc<ArcSwap<Snapshot>>,
    command_rx: Receiver<SessionCommand>,
    update_tx: Sender<SessionUpdate>,
    /// Edits applied since the last publish
    dirty: bool,
}

impl Session {
    pub fn new(
        project: SongProject,
        score: Score,
        settings: &Settings,
        layout: Layout,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = crossbeam::channel::unbounded();
        let (update_tx, update_rx) = crossbeam::channel::unbounded();

        let anchors = AnchorStore::from_points(project.sync_points.clone(), settings.extrapolation);
        let mut view = ViewState::new(merge_track_settings(&score.tracks, &project.tracks), layout);
        view.grid_interval = settings.grid_interval;
        let annotations = project.annotations.clone();

        let snapshot = Arc::new(ArcSwap::from_pointee(Snapshot {
            timeline: anchors.timeline(),
            annotations: Arc::from(annotations.as_slice()),
            view: view.clone(),
        }));

        let session = Self {
            project,
            score,
            anchors,
            annotations,
            view,
            snapshot,
            command_rx,
            update_tx,
            dirty: false,
        };

        (
            session,
            SessionHandle {
                command_tx,
                update_rx,
            },
        )
    }

    /// Loads a song's record and score. A score that cannot be read ends the
    /// session; retrying is up to the caller.
    pub fn open(
        store: &DirectoryStore,
        source: &dyn ScoreSource,
        id: &str,
        settings: &Settings,
        layout: Layout,
    ) -> Result<(Self, SessionHandle)> {
        let project = store.load(id)?;
        let score_path = store.media_path(id, &project.score_file)?;
        let bytes = fs::read(&score_path).map_err(|e| SyncError::ScoreLoad {
            name: project.score_file.clone(),
            message: e.to_string(),
        })?;
        let score = source.load(&project.title, &bytes)?;

        info!(
            "Opened '{}': {} events, {} sync points",
            project.title,
            score.events.len(),
            project.sync_points.len()
        );
        let (session, handle) = Self::new(project, score, settings, layout);
        for segment in session.anchors.timeline().segments() {
            if segment.health == SegmentHealth::Check {
                warn!(
                    "Interval {} ({:.2}s-{:.2}s) runs at {:.2}x, check its sync points",
                    segment.label, segment.start, segment.end, segment.ratio
                );
            }
        }
        Ok((session, handle))
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn anchors(&self) -> &AnchorStore {
        &self.anchors
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// The published snapshot, for readers on other threads.
    pub fn shared_snapshot(&self) -> Arc<ArcSwap<Snapshot>> {
        self.snapshot.clone()
    }

    /// Drains pending commands, then publishes a new snapshot if anything
    /// changed since the last one, including edits made through [`Session::apply`].
    pub fn process_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.command_rx.try_recv() {
            match self.apply(command) {
                Ok(()) => applied += 1,
                Err(e) => {
                    warn!("Command rejected: {}", e);
                    let _ = self.update_tx.send(SessionUpdate::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
        if applied > 0 {
            debug!("Applied {} commands", applied);
        }
        if self.dirty {
            self.publish();
        }
        applied
    }

    /// Applies one command. The change is published at the next frame.
    pub fn apply(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::AddSyncPoint {
                symbolic_time,
                performance_time,
            } => {
                let id = self.anchors.add(symbolic_time, performance_time).id.clone();
                let _ = self.update_tx.send(SessionUpdate::SyncPointAdded { id });
            }
            SessionCommand::MoveSyncPoint {
                id,
                symbolic_time,
                performance_time,
            } => {
                if self.anchors.get(&id).is_none() {
                    return Err(SyncError::UnknownSyncPoint(id));
                }
                if let Some(t) = symbolic_time {
                    self.anchors.set_symbolic_time(&id, t)?;
                }
                if let Some(t) = performance_time {
                    self.anchors.set_performance_time(&id, t)?;
                }
            }
            SessionCommand::RemoveSyncPoint { id } => {
                self.anchors.remove(&id)?;
            }
            SessionCommand::AddAnnotation(annotation) => {
                annotation.validate(self.score.tracks.len())?;
                let id = annotation.id.clone();
                debug!("Adding {:?} annotation {}", annotation.kind, id);
                self.annotations.push(annotation);
                let _ = self.update_tx.send(SessionUpdate::AnnotationAdded { id });
            }
            SessionCommand::RemoveAnnotation { id } => {
                let idx = self
                    .annotations
                    .iter()
                    .position(|a| a.id == id)
                    .ok_or(SyncError::UnknownAnnotation(id))?;
                self.annotations.remove(idx);
            }
            SessionCommand::ToggleVisible { track_id } => {
                self.view.toggle_visible(track_id)?;
            }
            SessionCommand::ToggleMute { track_id } => {
                self.view.toggle_mute(track_id)?;
            }
            SessionCommand::ToggleSolo { track_id } => {
                self.view.toggle_solo(track_id)?;
            }
            SessionCommand::Zoom(factor) => self.view.zoom(factor),
            SessionCommand::SetLayout(layout) => self.view.layout = layout,
            SessionCommand::SetMode { mode, clock } => {
                let timeline = self.anchors.timeline();
                let instant = self.view.mode.display_instant(clock, &timeline);
                let clock = mode.clock_for(instant, &timeline);
                self.view.mode = mode;
                info!("Playback mode {} at {:.3}s", mode.label(), clock);
                let _ = self.update_tx.send(SessionUpdate::ModeChanged { mode, clock });
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Applies pending edits, then resolves the frame for `clock` against
    /// the snapshot taken at that point.
    pub fn frame(&mut self, clock: f64) -> Frame<'_> {
        self.process_commands();
        let snapshot = self.snapshot.load_full();
        resolve_frame(
            &self.score,
            &snapshot.timeline,
            &snapshot.annotations,
            &snapshot.view,
            clock,
        )
    }

    /// The whole record to hand to a [`ProjectStore`].
    pub fn to_project(&self) -> SongProject {
        SongProject {
            sync_points: self.anchors.points().to_vec(),
            tracks: self.view.track_settings(),
            annotations: self.annotations.clone(),
            ..self.project.clone()
        }
    }

    pub fn save(&mut self, store: &dyn ProjectStore) -> Result<()> {
        let mut project = self.to_project();
        store.save(&mut project)?;
        self.project = project;
        Ok(())
    }

    fn publish(&mut self) {
        self.dirty = false;
        self.snapshot.store(Arc::new(Snapshot {
            timeline: self.anchors.timeline(),
            annotations: Arc::from(self.annotations.as_slice()),
            view: self.view.clone(),
        }));
    }
}
