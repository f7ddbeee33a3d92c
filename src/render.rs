use std::io::Write;

use crate::error::Result;
use crate::timing::format_time;
use crate::view::{AnnotationKind, Frame, ResolvedNote};

/// Consumes resolved frames. Resolution never depends on the renderer.
pub trait FrameRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()>;
}

type Effect = for<'a> fn(&ResolvedNote<'a>) -> String;

/// Indexed by [`AnnotationKind::index`], in [`AnnotationKind::ALL`] order.
const EFFECTS: [Effect; 8] = [wavy, spark, punch, glow, phrase, accent, tremolo, legato];

fn wavy(note: &ResolvedNote<'_>) -> String {
    format!("wavy(amp={:.1})", note.placement.thickness * 0.5)
}

fn spark(note: &ResolvedNote<'_>) -> String {
    let count = if note.active { 6 } else { 3 };
    format!("spark(n={})", count)
}

fn punch(note: &ResolvedNote<'_>) -> String {
    format!("punch(scale={:.2})", 1.0 + note.event.velocity * 0.3)
}

fn glow(note: &ResolvedNote<'_>) -> String {
    format!("glow(r={:.1})", 4.0 + note.event.velocity * 8.0)
}

fn phrase(note: &ResolvedNote<'_>) -> String {
    format!("phrase(at={:.1})", note.placement.along)
}

fn accent(_note: &ResolvedNote<'_>) -> String {
    "accent".to_string()
}

fn tremolo(note: &ResolvedNote<'_>) -> String {
    let strokes = (note.event.duration * 8.0).round().max(1.0) as u32;
    format!("tremolo(n={})", strokes)
}

fn legato(note: &ResolvedNote<'_>) -> String {
    format!("legato(to={:.1})", note.placement.along + note.placement.length)
}

pub fn effect_for(kind: AnnotationKind, note: &ResolvedNote<'_>) -> String {
    EFFECTS[kind.index()](note)
}

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// `60` -> `C4`
pub fn note_name(pitch: u8) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[pitch as usize % 12], octave)
}

/// Writes each frame as plain text: a header, then one line per note and
/// per sync marker.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameRenderer for TextRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        writeln!(
            self.out,
            "[{} {} -> {}] {} notes, {} active, {} markers",
            frame.mode.label(),
            format_time(frame.clock),
            format_time(frame.instant),
            frame.notes.len(),
            frame.active_notes().count(),
            frame.markers.len(),
        )?;

        for note in &frame.notes {
            let state = if note.dimmed {
                '-'
            } else if note.active {
                '*'
            } else {
                ' '
            };
            let p = note.placement;
            write!(
                self.out,
                "  {} {:<4} t{} {:.1}+{:.1} @ {:.1}x{:.1} {} a={:.2}",
                state,
                note_name(note.event.pitch),
                note.event.track_id,
                p.along,
                p.length,
                p.across,
                p.thickness,
                note.color.to_hex(),
                note.opacity,
            )?;
            if !note.annotations.is_empty() {
                let effects: Vec<String> = note
                    .annotations
                    .iter()
                    .map(|kind| effect_for(*kind, note))
                    .collect();
                write!(self.out, " [{}]", effects.join(" "))?;
            }
            writeln!(self.out)?;
        }

        for marker in &frame.markers {
            writeln!(self.out, "  | {} @ {:.1}", marker.label, marker.along)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{NoteEvent, palette};
    use crate::timing::PlaybackMode;
    use crate::view::{Placement, SyncMarker, TimeAxis, Window};

    const EVENT: NoteEvent = NoteEvent {
        pitch: 60,
        start_time: 1.0,
        duration: 0.5,
        velocity: 0.5,
        track_id: 2,
    };

    fn note(annotations: Vec<AnnotationKind>) -> ResolvedNote<'static> {
        ResolvedNote {
            index: 0,
            event: &EVENT,
            placement: Placement {
                along: 100.0,
                length: 50.0,
                across: 20.0,
                thickness: 4.0,
            },
            color: palette::track_color(0),
            active: true,
            dimmed: false,
            opacity: 1.0,
            annotations,
        }
    }

    #[test]
    fn test_effect_table_follows_kind_order() {
        let note = note(Vec::new());
        assert_eq!(effect_for(AnnotationKind::Wavy, &note), "wavy(amp=2.0)");
        assert_eq!(effect_for(AnnotationKind::Glow, &note), "glow(r=8.0)");
        assert_eq!(effect_for(AnnotationKind::Tremolo, &note), "tremolo(n=4)");
        assert_eq!(effect_for(AnnotationKind::Legato, &note), "legato(to=150.0)");
        for kind in AnnotationKind::ALL {
            assert!(
                effect_for(kind, &note).starts_with(&kind.label().to_lowercase()),
                "{:?}",
                kind
            );
        }
    }

    #[test]
    fn test_note_name() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(127), "G9");
    }

    #[test]
    fn test_text_renderer_output() {
        let frame = Frame {
            mode: PlaybackMode::Performance,
            clock: 2.0,
            instant: 1.25,
            window: Window { start: 0.0, end: 10.0 },
            axis: TimeAxis::Rightward,
            playhead: 150.0,
            notes: vec![note(vec![AnnotationKind::Accent, AnnotationKind::Spark])],
            markers: vec![SyncMarker {
                id: "sp-1".into(),
                label: "Sync 1".into(),
                along: 300.0,
            }],
            grid: Vec::new(),
            sync_point_count: 1,
        };

        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&frame).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[AUDIO 0:02.00 -> 0:01.25] 1 notes, 1 active, 1 markers");
        assert!(lines[1].starts_with("  * C4   t2 100.0+50.0 @ 20.0x4.0"));
        assert!(lines[1].ends_with("[accent spark(n=6)]"));
        assert_eq!(lines[2], "  | Sync 1 @ 300.0");
    }
}
