//! Audible alert played when a countdown finishes.
//!
//! The alert is fire-and-forget: [`Alert::ring`] returns nothing and an
//! implementation that cannot reach its audio device just logs and carries on.
//! The timer's transition to paused never depends on it.
//!
//! [`SineTone`] synthesizes the [`Tone`] on the default output device and
//! falls back to the terminal bell when there is none.

use crossterm::style::Print;
use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink, StreamError};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Waveform of the alert tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// A pure sine wave.
    Sine,
}

/// Description of the alert tone: one short fixed-pitch beep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Waveform.
    pub waveform: Waveform,
    /// Pitch in hertz.
    pub frequency_hz: f32,
    /// Linear gain, 0.0..=1.0.
    pub gain: f32,
    /// How long the tone sounds.
    pub duration: Duration,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency_hz: 1000.0,
            gain: 0.1,
            duration: Duration::from_millis(500),
        }
    }
}

/// Something that can play the alert tone.
pub trait Alert: Send + Sync + std::fmt::Debug {
    /// Plays `tone` once. Must not block for the length of the tone and must
    /// not panic when no audio is available.
    fn ring(&self, tone: &Tone);
}

/// Plays the tone as a generated sine wave.
///
/// Each ring opens the default output device on its own thread and keeps it
/// until the tone ends, so [`Alert::ring`] returns at once. Without a device
/// the `fallback` alert rings instead.
///
/// # Examples
///
/// ```rust,no_run
/// use timer_grid::alert::{Alert, SineTone, Tone};
///
/// let alert = SineTone::new();
/// alert.ring(&Tone::default());
/// ```
#[derive(Debug, Clone)]
pub struct SineTone {
    fallback: Arc<dyn Alert>,
}

impl Default for SineTone {
    fn default() -> Self {
        Self::new()
    }
}

impl SineTone {
    /// Creates a sine alert that falls back to the [`TerminalBell`].
    pub fn new() -> Self {
        Self::with_fallback(Arc::new(TerminalBell))
    }

    /// Creates a sine alert with a custom fallback.
    pub fn with_fallback(fallback: Arc<dyn Alert>) -> Self {
        Self { fallback }
    }

    fn play_on(
        &self,
        tone: &Tone,
        device: std::result::Result<(OutputStream, OutputStreamHandle), StreamError>,
    ) {
        let (_stream, handle) = match device {
            Ok(device) => device,
            Err(err) => {
                tracing::debug!(error = %err, "no audio device, using fallback alert");
                self.fallback.ring(tone);
                return;
            }
        };
        let sink = match Sink::try_new(&handle) {
            Ok(sink) => sink,
            Err(err) => {
                tracing::warn!(error = %err, "could not open audio sink");
                self.fallback.ring(tone);
                return;
            }
        };
        sink.append(sine_source(tone));
        sink.sleep_until_end();
    }
}

/// The samples of `tone`: a sine at the tone's pitch, cut to its duration and
/// scaled by its gain.
pub fn sine_source(tone: &Tone) -> impl Source<Item = f32> + Send + 'static {
    match tone.waveform {
        Waveform::Sine => SineWave::new(tone.frequency_hz)
            .take_duration(tone.duration)
            .amplify(tone.gain),
    }
}

impl Alert for SineTone {
    fn ring(&self, tone: &Tone) {
        tracing::debug!(frequency_hz = tone.frequency_hz, gain = tone.gain, "playing alert tone");
        let this = self.clone();
        let tone = *tone;
        let spawned = thread::Builder::new()
            .name("alert-tone".into())
            .spawn(move || this.play_on(&tone, OutputStream::try_default()));
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "could not start alert thread");
            self.fallback.ring(&tone);
        }
    }
}

/// Rings the terminal bell.
///
/// Terminals do not let the program pick the pitch or length of the bell, so
/// the tone is only used for logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl TerminalBell {
    fn write_bell(out: &mut impl Write) -> io::Result<()> {
        crossterm::queue!(out, Print('\x07'))?;
        out.flush()
    }
}

impl Alert for TerminalBell {
    fn ring(&self, tone: &Tone) {
        tracing::debug!(frequency_hz = tone.frequency_hz, "ringing terminal bell");
        if let Err(err) = Self::write_bell(&mut io::stdout()) {
            tracing::warn!(error = %err, "terminal bell unavailable");
        }
    }
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Alert for Silent {
    fn ring(&self, _tone: &Tone) {}
}

/// Counts rings instead of playing them. Useful for headless runs and tests.
#[derive(Debug, Default)]
pub struct Counter {
    rings: AtomicUsize,
}

impl Counter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the alert has rung.
    pub fn count(&self) -> usize {
        self.rings.load(Ordering::SeqCst)
    }
}

impl Alert for Counter {
    fn ring(&self, _tone: &Tone) {
        self.rings.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tone() {
        let tone = Tone::default();
        assert_eq!(tone.waveform, Waveform::Sine);
        assert_eq!(tone.frequency_hz, 1000.0);
        assert_eq!(tone.duration, Duration::from_millis(500));
        assert!(tone.gain > 0.0 && tone.gain <= 1.0);
    }

    #[test]
    fn test_bell_writes_bel() {
        let mut out = Vec::new();
        TerminalBell::write_bell(&mut out).unwrap();
        assert_eq!(out, b"\x07");
    }

    #[test]
    fn test_sine_source_follows_tone() {
        let tone = Tone::default();
        let source = sine_source(&tone);
        let expected = source.sample_rate() as usize * source.channels() as usize / 2;

        let samples: Vec<f32> = source.collect();
        assert!(samples.len().abs_diff(expected) <= expected / 100);
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= tone.gain + 1e-4);
        assert!(peak > tone.gain * 0.9);
    }

    #[test]
    fn test_missing_device_rings_fallback() {
        let fallback = Arc::new(Counter::new());
        let alert = SineTone::with_fallback(fallback.clone());
        alert.play_on(&Tone::default(), Err(StreamError::NoDevice));
        assert_eq!(fallback.count(), 1);
    }

    #[test]
    fn test_sine_ring_does_not_block() {
        let alert = SineTone::with_fallback(Arc::new(Silent));
        let started = std::time::Instant::now();
        alert.ring(&Tone::default());
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn test_counter() {
        let counter = Counter::new();
        counter.ring(&Tone::default());
        counter.ring(&Tone::default());
        assert_eq!(counter.count(), 2);
    }
}
