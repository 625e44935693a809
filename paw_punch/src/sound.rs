//! Sound cues on a MIDI output.
//!
//! Each cue is a short jingle played on its own thread so the tick loop
//! never waits on audio.  Cues are requested through a channel and played
//! in order, over an optional quiet background loop on a second channel.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use paw_core::Outcome;
use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// Cue — what to play
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Played once when the window opens.
    Startup,
    /// Played once per round when the result is revealed.
    RoundResult(Outcome),
}

/// One note of a jingle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tone {
    pub pitch:  u8,
    pub millis: u64,
}

const fn tone(pitch: u8, millis: u64) -> Tone {
    Tone { pitch, millis }
}

// General MIDI programs used by the cues.
const CELESTA:    u8 = 8;
const VIBRAPHONE: u8 = 11;
const MARIMBA:    u8 = 12;
const TUBA:       u8 = 58;

// A little two-note "mew".
const STARTUP: &[Tone] = &[tone(79, 90), tone(84, 220)];
const WIN:     &[Tone] = &[tone(72, 110), tone(76, 110), tone(79, 110), tone(84, 320)];
const LOSE:    &[Tone] = &[tone(55, 180), tone(51, 180), tone(48, 420)];
const DRAW:    &[Tone] = &[tone(67, 160), tone(67, 240)];
const NO_MOVE: &[Tone] = &[tone(60, 200)];

/// Instrument and notes for a cue.
pub fn jingle(cue: Cue) -> (u8, &'static [Tone]) {
    match cue {
        Cue::Startup                      => (CELESTA,    STARTUP),
        Cue::RoundResult(Outcome::Win)    => (VIBRAPHONE, WIN),
        Cue::RoundResult(Outcome::Lose)   => (TUBA,       LOSE),
        Cue::RoundResult(Outcome::Draw)   => (MARIMBA,    DRAW),
        Cue::RoundResult(Outcome::NoMove) => (MARIMBA,    NO_MOVE),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Background music
// ════════════════════════════════════════════════════════════════════════════

const PAD_NEW_AGE: u8 = 88;

/// Slow arpeggio looped under everything else.
const MUSIC: &[Tone] = &[
    tone(60, 600), tone(64, 600), tone(67, 600), tone(72, 900),
    tone(65, 600), tone(69, 600), tone(72, 600), tone(77, 900),
    tone(67, 600), tone(71, 600), tone(74, 600), tone(79, 900),
    tone(64, 600), tone(67, 600), tone(72, 1200),
];

const MUSIC_CHANNEL:  u8 = 1;
const MUSIC_VELOCITY: u8 = 16;

/// Position in the looping background motif.  At most one note sounds
/// at a time.
struct Music {
    next:     usize,
    sounding: Option<u8>,
}

impl Music {
    fn start(out: &mut dyn MidiOut) -> Self {
        out.send(&program(MUSIC_CHANNEL, PAD_NEW_AGE));
        Music { next: 0, sounding: None }
    }

    /// Release the current note, strike the next one and return how long
    /// it should ring.
    fn advance(&mut self, out: &mut dyn MidiOut) -> Duration {
        self.silence(out);
        let t = MUSIC[self.next];
        out.send(&key_down(MUSIC_CHANNEL, t.pitch, MUSIC_VELOCITY));
        self.sounding = Some(t.pitch);
        self.next = (self.next + 1) % MUSIC.len();
        Duration::from_millis(t.millis)
    }

    fn silence(&mut self, out: &mut dyn MidiOut) {
        if let Some(pitch) = self.sounding.take() {
            out.send(&key_up(MUSIC_CHANNEL, pitch));
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — where channel messages go
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn send(&mut self, message: &[u8]);
}

fn program(channel: u8, program: u8) -> [u8; 2] {
    [0xC0 | (channel & 0x0F), program & 0x7F]
}

fn key_down(channel: u8, pitch: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), pitch & 0x7F, velocity & 0x7F]
}

fn key_up(channel: u8, pitch: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), pitch & 0x7F, 0]
}

impl MidiOut for midir::MidiOutputConnection {
    fn send(&mut self, message: &[u8]) {
        if let Err(e) = midir::MidiOutputConnection::send(self, message) {
            debug!(error = %e, "MIDI send failed");
        }
    }
}

/// Swallows everything; used when no port can be opened.
pub struct NullOut;

impl MidiOut for NullOut {
    fn send(&mut self, _message: &[u8]) {}
}

/// Substrings of port names that usually belong to a software synth.
const SYNTH_HINTS: [&str; 4] = ["fluid", "timidity", "synth", "microsoft"];

/// Port to use out of `names`: the first softsynth-looking one, else the
/// first port.  `None` when there are no ports.
fn pick_port<S: AsRef<str>>(names: &[S]) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    let looks_like_synth = |name: &S| {
        let name = name.as_ref().to_lowercase();
        SYNTH_HINTS.iter().any(|hint| name.contains(hint))
    };
    Some(names.iter().position(looks_like_synth).unwrap_or(0))
}

fn connect_port() -> Result<midir::MidiOutputConnection, String> {
    let output = midir::MidiOutput::new("paw_punch").map_err(|e| e.to_string())?;
    let ports = output.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|p| output.port_name(p).unwrap_or_default())
        .collect();
    let idx = pick_port(&names)
        .ok_or_else(|| "no MIDI output ports (start `timidity -iA` or `fluidsynth`)".to_string())?;
    info!(port = %names[idx], "opening MIDI port");
    output.connect(&ports[idx], "paw-punch-cues").map_err(|e| e.to_string())
}

/// The system's MIDI output, or `NullOut` when none can be opened.
fn open_midi_output() -> Box<dyn MidiOut> {
    match connect_port() {
        Ok(conn) => Box::new(conn),
        Err(reason) => {
            warn!(%reason, "sound disabled");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sound — handle to the cue thread
// ════════════════════════════════════════════════════════════════════════════

enum SoundCommand {
    Play(Cue),
    Quit,
}

const CUE_CHANNEL:  u8 = 0;
const CUE_VELOCITY: u8 = 100;

pub struct Sound {
    cmd_tx:    Option<Sender<SoundCommand>>,
    cue_count: u64,
}

impl Sound {
    /// Spawn the cue thread on the system's MIDI output, with the
    /// background loop if `music` is set.
    pub fn spawn(music: bool) -> Self {
        Self::spawn_with(open_midi_output, music)
    }

    /// Spawn the cue thread on a backend built inside the thread.
    pub fn spawn_with<F>(open: F, music: bool) -> Self
    where
        F: FnOnce() -> Box<dyn MidiOut> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SoundCommand>();
        thread::spawn(move || {
            let mut out = open();
            cue_thread(out.as_mut(), cmd_rx, music);
        });
        Sound { cmd_tx: Some(cmd_tx), cue_count: 0 }
    }

    /// No thread, no output, no music.  Cues are still counted.
    pub fn muted() -> Self {
        Sound { cmd_tx: None, cue_count: 0 }
    }

    pub fn play(&mut self, cue: Cue) {
        self.cue_count += 1;
        debug!(?cue, n = self.cue_count, "sound cue");
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(SoundCommand::Play(cue));
        }
    }

    /// Cues requested so far.
    pub fn cue_count(&self) -> u64 { self.cue_count }
}

impl Drop for Sound {
    fn drop(&mut self) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(SoundCommand::Quit);
        }
    }
}

/// Serve commands until `Quit` or the handle is dropped.  With music on,
/// the background loop steps one note per wait and cues play over it.
fn cue_thread(out: &mut dyn MidiOut, cmd_rx: Receiver<SoundCommand>, music: bool) {
    let mut music = if music { Some(Music::start(out)) } else { None };
    loop {
        let cmd = match music.as_mut() {
            Some(m) => {
                let ring = m.advance(out);
                match cmd_rx.recv_timeout(ring) {
                    Ok(cmd)                              => Some(cmd),
                    Err(RecvTimeoutError::Timeout)       => None,
                    Err(RecvTimeoutError::Disconnected)  => break,
                }
            }
            None => match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_)  => break,
            },
        };
        match cmd {
            Some(SoundCommand::Play(cue)) => perform(out, cue, thread::sleep),
            Some(SoundCommand::Quit)      => break,
            None                          => {}
        }
    }
    if let Some(m) = music.as_mut() {
        m.silence(out);
    }
}

/// Play one cue on `out`, calling `pause` for each note's length.
fn perform<P: FnMut(Duration)>(out: &mut dyn MidiOut, cue: Cue, mut pause: P) {
    let (instrument, tones) = jingle(cue);
    out.send(&program(CUE_CHANNEL, instrument));
    for t in tones {
        out.send(&key_down(CUE_CHANNEL, t.pitch, CUE_VELOCITY));
        pause(Duration::from_millis(t.millis));
        out.send(&key_up(CUE_CHANNEL, t.pitch));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        msgs: Vec<Vec<u8>>,
    }

    impl MidiOut for Recorder {
        fn send(&mut self, message: &[u8]) { self.msgs.push(message.to_vec()); }
    }

    impl Recorder {
        fn count(&self, status: u8, channel: u8) -> usize {
            self.msgs.iter().filter(|m| m[0] == status | channel).count()
        }
    }

    #[test]
    fn every_note_is_released() {
        for cue in [
            Cue::Startup,
            Cue::RoundResult(Outcome::Win),
            Cue::RoundResult(Outcome::Lose),
            Cue::RoundResult(Outcome::Draw),
            Cue::RoundResult(Outcome::NoMove),
        ] {
            let mut rec = Recorder::default();
            perform(&mut rec, cue, |_| {});
            let on  = rec.count(0x90, CUE_CHANNEL);
            let off = rec.count(0x80, CUE_CHANNEL);
            assert_eq!(on, off, "{:?}", cue);
            assert_eq!(on, jingle(cue).1.len());
            assert_eq!(rec.msgs[0], vec![0xC0, jingle(cue).0]);
        }
    }

    #[test]
    fn win_rises_and_lose_falls() {
        let (_, win) = jingle(Cue::RoundResult(Outcome::Win));
        assert!(win.windows(2).all(|w| w[0].pitch < w[1].pitch));
        let (_, lose) = jingle(Cue::RoundResult(Outcome::Lose));
        assert!(lose.windows(2).all(|w| w[0].pitch > w[1].pitch));
    }

    #[test]
    fn perform_pauses_for_each_note() {
        let mut rec = Recorder::default();
        let mut total = Duration::ZERO;
        perform(&mut rec, Cue::RoundResult(Outcome::Draw), |d| total += d);
        assert_eq!(total, Duration::from_millis(400));
    }

    #[test]
    fn music_loops_one_note_at_a_time() {
        let mut rec = Recorder::default();
        let mut m = Music::start(&mut rec);
        let mut total = Duration::ZERO;
        for _ in 0..MUSIC.len() + 1 {
            total += m.advance(&mut rec);
        }
        assert_eq!(m.next, 1, "wrapped to the start");
        let on  = rec.count(0x90, MUSIC_CHANNEL);
        let off = rec.count(0x80, MUSIC_CHANNEL);
        assert_eq!(on, MUSIC.len() + 1);
        assert_eq!(off, on - 1);
        m.silence(&mut rec);
        assert_eq!(rec.count(0x80, MUSIC_CHANNEL), on);

        let lap: u64 = MUSIC.iter().map(|t| t.millis).sum();
        assert_eq!(total, Duration::from_millis(lap + MUSIC[0].millis));
    }

    #[test]
    fn music_is_quiet_and_off_the_cue_channel() {
        let mut rec = Recorder::default();
        let mut m = Music::start(&mut rec);
        m.advance(&mut rec);
        assert_eq!(rec.msgs[0], vec![0xC0 | MUSIC_CHANNEL, PAD_NEW_AGE]);
        assert_eq!(rec.msgs[1][2], MUSIC_VELOCITY);
        assert!(MUSIC_VELOCITY < CUE_VELOCITY / 4);
        assert_ne!(MUSIC_CHANNEL, CUE_CHANNEL);
    }

    #[test]
    fn quit_silences_music() {
        let (tx, rx) = mpsc::channel();
        tx.send(SoundCommand::Quit).unwrap();
        let mut rec = Recorder::default();
        cue_thread(&mut rec, rx, true);
        assert_eq!(rec.count(0xC0, MUSIC_CHANNEL), 1);
        assert_eq!(rec.count(0x90, MUSIC_CHANNEL), 1);
        assert_eq!(rec.count(0x80, MUSIC_CHANNEL), 1);
    }

    #[test]
    fn no_music_when_disabled() {
        let (tx, rx) = mpsc::channel();
        tx.send(SoundCommand::Quit).unwrap();
        let mut rec = Recorder::default();
        cue_thread(&mut rec, rx, false);
        assert!(rec.msgs.is_empty());
    }

    #[test]
    fn prefers_softsynth_port() {
        let none: [&str; 0] = [];
        assert_eq!(pick_port(&none), None);
        assert_eq!(pick_port(&["Midi Through 14:0", "FLUID Synth (1234)"]), Some(1));
        assert_eq!(pick_port(&["Midi Through 14:0", "USB Keyboard"]), Some(0));
    }

    #[test]
    fn muted_sound_counts_cues() {
        let mut s = Sound::muted();
        s.play(Cue::Startup);
        s.play(Cue::RoundResult(Outcome::Win));
        assert_eq!(s.cue_count(), 2);
    }

    #[test]
    fn null_backend_thread_accepts_cues() {
        let mut s = Sound::spawn_with(|| Box::new(NullOut), true);
        s.play(Cue::RoundResult(Outcome::Draw));
        assert_eq!(s.cue_count(), 1);
    }
}
