//! Software-rendered game window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Detected: paper                 ║ ║                          │
//! │                              ┌──╨─╨──┐  cat paw, slides down │
//! │                              │ (•••) │  during the reveal    │
//! │                              └───────┘                       │
//! │                     3   /   YOU WIN!                         │
//! │                  Show hand to start        ┌──────────────┐  │
//! │                                            │  landmarks   │  │
//! │ status                                     └──────────────┘  │
//! │ key legend                                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All drawing goes through [`Canvas`], which owns the pixel buffer and
//! knows nothing about windows, so frames can be painted in tests.

use std::sync::mpsc::Sender;
use std::time::Instant;

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use paw_core::gesture::describe;
use paw_core::landmark::{HandLandmark, HandSample, Landmark};
use paw_core::pose::FingerPose;
use paw_core::{MoveSource, Outcome, RoundPhase, RoundStateMachine};
use tracing::warn;

use crate::error::AppError;
use crate::hands::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 800;
pub const WIN_H:     usize = 480;
const TILE:          f32   = 100.0;
const SCROLL_STEP:   (f32, f32) = (0.5, 0.25);
const PREVIEW_W:     usize = WIN_W / 4;
const PREVIEW_H:     usize = WIN_H / 4;
const PREVIEW_X:     usize = WIN_W - PREVIEW_W - 12;
const PREVIEW_Y:     usize = WIN_H - PREVIEW_H - 40;
const RESULT_Y:      isize = 250;
const HINT_Y:        isize = 320;

const BG_A:          u32 = 0xFFFFE4EC;
const BG_B:          u32 = 0xFFFFD1DC;
const FUR:           u32 = 0xFFFFF8F0;
const PAD:           u32 = 0xFFFFA0B4;
const TEXT:          u32 = 0xFF5A2A40;
const HINT:          u32 = 0xFF8B3A62;
const DIM:           u32 = 0xFF7A5A6A;
const COUNT_FILL:    u32 = 0xFFFFF0F5;
const COUNT_EDGE:    u32 = 0xFFDB7093;  // palevioletred
const PREVIEW_BG:    u32 = 0xFF2A1A24;
const PREVIEW_EDGE:  u32 = 0xFFFFFFFF;
const LANDMARK:      u32 = 0xFF7FFFD4;
const BONE:          u32 = 0xFF3CB371;

const LEGEND: &str = "R/P/S=pose  X=unsure  H=hide  L=hand  J=jitter  F=drop frame  Q=quit";

// ════════════════════════════════════════════════════════════════════════════
// Result styling
// ════════════════════════════════════════════════════════════════════════════

/// How the result banner is drawn for one outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultStyle {
    pub fill:    u32,
    pub outline: u32,
    pub scale:   usize,
}

/// A win gets the biggest banner, a loss a smaller one, draws and
/// no-moves the smallest.
pub fn result_style(outcome: Outcome) -> ResultStyle {
    match outcome {
        Outcome::Win  => ResultStyle { fill: 0xFFFF69B4, outline: 0xFFC71585, scale: 10 },
        Outcome::Lose => ResultStyle { fill: 0xFFFF8CAB, outline: COUNT_EDGE, scale: 8  },
        Outcome::Draw | Outcome::NoMove
                      => ResultStyle { fill: 0xFFFFB6C1, outline: COUNT_EDGE, scale: 7  },
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — pixel buffer and drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    buf: Vec<u32>,
    w:   usize,
    h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![BG_A; w * h], w, h }
    }

    pub fn width(&self)  -> usize  { self.w }
    pub fn height(&self) -> usize  { self.h }
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.w && y < self.h { Some(self.buf[y * self.w + x]) } else { None }
    }

    /// Off-canvas coordinates are ignored.
    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.buf[y as usize * self.w + x as usize] = color;
        }
    }

    /// Fill a rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w as isize).min(self.w as isize);
        let y1 = (y + h as isize).min(self.h as isize);
        if x0 >= x1 || y0 >= y1 { return; }
        for row in y0 as usize..y1 as usize {
            self.buf[row * self.w + x0 as usize..row * self.w + x1 as usize].fill(color);
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inward.
    pub fn draw_border(&mut self, x: isize, y: isize, w: usize, h: usize, thickness: usize, color: u32) {
        for i in 0..thickness.min(w).min(h) as isize {
            self.fill_rect(x,                        y + i,                    w, 1, color);
            self.fill_rect(x,                        y + h as isize - 1 - i,   w, 1, color);
            self.fill_rect(x + i,                    y,                        1, h, color);
            self.fill_rect(x + w as isize - 1 - i,   y,                        1, h, color);
        }
    }

    pub fn fill_disc(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    pub fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        for i in 0..=steps {
            let x = x0 + (x1 - x0) * i / steps;
            let y = y0 + (y1 - y0) * i / steps;
            self.set_pixel(x, y, color);
        }
    }

    /// 3×5 bitmap font, each font pixel drawn as a `scale`×`scale` block.
    pub fn draw_label(&mut self, text: &str, x: isize, y: isize, scale: usize, color: u32) {
        let s = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + (col * s) as isize, y + (row * s) as isize, s, s, color);
                    }
                }
            }
            cx += (4 * s) as isize; // 3 wide + 1 gap
            if cx >= self.w as isize { break; }
        }
    }

    /// Label with a one-block outline around every stroke.
    pub fn draw_label_outlined(&mut self, text: &str, x: isize, y: isize, scale: usize, fill: u32, outline: u32) {
        let d = (scale / 3).max(1) as isize;
        for (ox, oy) in [(-d, 0), (d, 0), (0, -d), (0, d), (-d, -d), (d, d), (-d, d), (d, -d)] {
            self.draw_label(text, x + ox, y + oy, scale, outline);
        }
        self.draw_label(text, x, y, scale, fill);
    }

    /// Label centered horizontally on the canvas.
    fn draw_label_centered(&mut self, text: &str, y: isize, scale: usize, color: u32) {
        let x = (self.w as isize - text_width(text, scale) as isize) / 2;
        self.draw_label(text, x, y, scale, color);
    }
}

/// Pixel width of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 { 0 } else { n * 4 * scale - scale }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene painting
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame inputs to [`paint`] that don't live in the round.
pub struct View<'a> {
    pub hands:          &'a [HandSample],
    pub status:         &'a str,
    pub show_landmarks: bool,
    /// Background scroll offset in pixels.
    pub scroll:         (f32, f32),
}

/// Paint one complete frame of the game onto `canvas`.
pub fn paint<M: MoveSource>(canvas: &mut Canvas, round: &RoundStateMachine<M>, now: Instant, view: &View<'_>) {
    draw_background(canvas, view.scroll);

    if let Some(g) = round.visible_paw() {
        let cx = (canvas.width() / 2) as isize;
        draw_paw(canvas, cx, round.paw_offset() as isize, FingerPose::for_gesture(Some(g)));
    }

    let counting = matches!(round.phase(), RoundPhase::Countdown { .. });
    let showing  = matches!(round.phase(), RoundPhase::ShowingResult { .. });

    // ── Detected gesture ──────────────────────────────────────────────────
    if let Some(player) = round.player_gesture().filter(|_| !counting && !showing) {
        canvas.draw_label(&format!("Detected: {}", player), 12, 12, 2, TEXT);
    }
    let first = view.hands.first();
    if view.show_landmarks {
        if let Some(hand) = first {
            let f = round.classifier().finger_states(hand, hand.handedness);
            let flag = |open: bool, c: char| if open { c } else { '-' };
            let flags: String = [
                flag(f.thumb, 'T'), flag(f.index, 'I'), flag(f.middle, 'M'),
                flag(f.ring, 'R'), flag(f.pinky, 'P'),
            ].iter().flat_map(|&c| [c, ' ']).collect();
            canvas.draw_label(&format!("Fingers: {}", flags.trim_end()), 12, 34, 2, TEXT);
        }
    }

    // ── Phase overlays ────────────────────────────────────────────────────
    if let Some(left) = round.countdown_remaining(now) {
        canvas.draw_label_outlined_centered(&left.to_string(), 16, COUNT_FILL, COUNT_EDGE);
    }

    if let RoundPhase::ShowingResult { outcome, .. } = *round.phase() {
        let style = result_style(outcome);
        let text = outcome.label();
        let x = (canvas.width() as isize - text_width(text, style.scale) as isize) / 2;
        canvas.draw_label_outlined(text, x, RESULT_Y, style.scale, style.fill, style.outline);
        let moves = format!(
            "You: {}   Cat: {}",
            describe(round.player_gesture()),
            describe(round.opponent_gesture()),
        );
        canvas.draw_label_centered(&moves, RESULT_Y + (5 * style.scale) as isize + 16, 2, TEXT);
    }

    if round.hint_visible() {
        canvas.draw_label_centered("Show hand to start", HINT_Y, 3, HINT);
    }

    if !counting {
        draw_preview(canvas, view.hands, view.show_landmarks);
    }

    // ── Status bar ────────────────────────────────────────────────────────
    let h = canvas.height() as isize;
    canvas.draw_label(view.status, 12, h - 30, 2, TEXT);
    canvas.draw_label(LEGEND, 12, h - 12, 1, DIM);
}

impl Canvas {
    fn draw_label_outlined_centered(&mut self, text: &str, scale: usize, fill: u32, outline: u32) {
        let x = (self.w as isize - text_width(text, scale) as isize) / 2;
        let y = (self.h as isize - (5 * scale) as isize) / 2;
        self.draw_label_outlined(text, x, y, scale, fill, outline);
    }
}

// ── Background ────────────────────────────────────────────────────────────

/// Checkerboard of pink tiles, shifted by `scroll`.
fn draw_background(canvas: &mut Canvas, scroll: (f32, f32)) {
    let (ox, oy) = (scroll.0 as usize, scroll.1 as usize);
    let tile = TILE as usize;
    let (w, h) = (canvas.width(), canvas.height());
    for y in 0..h {
        let ty = (y + oy) / tile;
        for x in 0..w {
            let tx = (x + ox) / tile;
            let color = if (tx + ty) % 2 == 0 { BG_A } else { BG_B };
            canvas.buf[y * w + x] = color;
        }
    }
}

/// Advance the background scroll by one frame, wrapping after two tiles.
pub fn advance_scroll(scroll: (f32, f32)) -> (f32, f32) {
    let period = 2.0 * TILE;
    ((scroll.0 + SCROLL_STEP.0) % period, (scroll.1 + SCROLL_STEP.1) % period)
}

// ── Cat paw ───────────────────────────────────────────────────────────────

/// The paw hangs from an arm above the window; `top` is the palm's top
/// edge.  Open toes reach down, closed toes stay curled under the palm.
fn draw_paw(canvas: &mut Canvas, cx: isize, top: isize, pose: FingerPose) {
    let shade = mix(FUR, PAD, 0.25);

    canvas.fill_rect(cx - 50, top - 400, 100, 470, FUR);
    canvas.fill_disc(cx, top + 70, 64, FUR);

    let toes = [(-48, pose.index), (-16, pose.middle), (16, pose.ring), (48, pose.pinky)];
    for (dx, open) in toes {
        let tx = cx + dx;
        let ty = if open { top + 165 } else { top + 128 };
        if open {
            canvas.fill_rect(tx - 15, top + 100, 30, 65, FUR);
            canvas.draw_line(tx - 15, top + 110, tx - 15, ty, shade);
        }
        canvas.fill_disc(tx, ty, 20, FUR);
        canvas.fill_disc(tx, ty + 4, 9, PAD);
    }

    let (thumb_x, thumb_y) = if pose.thumb { (cx - 88, top + 120) } else { (cx - 62, top + 100) };
    if pose.thumb {
        canvas.draw_line(cx - 50, top + 80, thumb_x, thumb_y, shade);
    }
    canvas.fill_disc(thumb_x, thumb_y, 16, FUR);
    canvas.fill_disc(thumb_x, thumb_y + 3, 7, PAD);

    canvas.fill_disc(cx, top + 82, 28, PAD);
}

// ── Landmark preview ──────────────────────────────────────────────────────

const BONES: [(HandLandmark, HandLandmark); 21] = {
    use HandLandmark::*;
    [
        (Wrist, ThumbCmc), (ThumbCmc, ThumbMcp), (ThumbMcp, ThumbIp), (ThumbIp, ThumbTip),
        (Wrist, IndexMcp), (IndexMcp, IndexPip), (IndexPip, IndexDip), (IndexDip, IndexTip),
        (IndexMcp, MiddleMcp), (MiddleMcp, MiddlePip), (MiddlePip, MiddleDip), (MiddleDip, MiddleTip),
        (MiddleMcp, RingMcp), (RingMcp, RingPip), (RingPip, RingDip), (RingDip, RingTip),
        (RingMcp, PinkyMcp), (Wrist, PinkyMcp),
        (PinkyMcp, PinkyPip), (PinkyPip, PinkyDip), (PinkyDip, PinkyTip),
    ]
};

fn to_preview(lm: Landmark) -> (isize, isize) {
    let x = PREVIEW_X as f32 + lm.x.clamp(0.0, 1.0) * (PREVIEW_W - 1) as f32;
    let y = PREVIEW_Y as f32 + lm.y.clamp(0.0, 1.0) * (PREVIEW_H - 1) as f32;
    (x as isize, y as isize)
}

fn draw_preview(canvas: &mut Canvas, hands: &[HandSample], show_landmarks: bool) {
    let (x, y) = (PREVIEW_X as isize, PREVIEW_Y as isize);
    canvas.fill_rect(x, y, PREVIEW_W, PREVIEW_H, PREVIEW_BG);

    for hand in hands {
        if show_landmarks {
            for (a, b) in BONES {
                if let (Some(a), Some(b)) = (hand.point(a), hand.point(b)) {
                    let (ax, ay) = to_preview(a);
                    let (bx, by) = to_preview(b);
                    canvas.draw_line(ax, ay, bx, by, BONE);
                }
            }
        }
        for lm in hand.landmarks.iter().filter(|lm| lm.is_finite()) {
            let (px, py) = to_preview(*lm);
            canvas.fill_disc(px, py, 2, LANDMARK);
        }
    }

    canvas.draw_border(x - 4, y - 4, PREVIEW_W + 8, PREVIEW_H + 8, 4, PREVIEW_EDGE);
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — the window
// ════════════════════════════════════════════════════════════════════════════

const KEYMAP: [(Key, SimKey); 8] = [
    (Key::R, SimKey::Rock),
    (Key::P, SimKey::Paper),
    (Key::S, SimKey::Scissors),
    (Key::X, SimKey::Ambiguous),
    (Key::H, SimKey::HideHand),
    (Key::L, SimKey::CycleHandedness),
    (Key::J, SimKey::ToggleJitter),
    (Key::F, SimKey::DropFrame),
];

pub struct Visualizer {
    window:         Window,
    canvas:         Canvas,
    sim_tx:         Sender<SimInput>,
    scroll:         (f32, f32),
    show_landmarks: bool,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, fps: u32, show_landmarks: bool) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Paw Punch",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(fps.max(1) as usize);

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H),
            sim_tx,
            scroll: (0.0, 0.0),
            show_landmarks,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Forward simulator keys.  Returns false when the player asked to quit
    /// or closed the window.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            return false;
        }
        for (key, sim) in KEYMAP {
            if one_shot(key) {
                let _ = self.sim_tx.send(SimInput::KeyDown(sim));
            }
        }
        true
    }

    /// Paint and present one frame.
    pub fn render<M: MoveSource>(
        &mut self,
        round:  &RoundStateMachine<M>,
        now:    Instant,
        hands:  &[HandSample],
        status: &str,
    ) {
        self.scroll = advance_scroll(self.scroll);
        let view = View { hands, status, show_landmarks: self.show_landmarks, scroll: self.scroll };
        paint(&mut self.canvas, round, now, &view);

        if let Err(e) = self.window.update_with_buffer(self.canvas.pixels(), WIN_W, WIN_H) {
            warn!(error = %e, "frame update failed");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Five rows, top first; bit 2 is the left column.
type Glyph = [u8; 5];

const DIGITS: [Glyph; 10] = [
    [7, 5, 5, 5, 7], [2, 6, 2, 2, 7], [7, 1, 7, 4, 7], [7, 1, 7, 1, 7], [5, 5, 7, 1, 1],
    [7, 4, 7, 1, 7], [7, 4, 7, 5, 7], [7, 1, 1, 1, 1], [7, 5, 7, 5, 7], [7, 5, 7, 1, 7],
];

const LETTERS: [Glyph; 26] = [
    [7, 5, 7, 5, 5], [6, 5, 6, 5, 6], [7, 4, 4, 4, 7], [6, 5, 5, 5, 6], [7, 4, 7, 4, 7], // a-e
    [7, 4, 7, 4, 4], [7, 4, 5, 5, 7], [5, 5, 7, 5, 5], [7, 2, 2, 2, 7], [1, 1, 1, 5, 7], // f-j
    [5, 5, 6, 5, 5], [4, 4, 4, 4, 7], [5, 7, 5, 5, 5], [7, 5, 5, 5, 5], [7, 5, 5, 5, 7], // k-o
    [7, 5, 7, 4, 4], [7, 5, 5, 7, 1], [6, 5, 6, 5, 5], [7, 4, 7, 1, 7], [7, 2, 2, 2, 2], // p-t
    [5, 5, 5, 5, 7], [5, 5, 5, 2, 2], [5, 5, 5, 7, 5], [5, 5, 2, 5, 5], [5, 5, 7, 2, 2], // u-y
    [7, 1, 2, 4, 7],                                                                     // z
];

/// Punctuation that shows up in labels, status lines and the legend.
const MARKS: [(char, Glyph); 11] = [
    (' ', [0, 0, 0, 0, 0]),
    ('!', [2, 2, 2, 0, 2]),
    ('.', [0, 0, 0, 0, 2]),
    (',', [0, 0, 0, 2, 4]),
    (':', [0, 2, 0, 2, 0]),
    ('-', [0, 0, 7, 0, 0]),
    ('=', [0, 7, 0, 7, 0]),
    ('/', [1, 1, 2, 4, 4]),
    ('|', [2, 2, 2, 2, 2]),
    ('(', [2, 4, 4, 4, 2]),
    (')', [2, 1, 1, 1, 2]),
];

const FALLBACK: Glyph = [0, 0, 2, 0, 0];

fn glyph(c: char) -> Glyph {
    let offset = |base: char| c as usize - base as usize;
    match c {
        '0'..='9' => DIGITS[offset('0')],
        'a'..='z' => LETTERS[offset('a')],
        'A'..='Z' => LETTERS[offset('A')],
        _ => MARKS.iter().find(|(m, _)| *m == c).map_or(FALLBACK, |(_, g)| *g),
    }
}

/// Linear mix of two opaque colors, `t` = 0 gives `a`.
fn mix(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    [16u32, 8, 0].iter().fold(0xFF00_0000u32, |acc, &shift| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        acc | (((ca + (cb - ca) * t).round() as u32) << shift)
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
