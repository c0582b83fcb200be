//! Terminal renderer. All terminal I/O for a frame lives here.
//!
//! World coordinates (the configured viewport) are scaled onto the play
//! field between the border rows. No game logic is performed; this module
//! only translates state into queued crossterm commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use stellar_conflict::assets::Appearance;
use stellar_conflict::config::{Difficulty, ViewportConfig};
use stellar_conflict::entities::{GameState, Player};
use stellar_conflict::error::RenderError;
use stellar_conflict::events::FrameEvent;
use stellar_conflict::particles::ParticleKind;
use stellar_conflict::render::{Overlay, PresentedFrame, Renderer};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_ENERGY: Color = Color::Cyan;
const C_HUD_COMBO: Color = Color::Magenta;
const C_PLAYER: Color = Color::White;
const C_ENEMY_GREEN: Color = Color::Green;
const C_ENEMY_RED: Color = Color::Red;
const C_LASER: Color = Color::Cyan;
const C_PLASMA: Color = Color::Magenta;
const C_EXPLOSION: Color = Color::Yellow;
const C_PARTICLE: Color = Color::DarkYellow;
const C_PLACEHOLDER: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;
const C_DAMAGE: Color = Color::Red;

const EXPLOSION_FRAMES: [&str; 9] = ["·", "*", "✶", "✸", "✹", "✺", "✹", "✸", "·"];

/// Frames a floating damage number stays up.
const FLOATER_TTL: u32 = 20;
const SHAKE_FRAMES: u32 = 6;

struct Floater {
    col: u16,
    row: u16,
    text: String,
    ttl: u32,
}

/// World → cell mapping for the current terminal size.
#[derive(Clone, Copy)]
struct Grid {
    cols: u16,
    rows: u16,
    world_w: f32,
    world_h: f32,
    shake: i32,
}

impl Grid {
    fn field_cols(&self) -> f32 {
        self.cols.saturating_sub(2).max(1) as f32
    }

    fn field_rows(&self) -> f32 {
        self.rows.saturating_sub(4).max(1) as f32
    }

    /// Cell for a world point, or `None` outside the play field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 || x >= self.world_w || y >= self.world_h {
            return None;
        }
        let col = 1 + (x / self.world_w * self.field_cols()) as i32 + self.shake;
        let row = 2 + (y / self.world_h * self.field_rows()) as i32;
        let max_col = self.cols as i32 - 2;
        if col < 1 || col > max_col {
            return None;
        }
        Some((col as u16, row as u16))
    }

    fn bottom_border(&self) -> u16 {
        self.rows.saturating_sub(2)
    }
}

pub struct TerminalRenderer<W: Write> {
    out: W,
    grid: Grid,
    shake_frames: u32,
    floaters: Vec<Floater>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, cols: u16, rows: u16, viewport: &ViewportConfig) -> Self {
        Self {
            out,
            grid: Grid {
                cols,
                rows,
                world_w: viewport.width.max(1.0),
                world_h: viewport.height.max(1.0),
                shake: 0,
            },
            shake_frames: 0,
            floaters: Vec::new(),
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.grid.cols = cols;
        self.grid.rows = rows;
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    /// Turn this frame's events into lasting on-screen effects.
    fn absorb_events(&mut self, events: &[FrameEvent]) {
        for event in events {
            match event {
                FrameEvent::ScreenShake { .. } => self.shake_frames = SHAKE_FRAMES,
                FrameEvent::DamageNumber { x, y, amount } => {
                    if let Some((col, row)) = self.grid.cell(*x, *y) {
                        self.floaters.push(Floater {
                            col,
                            row: row.saturating_sub(1).max(2),
                            text: format!("-{amount}"),
                            ttl: FLOATER_TTL,
                        });
                    }
                }
                FrameEvent::Sound(cue) => log::trace!("sound {}", cue.asset_key()),
                _ => {}
            }
        }
    }

    fn age_effects(&mut self) {
        self.shake_frames = self.shake_frames.saturating_sub(1);
        self.grid.shake = match self.shake_frames {
            0 => 0,
            n if n % 2 == 0 => 1,
            _ => -1,
        };
        for f in &mut self.floaters {
            f.ttl = f.ttl.saturating_sub(1);
            f.row = f.row.saturating_sub(u16::from(f.ttl % 5 == 0)).max(2);
        }
        self.floaters.retain(|f| f.ttl > 0);
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn clear(&mut self) -> Result<(), RenderError> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        draw_border(&mut self.out, &self.grid)?;
        Ok(())
    }

    fn render(&mut self, state: &GameState, player: &Player) -> Result<(), RenderError> {
        let out = &mut self.out;
        let grid = &self.grid;

        for p in state.particles.particles() {
            draw_particle(out, grid, p.x, p.y, p.kind)?;
        }
        for powerup in &state.powerups {
            let (glyph, color) = powerup_glyph(&powerup.appearance);
            draw_glyph(out, grid, powerup.x, powerup.y, glyph, color)?;
        }
        for enemy in &state.enemies {
            draw_enemy(out, grid, enemy.x, enemy.y, &enemy.appearance)?;
        }
        for projectile in &state.projectiles {
            let (glyph, color) = projectile_glyph(&projectile.appearance);
            draw_glyph(out, grid, projectile.x, projectile.y, glyph, color)?;
        }
        if !state.is_game_over {
            draw_player(out, grid, player)?;
        }
        for explosion in &state.explosions {
            let glyph = if explosion.appearance.placeholder {
                "?"
            } else {
                EXPLOSION_FRAMES[(explosion.current_frame as usize).min(EXPLOSION_FRAMES.len() - 1)]
            };
            draw_glyph(out, grid, explosion.x, explosion.y, glyph, C_EXPLOSION)?;
        }
        Ok(())
    }

    fn present(&mut self, frame: &PresentedFrame<'_>) -> Result<(), RenderError> {
        self.absorb_events(frame.events);

        for f in &self.floaters {
            self.out.queue(cursor::MoveTo(f.col, f.row))?;
            self.out.queue(style::SetForegroundColor(C_DAMAGE))?;
            self.out.queue(Print(&f.text))?;
        }

        if frame.shows(Overlay::Hud) {
            if let Some(session) = frame.session {
                draw_hud(&mut self.out, &self.grid, &session.state)?;
            }
        }
        if frame.shows(Overlay::MainMenu) {
            draw_menu(&mut self.out, &self.grid, frame)?;
        }
        if frame.shows(Overlay::Controls) {
            draw_controls(&mut self.out, &self.grid)?;
        }
        if frame.shows(Overlay::PauseMenu) {
            draw_pause(&mut self.out, &self.grid, frame.shows(Overlay::ConfirmQuit))?;
        }
        if frame.shows(Overlay::GameOver) {
            draw_game_over(&mut self.out, &self.grid, frame)?;
        }
        draw_hint(&mut self.out, &self.grid, frame)?;

        self.age_effects();

        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.grid.rows.saturating_sub(1)))?;
        self.out.flush()?;
        Ok(())
    }
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, grid: &Grid) -> std::io::Result<()> {
    let w = grid.cols as usize;
    let h = grid.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, grid.bottom_border()))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(grid.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_glyph<W: Write>(
    out: &mut W,
    grid: &Grid,
    x: f32,
    y: f32,
    glyph: &str,
    color: Color,
) -> std::io::Result<()> {
    if let Some((col, row)) = grid.cell(x, y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, grid: &Grid, player: &Player) -> std::io::Result<()> {
    if player.appearance.placeholder {
        return draw_glyph(out, grid, player.x, player.y, "?", C_PLACEHOLDER);
    }
    // Two rows:
    //   ▲       tip
    //  /█\      fuselage + wings
    let Some((col, row)) = grid.cell(player.x, player.y) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print(if player.is_dashing { "△" } else { "▲" }))?;

    if row + 1 < grid.bottom_border() {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
        out.queue(Print("/█\\"))?;
    }
    for &(tx, ty) in &player.trail {
        draw_glyph(out, grid, tx, ty, "·", C_HINT)?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(
    out: &mut W,
    grid: &Grid,
    x: f32,
    y: f32,
    appearance: &Appearance,
) -> std::io::Result<()> {
    if appearance.placeholder {
        return draw_glyph(out, grid, x, y, "?", C_PLACEHOLDER);
    }
    let Some((col, row)) = grid.cell(x, y) else {
        return Ok(());
    };
    let (top, bottom, color) = match appearance.key.as_str() {
        "enemygreen" => ("«▼»", "╚═╝", C_ENEMY_GREEN),
        _ => ("(◎)", "╰─╯", C_ENEMY_RED),
    };
    let lx = col.saturating_sub(1).max(1);
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(lx, row))?;
    out.queue(Print(top))?;
    if row + 1 < grid.bottom_border() {
        out.queue(cursor::MoveTo(lx, row + 1))?;
        out.queue(Print(bottom))?;
    }
    Ok(())
}

fn projectile_glyph(appearance: &Appearance) -> (&'static str, Color) {
    if appearance.placeholder {
        return ("?", C_PLACEHOLDER);
    }
    match appearance.key.as_str() {
        "projectile_plasma" => ("↓", C_PLASMA),
        _ => ("║", C_LASER),
    }
}

/// ♥ health, ◆ shield, ★ energy.
fn powerup_glyph(appearance: &Appearance) -> (&'static str, Color) {
    if appearance.placeholder {
        return ("?", C_PLACEHOLDER);
    }
    match appearance.key.as_str() {
        "powerup_health" => ("♥", Color::Magenta),
        "powerup_shield" => ("◆", Color::Cyan),
        _ => ("★", Color::Yellow),
    }
}

fn draw_particle<W: Write>(
    out: &mut W,
    grid: &Grid,
    x: f32,
    y: f32,
    kind: ParticleKind,
) -> std::io::Result<()> {
    let glyph = match kind {
        ParticleKind::Spark => "·",
        ParticleKind::Trail => "˙",
        ParticleKind::Sparkle => "+",
    };
    draw_glyph(out, grid, x, y, glyph, C_PARTICLE)
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn bar(value: f32, max: f32, cells: usize) -> String {
    let filled = if max <= 0.0 {
        0
    } else {
        ((value / max).clamp(0.0, 1.0) * cells as f32).round() as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(cells - filled))
}

fn draw_hud<W: Write>(out: &mut W, grid: &Grid, state: &GameState) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}  ", state.score)))?;

    let health_cap = state.config.powerup.health_cap as f32;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!(
        "♥ {} {:>3}  ",
        bar(state.health as f32, health_cap, 10),
        state.health
    )))?;

    out.queue(style::SetForegroundColor(C_HUD_ENERGY))?;
    out.queue(Print(format!(
        "⚡ {} {:>3}  ",
        bar(state.energy, state.config.max_energy, 10),
        state.energy as i32
    )))?;

    let dash = if state.dash_cooldown == 0 {
        "DASH ready".to_string()
    } else {
        format!("DASH {:>3}", state.dash_cooldown)
    };
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(dash))?;

    if state.combo_count > 1 {
        let multiplier = state.combo_count.min(state.config.combo.max_multiplier);
        let combo = format!("COMBO x{multiplier} ({})", state.combo_count);
        let rx = grid.cols.saturating_sub(combo.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(rx, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_COMBO))?;
        out.queue(Print(combo))?;
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    grid: &Grid,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (grid.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_menu<W: Write>(out: &mut W, grid: &Grid, frame: &PresentedFrame<'_>) -> std::io::Result<()> {
    let cy = grid.rows / 2;
    draw_centered(out, grid, cy.saturating_sub(6), "★  STELLAR  CONFLICT  ★", Color::Cyan)?;

    if let Some(best) = frame.high_scores.first() {
        let hs = format!("Best Score: {}", best.score);
        draw_centered(out, grid, cy.saturating_sub(5), &hs, Color::Yellow)?;
    }

    let options: &[(&str, Difficulty, Color, &str)] = &[
        ("1", Difficulty::Easy, Color::Green, "Easy    fewer, calmer enemies"),
        ("2", Difficulty::Normal, Color::Yellow, "Normal  balanced challenge"),
        ("3", Difficulty::Hard, Color::Red, "Hard    fast and relentless"),
    ];
    let left = (grid.cols / 2).saturating_sub(16);
    for (i, (key, difficulty, color, label)) in options.iter().enumerate() {
        let row = cy.saturating_sub(3) + i as u16;
        let selected = frame.settings.difficulty == *difficulty;
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("{} [{}] ", if selected { "▶" } else { " " }, key)))?;
        out.queue(style::SetForegroundColor(if selected { *color } else { Color::DarkGrey }))?;
        out.queue(Print(*label))?;
    }

    draw_centered(out, grid, cy + 1, "ENTER / SPACE : Start mission", Color::White)?;
    draw_centered(out, grid, cy + 2, "ESC : Controls   M : Mute   Q : Quit", C_HINT)?;
    Ok(())
}

fn draw_controls<W: Write>(out: &mut W, grid: &Grid) -> std::io::Result<()> {
    let lines = [
        "← → ↑ ↓ / WASD : Move",
        "SPACE          : Fire (costs energy)",
        "SHIFT / X      : Dash",
        "P              : Pause / Resume",
        "ESC            : Back",
        "",
        "♥ health   ◆ shield   ★ energy",
    ];
    let start = (grid.rows / 2 + 4).min(grid.rows.saturating_sub(lines.len() as u16 + 2));
    for (i, line) in lines.iter().enumerate() {
        draw_centered(out, grid, start + i as u16, line, Color::White)?;
    }
    Ok(())
}

fn draw_pause<W: Write>(out: &mut W, grid: &Grid, confirming: bool) -> std::io::Result<()> {
    let cy = grid.rows / 2;
    draw_centered(out, grid, cy.saturating_sub(2), "╔══════════════════╗", Color::Cyan)?;
    draw_centered(out, grid, cy.saturating_sub(1), "║      PAUSED      ║", Color::Cyan)?;
    draw_centered(out, grid, cy, "╚══════════════════╝", Color::Cyan)?;
    if confirming {
        draw_centered(out, grid, cy + 1, "Quit to menu?  ENTER : Yes   ESC : No", Color::Yellow)?;
    } else {
        draw_centered(out, grid, cy + 1, "P : Resume   ESC : Quit", Color::White)?;
    }
    Ok(())
}

fn draw_game_over<W: Write>(out: &mut W, grid: &Grid, frame: &PresentedFrame<'_>) -> std::io::Result<()> {
    let Some(run) = frame.last_run else {
        return Ok(());
    };
    let score = run.summary.score;
    let best = frame.high_scores.first().map(|h| h.score).unwrap_or(0).max(score);

    let box_lines = [
        "╔════════════════════╗",
        "║    GAME  OVER      ║",
        "╚════════════════════╝",
    ];
    let total_rows = box_lines.len() + 4 + run.unlocked.len();
    let mut row = (grid.rows / 2).saturating_sub(total_rows as u16 / 2);

    for line in box_lines {
        draw_centered(out, grid, row, line, Color::Red)?;
        row += 1;
    }

    draw_centered(out, grid, row, &format!("Final Score: {score:>6}"), Color::Yellow)?;
    row += 1;
    if run.new_high_score {
        draw_centered(out, grid, row, &format!("★ NEW HIGH SCORE: {score:>6} ★"), Color::Yellow)?;
    } else {
        draw_centered(out, grid, row, &format!("Best Score:  {best:>6}"), Color::DarkGrey)?;
    }
    row += 1;

    let stats = &run.summary.stats;
    let accuracy = if stats.shots_fired == 0 {
        0
    } else {
        stats.shots_hit * 100 / stats.shots_fired
    };
    let line = format!(
        "Kills {}  Max combo {}  Accuracy {}%",
        stats.enemies_defeated, stats.max_combo, accuracy
    );
    draw_centered(out, grid, row, &line, Color::White)?;
    row += 1;

    for id in &run.unlocked {
        let title = stellar_conflict::achievements::find(id).map_or(*id, |a| a.title);
        draw_centered(out, grid, row, &format!("Achievement: {title}"), Color::Magenta)?;
        row += 1;
    }

    draw_centered(out, grid, row, "ENTER - Play Again  ESC - Menu", Color::White)?;
    Ok(())
}

// ── Hint line (last row) ──────────────────────────────────────────────────────

fn draw_hint<W: Write>(out: &mut W, grid: &Grid, frame: &PresentedFrame<'_>) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, grid.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    let music = match frame.music {
        Some(m) if m.paused => "♪ paused",
        Some(m) if m.volume <= 0.0 => "♪ muted",
        Some(m) if m.handle.is_none() => "♪ ?",
        Some(_) => "♪",
        None => "",
    };
    out.queue(Print(format!(
        "WASD/Arrows : Move   SPACE : Fire   SHIFT : Dash   P : Pause   {music}"
    )))?;
    Ok(())
}
