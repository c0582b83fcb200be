use stellar_conflict::assets::AssetCatalog;
use stellar_conflict::combo::register_kill;
use stellar_conflict::config::GameConfig;
use stellar_conflict::entities::GameState;
use stellar_conflict::events::FrameEvent;

fn make_state() -> GameState {
    GameState::new(GameConfig::default(), &AssetCatalog::standard(), 0)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ── Chains ────────────────────────────────────────────────────────────────────

#[test]
fn three_quick_kills_score_600() {
    let mut s = make_state();
    register_kill(&mut s, 1000);
    register_kill(&mut s, 1400);
    let third = register_kill(&mut s, 1800);

    assert_eq!(s.combo_count, 3);
    assert_eq!(third.multiplier, 3);
    assert_eq!(s.score, 100 + 200 + 300);
}

#[test]
fn gap_longer_than_timeout_restarts_chain() {
    let mut s = make_state();
    register_kill(&mut s, 1000);
    let second = register_kill(&mut s, 3500);

    assert_eq!(second.combo_count, 1);
    assert_eq!(second.multiplier, 1);
    assert_eq!(s.score, 200);
}

#[test]
fn kill_exactly_at_timeout_extends_chain() {
    let mut s = make_state();
    register_kill(&mut s, 5000);
    let second = register_kill(&mut s, 7000);
    assert_eq!(second.combo_count, 2);
}

#[test]
fn first_kill_after_a_long_wait_starts_at_one() {
    let mut s = make_state();
    let first = register_kill(&mut s, 60_000);
    assert_eq!(first.combo_count, 1);
    assert_eq!(first.score_gain, 100);
}

#[test]
fn multiplier_caps_at_five() {
    let mut s = make_state();
    let multipliers: Vec<u32> = (0..7)
        .map(|i| register_kill(&mut s, 1000 + i * 100).multiplier)
        .collect();

    assert_eq!(multipliers, vec![1, 2, 3, 4, 5, 5, 5]);
    assert_eq!(s.combo_count, 7);
    assert_eq!(s.score, 100 * (1 + 2 + 3 + 4 + 5 + 5 + 5));
    assert_eq!(s.stats.max_combo, 7);
}

// ── Energy ────────────────────────────────────────────────────────────────────

#[test]
fn energy_gain_grows_with_multiplier() {
    let mut s = make_state();
    s.energy = 0.0;
    let first = register_kill(&mut s, 1000);
    let second = register_kill(&mut s, 1100);

    assert!(approx(first.energy_gain, 20.0));
    assert!(approx(second.energy_gain, 24.0));
    assert!(approx(s.energy, 44.0));
}

#[test]
fn energy_gain_never_exceeds_cap() {
    let mut s = make_state();
    s.energy = 195.0;
    for i in 0..20 {
        register_kill(&mut s, 1000 + i * 10);
        assert!(s.energy <= 200.0);
    }
    assert!(approx(s.energy, 200.0));
}

#[test]
fn kill_emits_combo_event() {
    let mut s = make_state();
    register_kill(&mut s, 1000);
    register_kill(&mut s, 1200);
    assert_eq!(
        s.events.last(),
        Some(&FrameEvent::ComboUpdated {
            count: 2,
            multiplier: 2
        })
    );
}
