use stellar_conflict::assets::AssetCatalog;
use stellar_conflict::config::GameConfig;
use stellar_conflict::entities::{GameState, ProjectileOwner};
use stellar_conflict::pool::ObjectPool;

// ── ObjectPool ────────────────────────────────────────────────────────────────

#[test]
fn empty_pool_hands_out_nothing() {
    let mut pool: ObjectPool<u32> = ObjectPool::unbounded();
    assert!(pool.acquire().is_none());
    assert!(pool.is_empty());
}

#[test]
fn round_trip_returns_the_same_allocation() {
    let mut pool = ObjectPool::unbounded();
    let item = Box::new(7_u64);
    let addr = &*item as *const u64;

    assert!(pool.release(item));
    let again = pool.acquire().unwrap();
    assert_eq!(&*again as *const u64, addr);
    assert_eq!(*again, 7);
    assert!(pool.is_empty());
}

#[test]
fn bounded_pool_drops_overflow() {
    let mut pool = ObjectPool::bounded(2);
    assert!(pool.release(1));
    assert!(pool.release(2));
    assert!(!pool.release(3));
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.capacity(), Some(2));
}

#[test]
fn reclaim_keeps_order_and_pools_the_rest() {
    let mut pool = ObjectPool::unbounded();
    let mut live = vec![1, 2, 3, 4, 5, 6];

    let removed = pool.reclaim_from(&mut live, |n| *n % 2 == 1);

    assert_eq!(removed, 3);
    assert_eq!(live, vec![1, 3, 5]);
    assert_eq!(pool.len(), 3);
}

#[test]
fn reclaim_can_mutate_survivors() {
    let mut pool = ObjectPool::unbounded();
    let mut live = vec![1, 2, 3];
    pool.reclaim_from(&mut live, |n| {
        *n *= 10;
        *n < 30
    });
    assert_eq!(live, vec![10, 20]);
    assert_eq!(pool.acquire(), Some(30));
}

#[test]
fn clear_empties_the_pool() {
    let mut pool = ObjectPool::unbounded();
    pool.release("a");
    pool.release("b");
    pool.clear();
    assert!(pool.is_empty());
}

// ── Projectile pooling through GameState ──────────────────────────────────────

fn make_state() -> GameState {
    GameState::new(GameConfig::default(), &AssetCatalog::standard(), 0)
}

#[test]
fn released_projectile_is_reused_with_its_id() {
    let mut state = make_state();
    state.fire_projectile(100.0, 100.0, ProjectileOwner::Player);
    let first_id = state.projectiles[0].id;

    state.projectiles[0].deactivate();
    let removed = state
        .projectile_pool
        .reclaim_from(&mut state.projectiles, |p| p.active);
    assert_eq!(removed, 1);
    assert!(state.projectiles.is_empty());

    state.fire_projectile(300.0, 50.0, ProjectileOwner::Enemy);
    let reused = &state.projectiles[0];
    assert_eq!(reused.id, first_id);
    assert!(reused.active);
    assert_eq!(reused.owner, ProjectileOwner::Enemy);
    assert_eq!(reused.x, 300.0);
    assert_eq!(reused.speed, GameConfig::default().projectile.enemy_speed);
    assert!(state.projectile_pool.is_empty());
}

#[test]
fn no_projectile_is_live_and_pooled_at_once() {
    let mut state = make_state();
    for i in 0..10 {
        state.fire_projectile(i as f32 * 10.0, 300.0, ProjectileOwner::Player);
    }
    for p in state.projectiles.iter_mut().step_by(2) {
        p.deactivate();
    }
    state
        .projectile_pool
        .reclaim_from(&mut state.projectiles, |p| p.active);
    for _ in 0..3 {
        state.fire_projectile(0.0, 0.0, ProjectileOwner::Enemy);
    }

    let mut ids: Vec<u64> = state.projectiles.iter().map(|p| p.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), state.projectiles.len());
    assert_eq!(state.projectiles.len(), 8);
    assert_eq!(state.projectile_pool.len(), 2);
}
