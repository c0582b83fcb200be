use stellar_conflict::collision::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn random_rect(rng: &mut StdRng) -> Rect {
    Rect::new(
        rng.gen_range(0.0..200.0),
        rng.gen_range(0.0..200.0),
        rng.gen_range(0.0..80.0),
        rng.gen_range(0.0..80.0),
    )
}

// ── check_collision ───────────────────────────────────────────────────────────

#[test]
fn collision_is_symmetric() {
    let mut rng = seeded_rng();
    for _ in 0..2000 {
        let a = random_rect(&mut rng);
        let b = random_rect(&mut rng);
        assert_eq!(check_collision(&a, &b), check_collision(&b, &a), "{a:?} vs {b:?}");
    }
}

#[test]
fn overlapping_boxes_collide() {
    let a = Rect::new(100.0, 100.0, 50.0, 50.0);
    let b = Rect::new(120.0, 110.0, 50.0, 50.0);
    assert!(check_collision(&a, &b));
}

#[test]
fn edge_touching_boxes_do_not_collide() {
    // 100 + 25 > 150 - 25 is 125 > 125: false
    let a = Rect::new(100.0, 100.0, 50.0, 50.0);
    let b = Rect::new(150.0, 100.0, 50.0, 50.0);
    assert!(!check_collision(&a, &b));
    assert!(!check_collision(&b, &a));
}

#[test]
fn edge_touching_vertically_does_not_collide() {
    let a = Rect::new(100.0, 100.0, 50.0, 50.0);
    let b = Rect::new(100.0, 150.0, 50.0, 50.0);
    assert!(!check_collision(&a, &b));
}

#[test]
fn a_sliver_of_overlap_collides() {
    let a = Rect::new(100.0, 100.0, 50.0, 50.0);
    let b = Rect::new(149.5, 100.0, 50.0, 50.0);
    assert!(check_collision(&a, &b));
}

#[test]
fn separated_boxes_do_not_collide() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(100.0, 0.0, 10.0, 10.0);
    assert!(!check_collision(&a, &b));
}

#[test]
fn zero_size_box_inside_another_collides() {
    let point = Rect::new(100.0, 100.0, 0.0, 0.0);
    let big = Rect::new(100.0, 100.0, 50.0, 50.0);
    assert!(check_collision(&point, &big));
    assert!(check_collision(&big, &point));
}

#[test]
fn overlaps_uses_bounds() {
    let a = Rect::new(10.0, 10.0, 4.0, 4.0);
    let b = Rect::new(12.0, 12.0, 4.0, 4.0);
    assert!(overlaps(&a, &b));
    assert_eq!(a.bounds(), a);
}

// ── check_circle_collision ────────────────────────────────────────────────────

#[test]
fn circles_touching_at_one_point_do_not_collide() {
    let a = Circle::new(0.0, 0.0, 10.0);
    let b = Circle::new(20.0, 0.0, 10.0);
    assert!(!check_circle_collision(&a, &b));
}

#[test]
fn overlapping_circles_collide() {
    let a = Circle::new(0.0, 0.0, 10.0);
    let b = Circle::new(12.0, 9.0, 10.0); // distance 15
    assert!(check_circle_collision(&a, &b));
    assert!(check_circle_collision(&b, &a));
}

#[test]
fn distant_circles_do_not_collide() {
    let a = Circle::new(0.0, 0.0, 5.0);
    let b = Circle::new(30.0, 40.0, 5.0);
    assert!(!check_circle_collision(&a, &b));
}
