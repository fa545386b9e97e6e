use super::*;
use crate::transform::model::Transform;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn pinch_points(distance: f64, angle_deg: f64) -> [Point; 2] {
    let a = Point::new(200.0, 200.0);
    let r = angle_deg.to_radians();
    [a, Point::new(a.x + distance * r.cos(), a.y + distance * r.sin())]
}

fn run(
    interp: &mut GestureInterpreter,
    arb: &mut InteractionArbiter,
    id: &OverlayId,
    t: Transform,
    contacts: &[Point],
) -> (Transform, GestureOutcome) {
    let outcome = interp.tick(id, contacts, arb);
    let t = match outcome {
        GestureOutcome::Delta(d) => t.apply(d),
        _ => t,
    };
    (t, outcome)
}

#[test]
fn single_contact_drag_emits_position_differences() {
    let id = OverlayId::new("s");
    let mut arb = InteractionArbiter::new();
    let mut interp = GestureInterpreter::new();

    assert_eq!(
        interp.tick(&id, &[Point::new(10.0, 10.0)], &mut arb),
        GestureOutcome::Began
    );
    assert_eq!(arb.holder(), Some(&id));
    assert_eq!(
        interp.tick(&id, &[Point::new(15.0, 7.0)], &mut arb),
        GestureOutcome::Delta(TransformDelta::pan(5.0, -3.0))
    );
    assert_eq!(interp.tick(&id, &[], &mut arb), GestureOutcome::Ended);
    assert!(arb.is_free());
    assert!(!interp.is_active(&id));
}

#[test]
fn pinch_is_incremental_against_previous_tick() {
    let id = OverlayId::new("s");
    let mut arb = InteractionArbiter::new();
    let mut interp = GestureInterpreter::new();
    let mut t = Transform::IDENTITY;

    let expected = [(100.0, 0.0, 1.0, 0.0), (150.0, 0.0, 1.5, 0.0), (150.0, 30.0, 1.5, 30.0)];
    for (distance, angle, scale, rotation) in expected {
        let (next, _) = run(
            &mut interp,
            &mut arb,
            &id,
            t,
            &pinch_points(distance, angle),
        );
        t = next;
        assert!(approx(t.scale, scale), "scale {} != {scale}", t.scale);
        assert!(
            approx(t.rotation_deg, rotation),
            "rotation {} != {rotation}",
            t.rotation_deg
        );
    }
}

#[test]
fn coincident_contacts_are_a_no_op() {
    let id = OverlayId::new("s");
    let mut arb = InteractionArbiter::new();
    let mut interp = GestureInterpreter::new();
    let p = Point::new(50.0, 50.0);

    assert_eq!(interp.tick(&id, &[p, p], &mut arb), GestureOutcome::Began);
    // a 63 degree angle measured against a zero-length baseline
    let GestureOutcome::Delta(d) = interp.tick(&id, &[p, Point::new(60.0, 70.0)], &mut arb) else {
        panic!("expected delta");
    };
    assert_eq!(d, TransformDelta::IDENTITY);

    let GestureOutcome::Delta(d) = interp.tick(&id, &[p, p], &mut arb) else {
        panic!("expected delta");
    };
    assert_eq!(d, TransformDelta::IDENTITY);
    assert_eq!(d.d_rotation_deg, 0.0);
    assert_eq!(d.d_scale, 1.0);

    // a real baseline after the degenerate ticks yields a normal delta again
    assert_eq!(
        interp.tick(&id, &pinch_points(80.0, 0.0), &mut arb),
        GestureOutcome::Delta(TransformDelta::IDENTITY)
    );
    let GestureOutcome::Delta(d) = interp.tick(&id, &pinch_points(80.0, 90.0), &mut arb) else {
        panic!("expected delta");
    };
    assert!(approx(d.d_rotation_deg, 90.0));
    assert!(approx(d.d_scale, 1.0));
}

#[test]
fn leaving_pinch_discards_baseline() {
    let id = OverlayId::new("s");
    let mut arb = InteractionArbiter::new();
    let mut interp = GestureInterpreter::new();

    interp.tick(&id, &pinch_points(100.0, 0.0), &mut arb);
    interp.tick(&id, &pinch_points(200.0, 0.0), &mut arb);
    assert!(interp.is_pinching(&id));

    // 2 -> 1: re-baseline the drag without a jump.
    assert_eq!(
        interp.tick(&id, &[Point::new(400.0, 400.0)], &mut arb),
        GestureOutcome::Began
    );
    assert!(!interp.is_pinching(&id));

    // 1 -> 2 again: a fresh baseline, not the stale 200px one.
    assert_eq!(
        interp.tick(&id, &pinch_points(50.0, 0.0), &mut arb),
        GestureOutcome::Began
    );
    let GestureOutcome::Delta(d) = interp.tick(&id, &pinch_points(100.0, 0.0), &mut arb) else {
        panic!("expected delta");
    };
    assert!(approx(d.d_scale, 2.0));
}

#[test]
fn other_overlay_is_rejected_while_lock_is_held() {
    let a = OverlayId::new("a");
    let b = OverlayId::new("b");
    let mut arb = InteractionArbiter::new();
    let mut interp = GestureInterpreter::new();

    interp.tick(&a, &[Point::new(0.0, 0.0)], &mut arb);
    assert_eq!(
        interp.tick(&b, &[Point::new(1.0, 1.0)], &mut arb),
        GestureOutcome::Rejected
    );
    assert_eq!(interp.tick(&b, &[], &mut arb), GestureOutcome::Rejected);
    assert!(!interp.is_active(&b));
    assert_eq!(arb.holder(), Some(&a));

    interp.tick(&a, &[], &mut arb);
    assert_eq!(
        interp.tick(&b, &[Point::new(1.0, 1.0)], &mut arb),
        GestureOutcome::Began
    );
}

#[test]
fn rotation_across_atan2_branch_does_not_jump() {
    let id = OverlayId::new("s");
    let mut arb = InteractionArbiter::new();
    let mut interp = GestureInterpreter::new();

    interp.tick(&id, &pinch_points(100.0, 179.0), &mut arb);
    let GestureOutcome::Delta(d) = interp.tick(&id, &pinch_points(100.0, -179.0), &mut arb) else {
        panic!("expected delta");
    };
    assert!(approx(d.d_rotation_deg, 2.0), "got {}", d.d_rotation_deg);
}

#[test]
fn malformed_and_idle_ticks() {
    let id = OverlayId::new("s");
    let mut arb = InteractionArbiter::new();
    let mut interp = GestureInterpreter::new();

    assert_eq!(interp.tick(&id, &[], &mut arb), GestureOutcome::Idle);
    assert_eq!(
        interp.tick(&id, &[Point::new(f64::NAN, 0.0)], &mut arb),
        GestureOutcome::Malformed
    );
    assert!(arb.is_free());

    interp.tick(&id, &[Point::new(1.0, 1.0)], &mut arb);
    interp.forget(&id);
    assert!(!interp.is_active(&id));
    interp.tick(&id, &[Point::new(1.0, 1.0)], &mut arb);
    interp.reset();
    assert!(!interp.is_active(&id));
}
