use super::*;

fn asset(name: &str) -> AssetRef {
    AssetRef::new(name)
}

#[test]
fn snapshot_orders_uniform_before_stickers_in_insertion_order() {
    let mut reg = OverlayRegistry::new();
    let s1 = reg.add_sticker(asset("s1.png"), "s1");
    let u = reg.set_uniform(asset("winter.png"), "winter");
    let s2 = reg.add_sticker(asset("s2.png"), "s2");

    let ids: Vec<_> = reg.snapshot().into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![u.id, s1.id, s2.id]);
}

#[test]
fn new_overlays_start_at_default_transform_with_unique_ids() {
    let mut reg = OverlayRegistry::new();
    let a = reg.add_sticker(asset("a.png"), "a");
    let b = reg.add_sticker(asset("a.png"), "a");
    assert_ne!(a.id, b.id);
    assert_eq!(a.transform, Transform::IDENTITY);
    assert!(a.visible);
    assert_eq!(a.kind, OverlayKind::Sticker);
}

#[test]
fn replacing_uniform_discards_transform_and_releases_lock() {
    let mut reg = OverlayRegistry::new();
    let old = reg.set_uniform(asset("winter.png"), "winter");
    reg.update_overlay(&old.id, TransformDelta::pan(30.0, 5.0));
    assert!(reg.arbiter_mut().try_acquire(&old.id));

    let new = reg.set_uniform(asset("summer.png"), "summer");
    assert_ne!(old.id, new.id);
    assert_eq!(reg.uniform().unwrap().transform, Transform::IDENTITY);
    assert!(reg.arbiter().is_free());
    assert!(reg.get(&old.id).is_none());
}

#[test]
fn uniform_visibility_survives_replacement() {
    let mut reg = OverlayRegistry::new();
    reg.set_uniform(asset("winter.png"), "winter");
    reg.set_uniform_visible(false);
    reg.set_uniform(asset("summer.png"), "summer");
    assert!(!reg.uniform().unwrap().visible);
}

#[test]
fn update_and_remove_missing_ids_are_silent() {
    let mut reg = OverlayRegistry::new();
    let ghost = OverlayId::new("sticker-99");
    assert!(!reg.update_overlay(&ghost, TransformDelta::pan(1.0, 1.0)));
    assert!(reg.remove_overlay(&ghost).is_none());
    assert!(!reg.reset_transform(&ghost));
}

#[test]
fn update_applies_clamped_transform() {
    let mut reg = OverlayRegistry::new();
    let s = reg.add_sticker(asset("a.png"), "a");
    reg.update_overlay(&s.id, TransformDelta::pan(20.0, -10.0));
    reg.update_overlay(&s.id, TransformDelta::pinch(10.0, 15.0));
    let t = reg.get(&s.id).unwrap().transform;
    assert_eq!((t.x, t.y, t.scale, t.rotation_deg), (20.0, -10.0, 3.0, 15.0));

    assert!(reg.reset_transform(&s.id));
    assert_eq!(reg.get(&s.id).unwrap().transform, Transform::IDENTITY);
}

#[test]
fn removing_lock_holder_releases_lock() {
    let mut reg = OverlayRegistry::new();
    let a = reg.add_sticker(asset("a.png"), "a");
    let b = reg.add_sticker(asset("b.png"), "b");
    assert!(reg.arbiter_mut().try_acquire(&a.id));

    reg.remove_overlay(&b.id);
    assert_eq!(reg.arbiter().holder(), Some(&a.id));

    let removed = reg.remove_overlay(&a.id).unwrap();
    assert_eq!(removed.id, a.id);
    assert!(reg.arbiter().is_free());
}

#[test]
fn remove_all_stickers_is_idempotent_and_keeps_uniform() {
    let mut reg = OverlayRegistry::new();
    let u = reg.set_uniform(asset("winter.png"), "winter");
    let s = reg.add_sticker(asset("a.png"), "a");
    reg.add_sticker(asset("b.png"), "b");
    assert!(reg.arbiter_mut().try_acquire(&s.id));

    assert_eq!(reg.remove_all_stickers(), 2);
    assert!(reg.arbiter().is_free());
    assert!(!reg.has_stickers());

    assert_eq!(reg.remove_all_stickers(), 0);
    assert!(reg.arbiter().is_free());
    assert_eq!(reg.sticker_count(), 0);
    assert_eq!(reg.uniform().unwrap().id, u.id);
}

#[test]
fn remove_all_stickers_leaves_uniform_lock_alone() {
    let mut reg = OverlayRegistry::new();
    let u = reg.set_uniform(asset("winter.png"), "winter");
    reg.add_sticker(asset("a.png"), "a");
    assert!(reg.arbiter_mut().try_acquire(&u.id));
    reg.remove_all_stickers();
    assert_eq!(reg.arbiter().holder(), Some(&u.id));
}

#[test]
fn snapshot_is_detached_from_later_mutation() {
    let mut reg = OverlayRegistry::new();
    let s = reg.add_sticker(asset("a.png"), "a");
    let snap = reg.snapshot();
    reg.update_overlay(&s.id, TransformDelta::pan(50.0, 0.0));
    reg.remove_all_stickers();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].transform, Transform::IDENTITY);
}

#[test]
fn clear_uniform_releases_lock() {
    let mut reg = OverlayRegistry::new();
    let u = reg.set_uniform(asset("winter.png"), "winter");
    reg.arbiter_mut().try_acquire(&u.id);
    assert_eq!(reg.clear_uniform().unwrap().id, u.id);
    assert!(reg.arbiter().is_free());
    assert!(reg.clear_uniform().is_none());
}

#[test]
fn set_transform_places_absolutely_with_clamp() {
    let mut reg = OverlayRegistry::new();
    let s = reg.add_sticker(asset("a.png"), "a");
    assert!(reg.set_transform(&s.id, Transform::new(20.0, -10.0, 1.2, 15.0)));
    assert_eq!(reg.get(&s.id).unwrap().transform.x, 20.0);

    let wild = Transform {
        x: 0.0,
        y: 0.0,
        scale: 9.0,
        rotation_deg: 0.0,
    };
    reg.set_transform(&s.id, wild);
    assert_eq!(reg.get(&s.id).unwrap().transform.scale, 3.0);
    assert!(!reg.set_transform(&OverlayId::new("ghost"), wild));
}
