use super::*;
use crate::catalog::manifest::BoothManifest;

fn session() -> BoothSession {
    BoothSession::new(
        BoothManifest::from_json_str(
            r#"{
              "uniforms": [ { "id": "w", "name": "winter", "image": "w.png", "category": "middle", "kind": "winter" } ],
              "stickers": [ { "id": "heart", "name": "Heart", "image": "heart.png" } ]
            }"#,
        )
        .unwrap(),
    )
}

#[test]
fn scene_places_overlays_and_replays_gestures() {
    let scene: Scene = serde_json::from_str(
        r#"{
          "uniform": "w",
          "filter": "sepia",
          "stickers": [
            { "sticker": "heart", "transform": { "x": 20, "y": -10, "scale": 1.2, "rotation_deg": 15 } },
            { "sticker": "heart" }
          ],
          "gestures": [
            { "target": { "sticker": 1 }, "contacts": [[0, 0]] },
            { "target": { "sticker": 1 }, "contacts": [[5, 7]] },
            { "target": { "sticker": 1 } }
          ]
        }"#,
    )
    .unwrap();

    let mut s = session();
    assert_eq!(scene.apply_to(&mut s).unwrap(), 3);

    let stickers = s.registry().stickers();
    assert_eq!(stickers[0].transform, Transform::new(20.0, -10.0, 1.2, 15.0));
    assert_eq!((stickers[1].transform.x, stickers[1].transform.y), (5.0, 7.0));
    assert_eq!(s.registry().uniform().unwrap().name, "winter");
    assert_eq!(s.filter(), Some("sepia"));
    assert!(s.registry().arbiter().is_free());
}

#[test]
fn hidden_uniform_and_bad_targets() {
    let mut s = session();
    let hidden = Scene {
        uniform: Some("w".into()),
        uniform_visible: false,
        ..Scene::default()
    };
    hidden.apply_to(&mut s).unwrap();
    assert!(!s.registry().uniform().unwrap().visible);

    let bad = Scene {
        gestures: vec![GestureTick {
            target: GestureTarget::Sticker(3),
            contacts: vec![[0.0, 0.0]],
        }],
        ..Scene::default()
    };
    let err = bad.apply_to(&mut session()).unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<Scene>(r#"{ "unifrom": "w" }"#).is_err());
}
