use aquaterm::{Aquarium, Item, ItemKind, SceneError};
use std::fs;
use std::path::Path;

fn aquarium() -> Aquarium {
    Aquarium::new(1024.0, 768.0, 1238197374)
}

fn place(aq: &mut Aquarium, kind: ItemKind, x: f64, y: f64, speed: Option<(f64, f64)>) {
    let item = Item::new(kind, aq.rng_mut());
    let id = aq.add(item);
    let item = aq.get_mut(id).unwrap();
    item.set_location(x, y);
    if let (Some((sx, sy)), Some(fish)) = (speed, item.fish_mut()) {
        fish.set_speed_x(sx);
        fish.set_speed_y(sy);
    }
}

fn populate_three_betas(aq: &mut Aquarium) {
    place(aq, ItemKind::Beta, 100.0, 200.0, Some((45.0, 15.0)));
    place(aq, ItemKind::Beta, 400.0, 400.0, Some((-35.0, 10.0)));
    place(aq, ItemKind::Beta, 600.0, 100.0, Some((55.0, -20.0)));
}

fn populate_all_types(aq: &mut Aquarium) {
    place(aq, ItemKind::Beta, 100.0, 200.0, Some((44.695, 0.0)));
    place(aq, ItemKind::Carp, 300.0, 400.0, Some((33.895, 0.0)));
    place(aq, ItemKind::Catfish, 500.0, 600.0, Some((22.795, 0.0)));
    place(aq, ItemKind::Castle, 700.0, 800.0, None);
}

fn item_lines(xml: &str) -> Vec<&str> {
    xml.split("<item").skip(1).collect()
}

fn check_three_betas(xml: &str) {
    assert!(xml.contains(r#"speedx="45.000000" speedy="15.000000""#));
    assert!(xml.contains(r#"speedx="-35.000000" speedy="10.000000""#));
    assert!(xml.contains(r#"speedx="55.000000" speedy="-20.000000""#));
    assert!(xml.contains(r#"x="100.000000" y="200.000000""#));
    assert!(xml.contains(r#"x="400.000000" y="400.000000""#));
    assert!(xml.contains(r#"x="600.000000" y="100.000000""#));
}

fn check_all_types(xml: &str) {
    let items = item_lines(xml);
    assert_eq!(items.len(), 4);
    assert!(items[0].contains(r#"x="100.000000" y="200.000000" type="beta" speedx="44.695000""#));
    assert!(items[1].contains(r#"x="300.000000" y="400.000000" type="carp" speedx="33.895000""#));
    assert!(items[2].contains(r#"x="500.000000" y="600.000000" type="catfish" speedx="22.795000""#));
    assert!(items[3].contains(r#"x="700.000000" y="800.000000" type="castle"/>"#));
    assert!(!items[3].contains("speedx"));
    assert!(xml.trim_end().ends_with("</aqua>"));
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn empty_aquarium_saves_only_the_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.aqua");
    aquarium().save(&path).unwrap();
    let xml = read(&path);
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<aqua/>"));
    assert!(!xml.contains("<item"));
}

#[test]
fn three_betas_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("betas.aqua");

    let mut aq = aquarium();
    populate_three_betas(&mut aq);
    aq.save(&path).unwrap();
    check_three_betas(&read(&path));

    let mut loaded = aquarium();
    loaded.load(&path).unwrap();
    assert_eq!(loaded.len(), 3);
    let again = dir.path().join("betas2.aqua");
    loaded.save(&again).unwrap();
    check_three_betas(&read(&again));
    assert_eq!(read(&path), read(&again));
}

#[test]
fn all_types_keep_order_and_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.aqua");

    let mut aq = aquarium();
    populate_all_types(&mut aq);
    aq.save(&path).unwrap();
    check_all_types(&read(&path));

    let mut loaded = aquarium();
    loaded.load(&path).unwrap();
    let kinds: Vec<_> = loaded.items().map(|(_, i)| i.kind()).collect();
    assert_eq!(
        kinds,
        vec![ItemKind::Beta, ItemKind::Carp, ItemKind::Catfish, ItemKind::Castle]
    );
    let again = dir.path().join("all2.aqua");
    loaded.save(&again).unwrap();
    check_all_types(&read(&again));
}

#[test]
fn clear_then_save_gives_an_empty_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cleared.aqua");

    let mut aq = aquarium();
    populate_all_types(&mut aq);
    aq.save(&path).unwrap();
    assert!(read(&path).contains("<item"));

    aq.clear();
    aq.save(&path).unwrap();
    let xml = read(&path);
    assert!(xml.contains("<aqua/>"));
    assert!(!xml.contains("<item"));
}

#[test]
fn loading_a_broken_file_keeps_the_scene() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.aqua");
    fs::write(&path, "<aqua><item x=\"1\" type=\"beta\"></aqua>").unwrap();

    let mut aq = aquarium();
    populate_three_betas(&mut aq);
    let err = aq.load(&path).unwrap_err();
    assert!(matches!(err, SceneError::Xml(_) | SceneError::Structure(_)));
    assert_eq!(aq.len(), 3);
}

#[test]
fn unknown_types_are_skipped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.aqua");
    fs::write(
        &path,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<aqua>
  <item x="1.000000" y="2.000000" type="shark" speedx="9.000000" speedy="9.000000"/>
  <item x="3.000000" y="4.000000" type="catfish" speedx="21.000000" speedy="22.000000"/>
</aqua>
"#,
    )
    .unwrap();

    let mut aq = aquarium();
    aq.load(&path).unwrap();
    assert_eq!(aq.len(), 1);
    let (_, catfish) = aq.items().next().unwrap();
    assert_eq!(catfish.kind(), ItemKind::Catfish);
    assert_eq!((catfish.x(), catfish.y()), (3.0, 4.0));
    let fish = catfish.fish().unwrap();
    assert_eq!((fish.speed_x(), fish.speed_y()), (21.0, 22.0));
}
