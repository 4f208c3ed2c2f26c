use super::*;
use crate::associate::build_associations;

fn image(id: &str) -> ProductImage {
    ProductImage {
        id: id.to_owned(),
        source_url: format!("https://cdn.shopify.com/s/files/1/{id}.jpg?v=1700000000"),
        alt_text: None,
    }
}

fn variant(id: &str, options: &[(&str, &str)], image: Option<&str>) -> Variant {
    Variant {
        id: id.to_owned(),
        selected_options: options
            .iter()
            .map(|(n, v)| SelectedOption::new(*n, *v))
            .collect(),
        linked_image_id: image.map(str::to_owned),
    }
}

fn filenames(renamed: &[RenamedEntry]) -> Vec<&str> {
    renamed.iter().map(|r| r.new_filename.as_str()).collect()
}

// -----------------------------------------------------------------------
// rename
// -----------------------------------------------------------------------

#[test]
fn carries_last_linked_variant_forward() {
    let images = vec![image("a"), image("b"), image("c"), image("d"), image("e")];
    let variants = vec![
        variant("red", &[("Color", "Red")], Some("a")),
        variant("blue", &[("Color", "Blue")], Some("b")),
    ];
    let entries = build_associations(&images, &variants);
    let (renamed, _) = rename(
        &entries,
        "Wall & Floor Tile",
        CarryForwardPolicy::Carry,
        NamingState::new(),
    );

    assert_eq!(
        filenames(&renamed),
        [
            "wall-and-floor-tile-red-01.jpg",
            "wall-and-floor-tile-blue-01.jpg",
            "wall-and-floor-tile-blue-02.jpg",
            "wall-and-floor-tile-blue-03.jpg",
            "wall-and-floor-tile-blue-04.jpg",
        ]
    );
    assert_eq!(renamed[2].attribution, Attribution::CarriedForward);
    assert_eq!(renamed[2].variant_id.as_deref(), Some("blue"));
    assert_eq!(renamed[4].sequence_number, 4);
    assert_eq!(renamed[4].gallery_position, 5);
    assert_eq!(renamed[0].sequence_number, 1);
}

#[test]
fn shared_image_yields_one_copy_per_variant() {
    let images = vec![image("swatch")];
    let variants = vec![
        variant("s", &[("Color", "Red"), ("Size", "S")], Some("swatch")),
        variant("l", &[("Color", "Red"), ("Size", "L")], Some("swatch")),
    ];
    let entries = build_associations(&images, &variants);
    let (renamed, _) = rename(&entries, "Tee", CarryForwardPolicy::Carry, NamingState::new());

    assert_eq!(filenames(&renamed), ["tee-red-s-01.jpg", "tee-red-l-01.jpg"]);
    assert_eq!(renamed[0].image, renamed[1].image);
    assert_eq!(renamed[0].variant_id.as_deref(), Some("s"));
    assert_eq!(renamed[1].variant_id.as_deref(), Some("l"));
}

#[test]
fn shared_image_context_duplicates_follow_on_shots() {
    let images = vec![image("swatch"), image("detail")];
    let variants = vec![
        variant("s", &[("Size", "S")], Some("swatch")),
        variant("l", &[("Size", "L")], Some("swatch")),
    ];
    let entries = build_associations(&images, &variants);
    let (renamed, _) = rename(&entries, "Tee", CarryForwardPolicy::Carry, NamingState::new());

    assert_eq!(
        filenames(&renamed),
        ["tee-s-01.jpg", "tee-l-01.jpg", "tee-s-02.jpg", "tee-l-02.jpg"]
    );
}

#[test]
fn unlinked_images_before_first_link_are_gallery_images() {
    let images = vec![image("hero"), image("lifestyle"), image("a")];
    let variants = vec![variant("red", &[("Color", "Red")], Some("a"))];
    let entries = build_associations(&images, &variants);
    let (renamed, _) = rename(&entries, "Lamp", CarryForwardPolicy::Carry, NamingState::new());

    assert_eq!(
        filenames(&renamed),
        ["lamp-gallery-01.jpg", "lamp-gallery-02.jpg", "lamp-red-01.jpg"]
    );
    assert_eq!(renamed[0].attribution, Attribution::Gallery);
    assert!(renamed[0].variant_id.is_none());
    assert!(renamed[0].options.is_empty());
}

#[test]
fn disabled_policy_names_unlinked_images_as_gallery() {
    let images = vec![image("a"), image("b"), image("c")];
    let variants = vec![variant("red", &[("Color", "Red")], Some("a"))];
    let entries = build_associations(&images, &variants);
    let (renamed, _) = rename(
        &entries,
        "Lamp",
        CarryForwardPolicy::Disabled,
        NamingState::new(),
    );

    assert_eq!(
        filenames(&renamed),
        ["lamp-red-01.jpg", "lamp-gallery-01.jpg", "lamp-gallery-02.jpg"]
    );
}

#[test]
fn collisions_get_numeric_suffix() {
    // Two variants whose option values normalize to the same slug.
    let images = vec![image("a"), image("b")];
    let variants = vec![
        variant("one", &[("Color", "Black/White")], Some("a")),
        variant("two", &[("Color", "Black White")], Some("b")),
    ];
    let entries = build_associations(&images, &variants);
    let (renamed, _) = rename(&entries, "Mug", CarryForwardPolicy::Carry, NamingState::new());

    assert_eq!(
        filenames(&renamed),
        ["mug-black-white-01.jpg", "mug-black-white-01-1.jpg"]
    );
}

#[test]
fn preexisting_names_are_avoided() {
    let images = vec![image("a")];
    let variants = vec![variant("red", &[("Color", "Red")], Some("a"))];
    let entries = build_associations(&images, &variants);
    let state = NamingState::new().reserve([
        "mug-red-01.jpg".to_owned(),
        "mug-red-01-1.jpg".to_owned(),
    ]);
    let (renamed, state) = rename(&entries, "Mug", CarryForwardPolicy::Carry, state);
    assert_eq!(filenames(&renamed), ["mug-red-01-2.jpg"]);

    let (again, _) = rename(
        &entries,
        "Mug",
        CarryForwardPolicy::Carry,
        state.next_product(),
    );
    assert_eq!(filenames(&again), ["mug-red-01-3.jpg"]);
}

#[test]
fn reserving_keeps_counters() {
    let images = vec![image("a"), image("b")];
    let entries = build_associations(&images, &[]);
    let (_, state) = rename(&entries, "Mug", CarryForwardPolicy::Carry, NamingState::new());
    let (renamed, _) = rename(
        &entries[..1],
        "Mug",
        CarryForwardPolicy::Carry,
        state.reserve(["mug-gallery-03.jpg".to_owned()]),
    );

    assert_eq!(filenames(&renamed), ["mug-gallery-03-1.jpg"]);
}

#[test]
fn next_product_keeps_names_and_resets_counters() {
    let images = vec![image("a"), image("b")];
    let entries = build_associations(&images, &[]);
    let (first, state) = rename(&entries, "Mug", CarryForwardPolicy::Carry, NamingState::new());
    let (second, _) = rename(
        &entries,
        "Mug",
        CarryForwardPolicy::Carry,
        state.next_product(),
    );

    assert_eq!(filenames(&first), ["mug-gallery-01.jpg", "mug-gallery-02.jpg"]);
    assert_eq!(
        filenames(&second),
        ["mug-gallery-01-1.jpg", "mug-gallery-02-1.jpg"]
    );
    assert_eq!(second[0].sequence_number, 1);
}

#[test]
fn variant_without_option_values_omits_option_part() {
    let images = vec![image("a")];
    let variants = vec![variant("default", &[], Some("a"))];
    let entries = build_associations(&images, &variants);
    let (renamed, _) = rename(&entries, "Mug", CarryForwardPolicy::Carry, NamingState::new());
    assert_eq!(filenames(&renamed), ["mug-01.jpg"]);
}

#[test]
fn empty_product_renames_nothing() {
    let (renamed, state) = rename(&[], "Mug", CarryForwardPolicy::Carry, NamingState::new());
    assert!(renamed.is_empty());
    assert_eq!(state, NamingState::new());
}

// -----------------------------------------------------------------------
// extension_of
// -----------------------------------------------------------------------

#[test]
fn extension_ignores_query_string() {
    assert_eq!(
        extension_of("https://cdn.shopify.com/s/files/1/tile.PNG?v=123"),
        ".png"
    );
}

#[test]
fn extension_defaults_to_jpg() {
    assert_eq!(extension_of("https://cdn.example.com/images/tile"), ".jpg");
    assert_eq!(extension_of("https://cdn.example.com/images/tile."), ".jpg");
    assert_eq!(extension_of("https://cdn.example.com/v1.2/tile"), ".jpg");
}

#[test]
fn extension_keeps_webp() {
    assert_eq!(
        extension_of("https://cdn.example.com/a/b/photo.webp#frag"),
        ".webp"
    );
}
