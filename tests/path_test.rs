//! Integration tests for KeyPath.

use validated_command::{KeyPath, PathSegment};

#[test]
fn test_path_construction_and_display() {
    assert_eq!(KeyPath::root().to_string(), "");
    assert_eq!(KeyPath::root().push_field("name").to_string(), "name");
    assert_eq!(KeyPath::root().push_index(0).to_string(), "[0]");

    let path = KeyPath::root()
        .push_field("users")
        .push_index(0)
        .push_field("address")
        .push_field("city");
    assert_eq!(path.to_string(), "users[0].address.city");
}

#[test]
fn test_path_segments_preserved() {
    let path = KeyPath::root()
        .push_field("data")
        .push_index(42)
        .push_field("value");

    let segments: Vec<&PathSegment> = path.segments().collect();
    assert_eq!(segments.len(), 3);

    match &segments[0] {
        PathSegment::Field(name) => assert_eq!(name, "data"),
        _ => panic!("Expected Field segment"),
    }

    match &segments[1] {
        PathSegment::Index(idx) => assert_eq!(*idx, 42),
        _ => panic!("Expected Index segment"),
    }
}

#[test]
fn test_path_is_immutable() {
    let base = KeyPath::root().push_field("items");

    let path1 = base.push_index(0);
    let path2 = base.push_field("count");

    assert_eq!(base.to_string(), "items");
    assert_eq!(path1.to_string(), "items[0]");
    assert_eq!(path2.to_string(), "items.count");
}

#[test]
fn test_dotted_paths_are_all_fields() {
    let path = KeyPath::parse_dotted("second_arg.0.second_sub_arg");

    assert_eq!(path.len(), 3);
    assert_eq!(
        path.segments().filter_map(PathSegment::as_field).collect::<Vec<_>>(),
        vec!["second_arg", "0", "second_sub_arg"]
    );
    assert!(KeyPath::parse_dotted("").is_root());
    assert_eq!(KeyPath::parse_dotted("a..b"), KeyPath::from_segments(["a", "b"]));
}

#[test]
fn test_last_field_skips_indices() {
    let path = KeyPath::from_field("tags").push_index(3);
    assert_eq!(path.last_field(), Some("tags"));
    assert_eq!(path.last(), Some(&PathSegment::Index(3)));
    assert_eq!(KeyPath::root().last_field(), None);
}

#[test]
fn test_parent() {
    let path = KeyPath::from_segments(["a", "b"]);
    assert_eq!(path.parent(), Some(KeyPath::from_field("a")));
    assert_eq!(KeyPath::root().parent(), None);
}
