//! Tests for bounding box parsing and overlay-positioning helpers.

use drought_common::BoundingBox;

#[test]
fn test_parse_valid_bbox() {
    let bbox = BoundingBox::from_param("-125.0,24.0,-66.0,50.0").unwrap();
    assert_eq!(bbox.min_x, -125.0);
    assert_eq!(bbox.min_y, 24.0);
    assert_eq!(bbox.max_x, -66.0);
    assert_eq!(bbox.max_y, 50.0);
}

#[test]
fn test_parse_rejects_wrong_arity() {
    assert!(BoundingBox::from_param("1.0,2.0,3.0").is_err());
    assert!(BoundingBox::from_param("1.0,2.0,3.0,4.0,5.0").is_err());
}

#[test]
fn test_parse_rejects_non_numeric() {
    assert!(BoundingBox::from_param("a,2.0,3.0,4.0").is_err());
}

#[test]
fn test_width_height() {
    let bbox = BoundingBox::new(33.0, -5.0, 36.0, -2.0);
    assert_eq!(bbox.width(), 3.0);
    assert_eq!(bbox.height(), 3.0);
}

#[test]
fn test_corners_are_south_west_north_east() {
    // The overlay widget expects [[south, west], [north, east]]
    let bbox = BoundingBox::new(33.0, -5.0, 36.0, -2.0);
    let corners = bbox.to_corners();
    assert_eq!(corners[0], [-5.0, 33.0]);
    assert_eq!(corners[1], [-2.0, 36.0]);
}

#[test]
fn test_contains_point() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(5.0, 5.0));
    assert!(bbox.contains_point(0.0, 10.0));
    assert!(!bbox.contains_point(-0.1, 5.0));
}

#[test]
fn test_undefined_is_invalid() {
    assert!(!BoundingBox::undefined().is_valid());
    assert!(BoundingBox::new(33.0, -5.0, 36.0, -2.0).is_valid());
}

#[test]
fn test_serde_round_trip() {
    let bbox = BoundingBox::new(33.0, -5.0, 36.0, -2.0);
    let json = serde_json::to_string(&bbox).unwrap();
    let back: BoundingBox = serde_json::from_str(&json).unwrap();
    assert_eq!(back, bbox);
}
